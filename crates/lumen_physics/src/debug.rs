//! Wireframe output of collider shapes and contacts

use crate::convert::from_point;
use glam::Vec3;
use rapier3d::pipeline::{DebugRenderBackend, DebugRenderObject};
use rapier3d::prelude as rapier;

/// One world-space line segment with an RGBA colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: [f32; 4],
}

/// Collects lines emitted by Rapier's debug render pipeline
#[derive(Default)]
pub(crate) struct LineCollector {
    pub(crate) lines: Vec<DebugLine>,
}

impl DebugRenderBackend for LineCollector {
    fn draw_line(
        &mut self,
        _object: DebugRenderObject<'_>,
        a: rapier::Point<f32>,
        b: rapier::Point<f32>,
        color: [f32; 4],
    ) {
        self.lines.push(DebugLine {
            start: from_point(&a),
            end: from_point(&b),
            color: hsla_to_rgba(color),
        });
    }
}

/// Rapier colours are HSLA with hue in degrees
pub(crate) fn hsla_to_rgba([h, s, l, a]: [f32; 4]) -> [f32; 4] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h / 60.0).rem_euclid(6.0);
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c * 0.5;
    [r + m, g + m, b + m, a]
}
