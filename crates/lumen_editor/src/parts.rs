//! Gizmo modes, axes and the shapes that make up each handle

use glam::{Quat, Vec3};
use lumen_render::Material;
use lumen_scene::{ShapeDefinition, ShapeFlags, ShapeSpec};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Current gizmo operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// Handle of a gizmo
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
    /// Free movement in the view plane, or uniform scale
    Center,
}

impl GizmoAxis {
    pub const AXES: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    /// World direction of the axis. `None` for the centre handle.
    pub fn direction(self) -> Option<Vec3> {
        match self {
            GizmoAxis::X => Some(Vec3::X),
            GizmoAxis::Y => Some(Vec3::Y),
            GizmoAxis::Z => Some(Vec3::Z),
            GizmoAxis::Center => None,
        }
    }

    /// Overlay colour: red, green, blue, yellow
    pub fn color(self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::new(1.0, 0.0, 0.0),
            GizmoAxis::Y => Vec3::new(0.0, 1.0, 0.0),
            GizmoAxis::Z => Vec3::new(0.0, 0.0, 1.0),
            GizmoAxis::Center => Vec3::new(1.0, 1.0, 0.0),
        }
    }
}

/// Colour of the handle being dragged
pub(crate) const HIGHLIGHT: Vec3 = Vec3::new(1.0, 1.0, 1.0);

const SHAFT_LENGTH: f32 = 0.8;
const SHAFT_RADIUS: f32 = 0.03;
const TIP_LENGTH: f32 = 0.2;
const RING_BEADS: usize = 16;
const BEAD_RADIUS: f32 = 0.05;

pub(crate) fn part_material(axis: GizmoAxis) -> Material {
    Material::colored(axis.color())
}

fn part(axis: GizmoAxis, definition: ShapeDefinition, position: Vec3, rotation: Quat) -> (GizmoAxis, ShapeSpec) {
    let spec = ShapeSpec::new(definition, part_material(axis))
        .with_local_position(position)
        .with_local_rotation(rotation)
        .with_flags(ShapeFlags::overlay());
    (axis, spec)
}

/// Every shape of the gizmo for `mode`, in body space, tagged with its handle
pub(crate) fn layout(mode: GizmoMode, size: f32) -> Vec<(GizmoAxis, ShapeSpec)> {
    let mut parts = Vec::new();

    match mode {
        GizmoMode::Translate | GizmoMode::Scale => {
            for axis in GizmoAxis::AXES {
                let Some(dir) = axis.direction() else { continue };
                let align = Quat::from_rotation_arc(Vec3::Y, dir);
                parts.push(part(
                    axis,
                    ShapeDefinition::cylinder(SHAFT_RADIUS * size, SHAFT_LENGTH * size),
                    dir * SHAFT_LENGTH * 0.5 * size,
                    align,
                ));

                let tip_center = dir * (SHAFT_LENGTH + TIP_LENGTH * 0.5) * size;
                let tip = if mode == GizmoMode::Translate {
                    ShapeDefinition::cone(TIP_LENGTH * 0.4 * size, TIP_LENGTH * size)
                } else {
                    ShapeDefinition::cube(Vec3::splat(TIP_LENGTH * 0.75 * size))
                };
                parts.push(part(axis, tip, tip_center, align));
            }
            parts.push(part(
                GizmoAxis::Center,
                ShapeDefinition::cube(Vec3::splat(0.15 * size)),
                Vec3::ZERO,
                Quat::IDENTITY,
            ));
        }
        GizmoMode::Rotate => {
            // Each ring is a loop of beads in the plane normal to its axis
            for axis in GizmoAxis::AXES {
                let Some(dir) = axis.direction() else { continue };
                let (u, v) = dir.any_orthonormal_pair();
                for i in 0..RING_BEADS {
                    let angle = TAU * i as f32 / RING_BEADS as f32;
                    let position = (u * angle.cos() + v * angle.sin()) * size;
                    parts.push(part(axis, ShapeDefinition::sphere(BEAD_RADIUS * size), position, Quat::IDENTITY));
                }
            }
        }
    }

    parts
}
