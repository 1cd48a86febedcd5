//! Draw batching by geometry kind.
//!
//! Sources hand instances over grouped by [`GeometryKind`], so each shared
//! vertex/index buffer pair is bound at most once per phase and only the
//! per-instance uniforms change between draws.

use crate::material::Material;
use crate::target::ShaderTarget;
use glam::Mat4;
use lumen_gpu::GpuDevice;
use lumen_shapes::{GeometryKind, GeometryLibrary};
use std::ops::AddAssign;

/// Render phase of a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderPhase {
    /// Depth only: transforms, no material
    Shadow,
    /// Full lighting: transform and material
    Lit,
    /// Editor overlays drawn with the flat program
    Overlay,
}

impl RenderPhase {
    fn uses_material(self) -> bool {
        !matches!(self, RenderPhase::Shadow)
    }
}

/// One drawable instance
#[derive(Clone, Copy, Debug)]
pub struct DrawInstance<'a> {
    pub model: &'a Mat4,
    pub material: &'a Material,
}

/// Anything that can enumerate instances of one geometry kind
pub trait DrawSource {
    /// Visit every instance of `kind` in a stable order
    fn visit_group(&self, kind: GeometryKind, visitor: &mut dyn FnMut(DrawInstance<'_>));
}

/// Counters for one or more batches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub geometry_binds: u32,
    pub draw_calls: u32,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, other: Self) {
        self.geometry_binds += other.geometry_binds;
        self.draw_calls += other.draw_calls;
    }
}

/// Issues grouped draws and keeps per-frame totals
#[derive(Debug, Default)]
pub struct DrawBatcher {
    frame: DrawStats,
}

impl DrawBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the frame totals
    pub fn begin_frame(&mut self) {
        self.frame = DrawStats::default();
    }

    /// Totals since [`begin_frame`](Self::begin_frame)
    pub fn frame_stats(&self) -> DrawStats {
        self.frame
    }

    /// Draw every instance of `source` with `target`.
    ///
    /// Geometry for a kind is bound lazily on its first instance, so empty
    /// groups cost nothing.
    pub fn draw(
        &mut self,
        device: &mut dyn GpuDevice,
        target: &dyn ShaderTarget,
        source: &dyn DrawSource,
        library: &GeometryLibrary,
        phase: RenderPhase,
    ) -> DrawStats {
        let mut stats = DrawStats::default();
        target.bind(device);

        for kind in GeometryKind::ALL {
            let geometry = library.get(kind);
            let mut bound = false;
            source.visit_group(kind, &mut |instance: DrawInstance<'_>| {
                if !bound {
                    geometry.bind(device, target.attributes());
                    stats.geometry_binds += 1;
                    bound = true;
                }
                let material = phase.uses_material().then_some(instance.material);
                target.set_instance(device, instance.model, material);
                geometry.draw(device);
                stats.draw_calls += 1;
            });
        }

        log::trace!(
            "{:?} batch: {} binds, {} draws",
            phase,
            stats.geometry_binds,
            stats.draw_calls
        );
        self.frame += stats;
        stats
    }
}
