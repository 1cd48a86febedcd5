//! Feeding the registry to the draw batcher

use crate::handle::BodyKey;
use crate::scene::Scene;
use glam::Mat4;
use lumen_gpu::{with_state, GpuDevice, RenderState};
use lumen_render::{
    DebugLineRenderer, DrawBatcher, DrawInstance, DrawSource, DrawStats, FlatShader, FrameCamera, LightData,
    LineVertex, ModelShader, RenderPhase,
};
use lumen_shapes::{GeometryKind, GeometryLibrary};

/// Main batches skip `no_draw` shapes
impl DrawSource for Scene {
    fn visit_group(&self, kind: GeometryKind, visitor: &mut dyn FnMut(DrawInstance<'_>)) {
        for key in &self.draw_index[kind.index()] {
            let Some(shape) = self.shapes.get(*key) else {
                continue;
            };
            if shape.flags.no_draw {
                continue;
            }
            visitor(DrawInstance {
                model: &shape.model,
                material: &shape.material,
            });
        }
    }
}

/// Every shape of one body, `no_draw` included
struct BodyShapes<'a> {
    scene: &'a Scene,
    body: BodyKey,
}

impl DrawSource for BodyShapes<'_> {
    fn visit_group(&self, kind: GeometryKind, visitor: &mut dyn FnMut(DrawInstance<'_>)) {
        let Some(body) = self.scene.bodies.get(self.body) else {
            return;
        };
        for key in &body.shapes {
            if let Some(shape) = self.scene.shapes.get(*key) {
                if shape.kind == kind {
                    visitor(DrawInstance {
                        model: &shape.model,
                        material: &shape.material,
                    });
                }
            }
        }
    }
}

impl Scene {
    /// Render one frame: every shadow pass the shader asks for, then the lit pass.
    ///
    /// Call [`step`](Scene::step) first; drawing only reads cached matrices.
    pub fn draw(
        &self,
        device: &mut dyn GpuDevice,
        library: &GeometryLibrary,
        shader: &mut ModelShader,
        batcher: &mut DrawBatcher,
        camera: &FrameCamera,
        lights: &LightData,
    ) -> DrawStats {
        let mut stats = DrawStats::default();

        while shader.begin_render_shadow(device, lights) {
            if let Some(depth) = shader.shadow_target() {
                stats += batcher.draw(device, depth, self, library, RenderPhase::Shadow);
            }
            shader.end_render_shadow(device);
        }

        shader.bind_frame(device, camera, lights);
        stats += batcher.draw(device, &*shader, self, library, RenderPhase::Lit);
        stats
    }

    /// Draw one body's shapes in flat colour over the scene, each in its
    /// material's diffuse colour. Depth testing is off for the duration.
    pub fn draw_overlay(
        &self,
        device: &mut dyn GpuDevice,
        library: &GeometryLibrary,
        flat: &FlatShader,
        batcher: &mut DrawBatcher,
        body: BodyKey,
        camera: &FrameCamera,
    ) -> DrawStats {
        let source = BodyShapes { scene: self, body };
        with_state(device, RenderState::gizmo_overlay(), |device| {
            flat.set_camera(device, camera.view, camera.projection);
            batcher.draw(device, flat, &source, library, RenderPhase::Overlay)
        })
    }

    /// Physics wireframe of every collider and contact. Returns the segment count.
    pub fn debug_draw(
        &mut self,
        device: &mut dyn GpuDevice,
        lines: &mut DebugLineRenderer,
        view: Mat4,
        projection: Mat4,
    ) -> u32 {
        let vertices = self
            .physics_mut()
            .debug_lines()
            .into_iter()
            .flat_map(|line| [LineVertex::new(line.start, line.color), LineVertex::new(line.end, line.color)])
            .collect::<Vec<_>>();
        lines.draw(device, &vertices, view, projection)
    }
}
