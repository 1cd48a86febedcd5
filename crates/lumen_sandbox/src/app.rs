//! Headless application: owns the device, the scene and the gizmo, and
//! runs the per-frame update and draw sequence.

use crate::config::{RenderSettings, SandboxConfig};
use crate::error::Result;
use glam::Vec2;
use lumen_editor::{Gizmo, Pick, TransformDelta};
use lumen_gpu::HeadlessDevice;
use lumen_render::{
    Camera, DebugLineRenderer, DrawBatcher, DrawStats, FlatShader, LightData, MaterialTextures, ModelShader, Ray,
    ShaderCache,
};
use lumen_scene::{BodyKey, Scene};
use lumen_shader::ShaderConfig;
use lumen_shapes::GeometryLibrary;

/// What one frame did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number, starting at 0
    pub frame: u64,
    /// Shadow and lit passes of the scene
    pub draw: DrawStats,
    /// Gizmo overlay
    pub overlay: DrawStats,
    /// Physics wireframe segments, 0 when disabled
    pub debug_segments: u32,
}

/// Sandbox state
pub struct App {
    device: HeadlessDevice,
    library: GeometryLibrary,
    cache: ShaderCache,
    shader: ModelShader,
    flat: FlatShader,
    lines: DebugLineRenderer,
    batcher: DrawBatcher,
    scene: Scene,
    gizmo: Gizmo,
    camera: Camera,
    lights: LightData,
    settings: RenderSettings,
    bodies: Vec<BodyKey>,
    frame: u64,
}

impl App {
    /// Build GPU resources and the scene described by `config`
    pub fn new(config: &SandboxConfig) -> Result<Self> {
        config.validate()?;
        let mut device = HeadlessDevice::new();

        // ==================== GPU resources ====================

        let library = GeometryLibrary::new(&mut device, &config.geometry)?;
        let mut cache = ShaderCache::new();
        let shader_config = ShaderConfig::new()
            .with_lights(config.lights.layout())
            .with_shading(config.render.shading)
            .with_shadows(config.render.shadows);
        let shader = ModelShader::new(
            &mut device,
            &mut cache,
            shader_config,
            &MaterialTextures::new(),
            config.shadow.clone(),
        )?;
        let flat = FlatShader::new(&mut device)?;
        let lines = DebugLineRenderer::new(&mut device)?;

        // ==================== Scene ====================

        let mut scene = Scene::new(config.physics.clone())?;
        let bodies = config.populate(&mut scene)?;

        let mut gizmo = Gizmo::new()
            .with_size(config.editor.size)
            .with_snap(config.editor.snap);
        gizmo.set_mode(&mut scene, config.editor.mode)?;
        if let Some(index) = config.editor.select {
            if let Some(&body) = bodies.get(index) {
                gizmo.attach(&mut scene, body)?;
            }
        }

        log::info!(
            "Sandbox ready: {} bodies, {} shapes, {} shadow passes",
            scene.body_count(),
            scene.shape_count(),
            shader.shadow_pass_count()
        );

        Ok(Self {
            device,
            library,
            cache,
            shader,
            flat,
            lines,
            batcher: DrawBatcher::new(),
            scene,
            gizmo,
            camera: config.camera.build(config.render.viewport),
            lights: config.lights.clone(),
            settings: config.render.clone(),
            bodies,
            frame: 0,
        })
    }

    // ==================== Accessors ====================

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn gizmo(&self) -> &Gizmo {
        &self.gizmo
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn device(&self) -> &HeadlessDevice {
        &self.device
    }

    /// Keys of the configured bodies, in file order
    pub fn bodies(&self) -> &[BodyKey] {
        &self.bodies
    }

    /// Frames completed so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    // ==================== Frame ====================

    /// Step physics, then draw shadows, the lit scene, the gizmo and the
    /// optional physics wireframe, in that order.
    pub fn frame(&mut self) -> FrameReport {
        // Only the current frame's commands are kept
        self.device.clear_commands();

        self.scene.step();
        if let Err(err) = self.gizmo.follow(&mut self.scene) {
            log::warn!("Gizmo lost its target: {}", err);
        }

        self.batcher.begin_frame();
        let camera = self.camera.frame();
        let draw = self.scene.draw(
            &mut self.device,
            &self.library,
            &mut self.shader,
            &mut self.batcher,
            &camera,
            &self.lights,
        );
        let overlay = self.gizmo.draw(
            &self.scene,
            &mut self.device,
            &self.library,
            &self.flat,
            &mut self.batcher,
            &camera,
        );
        let debug_segments = if self.settings.debug_lines {
            self.scene
                .debug_draw(&mut self.device, &mut self.lines, camera.view, camera.projection)
        } else {
            0
        };

        let report = FrameReport {
            frame: self.frame,
            draw,
            overlay,
            debug_segments,
        };
        log::trace!("{:?}", report);
        self.frame += 1;
        report
    }

    /// Run `frames` frames and return the last report
    pub fn run(&mut self, frames: u32) -> Option<FrameReport> {
        let mut last = None;
        for _ in 0..frames {
            last = Some(self.frame());
        }
        if let Some(report) = last {
            log::info!(
                "Ran {} frames; last frame {} binds, {} draws",
                frames,
                report.draw.geometry_binds + report.overlay.geometry_binds,
                report.draw.draw_calls + report.overlay.draw_calls
            );
        }
        last
    }

    // ==================== Pointer input ====================

    /// World ray under a pixel of the viewport
    pub fn pointer_ray(&self, pixel: Vec2) -> Ray {
        let viewport = Vec2::new(self.settings.viewport[0] as f32, self.settings.viewport[1] as f32);
        self.camera.screen_ray(Camera::pixel_to_ndc(pixel, viewport))
    }

    /// Press at `pixel`: a handle starts a drag, a shape selects its body,
    /// empty space clears the selection.
    pub fn click(&mut self, pixel: Vec2) -> Result<Pick> {
        let ray = self.pointer_ray(pixel);
        let pick = self.gizmo.pick(&mut self.scene, &ray);
        match pick {
            Pick::Gizmo(axis) => self.gizmo.begin_drag(&mut self.scene, axis, &ray)?,
            Pick::Shape(shape) => {
                if let Some(body) = self.scene.body_of(shape) {
                    if self.gizmo.target() != Some(body) {
                        log::debug!("Selected {:?}", body);
                        self.gizmo.attach(&mut self.scene, body)?;
                    }
                }
            }
            Pick::Nothing => self.gizmo.detach(&mut self.scene)?,
        }
        Ok(pick)
    }

    /// Pointer moved to `pixel` while pressed. No-op unless dragging.
    pub fn drag_to(&mut self, pixel: Vec2) -> Result<TransformDelta> {
        if !self.gizmo.is_dragging() {
            return Ok(TransformDelta::default());
        }
        let ray = self.pointer_ray(pixel);
        let delta = self.gizmo.drag(&ray);
        self.gizmo.apply(&mut self.scene, &delta)?;
        Ok(delta)
    }

    /// Pointer released. Returns the final delta of a finished drag.
    pub fn release(&mut self) -> Option<TransformDelta> {
        self.gizmo.end_drag(&mut self.scene)
    }

    /// Destroy every GPU resource and hand the device back
    pub fn shutdown(self) -> HeadlessDevice {
        let Self {
            mut device,
            library,
            cache,
            shader,
            flat,
            lines,
            frame,
            ..
        } = self;
        shader.release(&mut device);
        cache.release(&mut device);
        flat.release(&mut device);
        lines.release(&mut device);
        library.release(&mut device);
        log::info!("Sandbox shut down after {} frames", frame);
        device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use lumen_editor::GizmoAxis;
    use lumen_gpu::GpuCommand;

    const ONE_CUBE: &str = r#"
        [render]
        shadows = false
        viewport = [800, 600]

        [camera]
        position = [0.0, 0.0, 10.0]
        target = [0.0, 0.0, 0.0]

        [[bodies]]
        name = "cube"
        static = true
        [[bodies.shapes]]
        shape = { type = "box", extents = [1.0, 1.0, 1.0] }
    "#;

    fn app(text: &str) -> App {
        App::new(&SandboxConfig::from_str(text).unwrap()).unwrap()
    }

    fn pixel_of(app: &App, point: Vec3) -> Vec2 {
        let ndc = app.camera().view_projection_matrix().project_point3(point);
        Vec2::new((ndc.x + 1.0) * 0.5 * 800.0, (1.0 - ndc.y) * 0.5 * 600.0)
    }

    #[test]
    fn test_frame_draws_every_body() {
        let mut app = app(ONE_CUBE);
        let report = app.frame();

        assert_eq!(report.frame, 0);
        assert_eq!(report.draw, DrawStats { geometry_binds: 1, draw_calls: 1 });
        assert_eq!(report.overlay, DrawStats::default());
        assert_eq!(report.debug_segments, 0);
        assert_eq!(app.frame_count(), 1);
    }

    #[test]
    fn test_builtin_scene_runs_with_shadows() {
        let mut app = App::new(&SandboxConfig::builtin().unwrap()).unwrap();
        let report = app.run(3).unwrap();

        assert_eq!(report.frame, 2);
        // Ten visible shapes in the lit pass, more again in the shadow passes
        assert!(report.draw.draw_calls > 10);
        assert!(app.device().count(|c| matches!(c, GpuCommand::BeginShadowTarget { .. })) > 0);
        // The builtin scene selects a body, so the gizmo is drawn
        assert_eq!(report.overlay.draw_calls, 7);
    }

    #[test]
    fn test_dynamic_bodies_fall() {
        let mut app = app(
            r#"
            [[bodies]]
            position = [0.0, 10.0, 0.0]
            [[bodies.shapes]]
            shape = { type = "sphere", radius = 0.5 }
        "#,
        );
        let ball = app.bodies()[0];
        app.run(30);
        assert!(app.scene().body(ball).unwrap().position().y < 10.0);
    }

    #[test]
    fn test_debug_lines_follow_setting() {
        let text = ONE_CUBE.replace("shadows = false", "shadows = false\ndebug_lines = true");
        let mut app = app(&text);
        assert!(app.frame().debug_segments >= 12);
    }

    #[test]
    fn test_click_selects_and_clears() {
        let mut app = app(ONE_CUBE);
        let cube = app.bodies()[0];

        let center = pixel_of(&app, Vec3::new(0.3, 0.3, 0.5));
        assert!(matches!(app.click(center).unwrap(), Pick::Shape(_)));
        assert_eq!(app.gizmo().target(), Some(cube));
        assert_eq!(app.frame().overlay.draw_calls, 7);

        assert_eq!(app.click(Vec2::new(5.0, 5.0)).unwrap(), Pick::Nothing);
        assert_eq!(app.gizmo().target(), None);
        assert_eq!(app.frame().overlay, DrawStats::default());
    }

    #[test]
    fn test_drag_x_handle_moves_target() {
        let text = format!("{ONE_CUBE}\n[editor]\nselect = 0\n");
        let mut app = app(&text);
        let cube = app.bodies()[0];

        let handle = pixel_of(&app, Vec3::new(0.6, 0.0, 0.0));
        assert_eq!(app.click(handle).unwrap(), Pick::Gizmo(GizmoAxis::X));
        assert!(app.gizmo().is_dragging());

        let delta = app.drag_to(pixel_of(&app, Vec3::new(2.6, 0.0, 0.0))).unwrap();
        assert_relative_eq!(delta.translation.x, 2.0, epsilon = 1e-3);

        let last = app.release().unwrap();
        assert_eq!(last, delta);
        assert!(!app.gizmo().is_dragging());

        app.frame();
        let position = app.scene().body(cube).unwrap().position();
        assert_relative_eq!(position.x, 2.0, epsilon = 1e-3);
        assert_relative_eq!(position.y, 0.0, epsilon = 1e-3);
        // The gizmo follows its target
        let gizmo = app.gizmo().body().unwrap();
        assert_relative_eq!(app.scene().body(gizmo).unwrap().position().x, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_drag_without_press_is_identity() {
        let mut app = app(ONE_CUBE);
        assert_eq!(app.drag_to(Vec2::new(100.0, 100.0)).unwrap(), TransformDelta::default());
        assert!(app.release().is_none());
    }

    #[test]
    fn test_shutdown_releases_gpu_resources() {
        let mut app = App::new(&SandboxConfig::builtin().unwrap()).unwrap();
        app.frame();

        let device = app.shutdown();
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_programs(), 0);
        assert_eq!(device.live_shadow_targets(), 0);
    }
}
