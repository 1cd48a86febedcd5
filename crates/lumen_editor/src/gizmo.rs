//! The transform gizmo: a compound body of overlay shapes glued to a target

use crate::error::{EditorError, Result};
use crate::parts::{layout, part_material, GizmoAxis, GizmoMode, HIGHLIGHT};
use crate::snap::{ray_plane_intersection, SnapSettings};
use glam::{Quat, Vec3};
use lumen_gpu::GpuDevice;
use lumen_render::{DrawBatcher, DrawStats, FlatShader, FrameCamera, Material, Ray};
use lumen_scene::{BodyKey, Placement, Scene, SceneHit, ShapeDefinition, ShapeKey};
use lumen_shapes::GeometryLibrary;
use std::collections::HashMap;

/// Change produced by a drag, relative to the transform at drag start
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformDelta {
    pub translation: Vec3,
    pub rotation: Quat,
    /// Per-axis factor applied to every shape of the target
    pub scale: Vec3,
}

impl Default for TransformDelta {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Result of picking with a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pick {
    /// A gizmo handle was under the ray
    Gizmo(GizmoAxis),
    /// Closest scene shape, gizmo excluded
    Shape(ShapeKey),
    Nothing,
}

#[derive(Debug)]
struct Attachment {
    target: BodyKey,
    body: BodyKey,
    parts: HashMap<ShapeKey, GizmoAxis>,
}

#[derive(Debug)]
struct DragState {
    axis: GizmoAxis,
    start_position: Vec3,
    start_rotation: Quat,
    /// Local position and scale of every target shape
    start_parts: Vec<(ShapeKey, Vec3, Vec3)>,
    plane_normal: Vec3,
    /// First plane hit; `None` until the ray crosses the drag plane
    anchor: Option<Vec3>,
    last: TransformDelta,
}

/// Move/rotate/scale manipulator.
///
/// Its handles are `no_draw` sensor shapes on a static compound body, so
/// they answer ray casts without being drawn by the main batches or pushing
/// anything.
#[derive(Debug)]
pub struct Gizmo {
    mode: GizmoMode,
    size: f32,
    snap: SnapSettings,
    attached: Option<Attachment>,
    drag: Option<DragState>,
}

impl Default for Gizmo {
    fn default() -> Self {
        Self::new()
    }
}

impl Gizmo {
    pub fn new() -> Self {
        Self {
            mode: GizmoMode::Translate,
            size: 1.0,
            snap: SnapSettings::default(),
            attached: None,
            drag: None,
        }
    }

    /// Handle length in world units
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_snap(mut self, snap: SnapSettings) -> Self {
        self.snap = snap;
        self
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn snap(&self) -> &SnapSettings {
        &self.snap
    }

    pub fn snap_mut(&mut self) -> &mut SnapSettings {
        &mut self.snap
    }

    /// Body being manipulated
    pub fn target(&self) -> Option<BodyKey> {
        self.attached.as_ref().map(|a| a.target)
    }

    /// The gizmo's own body
    pub fn body(&self) -> Option<BodyKey> {
        self.attached.as_ref().map(|a| a.body)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Gizmo shapes belonging to one handle
    pub fn axis_shapes(&self, axis: GizmoAxis) -> Vec<ShapeKey> {
        let Some(attached) = &self.attached else {
            return Vec::new();
        };
        attached
            .parts
            .iter()
            .filter(|(_, a)| **a == axis)
            .map(|(shape, _)| *shape)
            .collect()
    }

    pub fn is_gizmo_shape(&self, shape: ShapeKey) -> bool {
        self.attached
            .as_ref()
            .is_some_and(|a| a.parts.contains_key(&shape))
    }

    // ==================== Lifecycle ====================

    /// Build the gizmo at `target`, replacing any previous attachment
    pub fn attach(&mut self, scene: &mut Scene, target: BodyKey) -> Result<()> {
        if self.body() == Some(target) {
            return Err(EditorError::InvalidTarget(target));
        }
        let position = scene
            .body(target)
            .map(|b| b.position())
            .ok_or(lumen_scene::SceneError::BodyNotFound(target))?;
        self.detach(scene)?;

        let parts = layout(self.mode, self.size);
        let specs = parts.iter().map(|(_, spec)| *spec).collect::<Vec<_>>();
        let body = scene.add_compound(Placement::at(position), true, &specs)?;
        let shapes = scene.shapes_of(body).unwrap_or_default();
        let parts = shapes
            .iter()
            .copied()
            .zip(parts.iter().map(|(axis, _)| *axis))
            .collect();

        log::debug!("{:?} gizmo attached to {:?}", self.mode, target);
        self.attached = Some(Attachment { target, body, parts });
        Ok(())
    }

    /// Remove the gizmo body. A no-op when not attached.
    pub fn detach(&mut self, scene: &mut Scene) -> Result<()> {
        self.drag = None;
        if let Some(attached) = self.attached.take() {
            if scene.contains_body(attached.body) {
                scene.remove_body(attached.body)?;
            }
            log::debug!("Gizmo detached from {:?}", attached.target);
        }
        Ok(())
    }

    /// Switch mode, rebuilding the handles. Ignored mid-drag.
    pub fn set_mode(&mut self, scene: &mut Scene, mode: GizmoMode) -> Result<()> {
        if self.drag.is_some() || mode == self.mode {
            return Ok(());
        }
        self.mode = mode;
        match self.target() {
            Some(target) => self.attach(scene, target),
            None => Ok(()),
        }
    }

    /// Keep the gizmo on its target after the target moved under physics.
    /// Detaches when the target is gone.
    pub fn follow(&mut self, scene: &mut Scene) -> Result<()> {
        let Some(attached) = &self.attached else {
            return Ok(());
        };
        let body = attached.body;
        let target = scene.body(attached.target).map(|b| b.position());
        match target {
            Some(position) => {
                scene.set_body_transform(body, position, Quat::IDENTITY)?;
                Ok(())
            }
            None => self.detach(scene),
        }
    }

    // ==================== Picking ====================

    /// Handle whose hit lies closest to `eye`, if any gizmo shape was hit
    pub fn resolve_axis(&self, hits: &[SceneHit], eye: Vec3) -> Option<GizmoAxis> {
        let attached = self.attached.as_ref()?;
        hits.iter()
            .filter_map(|hit| attached.parts.get(&hit.shape).map(|axis| (*axis, hit.point.distance(eye))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| axis)
    }

    /// Drop every hit on a gizmo shape
    pub fn filter_gizmo_shapes(&self, hits: Vec<SceneHit>) -> Vec<SceneHit> {
        hits.into_iter().filter(|hit| !self.is_gizmo_shape(hit.shape)).collect()
    }

    /// Gizmo handles take priority; otherwise the closest other shape
    pub fn pick(&self, scene: &mut Scene, ray: &Ray) -> Pick {
        let hits = scene.raycast(ray.origin, ray.direction);
        if let Some(axis) = self.resolve_axis(&hits, ray.origin) {
            return Pick::Gizmo(axis);
        }
        self.filter_gizmo_shapes(hits)
            .into_iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map_or(Pick::Nothing, |hit| Pick::Shape(hit.shape))
    }

    // ==================== Dragging ====================

    /// Start dragging `axis`. The handle is highlighted until [`end_drag`](Self::end_drag).
    pub fn begin_drag(&mut self, scene: &mut Scene, axis: GizmoAxis, ray: &Ray) -> Result<()> {
        let attached = self.attached.as_ref().ok_or(EditorError::NotAttached)?;
        let target = scene
            .body(attached.target)
            .ok_or(lumen_scene::SceneError::BodyNotFound(attached.target))?;

        let start_position = target.position();
        let start_rotation = target.rotation();
        let start_parts = shape_parts(scene, target.shapes());
        let plane_normal = drag_plane_normal(self.mode, axis, ray.direction);
        let anchor = ray_plane_intersection(ray, start_position, plane_normal);

        for shape in self.axis_shapes(axis) {
            scene.set_shape_material(shape, Material::colored(HIGHLIGHT))?;
        }

        log::trace!("Begin {:?} drag on {:?}", self.mode, axis);
        self.drag = Some(DragState {
            axis,
            start_position,
            start_rotation,
            start_parts,
            plane_normal,
            anchor,
            last: TransformDelta::default(),
        });
        Ok(())
    }

    /// Delta for the current pointer ray, relative to the drag start.
    /// Identity when no drag is active or the ray misses the drag plane.
    pub fn drag(&mut self, ray: &Ray) -> TransformDelta {
        let mode = self.mode;
        let size = self.size;
        let snap = self.snap;
        let Some(state) = self.drag.as_mut() else {
            return TransformDelta::default();
        };
        let Some(current) = ray_plane_intersection(ray, state.start_position, state.plane_normal) else {
            return state.last;
        };
        let Some(anchor) = state.anchor else {
            state.anchor = Some(current);
            return state.last;
        };

        let pivot = state.start_position;
        let mut delta = TransformDelta::default();
        match mode {
            GizmoMode::Translate => {
                let moved = current - anchor;
                let constrained = match state.axis.direction() {
                    Some(dir) => dir * moved.dot(dir),
                    None => moved,
                };
                delta.translation = snap.translation(constrained);
            }
            GizmoMode::Rotate => {
                let axis = state.axis.direction().unwrap_or(state.plane_normal);
                let from = anchor - pivot;
                let to = current - pivot;
                let angle = axis.dot(from.cross(to)).atan2(from.dot(to));
                delta.rotation = Quat::from_axis_angle(axis, snap.angle(angle));
            }
            GizmoMode::Scale => {
                let factor = match state.axis.direction() {
                    Some(dir) => ratio((current - pivot).dot(dir), (anchor - pivot).dot(dir), (current - anchor).dot(dir), size),
                    None => ratio((current - pivot).length(), (anchor - pivot).length(), 0.0, size),
                };
                let factor = snap.factor(factor).max(0.01);
                delta.scale = match state.axis {
                    GizmoAxis::X => Vec3::new(factor, 1.0, 1.0),
                    GizmoAxis::Y => Vec3::new(1.0, factor, 1.0),
                    GizmoAxis::Z => Vec3::new(1.0, 1.0, factor),
                    GizmoAxis::Center => Vec3::splat(factor),
                };
            }
        }

        state.last = delta;
        delta
    }

    /// Finish the drag, restoring handle colours. Returns the final delta.
    pub fn end_drag(&mut self, scene: &mut Scene) -> Option<TransformDelta> {
        let state = self.drag.take()?;
        for shape in self.axis_shapes(state.axis) {
            if let Err(err) = scene.set_shape_material(shape, part_material(state.axis)) {
                log::warn!("Failed to restore gizmo colour: {}", err);
            }
        }
        Some(state.last)
    }

    /// Apply `delta` to the target and move the gizmo along with it.
    ///
    /// During a drag the delta is taken relative to the drag start; otherwise
    /// relative to the target's current transform.
    pub fn apply(&self, scene: &mut Scene, delta: &TransformDelta) -> Result<()> {
        let attached = self.attached.as_ref().ok_or(EditorError::NotAttached)?;
        let target = scene
            .body(attached.target)
            .ok_or(lumen_scene::SceneError::BodyNotFound(attached.target))?;

        let (position, rotation, parts) = match &self.drag {
            Some(state) => (state.start_position, state.start_rotation, state.start_parts.clone()),
            None => (target.position(), target.rotation(), shape_parts(scene, target.shapes())),
        };

        let new_position = position + delta.translation;
        let new_rotation = (delta.rotation * rotation).normalize();
        scene.set_body_transform(attached.target, new_position, new_rotation)?;

        // Offsets scale with the shapes so a compound grows as one piece
        for (key, local_position, scale) in parts {
            let Some(shape) = scene.shape(key) else { continue };
            let wanted_position = local_position * delta.scale;
            let wanted_scale = ShapeDefinition::from_scale(shape.kind(), scale * delta.scale).scale();
            if shape.local_position() != wanted_position || shape.scale() != wanted_scale {
                scene.set_shape_local(key, wanted_position, wanted_scale)?;
            }
        }

        scene.set_body_transform(attached.body, new_position, Quat::IDENTITY)?;
        Ok(())
    }

    // ==================== Drawing ====================

    /// Draw the handles over the scene. Nothing is drawn when detached.
    pub fn draw(
        &self,
        scene: &Scene,
        device: &mut dyn GpuDevice,
        library: &GeometryLibrary,
        flat: &FlatShader,
        batcher: &mut DrawBatcher,
        camera: &FrameCamera,
    ) -> DrawStats {
        match self.body() {
            Some(body) => scene.draw_overlay(device, library, flat, batcher, body, camera),
            None => DrawStats::default(),
        }
    }
}

fn shape_parts(scene: &Scene, shapes: &[ShapeKey]) -> Vec<(ShapeKey, Vec3, Vec3)> {
    shapes
        .iter()
        .filter_map(|key| scene.shape(*key).map(|shape| (*key, shape.local_position(), shape.scale())))
        .collect()
}

/// Plane the pointer is projected onto while dragging
fn drag_plane_normal(mode: GizmoMode, axis: GizmoAxis, view: Vec3) -> Vec3 {
    match (mode, axis.direction()) {
        (GizmoMode::Rotate, Some(dir)) => dir,
        // Plane containing the axis, turned towards the viewer
        (_, Some(dir)) => {
            let normal = dir.cross(view).cross(dir);
            if normal.length_squared() > 1e-6 {
                normal.normalize()
            } else {
                dir.any_orthogonal_vector().normalize()
            }
        }
        (_, None) => -view,
    }
}

/// Scale factor from how far the pointer moved relative to where it started
fn ratio(current: f32, anchor: f32, moved: f32, size: f32) -> f32 {
    if anchor.abs() > 1e-4 {
        current / anchor
    } else {
        1.0 + moved / size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lumen_gpu::HeadlessDevice;
    use lumen_scene::{PhysicsConfig, ShapeSpec};
    use lumen_shapes::GeometryConfig;

    fn down(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 5.0, z), Vec3::NEG_Y)
    }

    fn setup() -> (Scene, BodyKey, Gizmo) {
        let mut scene = Scene::new(PhysicsConfig::default().with_gravity(0.0, 0.0, 0.0)).unwrap();
        let target = scene
            .add_cube(Placement::default(), Vec3::splat(0.2), Material::default(), false)
            .unwrap();
        let mut gizmo = Gizmo::new();
        gizmo.attach(&mut scene, target).unwrap();
        (scene, target, gizmo)
    }

    #[test]
    fn test_attach_builds_overlay_body() {
        let (scene, target, gizmo) = setup();
        let body = gizmo.body().unwrap();

        assert_eq!(gizmo.target(), Some(target));
        assert_eq!(scene.shapes_of(body).unwrap().len(), 7);
        assert!(scene.body(body).unwrap().is_static());
        for shape in scene.shapes_of(body).unwrap() {
            assert!(scene.shape(*shape).unwrap().flags().no_draw);
            assert!(gizmo.is_gizmo_shape(*shape));
        }
        assert_eq!(gizmo.axis_shapes(GizmoAxis::X).len(), 2);
        assert_eq!(gizmo.axis_shapes(GizmoAxis::Center).len(), 1);
    }

    #[test]
    fn test_attach_to_missing_or_own_body_fails() {
        let (mut scene, target, mut gizmo) = setup();
        let own = gizmo.body().unwrap();
        assert!(matches!(gizmo.attach(&mut scene, own), Err(EditorError::InvalidTarget(_))));

        scene.remove_body(target).unwrap();
        assert!(gizmo.attach(&mut scene, target).is_err());
    }

    #[test]
    fn test_detach_removes_body() {
        let (mut scene, _, mut gizmo) = setup();
        assert_eq!(scene.body_count(), 2);
        gizmo.detach(&mut scene).unwrap();
        assert_eq!(scene.body_count(), 1);
        assert!(gizmo.body().is_none());
        gizmo.detach(&mut scene).unwrap();
    }

    #[test]
    fn test_set_mode_rebuilds_parts() {
        let (mut scene, _, mut gizmo) = setup();
        let old = gizmo.body().unwrap();
        gizmo.set_mode(&mut scene, GizmoMode::Rotate).unwrap();

        assert!(!scene.contains_body(old));
        assert_eq!(gizmo.mode(), GizmoMode::Rotate);
        assert_eq!(scene.shapes_of(gizmo.body().unwrap()).unwrap().len(), 48);
        assert!(gizmo.axis_shapes(GizmoAxis::Center).is_empty());
    }

    #[test]
    fn test_resolve_axis_and_filter() {
        let (mut scene, target, gizmo) = setup();
        let hits = scene.raycast(Vec3::new(0.5, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(gizmo.resolve_axis(&hits, Vec3::new(0.5, 5.0, 0.0)), Some(GizmoAxis::X));
        assert!(gizmo.filter_gizmo_shapes(hits).is_empty());

        // Straight down through the centre: centre handle and target
        let hits = scene.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        let filtered = gizmo.filter_gizmo_shapes(hits.clone());
        assert_eq!(filtered.len(), 1);
        assert_eq!(scene.body_of(filtered[0].shape), Some(target));
        for axis in [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z, GizmoAxis::Center] {
            let set = gizmo.axis_shapes(axis);
            assert!(filtered.iter().all(|hit| !set.contains(&hit.shape)));
        }
    }

    #[test]
    fn test_pick_prefers_gizmo() {
        let (mut scene, target, gizmo) = setup();
        let other = scene
            .add_sphere(Placement::at(Vec3::new(5.0, 0.0, 0.0)), 0.5, Material::default(), true)
            .unwrap();

        // Looking straight down, the Y handle is nearest the eye
        assert_eq!(gizmo.pick(&mut scene, &down(0.0, 0.0)), Pick::Gizmo(GizmoAxis::Y));
        let sphere_shape = scene.shapes_of(other).unwrap()[0];
        assert_eq!(gizmo.pick(&mut scene, &down(5.0, 0.0)), Pick::Shape(sphere_shape));
        assert_eq!(gizmo.pick(&mut scene, &down(-5.0, 0.0)), Pick::Nothing);
        assert!(scene.body(target).is_some());
    }

    #[test]
    fn test_translate_drag_moves_target_and_gizmo() {
        let (mut scene, target, mut gizmo) = setup();
        gizmo.begin_drag(&mut scene, GizmoAxis::X, &down(0.5, 0.0)).unwrap();

        let delta = gizmo.drag(&down(2.0, 0.3));
        assert_relative_eq!(delta.translation.x, 1.5, epsilon = 1e-4);
        assert_relative_eq!(delta.translation.z, 0.0, epsilon = 1e-4);

        gizmo.apply(&mut scene, &delta).unwrap();
        let position = scene.body(target).unwrap().position();
        assert_relative_eq!(position.x, 1.5, epsilon = 1e-4);
        assert_eq!(scene.body(gizmo.body().unwrap()).unwrap().position(), position);

        // Deltas are relative to the drag start, not cumulative
        let delta = gizmo.drag(&down(1.0, 0.0));
        gizmo.apply(&mut scene, &delta).unwrap();
        assert_relative_eq!(scene.body(target).unwrap().position().x, 0.5, epsilon = 1e-4);
        assert!(gizmo.end_drag(&mut scene).is_some());
        assert!(!gizmo.is_dragging());
    }

    #[test]
    fn test_translate_snaps() {
        let (mut scene, _, mut gizmo) = setup();
        *gizmo.snap_mut() = SnapSettings::enabled();
        gizmo.begin_drag(&mut scene, GizmoAxis::X, &down(0.5, 0.0)).unwrap();
        let delta = gizmo.drag(&down(1.7, 0.0));
        assert_relative_eq!(delta.translation.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotate_drag() {
        let (mut scene, target, mut gizmo) = setup();
        gizmo.set_mode(&mut scene, GizmoMode::Rotate).unwrap();
        gizmo.begin_drag(&mut scene, GizmoAxis::Y, &down(1.0, 0.0)).unwrap();

        let delta = gizmo.drag(&down(0.0, -1.0));
        let turned = delta.rotation * Vec3::X;
        assert_relative_eq!(turned.z, -1.0, epsilon = 1e-4);

        gizmo.apply(&mut scene, &delta).unwrap();
        let rotation = scene.body(target).unwrap().rotation();
        assert_relative_eq!((rotation * Vec3::X).z, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_scale_drag_resizes_shapes() {
        let (mut scene, target, mut gizmo) = setup();
        gizmo.set_mode(&mut scene, GizmoMode::Scale).unwrap();
        gizmo.begin_drag(&mut scene, GizmoAxis::X, &down(0.5, 0.0)).unwrap();

        let delta = gizmo.drag(&down(1.0, 0.0));
        assert_relative_eq!(delta.scale.x, 2.0, epsilon = 1e-4);
        assert_eq!(delta.scale.y, 1.0);

        gizmo.apply(&mut scene, &delta).unwrap();
        let shape = scene.shapes_of(target).unwrap()[0];
        let scale = scene.shape(shape).unwrap().scale();
        assert_relative_eq!(scale.x, 0.4, epsilon = 1e-4);
        assert_relative_eq!(scale.y, 0.2, epsilon = 1e-4);
    }

    #[test]
    fn test_scale_spreads_compound_parts() {
        let mut scene = Scene::new(PhysicsConfig::default().with_gravity(0.0, 0.0, 0.0)).unwrap();
        let part = |x: f32| {
            ShapeSpec::new(ShapeDefinition::cube(Vec3::splat(0.5)), Material::default())
                .with_local_position(Vec3::X * x)
        };
        let target = scene.add_compound(Placement::default(), false, &[part(-1.0), part(1.0)]).unwrap();
        let mut gizmo = Gizmo::new();
        gizmo.attach(&mut scene, target).unwrap();

        let delta = TransformDelta {
            scale: Vec3::new(2.0, 1.0, 1.0),
            ..TransformDelta::default()
        };
        gizmo.apply(&mut scene, &delta).unwrap();

        let shapes = scene.shapes_of(target).unwrap().to_vec();
        let left = scene.shape(shapes[0]).unwrap();
        let right = scene.shape(shapes[1]).unwrap();
        assert_eq!(left.local_position(), Vec3::X * -2.0);
        assert_eq!(right.local_position(), Vec3::X * 2.0);
        assert_eq!(right.scale(), Vec3::new(1.0, 0.5, 0.5));

        // Parts stay apart: nothing between them at the origin
        let hits = scene.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert!(gizmo.filter_gizmo_shapes(hits).is_empty());
        let hits = scene.raycast(Vec3::new(2.3, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(gizmo.filter_gizmo_shapes(hits).len(), 1);
    }

    #[test]
    fn test_repeated_scale_keeps_round_collider() {
        let mut scene = Scene::new(PhysicsConfig::default().with_gravity(0.0, 0.0, 0.0)).unwrap();
        let target = scene.add_sphere(Placement::default(), 0.5, Material::default(), false).unwrap();
        let mut gizmo = Gizmo::new();
        gizmo.attach(&mut scene, target).unwrap();
        gizmo.set_mode(&mut scene, GizmoMode::Scale).unwrap();
        let shape = scene.shapes_of(target).unwrap()[0];

        // A sphere only grows uniformly, so one axis widens all three
        gizmo.begin_drag(&mut scene, GizmoAxis::X, &down(0.5, 0.0)).unwrap();
        let delta = gizmo.drag(&down(1.0, 0.0));
        gizmo.apply(&mut scene, &delta).unwrap();
        let collider = scene.shape(shape).unwrap().collider();
        assert_relative_eq!(scene.shape(shape).unwrap().scale().y, 1.0, epsilon = 1e-4);

        for _ in 0..3 {
            gizmo.apply(&mut scene, &delta).unwrap();
            assert_eq!(scene.shape(shape).unwrap().collider(), collider);
        }
        gizmo.end_drag(&mut scene);
    }

    #[test]
    fn test_drag_highlights_active_handle() {
        let (mut scene, _, mut gizmo) = setup();
        let shaft = gizmo.axis_shapes(GizmoAxis::Y)[0];
        gizmo.begin_drag(&mut scene, GizmoAxis::Y, &Ray::new(Vec3::new(0.0, 0.5, 5.0), Vec3::NEG_Z)).unwrap();
        assert_eq!(scene.shape(shaft).unwrap().material().diffuse, HIGHLIGHT);

        gizmo.end_drag(&mut scene);
        assert_eq!(scene.shape(shaft).unwrap().material().diffuse, GizmoAxis::Y.color());
    }

    #[test]
    fn test_drag_without_attachment() {
        let mut scene = Scene::new(PhysicsConfig::default()).unwrap();
        let mut gizmo = Gizmo::new();
        assert!(matches!(
            gizmo.begin_drag(&mut scene, GizmoAxis::X, &down(0.0, 0.0)),
            Err(EditorError::NotAttached)
        ));
        assert_eq!(gizmo.drag(&down(1.0, 0.0)), TransformDelta::default());
        assert!(gizmo.apply(&mut scene, &TransformDelta::default()).is_err());
    }

    #[test]
    fn test_follow_tracks_falling_target() {
        let mut scene = Scene::new(PhysicsConfig::default()).unwrap();
        let target = scene
            .add_sphere(Placement::at(Vec3::Y * 10.0), 0.5, Material::default(), false)
            .unwrap();
        let mut gizmo = Gizmo::new();
        gizmo.attach(&mut scene, target).unwrap();

        for _ in 0..5 {
            scene.step();
            gizmo.follow(&mut scene).unwrap();
        }
        let position = scene.body(target).unwrap().position();
        assert!(position.y < 10.0);
        assert_eq!(scene.body(gizmo.body().unwrap()).unwrap().position(), position);

        scene.remove_body(target).unwrap();
        gizmo.follow(&mut scene).unwrap();
        assert!(gizmo.body().is_none());
        assert_eq!(scene.body_count(), 0);
    }

    #[test]
    fn test_draw_overlay_only_when_attached() {
        let (mut scene, _, mut gizmo) = setup();
        let mut device = HeadlessDevice::new();
        let library = GeometryLibrary::new(&mut device, &GeometryConfig::coarse()).unwrap();
        let flat = FlatShader::new(&mut device).unwrap();
        let mut batcher = DrawBatcher::new();
        let camera = lumen_render::Camera::default().frame();

        let stats = gizmo.draw(&scene, &mut device, &library, &flat, &mut batcher, &camera);
        assert_eq!(stats.draw_calls, 7);

        gizmo.detach(&mut scene).unwrap();
        let stats = gizmo.draw(&scene, &mut device, &library, &flat, &mut batcher, &camera);
        assert_eq!(stats, DrawStats::default());
    }
}
