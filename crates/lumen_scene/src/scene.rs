//! The body/shape registry

use crate::body::{Body, Shape};
use crate::error::{Result, SceneError};
use crate::handle::{BodyKey, Placement, ShapeKey, ShapeSpec};
use glam::{Mat4, Quat, Vec3};
use lumen_physics::{BodyDesc, ColliderDesc, ColliderHandle, PhysicsConfig, PhysicsWorld};
use lumen_render::Material;
use lumen_shapes::{GeometryKind, ShapeDefinition};
use slotmap::SlotMap;
use std::collections::HashMap;

/// A shape hit by a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneHit {
    pub shape: ShapeKey,
    /// World-space hit point
    pub point: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Owns the physics world and every body and shape living in it.
///
/// Handles come from slot maps, so adding or removing one body never
/// disturbs another body's keys. A removed key simply stops resolving.
pub struct Scene {
    physics: PhysicsWorld,
    pub(crate) bodies: SlotMap<BodyKey, Body>,
    pub(crate) shapes: SlotMap<ShapeKey, Shape>,
    /// Collider to shape, for mapping ray hits
    colliders: HashMap<ColliderHandle, ShapeKey>,
    /// Shapes per geometry kind in insertion order
    pub(crate) draw_index: [Vec<ShapeKey>; GeometryKind::COUNT],
}

impl Scene {
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        Ok(Self {
            physics: PhysicsWorld::new(config)?,
            bodies: SlotMap::with_key(),
            shapes: SlotMap::with_key(),
            colliders: HashMap::new(),
            draw_index: Default::default(),
        })
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub(crate) fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    // ==================== Single-shape bodies ====================

    /// Add a box body. `extents` are full edge lengths.
    pub fn add_cube(&mut self, placement: Placement, extents: Vec3, material: Material, is_static: bool) -> Result<BodyKey> {
        self.add_single(placement, ShapeDefinition::cube(extents), material, is_static)
    }

    pub fn add_sphere(&mut self, placement: Placement, radius: f32, material: Material, is_static: bool) -> Result<BodyKey> {
        self.add_single(placement, ShapeDefinition::sphere(radius), material, is_static)
    }

    pub fn add_cylinder(
        &mut self,
        placement: Placement,
        radius: f32,
        height: f32,
        material: Material,
        is_static: bool,
    ) -> Result<BodyKey> {
        self.add_single(placement, ShapeDefinition::cylinder(radius, height), material, is_static)
    }

    pub fn add_cone(
        &mut self,
        placement: Placement,
        radius: f32,
        height: f32,
        material: Material,
        is_static: bool,
    ) -> Result<BodyKey> {
        self.add_single(placement, ShapeDefinition::cone(radius, height), material, is_static)
    }

    fn add_single(
        &mut self,
        placement: Placement,
        definition: ShapeDefinition,
        material: Material,
        is_static: bool,
    ) -> Result<BodyKey> {
        self.insert_body(placement, is_static, false, &[ShapeSpec::new(definition, material)])
    }

    // ==================== Compound bodies ====================

    /// Add one body carrying every shape in `shapes`.
    ///
    /// A dynamic compound body splits unit mass evenly over these shapes.
    pub fn add_compound(&mut self, placement: Placement, is_static: bool, shapes: &[ShapeSpec]) -> Result<BodyKey> {
        self.insert_body(placement, is_static, true, shapes)
    }

    fn insert_body(
        &mut self,
        placement: Placement,
        is_static: bool,
        compound: bool,
        specs: &[ShapeSpec],
    ) -> Result<BodyKey> {
        let desc = (if is_static { BodyDesc::fixed() } else { BodyDesc::dynamic() })
            .with_position(placement.position)
            .with_rotation(placement.rotation);
        let mass = PhysicsWorld::initial_mass(is_static, specs.len());
        let colliders = specs.iter().map(|spec| collider_desc(spec, mass)).collect::<Vec<_>>();

        // Physics first: it validates every dimension before anything is recorded
        let (handle, collider_handles) = self.physics.create_compound(&desc, &colliders)?;

        let key = self.bodies.insert(Body {
            handle,
            position: placement.position,
            rotation: placement.rotation,
            is_static,
            compound,
            shapes: Vec::with_capacity(specs.len()),
        });
        for (spec, collider) in specs.iter().zip(collider_handles) {
            self.record_shape(key, spec, collider, mass);
        }

        log::debug!(
            "Added {} body {:?} with {} shape(s)",
            if is_static { "static" } else { "dynamic" },
            key,
            specs.len()
        );
        Ok(key)
    }

    /// Attach another shape to an existing body.
    ///
    /// A dynamic body keeps unit mass: it is spread evenly again over every
    /// shape, the new one included.
    pub fn add_shape(&mut self, body: BodyKey, spec: ShapeSpec) -> Result<ShapeKey> {
        let (handle, is_static) = self
            .bodies
            .get(body)
            .map(|b| (b.handle, b.is_static))
            .ok_or(SceneError::BodyNotFound(body))?;
        let collider = self.physics.attach_collider(handle, &collider_desc(&spec, 0.0))?;
        let shape = self.record_shape(body, &spec, collider, 0.0);

        if !is_static {
            let mass = self.physics.rebalance_mass(handle)?;
            if let Some(b) = self.bodies.get(body) {
                for key in &b.shapes {
                    if let Some(s) = self.shapes.get_mut(*key) {
                        s.mass = mass;
                    }
                }
            }
        }
        log::debug!("Added shape {:?} to body {:?}", shape, body);
        Ok(shape)
    }

    fn record_shape(&mut self, body: BodyKey, spec: &ShapeSpec, collider: ColliderHandle, mass: f32) -> ShapeKey {
        let world = self
            .bodies
            .get(body)
            .map(Body::world_matrix)
            .unwrap_or(Mat4::IDENTITY);
        let kind = spec.definition.kind();

        let mut shape = Shape {
            body,
            kind,
            local_position: spec.local_position,
            local_rotation: spec.local_rotation,
            scale: spec.definition.scale(),
            model: Mat4::IDENTITY,
            material: spec.material,
            flags: spec.flags,
            collider,
            mass,
        };
        shape.refresh(&world);

        let key = self.shapes.insert(shape);
        self.colliders.insert(collider, key);
        self.draw_index[kind.index()].push(key);
        if let Some(body) = self.bodies.get_mut(body) {
            body.shapes.push(key);
        }
        key
    }

    // ==================== Removal ====================

    /// Remove a body, its shapes and its physics body.
    ///
    /// Keys of the removed body and its shapes stop resolving; every other
    /// key is unaffected.
    pub fn remove_body(&mut self, key: BodyKey) -> Result<()> {
        let body = self.bodies.remove(key).ok_or(SceneError::BodyNotFound(key))?;

        for shape_key in &body.shapes {
            if let Some(shape) = self.shapes.remove(*shape_key) {
                self.colliders.remove(&shape.collider);
                self.draw_index[shape.kind.index()].retain(|k| k != shape_key);
            }
        }
        self.physics.remove_body(body.handle)?;

        log::debug!("Removed body {:?} ({} shapes)", key, body.shapes.len());
        Ok(())
    }

    // ==================== Simulation ====================

    /// Advance physics one fixed step and refresh every cached world matrix
    pub fn step(&mut self) {
        self.physics.step();
        for body in self.bodies.values_mut() {
            if let Ok((position, rotation)) = self.physics.body_transform(body.handle) {
                body.position = position;
                body.rotation = rotation;
            }
        }
        self.refresh_transforms();
    }

    /// Recompute every shape matrix from its body's current transform
    pub fn refresh_transforms(&mut self) {
        for shape in self.shapes.values_mut() {
            if let Some(body) = self.bodies.get(shape.body) {
                shape.refresh(&body.world_matrix());
            }
        }
    }

    // ==================== Queries ====================

    /// Every shape hit by the ray, in engine order. Sorting is up to the caller.
    pub fn raycast(&mut self, origin: Vec3, direction: Vec3) -> Vec<SceneHit> {
        self.physics
            .raycast(origin, direction)
            .into_iter()
            .filter_map(|hit| {
                let shape = *self.colliders.get(&hit.collider)?;
                Some(SceneHit {
                    shape,
                    point: hit.point,
                    distance: hit.distance,
                })
            })
            .collect()
    }

    // ==================== Mutation ====================

    /// Teleport a body and refresh its shapes immediately
    pub fn set_body_transform(&mut self, key: BodyKey, position: Vec3, rotation: Quat) -> Result<()> {
        let body = self.bodies.get_mut(key).ok_or(SceneError::BodyNotFound(key))?;
        self.physics.set_body_transform(body.handle, position, rotation)?;
        body.position = position;
        body.rotation = rotation;

        let world = body.world_matrix();
        for shape_key in &body.shapes {
            if let Some(shape) = self.shapes.get_mut(*shape_key) {
                shape.refresh(&world);
            }
        }
        Ok(())
    }

    /// Resize a shape. The collider is rebuilt at the new size.
    ///
    /// Spheres take the largest axis of `scale`; cylinders and cones the
    /// larger of X and Z for their radius.
    pub fn set_shape_scale(&mut self, key: ShapeKey, scale: Vec3) -> Result<()> {
        let local_position = self.shapes.get(key).ok_or(SceneError::ShapeNotFound(key))?.local_position;
        self.set_shape_local(key, local_position, scale)
    }

    /// Move a shape within its body and resize it in one collider rebuild.
    /// Scale follows the same per-kind rules as [`set_shape_scale`](Self::set_shape_scale).
    pub fn set_shape_local(&mut self, key: ShapeKey, local_position: Vec3, scale: Vec3) -> Result<()> {
        let shape = self.shapes.get(key).ok_or(SceneError::ShapeNotFound(key))?;
        let definition = ShapeDefinition::from_scale(shape.kind, scale);
        definition.validate()?;

        let desc = ColliderDesc::new(definition)
            .with_local_transform(local_position, shape.local_rotation)
            .with_mass(shape.mass)
            .with_sensor(shape.flags.no_contact);
        let old = shape.collider;
        let collider = self.physics.replace_collider(old, &desc)?;

        self.colliders.remove(&old);
        self.colliders.insert(collider, key);
        let world = self
            .bodies
            .get(self.shapes[key].body)
            .map(Body::world_matrix)
            .unwrap_or(Mat4::IDENTITY);
        let shape = &mut self.shapes[key];
        shape.collider = collider;
        shape.local_position = local_position;
        shape.scale = definition.scale();
        shape.refresh(&world);
        Ok(())
    }

    pub fn set_shape_material(&mut self, key: ShapeKey, material: Material) -> Result<()> {
        let shape = self.shapes.get_mut(key).ok_or(SceneError::ShapeNotFound(key))?;
        shape.material = material;
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn body(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    pub fn shape(&self, key: ShapeKey) -> Option<&Shape> {
        self.shapes.get(key)
    }

    /// Shapes of a body in insertion order
    pub fn shapes_of(&self, key: BodyKey) -> Option<&[ShapeKey]> {
        self.bodies.get(key).map(Body::shapes)
    }

    pub fn body_of(&self, shape: ShapeKey) -> Option<BodyKey> {
        self.shapes.get(shape).map(Shape::body)
    }

    /// Cached world matrix of a shape
    pub fn shape_transform(&self, shape: ShapeKey) -> Option<Mat4> {
        self.shapes.get(shape).map(|s| s.model)
    }

    pub fn contains_body(&self, key: BodyKey) -> bool {
        self.bodies.contains_key(key)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Shapes of one kind in draw order, including `no_draw` ones
    pub fn shapes_of_kind(&self, kind: GeometryKind) -> &[ShapeKey] {
        &self.draw_index[kind.index()]
    }
}

fn collider_desc(spec: &ShapeSpec, mass: f32) -> ColliderDesc {
    ColliderDesc::new(spec.definition)
        .with_local_transform(spec.local_position, spec.local_rotation)
        .with_mass(mass)
        .with_sensor(spec.flags.no_contact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ShapeFlags;
    use approx::assert_relative_eq;

    fn scene() -> Scene {
        Scene::new(PhysicsConfig::default()).unwrap()
    }

    #[test]
    fn test_add_single_shape_bodies() {
        let mut scene = scene();
        let cube = scene.add_cube(Placement::default(), Vec3::ONE, Material::default(), true).unwrap();
        scene.add_sphere(Placement::at(Vec3::X * 3.0), 0.5, Material::default(), false).unwrap();
        scene.add_cylinder(Placement::at(Vec3::X * 6.0), 0.5, 1.0, Material::default(), false).unwrap();
        scene.add_cone(Placement::at(Vec3::X * 9.0), 0.5, 1.0, Material::default(), true).unwrap();

        assert_eq!(scene.body_count(), 4);
        assert_eq!(scene.shape_count(), 4);
        assert_eq!(scene.physics().body_count(), 4);
        let body = scene.body(cube).unwrap();
        assert!(body.is_static());
        assert!(!body.is_compound());
        for kind in GeometryKind::ALL {
            assert_eq!(scene.shapes_of_kind(kind).len(), 1);
        }
    }

    #[test]
    fn test_invalid_dimensions_leave_scene_untouched() {
        let mut scene = scene();
        let specs = [
            ShapeSpec::new(ShapeDefinition::cube(Vec3::ONE), Material::default()),
            ShapeSpec::new(ShapeDefinition::sphere(-1.0), Material::default()),
        ];
        assert!(scene.add_compound(Placement::default(), false, &specs).is_err());
        assert_eq!(scene.body_count(), 0);
        assert_eq!(scene.shape_count(), 0);
        assert_eq!(scene.physics().body_count(), 0);
    }

    #[test]
    fn test_initial_matrix_available_before_step() {
        let mut scene = scene();
        let body = scene
            .add_cube(Placement::at(Vec3::new(1.0, 2.0, 3.0)), Vec3::splat(2.0), Material::default(), true)
            .unwrap();
        let shape = scene.shapes_of(body).unwrap()[0];
        let model = scene.shape_transform(shape).unwrap();
        assert_eq!(model, Mat4::from_scale_rotation_translation(Vec3::splat(2.0), Quat::IDENTITY, Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_add_shape_to_existing_body() {
        let mut scene = scene();
        let body = scene.add_compound(Placement::default(), false, &[]).unwrap();
        let spec = ShapeSpec::new(ShapeDefinition::sphere(0.25), Material::default()).with_local_position(Vec3::Z);
        let shape = scene.add_shape(body, spec).unwrap();

        assert_eq!(scene.body_of(shape), Some(body));
        assert_eq!(scene.shapes_of(body).unwrap(), &[shape]);
        assert_eq!(scene.shape(shape).unwrap().kind(), GeometryKind::Sphere);
    }

    #[test]
    fn test_shapes_added_to_dynamic_body_carry_unit_mass() {
        let mut scene = scene();
        let body = scene.add_compound(Placement::at(Vec3::Y * 10.0), false, &[]).unwrap();
        let first = scene
            .add_shape(body, ShapeSpec::new(ShapeDefinition::cube(Vec3::ONE), Material::default()))
            .unwrap();
        let handle = scene.body(body).unwrap().physics_handle();
        assert_relative_eq!(scene.physics().body_mass(handle).unwrap(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(scene.shape(first).unwrap().mass(), 1.0);

        let second = scene
            .add_shape(
                body,
                ShapeSpec::new(ShapeDefinition::sphere(0.5), Material::default()).with_local_position(Vec3::X * 2.0),
            )
            .unwrap();
        assert_relative_eq!(scene.physics().body_mass(handle).unwrap(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(scene.shape(first).unwrap().mass(), 0.5);
        assert_relative_eq!(scene.shape(second).unwrap().mass(), 0.5);

        for _ in 0..30 {
            scene.step();
        }
        assert!(scene.body(body).unwrap().position().y < 10.0);
    }

    #[test]
    fn test_shapes_added_to_static_body_stay_massless() {
        let mut scene = scene();
        let body = scene.add_compound(Placement::default(), true, &[]).unwrap();
        let shape = scene
            .add_shape(body, ShapeSpec::new(ShapeDefinition::cube(Vec3::ONE), Material::default()))
            .unwrap();
        assert_eq!(scene.shape(shape).unwrap().mass(), 0.0);
    }

    #[test]
    fn test_add_shape_to_removed_body_fails() {
        let mut scene = scene();
        let body = scene.add_sphere(Placement::default(), 1.0, Material::default(), true).unwrap();
        scene.remove_body(body).unwrap();

        let spec = ShapeSpec::new(ShapeDefinition::sphere(0.25), Material::default());
        assert!(matches!(scene.add_shape(body, spec), Err(SceneError::BodyNotFound(_))));
        assert!(matches!(scene.remove_body(body), Err(SceneError::BodyNotFound(_))));
    }

    #[test]
    fn test_step_moves_dynamic_bodies() {
        let mut scene = scene();
        let ball = scene.add_sphere(Placement::at(Vec3::Y * 10.0), 0.5, Material::default(), false).unwrap();
        let floor = scene.add_cube(Placement::default(), Vec3::new(10.0, 1.0, 10.0), Material::default(), true).unwrap();

        for _ in 0..10 {
            scene.step();
        }

        assert!(scene.body(ball).unwrap().position().y < 10.0);
        assert_eq!(scene.body(floor).unwrap().position(), Vec3::ZERO);
        let shape = scene.shapes_of(ball).unwrap()[0];
        let model = scene.shape_transform(shape).unwrap();
        assert_relative_eq!(model.w_axis.y, scene.body(ball).unwrap().position().y, epsilon = 1e-5);
    }

    #[test]
    fn test_set_body_transform_refreshes_shapes() {
        let mut scene = scene();
        let body = scene.add_cube(Placement::default(), Vec3::ONE, Material::default(), false).unwrap();
        scene.set_body_transform(body, Vec3::new(4.0, 0.0, 0.0), Quat::IDENTITY).unwrap();

        let shape = scene.shapes_of(body).unwrap()[0];
        assert_eq!(scene.shape_transform(shape).unwrap().w_axis.truncate(), Vec3::new(4.0, 0.0, 0.0));

        let hits = scene.raycast(Vec3::new(4.0, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].shape, shape);
    }

    #[test]
    fn test_set_shape_scale_rebuilds_collider() {
        let mut scene = scene();
        let body = scene.add_cube(Placement::default(), Vec3::ONE, Material::default(), true).unwrap();
        let shape = scene.shapes_of(body).unwrap()[0];
        let before = scene.shape(shape).unwrap().collider();

        scene.set_shape_scale(shape, Vec3::new(4.0, 1.0, 1.0)).unwrap();
        let after = scene.shape(shape).unwrap().collider();
        assert_ne!(before, after);
        assert_eq!(scene.shape(shape).unwrap().scale(), Vec3::new(4.0, 1.0, 1.0));
        assert_eq!(scene.physics().collider_count(), 1);

        // The wider collider now catches a ray that missed before
        let hits = scene.raycast(Vec3::new(1.5, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].shape, shape);
    }

    #[test]
    fn test_set_shape_scale_sphere_takes_largest_axis() {
        let mut scene = scene();
        let body = scene.add_sphere(Placement::default(), 1.0, Material::default(), true).unwrap();
        let shape = scene.shapes_of(body).unwrap()[0];

        scene.set_shape_scale(shape, Vec3::new(1.0, 3.0, 2.0)).unwrap();
        assert_eq!(scene.shape(shape).unwrap().scale(), Vec3::splat(3.0));
        assert!(scene.set_shape_scale(shape, Vec3::ZERO).is_err());
        assert_eq!(scene.shape(shape).unwrap().scale(), Vec3::splat(3.0));
    }

    #[test]
    fn test_set_shape_local_moves_collider_and_matrix() {
        let mut scene = scene();
        let specs = [ShapeSpec::new(ShapeDefinition::cube(Vec3::ONE), Material::default()).with_local_position(Vec3::X)];
        let body = scene.add_compound(Placement::default(), true, &specs).unwrap();
        let shape = scene.shapes_of(body).unwrap()[0];

        scene.set_shape_local(shape, Vec3::X * 3.0, Vec3::splat(2.0)).unwrap();
        let record = scene.shape(shape).unwrap();
        assert_eq!(record.local_position(), Vec3::X * 3.0);
        assert_eq!(record.scale(), Vec3::splat(2.0));
        assert_eq!(scene.shape_transform(shape).unwrap().w_axis.truncate(), Vec3::X * 3.0);

        let hits = scene.raycast(Vec3::new(3.8, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(hits.len(), 1);
        assert!(scene.raycast(Vec3::new(1.0, 5.0, 0.0), Vec3::NEG_Y).is_empty());
    }

    #[test]
    fn test_set_shape_material() {
        let mut scene = scene();
        let body = scene.add_cube(Placement::default(), Vec3::ONE, Material::default(), true).unwrap();
        let shape = scene.shapes_of(body).unwrap()[0];
        let red = Material::colored(Vec3::X);

        scene.set_shape_material(shape, red).unwrap();
        assert_eq!(*scene.shape(shape).unwrap().material(), red);
    }

    #[test]
    fn test_sensor_shapes_are_still_raycast() {
        let mut scene = scene();
        let spec = ShapeSpec::new(ShapeDefinition::sphere(0.5), Material::default()).with_flags(ShapeFlags::overlay());
        let body = scene.add_compound(Placement::default(), true, &[spec]).unwrap();
        let shape = scene.shapes_of(body).unwrap()[0];

        let hits = scene.raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].shape, shape);
    }
}
