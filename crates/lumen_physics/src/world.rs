//! Physics world - owns every rigid body and collider

use crate::body::{BodyDesc, BodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::PhysicsConfig;
use crate::convert::{from_isometry, to_isometry};
use crate::debug::{DebugLine, LineCollector};
use crate::error::{PhysicsError, Result};
use crate::query::{cast_ray_all, RayHit};
use glam::{Quat, Vec3};
use lumen_shapes::ShapeDefinition;
use rapier3d::pipeline::{DebugRenderMode, DebugRenderPipeline, DebugRenderStyle};
use rapier3d::prelude as rapier;
use std::num::NonZeroUsize;

/// Mass given to every dynamic body, split across its initial colliders
pub const DYNAMIC_BODY_MASS: f32 = 1.0;

/// The physics world containing all simulation state.
///
/// Stepping is fixed: every [`step`](Self::step) advances exactly one
/// configured timestep regardless of how long the frame took.
pub struct PhysicsWorld {
    /// Configuration
    config: PhysicsConfig,

    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,

    /// Query pipeline, refreshed lazily before ray casts
    query_pipeline: rapier::QueryPipeline,
    query_dirty: bool,

    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,

    debug_pipeline: DebugRenderPipeline,

    /// Steps taken since creation
    steps: u64,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;

        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations = NonZeroUsize::new(config.solver_iterations)
            .ok_or_else(|| PhysicsError::InvalidConfig("solver_iterations is zero".to_string()))?;

        log::info!(
            "Physics world: dt={:.4}s, {} solver iterations, gravity={:?}",
            config.timestep,
            config.solver_iterations,
            config.gravity
        );

        Ok(Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            query_dirty: false,
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            debug_pipeline: DebugRenderPipeline::new(
                DebugRenderStyle::default(),
                DebugRenderMode::COLLIDER_SHAPES | DebugRenderMode::CONTACTS,
            ),
            steps: 0,
        })
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // ==================== Single-shape bodies ====================

    /// Add a box body. `extents` are full edge lengths.
    pub fn add_box(&mut self, position: Vec3, rotation: Quat, extents: Vec3, is_static: bool) -> Result<BodyHandle> {
        self.add_single(ShapeDefinition::cube(extents), position, rotation, is_static)
    }

    /// Add a sphere body
    pub fn add_sphere(&mut self, position: Vec3, rotation: Quat, radius: f32, is_static: bool) -> Result<BodyHandle> {
        self.add_single(ShapeDefinition::sphere(radius), position, rotation, is_static)
    }

    /// Add a Y-aligned cylinder body
    pub fn add_cylinder(
        &mut self,
        position: Vec3,
        rotation: Quat,
        radius: f32,
        height: f32,
        is_static: bool,
    ) -> Result<BodyHandle> {
        self.add_single(ShapeDefinition::cylinder(radius, height), position, rotation, is_static)
    }

    /// Add a Y-aligned cone body
    pub fn add_cone(
        &mut self,
        position: Vec3,
        rotation: Quat,
        radius: f32,
        height: f32,
        is_static: bool,
    ) -> Result<BodyHandle> {
        self.add_single(ShapeDefinition::cone(radius, height), position, rotation, is_static)
    }

    fn add_single(
        &mut self,
        definition: ShapeDefinition,
        position: Vec3,
        rotation: Quat,
        is_static: bool,
    ) -> Result<BodyHandle> {
        let desc = BodyDesc {
            position,
            rotation,
            is_static,
        };
        let collider = ColliderDesc::new(definition).with_mass(Self::initial_mass(is_static, 1));
        let (body, _) = self.create_compound(&desc, &[collider])?;
        Ok(body)
    }

    // ==================== Compound bodies ====================

    /// Mass each of `collider_count` initial colliders receives
    pub fn initial_mass(is_static: bool, collider_count: usize) -> f32 {
        if is_static || collider_count == 0 {
            0.0
        } else {
            DYNAMIC_BODY_MASS / collider_count as f32
        }
    }

    /// Create a body with no colliders
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.bodies.insert(desc.to_rapier_builder()));
        log::debug!("Created {} body {:?}", if desc.is_static { "static" } else { "dynamic" }, handle);
        handle
    }

    /// Create a body and all its colliders. Nothing is left behind on failure.
    pub fn create_compound(
        &mut self,
        desc: &BodyDesc,
        colliders: &[ColliderDesc],
    ) -> Result<(BodyHandle, Vec<ColliderHandle>)> {
        // Validate before touching the engine
        let builders = colliders
            .iter()
            .map(ColliderDesc::to_rapier_builder)
            .collect::<Result<Vec<_>>>()?;

        let body = self.create_body(desc);
        let handles = builders
            .into_iter()
            .map(|builder| {
                ColliderHandle(self.colliders.insert_with_parent(builder, body.0, &mut self.bodies))
            })
            .collect();
        self.query_dirty = true;
        Ok((body, handles))
    }

    /// Attach one more collider to an existing body
    pub fn attach_collider(&mut self, body: BodyHandle, desc: &ColliderDesc) -> Result<ColliderHandle> {
        if !self.bodies.contains(body.0) {
            return Err(PhysicsError::BodyNotFound(body));
        }
        let builder = desc.to_rapier_builder()?;
        let handle = self.colliders.insert_with_parent(builder, body.0, &mut self.bodies);
        self.query_dirty = true;
        Ok(ColliderHandle(handle))
    }

    /// Spread unit mass evenly over every collider of a dynamic body.
    /// Returns the mass each collider now carries; fixed bodies are left at 0.
    pub fn rebalance_mass(&mut self, body: BodyHandle) -> Result<f32> {
        let rb = self.bodies.get_mut(body.0).ok_or(PhysicsError::BodyNotFound(body))?;
        if rb.is_fixed() {
            return Ok(0.0);
        }

        let handles = rb.colliders().to_vec();
        let mass = Self::initial_mass(false, handles.len());
        for handle in &handles {
            if let Some(collider) = self.colliders.get_mut(*handle) {
                collider.set_mass(mass);
            }
        }
        rb.recompute_mass_properties_from_colliders(&self.colliders);
        log::debug!("Body {:?}: {} colliders at mass {}", body, handles.len(), mass);
        Ok(mass)
    }

    /// Swap a collider for a new one on the same body
    pub fn replace_collider(&mut self, collider: ColliderHandle, desc: &ColliderDesc) -> Result<ColliderHandle> {
        let parent = self
            .colliders
            .get(collider.0)
            .and_then(|c| c.parent())
            .ok_or(PhysicsError::ColliderNotFound(collider))?;
        let builder = desc.to_rapier_builder()?;

        self.colliders
            .remove(collider.0, &mut self.islands, &mut self.bodies, true);
        let handle = self.colliders.insert_with_parent(builder, parent, &mut self.bodies);
        self.query_dirty = true;
        Ok(ColliderHandle(handle))
    }

    /// Remove a body together with every attached collider
    pub fn remove_body(&mut self, body: BodyHandle) -> Result<()> {
        let removed = self.bodies.remove(
            body.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true, // Remove attached colliders
        );
        match removed {
            Some(_) => {
                self.query_dirty = true;
                log::debug!("Removed body {:?}", body);
                Ok(())
            }
            None => Err(PhysicsError::BodyNotFound(body)),
        }
    }

    // ==================== Body state ====================

    pub fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains(body.0)
    }

    pub fn contains_collider(&self, collider: ColliderHandle) -> bool {
        self.colliders.contains(collider.0)
    }

    /// World position and rotation of a body
    pub fn body_transform(&self, body: BodyHandle) -> Result<(Vec3, Quat)> {
        self.bodies
            .get(body.0)
            .map(|b| from_isometry(b.position()))
            .ok_or(PhysicsError::BodyNotFound(body))
    }

    pub fn is_static(&self, body: BodyHandle) -> Result<bool> {
        self.bodies
            .get(body.0)
            .map(|b| b.is_fixed())
            .ok_or(PhysicsError::BodyNotFound(body))
    }

    /// Mass of a body as computed by the engine
    pub fn body_mass(&self, body: BodyHandle) -> Result<f32> {
        self.bodies
            .get(body.0)
            .map(|b| b.mass())
            .ok_or(PhysicsError::BodyNotFound(body))
    }

    /// Colliders attached to a body
    pub fn body_colliders(&self, body: BodyHandle) -> Result<Vec<ColliderHandle>> {
        self.bodies
            .get(body.0)
            .map(|b| b.colliders().iter().copied().map(ColliderHandle).collect())
            .ok_or(PhysicsError::BodyNotFound(body))
    }

    /// Teleport a body. Velocities are cleared so dynamic bodies restart at rest.
    pub fn set_body_transform(&mut self, body: BodyHandle, position: Vec3, rotation: Quat) -> Result<()> {
        let rb = self
            .bodies
            .get_mut(body.0)
            .ok_or(PhysicsError::BodyNotFound(body))?;
        let iso = to_isometry(position, rotation);
        rb.set_position(iso, true);
        rb.set_linvel(rapier::Vector::zeros(), true);
        rb.set_angvel(rapier::Vector::zeros(), true);

        // Colliders follow their parent only during a step; move them now for queries
        for handle in rb.colliders() {
            if let Some(collider) = self.colliders.get_mut(*handle) {
                if let Some(local) = collider.position_wrt_parent().copied() {
                    collider.set_position(iso * local);
                }
            }
        }
        self.query_dirty = true;
        Ok(())
    }

    // ==================== Simulation ====================

    /// Advance the simulation by one fixed timestep
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.query_dirty = false;
        self.steps += 1;
    }

    /// Number of steps taken
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    // ==================== Queries ====================

    /// Every collider hit by the ray, unsorted
    pub fn raycast(&mut self, origin: Vec3, direction: Vec3) -> Vec<RayHit> {
        if self.query_dirty {
            self.query_pipeline.update(&self.colliders);
            self.query_dirty = false;
        }
        cast_ray_all(&self.query_pipeline, &self.bodies, &self.colliders, origin, direction)
    }

    // ==================== Debug ====================

    /// Wireframe of every collider shape and active contact
    pub fn debug_lines(&mut self) -> Vec<DebugLine> {
        let mut collector = LineCollector::default();
        self.debug_pipeline.render(
            &mut collector,
            &self.bodies,
            &self.colliders,
            &self.impulse_joints,
            &self.multibody_joints,
            &self.narrow_phase,
        );
        collector.lines
    }

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::default()).unwrap()
    }

    #[test]
    fn test_create_world() {
        let world = world();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_invalid_config_fails() {
        let config = PhysicsConfig::default().with_solver_iterations(0);
        assert!(PhysicsWorld::new(config).is_err());
    }

    #[test]
    fn test_add_each_primitive() {
        let mut world = world();
        world.add_box(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE, true).unwrap();
        world.add_sphere(Vec3::X * 3.0, Quat::IDENTITY, 0.5, false).unwrap();
        world.add_cylinder(Vec3::X * 6.0, Quat::IDENTITY, 0.5, 1.0, false).unwrap();
        world.add_cone(Vec3::X * 9.0, Quat::IDENTITY, 0.5, 1.0, true).unwrap();

        assert_eq!(world.body_count(), 4);
        assert_eq!(world.collider_count(), 4);
    }

    #[test]
    fn test_bad_dimensions_are_rejected_without_side_effects() {
        let mut world = world();
        assert!(world.add_sphere(Vec3::ZERO, Quat::IDENTITY, 0.0, false).is_err());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_mass_policy() {
        let mut world = world();
        let dynamic = world.add_sphere(Vec3::ZERO, Quat::IDENTITY, 0.5, false).unwrap();
        let fixed = world.add_sphere(Vec3::X * 3.0, Quat::IDENTITY, 0.5, true).unwrap();
        world.step();

        assert_relative_eq!(world.body_mass(dynamic).unwrap(), 1.0, epsilon = 1e-4);
        assert!(world.is_static(fixed).unwrap());
        assert!(!world.is_static(dynamic).unwrap());
    }

    #[test]
    fn test_rebalance_keeps_unit_mass() {
        let mut world = world();
        let body = world.create_body(&BodyDesc::dynamic());
        world
            .attach_collider(body, &ColliderDesc::new(ShapeDefinition::cube(Vec3::ONE)).with_mass(0.0))
            .unwrap();
        world
            .attach_collider(body, &ColliderDesc::new(ShapeDefinition::sphere(0.5)).with_mass(0.0))
            .unwrap();

        assert_relative_eq!(world.rebalance_mass(body).unwrap(), 0.5);
        assert_relative_eq!(world.body_mass(body).unwrap(), 1.0, epsilon = 1e-4);

        let fixed = world.create_body(&BodyDesc::fixed());
        world
            .attach_collider(fixed, &ColliderDesc::new(ShapeDefinition::cube(Vec3::ONE)))
            .unwrap();
        assert_eq!(world.rebalance_mass(fixed).unwrap(), 0.0);
    }

    #[test]
    fn test_compound_mass_is_split() {
        let mut world = world();
        let mass = PhysicsWorld::initial_mass(false, 2);
        let parts = [
            ColliderDesc::new(ShapeDefinition::cube(Vec3::ONE)).with_mass(mass),
            ColliderDesc::new(ShapeDefinition::sphere(0.5))
                .with_local_transform(Vec3::Y, Quat::IDENTITY)
                .with_mass(mass),
        ];
        let (body, colliders) = world.create_compound(&BodyDesc::dynamic(), &parts).unwrap();
        world.step();

        assert_eq!(colliders.len(), 2);
        assert_relative_eq!(world.body_mass(body).unwrap(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_gravity_fall() {
        let mut world = world();
        let body = world
            .add_sphere(Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY, 1.0, false)
            .unwrap();

        let initial_y = world.body_transform(body).unwrap().0.y;
        for _ in 0..60 {
            world.step();
        }
        let final_y = world.body_transform(body).unwrap().0.y;

        assert!(final_y < initial_y, "Body should fall due to gravity");
        assert_eq!(world.step_count(), 60);
    }

    #[test]
    fn test_static_body_does_not_move() {
        let mut world = world();
        let body = world
            .add_box(Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY, Vec3::ONE, true)
            .unwrap();
        for _ in 0..30 {
            world.step();
        }
        assert_eq!(world.body_transform(body).unwrap().0, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_remove_body_removes_colliders() {
        let mut world = world();
        let parts = [
            ColliderDesc::new(ShapeDefinition::cube(Vec3::ONE)),
            ColliderDesc::new(ShapeDefinition::cube(Vec3::ONE)).with_local_transform(Vec3::X * 2.0, Quat::IDENTITY),
        ];
        let (body, colliders) = world.create_compound(&BodyDesc::fixed(), &parts).unwrap();

        world.remove_body(body).unwrap();

        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert!(colliders.iter().all(|c| !world.contains_collider(*c)));
        assert!(matches!(world.remove_body(body), Err(PhysicsError::BodyNotFound(_))));
    }

    #[test]
    fn test_raycast_before_first_step() {
        let mut world = world();
        world.add_sphere(Vec3::ZERO, Quat::IDENTITY, 1.0, true).unwrap();

        let hits = world.raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point.z, 1.0, epsilon = 1e-4);
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_raycast_miss_is_empty() {
        let mut world = world();
        world.add_sphere(Vec3::ZERO, Quat::IDENTITY, 1.0, true).unwrap();
        assert!(world.raycast(Vec3::new(0.0, 5.0, 5.0), Vec3::Z).is_empty());
        assert!(world.raycast(Vec3::ZERO, Vec3::ZERO).is_empty());
    }

    #[test]
    fn test_raycast_hits_sensors() {
        let mut world = world();
        let (_, colliders) = world
            .create_compound(
                &BodyDesc::fixed(),
                &[ColliderDesc::new(ShapeDefinition::sphere(1.0)).with_sensor(true)],
            )
            .unwrap();
        let hits = world.raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collider, colliders[0]);
    }

    #[test]
    fn test_set_transform_moves_ray_target() {
        let mut world = world();
        let body = world.add_sphere(Vec3::ZERO, Quat::IDENTITY, 1.0, true).unwrap();
        world.set_body_transform(body, Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY).unwrap();

        assert!(world.raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z).is_empty());
        let hits = world.raycast(Vec3::new(10.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_replace_collider_keeps_body() {
        let mut world = world();
        let (body, colliders) = world
            .create_compound(&BodyDesc::fixed(), &[ColliderDesc::new(ShapeDefinition::sphere(1.0))])
            .unwrap();

        let replaced = world
            .replace_collider(colliders[0], &ColliderDesc::new(ShapeDefinition::sphere(2.0)))
            .unwrap();

        assert!(!world.contains_collider(colliders[0]));
        assert_eq!(world.body_colliders(body).unwrap(), vec![replaced]);
        let hits = world.raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_relative_eq!(hits[0].point.z, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_debug_lines_cover_colliders() {
        let mut world = world();
        assert!(world.debug_lines().is_empty());
        world.add_box(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE, true).unwrap();
        assert!(!world.debug_lines().is_empty());
    }
}
