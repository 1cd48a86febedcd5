//! Collider handles and descriptors

use crate::convert::to_isometry;
use crate::error::Result;
use glam::{Quat, Vec3};
use lumen_shapes::ShapeDefinition;
use rapier3d::prelude as rapier;

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

impl ColliderHandle {
    /// Create from raw Rapier handle
    pub fn from_raw(handle: rapier::ColliderHandle) -> Self {
        Self(handle)
    }

    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::ColliderHandle {
        self.0
    }
}

/// Collider attached to a body, placed in body space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderDesc {
    pub definition: ShapeDefinition,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    /// Mass contributed to the parent body; inertia follows from the shape
    pub mass: f32,
    /// Sensors never produce contacts but still answer ray casts
    pub sensor: bool,
}

impl ColliderDesc {
    pub fn new(definition: ShapeDefinition) -> Self {
        Self {
            definition,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            mass: 0.0,
            sensor: false,
        }
    }

    pub fn with_local_transform(mut self, position: Vec3, rotation: Quat) -> Self {
        self.local_position = position;
        self.local_rotation = rotation;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub(crate) fn to_rapier_builder(&self) -> Result<rapier::ColliderBuilder> {
        self.definition.validate()?;
        Ok(rapier::ColliderBuilder::new(shape_to_rapier(&self.definition))
            .position(to_isometry(self.local_position, self.local_rotation))
            .mass(self.mass.max(0.0))
            .sensor(self.sensor))
    }
}

/// Build a Rapier shape. Cylinders and cones are Y-aligned like the render meshes.
pub(crate) fn shape_to_rapier(definition: &ShapeDefinition) -> rapier::SharedShape {
    match *definition {
        ShapeDefinition::Box { extents } => {
            let half = extents * 0.5;
            rapier::SharedShape::cuboid(half.x, half.y, half.z)
        }
        ShapeDefinition::Sphere { radius } => rapier::SharedShape::ball(radius),
        ShapeDefinition::Cylinder { radius, height } => {
            rapier::SharedShape::cylinder(height * 0.5, radius)
        }
        ShapeDefinition::Cone { radius, height } => rapier::SharedShape::cone(height * 0.5, radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_uses_half_extents() {
        let shape = shape_to_rapier(&ShapeDefinition::cube(Vec3::new(2.0, 4.0, 6.0)));
        let cuboid = shape.as_cuboid().unwrap();
        assert_eq!(cuboid.half_extents.x, 1.0);
        assert_eq!(cuboid.half_extents.y, 2.0);
        assert_eq!(cuboid.half_extents.z, 3.0);
    }

    #[test]
    fn test_cylinder_and_cone_half_heights() {
        let cylinder = shape_to_rapier(&ShapeDefinition::cylinder(0.5, 2.0));
        assert_eq!(cylinder.as_cylinder().unwrap().half_height, 1.0);
        let cone = shape_to_rapier(&ShapeDefinition::cone(0.5, 3.0));
        assert_eq!(cone.as_cone().unwrap().half_height, 1.5);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let desc = ColliderDesc::new(ShapeDefinition::sphere(-1.0));
        assert!(desc.to_rapier_builder().is_err());
    }
}
