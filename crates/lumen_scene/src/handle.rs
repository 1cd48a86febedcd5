//! Handles and construction inputs

use glam::{EulerRot, Quat, Vec3};
use lumen_render::Material;
use lumen_shapes::ShapeDefinition;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Stable handle to a body. Stays valid until that body is removed.
    pub struct BodyKey;

    /// Stable handle to a shape. Dies with its body.
    pub struct ShapeKey;
}

/// Per-shape behaviour switches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeFlags {
    /// Skip the main batches; overlays draw the shape themselves
    pub no_draw: bool,
    /// Collider is a sensor: ray-castable, never pushes anything
    pub no_contact: bool,
}

impl ShapeFlags {
    /// Flags for editor handles
    pub fn overlay() -> Self {
        Self {
            no_draw: true,
            no_contact: true,
        }
    }
}

/// World position and rotation of a new body
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Placement {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Unrotated placement at `position`
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotation from XYZ Euler angles in radians
    pub fn with_euler(mut self, angles: Vec3) -> Self {
        self.rotation = Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z);
        self
    }
}

/// One shape of a compound body, placed in body space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeSpec {
    pub definition: ShapeDefinition,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub material: Material,
    pub flags: ShapeFlags,
}

impl ShapeSpec {
    pub fn new(definition: ShapeDefinition, material: Material) -> Self {
        Self {
            definition,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            material,
            flags: ShapeFlags::default(),
        }
    }

    pub fn with_local_position(mut self, position: Vec3) -> Self {
        self.local_position = position;
        self
    }

    pub fn with_local_rotation(mut self, rotation: Quat) -> Self {
        self.local_rotation = rotation;
        self
    }

    pub fn with_flags(mut self, flags: ShapeFlags) -> Self {
        self.flags = flags;
        self
    }
}
