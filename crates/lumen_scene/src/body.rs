//! Registry records for bodies and shapes

use crate::handle::{BodyKey, ShapeFlags, ShapeKey};
use glam::{Mat4, Quat, Vec3};
use lumen_physics::{BodyHandle, ColliderHandle};
use lumen_render::Material;
use lumen_shapes::{GeometryKind, ShapeDefinition};

/// One rigid body and the shapes it carries
#[derive(Clone, Debug)]
pub struct Body {
    pub(crate) handle: BodyHandle,
    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) is_static: bool,
    pub(crate) compound: bool,
    pub(crate) shapes: Vec<ShapeKey>,
}

impl Body {
    /// World position as of the last step or teleport
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_compound(&self) -> bool {
        self.compound
    }

    /// Shapes in the order they were added
    pub fn shapes(&self) -> &[ShapeKey] {
        &self.shapes
    }

    /// Underlying physics handle
    pub fn physics_handle(&self) -> BodyHandle {
        self.handle
    }

    /// Body-to-world matrix
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// One drawable, collidable primitive on a body
#[derive(Clone, Debug)]
pub struct Shape {
    pub(crate) body: BodyKey,
    pub(crate) kind: GeometryKind,
    pub(crate) local_position: Vec3,
    pub(crate) local_rotation: Quat,
    pub(crate) scale: Vec3,
    pub(crate) model: Mat4,
    pub(crate) material: Material,
    pub(crate) flags: ShapeFlags,
    pub(crate) collider: ColliderHandle,
    /// Mass the collider contributes, kept when the collider is rebuilt
    pub(crate) mass: f32,
}

impl Shape {
    pub fn body(&self) -> BodyKey {
        self.body
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    pub fn local_rotation(&self) -> Quat {
        self.local_rotation
    }

    /// Scale applied to the unit mesh
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Dimensions the collider was built from
    pub fn definition(&self) -> ShapeDefinition {
        ShapeDefinition::from_scale(self.kind, self.scale)
    }

    /// Cached world matrix, valid as of the last step
    pub fn model(&self) -> &Mat4 {
        &self.model
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn flags(&self) -> ShapeFlags {
        self.flags
    }

    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }

    /// Share of the body's mass carried by this shape's collider
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Shape-to-body matrix
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.local_rotation, self.local_position)
    }

    pub(crate) fn refresh(&mut self, body: &Mat4) {
        self.model = *body * self.local_matrix();
    }
}
