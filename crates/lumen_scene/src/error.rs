//! Error types for the scene registry

use crate::handle::{BodyKey, ShapeKey};
use lumen_physics::PhysicsError;
use lumen_render::RenderError;
use lumen_shapes::GeometryError;
use thiserror::Error;

/// Scene errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// Body was removed or never existed
    #[error("Body not found: {0:?}")]
    BodyNotFound(BodyKey),

    /// Shape was removed with its body or never existed
    #[error("Shape not found: {0:?}")]
    ShapeNotFound(ShapeKey),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
