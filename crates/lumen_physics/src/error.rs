//! Error types for the physics adapter

use thiserror::Error;

/// Physics adapter errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Rigid body not found
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(crate::body::BodyHandle),

    /// Collider not found
    #[error("Collider not found: {0:?}")]
    ColliderNotFound(crate::collider::ColliderHandle),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Shape creation failed
    #[error("Failed to create collision shape: {0}")]
    InvalidShape(#[from] lumen_shapes::GeometryError),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
