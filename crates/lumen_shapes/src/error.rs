//! Error types for geometry generation

use thiserror::Error;

/// Geometry errors
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Tessellation parameters cannot produce a closed mesh
    #[error("Invalid tessellation for {shape}: {reason}")]
    InvalidTessellation {
        shape: &'static str,
        reason: String,
    },

    /// Shape dimensions must be finite and positive
    #[error("Invalid {shape} dimensions: {dimensions:?}")]
    InvalidDimensions {
        shape: &'static str,
        dimensions: [f32; 3],
    },
}

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, GeometryError>;
