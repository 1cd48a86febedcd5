//! Error types for the GPU command surface

use thiserror::Error;

/// GPU backend errors
#[derive(Debug, Error)]
pub enum GpuError {
    /// Program failed to compile or link
    #[error("Program compilation failed: {log}")]
    CompileFailed { log: String },

    /// Handle does not refer to a live resource
    #[error("Unknown {kind} handle: {id}")]
    UnknownHandle { kind: &'static str, id: u32 },

    /// Backend refused a resource allocation
    #[error("Resource allocation failed: {0}")]
    AllocationFailed(String),
}

/// Result type for GPU operations
pub type GpuResult<T> = std::result::Result<T, GpuError>;
