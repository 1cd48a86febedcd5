//! Error types for the editor overlay

use lumen_scene::{BodyKey, SceneError};
use thiserror::Error;

/// Editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Operation needs an attached gizmo
    #[error("Gizmo is not attached to a body")]
    NotAttached,

    /// A gizmo cannot manipulate itself
    #[error("Body {0:?} cannot be a gizmo target")]
    InvalidTarget(BodyKey),
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
