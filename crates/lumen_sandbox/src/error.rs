//! Error types for the sandbox

use lumen_editor::EditorError;
use lumen_physics::PhysicsError;
use lumen_render::RenderError;
use lumen_scene::SceneError;
use lumen_shapes::GeometryError;
use thiserror::Error;

/// Startup errors. Any of them aborts the sandbox before the first frame.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A shape names a material the palette does not have
    #[error("Body {body} shape {shape} uses material {index}, palette has {count}")]
    InvalidMaterialIndex {
        body: usize,
        shape: usize,
        index: usize,
        count: usize,
    },

    /// Editor selection names a body that does not exist
    #[error("Selected body {index} does not exist ({count} bodies)")]
    InvalidSelection { index: usize, count: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),
}

/// Result type for the sandbox
pub type Result<T> = std::result::Result<T, SandboxError>;
