//! Error types for shader binding and rendering

use lumen_gpu::GpuError;
use lumen_shader::{ShaderError, TextureChannel};
use thiserror::Error;

/// Rendering setup errors. All of them surface at construction time.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Program failed to compile, or a GPU resource could not be created
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    /// Variant configuration rejected before generation
    #[error("Invalid shader configuration: {0}")]
    InvalidShader(#[from] ShaderError),

    /// Linked program lacks a slot the binder requires
    #[error("{program} program has no location for `{name}`")]
    MissingLocation { program: &'static str, name: String },

    /// A texture stack layer has no texture supplied
    #[error("No texture supplied for {} layer {layer}", channel.name())]
    MissingTexture { channel: TextureChannel, layer: usize },

    #[error("Invalid shadow configuration: {0}")]
    InvalidShadowConfig(String),
}

/// Result type for rendering setup
pub type Result<T> = std::result::Result<T, RenderError>;
