//! Error types for shader variant configuration

use thiserror::Error;

/// Errors from an invalid variant configuration
#[derive(Debug, Error, PartialEq)]
pub enum ShaderError {
    #[error("Too many {kind} lights: {count} (max {max})")]
    TooManyLights {
        kind: &'static str,
        count: u32,
        max: u32,
    },

    #[error("{channel} layer {layer} samples uv channel {uv_channel} (max {max})")]
    InvalidUvChannel {
        channel: &'static str,
        layer: usize,
        uv_channel: u32,
        max: u32,
    },

    #[error("{channel} layer {layer} has invalid blend factor {factor}")]
    InvalidBlendFactor {
        channel: &'static str,
        layer: usize,
        factor: f32,
    },

    #[error("Too many {channel} texture layers: {count} (max {max})")]
    TooManyLayers {
        channel: &'static str,
        count: usize,
        max: usize,
    },
}

/// Result type for shader configuration
pub type Result<T> = std::result::Result<T, ShaderError>;
