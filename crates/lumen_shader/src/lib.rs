//! Lumen Shader - variant generation
//!
//! Turns a declarative [`ShaderConfig`] (light layout, texture stacks,
//! shading model, material source, shadows) into GLSL source. Generation is
//! a pure function: equal configurations always produce byte-identical
//! source, which is what lets the renderer cache compiled programs by
//! [`ShaderConfig::cache_key`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   validate()   ┌──────────────┐
//! │ ShaderConfig │ ─────────────► │  generate()  │ ──► ShaderSource
//! └──────────────┘                └──────────────┘
//!        │                               │
//!        ▼                               ▼
//! ┌──────────────┐                ┌──────────────┐
//! │ blend (CPU)  │                │    names     │ ◄── lumen_render binds
//! └──────────────┘                └──────────────┘     uniforms by these
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lumen_shader::prelude::*;
//!
//! let config = ShaderConfig::new()
//!     .with_lights(LightLayout::none().with_directional(true).with_points(2))
//!     .with_layer(TextureChannel::Diffuse, TextureLayer::new(BlendOp::Multiply))
//!     .with_shadows(true);
//! config.validate()?;
//! let source = generate(&config);
//! ```

pub mod blend;
pub mod builtin;
pub mod config;
pub mod error;
pub mod generator;
pub mod names;

pub mod prelude {
    //! Common imports for shader generation
    pub use crate::blend::combine;
    pub use crate::builtin::{generate_depth, generate_flat, generate_lines, DepthKind};
    pub use crate::config::{
        BlendOp, LightLayout, MaterialConstants, MaterialSource, ShaderConfig, ShadingModel,
        TextureChannel, TextureLayer, TextureStacks, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
        MAX_STACK_LAYERS, MAX_UV_CHANNELS,
    };
    pub use crate::error::{Result, ShaderError};
    pub use crate::generator::{generate, ShaderSource, POINT_SHADOW_OFFSETS};
}

pub use prelude::*;
