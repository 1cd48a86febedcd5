//! Lumen GPU - command surface between the renderer and a graphics backend
//!
//! The renderer never calls a graphics API directly. Geometry upload, shader
//! programs, uniform writes, shadow targets and fixed-function state all go
//! through [`GpuDevice`], which keeps the scene and shader layers testable
//! without a driver.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ lumen_shapes │   │ lumen_render │   │ lumen_scene  │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!                  ┌─────────────────┐
//!                  │ dyn GpuDevice   │
//!                  └────────┬────────┘
//!              ┌────────────┴────────────┐
//!              ▼                         ▼
//!     ┌─────────────────┐       ┌─────────────────┐
//!     │ HeadlessDevice  │       │ native backend  │
//!     │ (recording)     │       │ (application)   │
//!     └─────────────────┘       └─────────────────┘
//! ```

pub mod device;
pub mod error;
pub mod headless;
pub mod state;

pub mod prelude {
    //! Common imports for GPU access
    pub use crate::device::{
        AttributeLayout, BufferHandle, BufferKind, BufferUsage, CubeFace, FramebufferHandle,
        GpuDevice, ProgramHandle, ShadowTarget, ShadowTargetKind, TextureHandle, TextureTarget,
        UniformLocation, UniformValue,
    };
    pub use crate::error::{GpuError, GpuResult};
    pub use crate::headless::{GpuCommand, HeadlessDevice};
    pub use crate::state::{with_state, BlendMode, CullMode, RenderState};
}

pub use prelude::*;
