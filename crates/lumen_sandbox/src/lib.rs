//! Lumen Sandbox - headless scene runner
//!
//! Loads a TOML scene, builds the geometry library, shader variant and
//! scene, then steps physics and records draw commands frame by frame on
//! the headless device.
//!
//! # Frame
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌───────────┐   ┌─────────────┐
//! │ physics  │──►│ shadow passes│──►│ lit pass  │──►│ gizmo       │──► debug lines
//! │ step     │   │ (per light)  │   │ (batched) │   │ overlay     │    (optional)
//! └──────────┘   └──────────────┘   └───────────┘   └─────────────┘
//! ```

pub mod app;
pub mod config;
pub mod error;

pub mod prelude {
    //! Common imports for driving the sandbox
    pub use crate::app::{App, FrameReport};
    pub use crate::config::{BodyConfig, CameraSettings, EditorSettings, PartConfig, RenderSettings, SandboxConfig};
    pub use crate::error::{Result, SandboxError};
}

pub use prelude::*;
