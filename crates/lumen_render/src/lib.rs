//! Lumen Render - shader binding, shadow passes and draw batching
//!
//! Binds generated shader variants to the GPU and drives the two-phase
//! frame: one depth pass per shadow-casting light (cube maps take six),
//! then the lit pass. Geometry is drawn through [`DrawBatcher`], which binds
//! each primitive's buffers at most once per phase.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐ compile ┌──────────────┐
//! │ ShaderConfig  │ ──────► │ ShaderCache  │
//! └───────────────┘         └──────┬───────┘
//!                                  ▼
//! ┌───────────────────────────────────────────────┐
//! │ ModelShader                                   │
//! │  Locations (resolved once)                    │
//! │  ShadowTargets + DepthShader (planar / cube)  │
//! │  begin_render_shadow ─► end_render_shadow     │
//! │  bind_frame (camera, lights, shadow matrices) │
//! └──────────────────────┬────────────────────────┘
//!                        │ dyn ShaderTarget
//! ┌──────────────┐       ▼        ┌──────────────┐
//! │ DrawSource   │ ─► DrawBatcher │ Geometry     │
//! │ (scene)      │    ◄───────────│ Library      │
//! └──────────────┘                └──────────────┘
//! ```
//!
//! Overlays use [`FlatShader`]; physics wireframes use [`DebugLineRenderer`].
//! Both scope their fixed-function state with [`lumen_gpu::with_state`].

pub mod batcher;
pub mod cache;
pub mod camera;
pub mod depth;
pub mod error;
pub mod flat;
pub mod light;
pub mod lines;
pub mod locations;
pub mod material;
pub mod model;
pub mod shadow;
pub mod target;

pub mod prelude {
    //! Common imports for rendering
    pub use crate::batcher::{DrawBatcher, DrawInstance, DrawSource, DrawStats, RenderPhase};
    pub use crate::cache::ShaderCache;
    pub use crate::camera::{Camera, FrameCamera, Ray};
    pub use crate::depth::DepthShader;
    pub use crate::error::{RenderError, Result};
    pub use crate::flat::FlatShader;
    pub use crate::light::{Attenuation, DirectionalLight, LightData, PointLight, SpotLight};
    pub use crate::lines::{DebugLineRenderer, LineVertex};
    pub use crate::locations::Locations;
    pub use crate::material::{Material, MaterialTextures};
    pub use crate::model::ModelShader;
    pub use crate::shadow::{ShadowConfig, ShadowPass};
    pub use crate::target::ShaderTarget;
}

pub use prelude::*;
