//! Lumen Physics - Rapier 3D adapter
//!
//! A thin layer over Rapier that speaks in semantic shape definitions
//! (box, sphere, cylinder, cone) and glam math. It owns every rigid body and
//! collider; callers only ever hold [`BodyHandle`] and [`ColliderHandle`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 PhysicsWorld                    │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐  │
//! │  │ RigidBodySet│  │ ColliderSet │  │ Queries │  │
//! │  └─────────────┘  └─────────────┘  └─────────┘  │
//! │  ┌─────────────────────┐  ┌──────────────────┐  │
//! │  │ PhysicsPipeline     │  │ DebugRender      │  │
//! │  │ (fixed 1/60 step)   │  │ (wireframe out)  │  │
//! │  └─────────────────────┘  └──────────────────┘  │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lumen_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default())?;
//! let ball = physics.add_sphere(Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY, 0.5, false)?;
//! physics.step();
//! let hits = physics.raycast(Vec3::new(0.0, 20.0, 0.0), Vec3::NEG_Y);
//! ```

pub mod body;
pub mod collider;
pub mod config;
mod convert;
pub mod debug;
pub mod error;
pub mod query;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{BodyDesc, BodyHandle};
    pub use crate::collider::{ColliderDesc, ColliderHandle};
    pub use crate::config::PhysicsConfig;
    pub use crate::debug::DebugLine;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::query::RayHit;
    pub use crate::world::{PhysicsWorld, DYNAMIC_BODY_MASS};
    pub use glam::{Quat, Vec3};
}

pub use prelude::*;
