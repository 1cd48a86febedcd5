//! Lumen Scene - bodies, shapes and the bridge between physics and drawing
//!
//! A [`Scene`] owns the physics world and a registry of bodies, each
//! carrying one or more shapes. Callers hold [`BodyKey`]/[`ShapeKey`]
//! handles; they survive any number of unrelated insertions and removals.
//!
//! # Architecture
//!
//! ```text
//!   add_* / remove_body            step()
//!          │                         │
//!          ▼                         ▼
//! ┌────────────────────┐   ┌────────────────────┐
//! │ SlotMap<Body>      │◄──│ PhysicsWorld       │
//! │ SlotMap<Shape>     │   │ (body transforms)  │
//! │ collider ─► shape  │──►│ raycast            │
//! │ draw index by kind │   └────────────────────┘
//! └─────────┬──────────┘
//!           │ DrawSource
//!           ▼
//!      DrawBatcher ─► ModelShader / FlatShader
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lumen_scene::prelude::*;
//!
//! let mut scene = Scene::new(PhysicsConfig::default())?;
//! let ball = scene.add_sphere(Placement::at(Vec3::Y * 5.0), 0.5, Material::default(), false)?;
//! scene.step();
//! let hits = scene.raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
//! ```

pub mod body;
pub mod error;
pub mod handle;
mod render;
pub mod scene;

pub mod prelude {
    //! Common imports for scene building
    pub use crate::body::{Body, Shape};
    pub use crate::error::{Result, SceneError};
    pub use crate::handle::{BodyKey, Placement, ShapeFlags, ShapeKey, ShapeSpec};
    pub use crate::scene::{Scene, SceneHit};
    pub use glam::{Mat4, Quat, Vec3};
    pub use lumen_physics::PhysicsConfig;
    pub use lumen_render::Material;
    pub use lumen_shapes::{GeometryKind, ShapeDefinition};
}

pub use prelude::*;
