//! Lumen Shapes - primitive solids for the scene renderer
//!
//! Generates unit cube, sphere, cylinder and cone meshes (positions, normals,
//! UVs and tangents), uploads them once through a [`lumen_gpu::GpuDevice`],
//! and owns the resulting buffers. Shapes of any size share these buffers
//! and differ only by their model matrix.
//!
//! # Example
//!
//! ```ignore
//! use lumen_gpu::HeadlessDevice;
//! use lumen_shapes::prelude::*;
//!
//! let mut device = HeadlessDevice::new();
//! let library = GeometryLibrary::new(&mut device, &GeometryConfig::default())?;
//!
//! let box_shape = ShapeDefinition::cube(glam::Vec3::new(2.0, 1.0, 1.0));
//! let geometry = library.get(box_shape.kind());
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod geometry;
pub mod mesh;

pub mod prelude {
    //! Common imports for shape geometry
    pub use crate::config::GeometryConfig;
    pub use crate::definition::ShapeDefinition;
    pub use crate::error::{GeometryError, Result};
    pub use crate::geometry::{AttributeLocations, GeometryLibrary, ShapeGeometry};
    pub use crate::mesh::{GeometryKind, MeshData, Vertex};
}

pub use prelude::*;
