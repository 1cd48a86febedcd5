//! GPU-resident primitive geometry

use crate::config::GeometryConfig;
use crate::error::Result;
use crate::mesh::{GeometryKind, MeshData, Vertex};
use lumen_gpu::{AttributeLayout, BufferHandle, BufferKind, BufferUsage, GpuDevice};

/// Vertex attribute slots of a linked program.
///
/// `None` means the program does not consume that attribute. Every entry of
/// `uv` is fed from the single UV set the primitives carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeLocations {
    pub position: Option<u32>,
    pub normal: Option<u32>,
    pub uv: Vec<u32>,
    pub tangent: Option<u32>,
}

/// Vertex and index buffers for one primitive kind
#[derive(Debug)]
pub struct ShapeGeometry {
    kind: GeometryKind,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    vertex_count: u32,
    index_count: u32,
}

impl ShapeGeometry {
    /// Upload a mesh
    pub fn upload(device: &mut dyn GpuDevice, kind: GeometryKind, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer(
            BufferKind::Vertex,
            BufferUsage::Static,
            bytemuck::cast_slice(&mesh.vertices),
        );
        let index_buffer = device.create_buffer(
            BufferKind::Index,
            BufferUsage::Static,
            bytemuck::cast_slice(&mesh.indices),
        );
        log::debug!(
            "Uploaded {} geometry: {} vertices, {} triangles",
            kind.name(),
            mesh.vertices.len(),
            mesh.triangle_count()
        );

        Self {
            kind,
            vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertices.len() as u32,
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Bind the buffers to whichever attribute slots the program uses
    pub fn bind(&self, device: &mut dyn GpuDevice, attributes: &AttributeLocations) {
        let layout = |components, offset| AttributeLayout {
            components,
            stride: Vertex::STRIDE,
            offset,
        };

        if let Some(location) = attributes.position {
            device.bind_attribute(location, self.vertex_buffer, layout(3, Vertex::POSITION_OFFSET));
        }
        if let Some(location) = attributes.normal {
            device.bind_attribute(location, self.vertex_buffer, layout(3, Vertex::NORMAL_OFFSET));
        }
        for &location in &attributes.uv {
            device.bind_attribute(location, self.vertex_buffer, layout(2, Vertex::UV_OFFSET));
        }
        if let Some(location) = attributes.tangent {
            device.bind_attribute(location, self.vertex_buffer, layout(3, Vertex::TANGENT_OFFSET));
        }
        device.bind_index_buffer(self.index_buffer);
    }

    /// Issue the indexed draw for the bound buffers
    pub fn draw(&self, device: &mut dyn GpuDevice) {
        device.draw_indexed(self.index_count);
    }

    /// Destroy the buffers
    pub fn release(self, device: &mut dyn GpuDevice) {
        device.destroy_buffer(self.vertex_buffer);
        device.destroy_buffer(self.index_buffer);
    }
}

/// One shared geometry per primitive kind
#[derive(Debug)]
pub struct GeometryLibrary {
    geometries: Vec<ShapeGeometry>,
}

impl GeometryLibrary {
    /// Generate and upload every primitive
    pub fn new(device: &mut dyn GpuDevice, config: &GeometryConfig) -> Result<Self> {
        config.validate()?;
        let mut geometries = Vec::with_capacity(GeometryKind::COUNT);
        for kind in GeometryKind::ALL {
            let mesh = MeshData::for_kind(kind, config)?;
            geometries.push(ShapeGeometry::upload(device, kind, &mesh));
        }
        log::info!(
            "Geometry library ready ({} kinds) on {} device",
            geometries.len(),
            device.name()
        );
        Ok(Self { geometries })
    }

    pub fn get(&self, kind: GeometryKind) -> &ShapeGeometry {
        &self.geometries[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeGeometry> {
        self.geometries.iter()
    }

    /// Destroy every buffer the library owns
    pub fn release(self, device: &mut dyn GpuDevice) {
        for geometry in self.geometries {
            geometry.release(device);
        }
    }
}
