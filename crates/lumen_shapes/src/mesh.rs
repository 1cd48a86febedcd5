//! Primitive mesh generation.
//!
//! Every primitive is a unit solid centred at the origin with Y up:
//! a cube of side 1, a sphere of radius 1, and a cylinder and cone of
//! radius 1 and height 1. Instances reach their real size through the
//! per-shape scale, so one buffer pair per kind serves every shape.
//!
//! Triangles wind counter-clockwise seen from outside.

use crate::config::GeometryConfig;
use crate::error::Result;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Which shared primitive a shape draws with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeometryKind {
    Cube,
    Sphere,
    Cylinder,
    Cone,
}

impl GeometryKind {
    pub const COUNT: usize = 4;

    /// Every kind, in draw order
    pub const ALL: [GeometryKind; Self::COUNT] = [
        GeometryKind::Cube,
        GeometryKind::Sphere,
        GeometryKind::Cylinder,
        GeometryKind::Cone,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Cube => "cube",
            GeometryKind::Sphere => "sphere",
            GeometryKind::Cylinder => "cylinder",
            GeometryKind::Cone => "cone",
        }
    }
}

/// Interleaved vertex as uploaded to the GPU
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;
    pub const POSITION_OFFSET: u32 = 0;
    pub const NORMAL_OFFSET: u32 = 12;
    pub const UV_OFFSET: u32 = 24;
    pub const TANGENT_OFFSET: u32 = 32;

    fn new(position: Vec3, normal: Vec3, uv: [f32; 2], tangent: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
            tangent: tangent.to_array(),
        }
    }
}

/// CPU-side triangle mesh
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build the unit mesh for a kind
    pub fn for_kind(kind: GeometryKind, config: &GeometryConfig) -> Result<Self> {
        config.validate()?;
        Ok(match kind {
            GeometryKind::Cube => cube(),
            GeometryKind::Sphere => sphere(config.sphere_segments, config.sphere_rings),
            GeometryKind::Cylinder => cylinder(config.round_segments),
            GeometryKind::Cone => cone(config.round_segments),
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push(&mut self, vertex: Vertex) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    /// Flat disc at height `y` facing `+Y` or `-Y`
    fn disc(&mut self, y: f32, up: bool, segments: u32) {
        let normal = if up { Vec3::Y } else { Vec3::NEG_Y };
        let center = self.push(Vertex::new(Vec3::new(0.0, y, 0.0), normal, [0.5, 0.5], Vec3::X));
        for i in 0..segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            self.push(Vertex::new(
                Vec3::new(cos, y, sin),
                normal,
                [0.5 + cos * 0.5, 0.5 + sin * 0.5],
                Vec3::X,
            ));
        }
        for i in 0..segments {
            let curr = center + 1 + i;
            let next = center + 1 + (i + 1) % segments;
            if up {
                self.indices.extend_from_slice(&[center, next, curr]);
            } else {
                self.indices.extend_from_slice(&[center, curr, next]);
            }
        }
    }
}

/// Unit cube: 4 vertices per face so each face keeps a flat normal.
pub fn cube() -> MeshData {
    // (normal, u axis, v axis)
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    const CORNERS: [(f32, f32, [f32; 2]); 4] = [
        (-1.0, -1.0, [0.0, 1.0]),
        (1.0, -1.0, [1.0, 1.0]),
        (1.0, 1.0, [1.0, 0.0]),
        (-1.0, 1.0, [0.0, 0.0]),
    ];

    let mut mesh = MeshData {
        vertices: Vec::with_capacity(24),
        indices: Vec::with_capacity(36),
    };
    for (normal, u, v) in FACES {
        let base = mesh.vertices.len() as u32;
        for (su, sv, uv) in CORNERS {
            let position = (normal + u * su + v * sv) * 0.5;
            mesh.push(Vertex::new(position, normal, uv, u));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Unit UV sphere. U follows longitude, V runs from the north pole down.
pub fn sphere(segments: u32, rings: u32) -> MeshData {
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(((rings + 1) * (segments + 1)) as usize),
        indices: Vec::with_capacity((rings * segments * 6) as usize),
    };

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let (sin_phi, cos_phi) = (v * PI).sin_cos();
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let (sin_theta, cos_theta) = (u * TAU).sin_cos();
            let normal = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
            let tangent = Vec3::new(-sin_theta, 0.0, cos_theta);
            mesh.push(Vertex::new(normal, normal, [u, v], tangent));
        }
    }

    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let below = current + segments + 1;
            mesh.indices
                .extend_from_slice(&[current, current + 1, below, current + 1, below + 1, below]);
        }
    }
    mesh
}

/// Unit cylinder along Y with both caps.
pub fn cylinder(segments: u32) -> MeshData {
    let mut mesh = MeshData::default();

    // side rings duplicate the seam vertex so U can reach 1.0
    for i in 0..=segments {
        let u = i as f32 / segments as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        let normal = Vec3::new(cos, 0.0, sin);
        let tangent = Vec3::new(-sin, 0.0, cos);
        mesh.push(Vertex::new(Vec3::new(cos, 0.5, sin), normal, [u, 0.0], tangent));
        mesh.push(Vertex::new(Vec3::new(cos, -0.5, sin), normal, [u, 1.0], tangent));
    }
    for i in 0..segments {
        let top0 = i * 2;
        let bot0 = top0 + 1;
        let top1 = top0 + 2;
        let bot1 = top0 + 3;
        mesh.indices
            .extend_from_slice(&[top0, bot1, bot0, top0, top1, bot1]);
    }

    mesh.disc(0.5, true, segments);
    mesh.disc(-0.5, false, segments);
    mesh
}

/// Unit cone along Y, apex at `+0.5`, with a base cap.
pub fn cone(segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let apex = Vec3::new(0.0, 0.5, 0.0);

    // one apex vertex per segment so every side triangle keeps its own normal
    for i in 0..=segments {
        let u = i as f32 / segments as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        let normal = Vec3::new(cos, 1.0, sin).normalize();
        let tangent = Vec3::new(-sin, 0.0, cos);
        mesh.push(Vertex::new(Vec3::new(cos, -0.5, sin), normal, [u, 1.0], tangent));
        mesh.push(Vertex::new(apex, normal, [u, 0.0], tangent));
    }
    for i in 0..segments {
        let rim0 = i * 2;
        let apex0 = rim0 + 1;
        let rim1 = rim0 + 2;
        mesh.indices.extend_from_slice(&[rim0, apex0, rim1]);
    }

    mesh.disc(-0.5, false, segments);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn all_meshes() -> Vec<(GeometryKind, MeshData)> {
        let config = GeometryConfig::coarse();
        GeometryKind::ALL
            .iter()
            .map(|&kind| (kind, MeshData::for_kind(kind, &config).unwrap()))
            .collect()
    }

    fn face_normal(mesh: &MeshData, tri: &[u32]) -> Vec3 {
        let p = |i: u32| Vec3::from_array(mesh.vertices[i as usize].position);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn test_cube_counts() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = sphere(8, 4);
        assert_eq!(mesh.vertices.len(), 5 * 9);
        assert_eq!(mesh.indices.len(), 4 * 8 * 6);
    }

    #[test]
    fn test_indices_in_range() {
        for (kind, mesh) in all_meshes() {
            for &index in &mesh.indices {
                assert!((index as usize) < mesh.vertices.len(), "{kind:?} index {index}");
            }
            assert_eq!(mesh.indices.len() % 3, 0);
        }
    }

    #[test]
    fn test_normals_and_tangents_are_unit() {
        for (_, mesh) in all_meshes() {
            for v in &mesh.vertices {
                assert_relative_eq!(Vec3::from_array(v.normal).length(), 1.0, epsilon = 1e-5);
                assert_relative_eq!(Vec3::from_array(v.tangent).length(), 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_tangents_perpendicular_to_normals() {
        for (kind, mesh) in [(GeometryKind::Cube, cube()), (GeometryKind::Sphere, sphere(8, 4))] {
            for v in &mesh.vertices {
                let dot = Vec3::from_array(v.normal).dot(Vec3::from_array(v.tangent));
                assert!(dot.abs() < 1e-5, "{kind:?} tangent not perpendicular");
            }
        }
    }

    #[test]
    fn test_unit_extents() {
        for (kind, mesh) in all_meshes() {
            let max_y = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
            let expected = if kind == GeometryKind::Sphere { 1.0 } else { 0.5 };
            assert_relative_eq!(max_y, expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        // centroid-to-face vector agrees with the winding normal
        for (kind, mesh) in [
            (GeometryKind::Cube, cube()),
            (GeometryKind::Cylinder, cylinder(8)),
            (GeometryKind::Cone, cone(8)),
        ] {
            for tri in mesh.indices.chunks(3) {
                let normal = face_normal(&mesh, tri);
                if normal.length_squared() < 1e-12 {
                    continue;
                }
                let centroid = tri
                    .iter()
                    .map(|&i| Vec3::from_array(mesh.vertices[i as usize].position))
                    .sum::<Vec3>()
                    / 3.0;
                assert!(normal.dot(centroid) > 0.0, "{kind:?} triangle {tri:?} faces inward");
            }
        }
    }

    #[test]
    fn test_sphere_winding_faces_outward() {
        let mesh = sphere(8, 4);
        for tri in mesh.indices.chunks(3) {
            let normal = face_normal(&mesh, tri);
            if normal.length_squared() < 1e-12 {
                // degenerate triangles at the poles
                continue;
            }
            let centroid = Vec3::from_array(mesh.vertices[tri[0] as usize].position);
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(Vertex::STRIDE, 44);
        let v = Vertex {
            position: [1.0, 2.0, 3.0],
            normal: [4.0, 5.0, 6.0],
            uv: [7.0, 8.0],
            tangent: [9.0, 10.0, 11.0],
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats[(Vertex::UV_OFFSET / 4) as usize], 7.0);
        assert_eq!(floats[(Vertex::TANGENT_OFFSET / 4) as usize], 9.0);
    }
}
