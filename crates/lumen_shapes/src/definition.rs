//! Semantic shape definitions shared by the physics and render sides

use crate::error::{GeometryError, Result};
use crate::mesh::GeometryKind;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Construction-time description of one primitive solid
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDefinition {
    /// Box with full edge lengths
    Box { extents: Vec3 },
    Sphere { radius: f32 },
    /// Y-aligned cylinder
    Cylinder { radius: f32, height: f32 },
    /// Y-aligned cone, apex up
    Cone { radius: f32, height: f32 },
}

impl ShapeDefinition {
    pub fn cube(extents: Vec3) -> Self {
        Self::Box { extents }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    pub fn cylinder(radius: f32, height: f32) -> Self {
        Self::Cylinder { radius, height }
    }

    pub fn cone(radius: f32, height: f32) -> Self {
        Self::Cone { radius, height }
    }

    /// Primitive geometry this definition draws with
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Box { .. } => GeometryKind::Cube,
            Self::Sphere { .. } => GeometryKind::Sphere,
            Self::Cylinder { .. } => GeometryKind::Cylinder,
            Self::Cone { .. } => GeometryKind::Cone,
        }
    }

    /// Scale that maps the unit mesh of [`kind`](Self::kind) onto this shape
    pub fn scale(&self) -> Vec3 {
        match *self {
            Self::Box { extents } => extents,
            Self::Sphere { radius } => Vec3::splat(radius),
            Self::Cylinder { radius, height } | Self::Cone { radius, height } => {
                Vec3::new(radius, height, radius)
            }
        }
    }

    /// Inverse of [`scale`](Self::scale). Spheres take the largest axis.
    pub fn from_scale(kind: GeometryKind, scale: Vec3) -> Self {
        match kind {
            GeometryKind::Cube => Self::Box { extents: scale },
            GeometryKind::Sphere => Self::Sphere {
                radius: scale.max_element(),
            },
            GeometryKind::Cylinder => Self::Cylinder {
                radius: scale.x.max(scale.z),
                height: scale.y,
            },
            GeometryKind::Cone => Self::Cone {
                radius: scale.x.max(scale.z),
                height: scale.y,
            },
        }
    }

    /// Reject zero, negative and non-finite dimensions
    pub fn validate(&self) -> Result<()> {
        let scale = self.scale();
        if scale.is_finite() && scale.min_element() > 0.0 {
            Ok(())
        } else {
            Err(GeometryError::InvalidDimensions {
                shape: self.kind().name(),
                dimensions: scale.to_array(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_conventions() {
        assert_eq!(ShapeDefinition::cube(Vec3::new(1.0, 2.0, 3.0)).scale(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(ShapeDefinition::sphere(0.5).scale(), Vec3::splat(0.5));
        assert_eq!(ShapeDefinition::cylinder(0.5, 2.0).scale(), Vec3::new(0.5, 2.0, 0.5));
        assert_eq!(ShapeDefinition::cone(1.0, 3.0).kind(), GeometryKind::Cone);
    }

    #[test]
    fn test_from_scale_round_trips_uniform_shapes() {
        for definition in [
            ShapeDefinition::cube(Vec3::new(1.0, 2.0, 3.0)),
            ShapeDefinition::sphere(0.75),
            ShapeDefinition::cylinder(0.5, 2.0),
            ShapeDefinition::cone(0.25, 1.5),
        ] {
            let rebuilt = ShapeDefinition::from_scale(definition.kind(), definition.scale());
            assert_eq!(rebuilt, definition);
        }
    }

    #[test]
    fn test_sphere_from_non_uniform_scale() {
        let sphere = ShapeDefinition::from_scale(GeometryKind::Sphere, Vec3::new(1.0, 3.0, 2.0));
        assert_eq!(sphere, ShapeDefinition::sphere(3.0));
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        assert!(ShapeDefinition::sphere(0.0).validate().is_err());
        assert!(ShapeDefinition::cube(Vec3::new(1.0, -1.0, 1.0)).validate().is_err());
        assert!(ShapeDefinition::cone(f32::NAN, 1.0).validate().is_err());
        assert!(ShapeDefinition::cylinder(1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_toml_friendly_tagging() {
        let json = serde_json::to_string(&ShapeDefinition::sphere(2.0)).unwrap();
        assert_eq!(json, r#"{"type":"sphere","radius":2.0}"#);
    }
}
