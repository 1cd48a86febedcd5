//! Tessellation configuration

use crate::error::{GeometryError, Result};
use serde::{Deserialize, Serialize};

/// Tessellation used when building the shared primitive meshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Longitude divisions of the sphere
    pub sphere_segments: u32,
    /// Latitude divisions of the sphere
    pub sphere_rings: u32,
    /// Divisions around cylinders and cones
    pub round_segments: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            sphere_segments: 32,
            sphere_rings: 16,
            round_segments: 32,
        }
    }
}

impl GeometryConfig {
    /// Low-poly meshes for tests and previews
    pub fn coarse() -> Self {
        Self {
            sphere_segments: 8,
            sphere_rings: 4,
            round_segments: 8,
        }
    }

    pub fn with_sphere(mut self, segments: u32, rings: u32) -> Self {
        self.sphere_segments = segments;
        self.sphere_rings = rings;
        self
    }

    pub fn with_round_segments(mut self, segments: u32) -> Self {
        self.round_segments = segments;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sphere_segments < 3 || self.sphere_rings < 2 {
            return Err(GeometryError::InvalidTessellation {
                shape: "sphere",
                reason: format!(
                    "need at least 3 segments and 2 rings, got {}x{}",
                    self.sphere_segments, self.sphere_rings
                ),
            });
        }
        if self.round_segments < 3 {
            return Err(GeometryError::InvalidTessellation {
                shape: "cylinder/cone",
                reason: format!("need at least 3 segments, got {}", self.round_segments),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GeometryConfig::default().validate().is_ok());
        assert!(GeometryConfig::coarse().validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_sphere() {
        let config = GeometryConfig::default().with_sphere(2, 8);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_degenerate_round() {
        let config = GeometryConfig::default().with_round_segments(1);
        assert!(config.validate().is_err());
    }
}
