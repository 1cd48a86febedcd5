//! Shadow map settings, pass enumeration and light-space matrices

use crate::error::{RenderError, Result};
use crate::light::{DirectionalLight, SpotLight};
use glam::{Mat4, Vec3};
use lumen_gpu::CubeFace;
use lumen_shader::LightLayout;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Global shadow configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Shadow map resolution (width = height)
    pub resolution: u32,
    /// Near plane of every light projection
    pub near: f32,
    /// Far plane of every light projection; point lights store distance over this
    pub far: f32,
    /// Half extent of the directional light's orthographic box
    pub ortho_extent: f32,
    /// How far back along its direction the directional light is placed
    pub directional_distance: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            near: 0.1,
            far: 50.0,
            ortho_extent: 20.0,
            directional_distance: 20.0,
        }
    }
}

impl ShadowConfig {
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(RenderError::InvalidShadowConfig(
                "resolution must be non-zero".to_string(),
            ));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(RenderError::InvalidShadowConfig(format!(
                "planes must satisfy 0 < near < far (near {}, far {})",
                self.near, self.far
            )));
        }
        if !(self.ortho_extent > 0.0 && self.directional_distance > 0.0) {
            return Err(RenderError::InvalidShadowConfig(
                "directional extent and distance must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Size of one texel in shadow-map uv units
    pub fn texel_size(&self) -> f32 {
        1.0 / self.resolution as f32
    }
}

/// One depth-only render of the scene
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadowPass {
    Directional,
    Spot(u32),
    Point(u32, CubeFace),
}

/// Every pass a layout needs, directional first, then spots, then point faces
pub fn shadow_passes(layout: &LightLayout) -> Vec<ShadowPass> {
    let mut passes = Vec::new();
    if layout.directional {
        passes.push(ShadowPass::Directional);
    }
    passes.extend((0..layout.spot_count).map(ShadowPass::Spot));
    for index in 0..layout.point_count {
        passes.extend(CubeFace::ALL.iter().map(|&face| ShadowPass::Point(index, face)));
    }
    passes
}

/// Up vector that is never parallel to `direction`
fn up_for(direction: Vec3) -> Vec3 {
    if direction.dot(Vec3::Y).abs() > 0.99 {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

/// Unit light direction; a zero vector shines straight down
fn light_direction(direction: Vec3) -> Vec3 {
    direction.try_normalize().unwrap_or(Vec3::NEG_Y)
}

/// Orthographic view-projection of a directional light, centred on the origin
pub fn directional_light_space(light: &DirectionalLight, config: &ShadowConfig) -> Mat4 {
    let direction = light_direction(light.direction);
    let eye = -direction * config.directional_distance;
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, up_for(direction));
    let e = config.ortho_extent;
    let projection = Mat4::orthographic_rh_gl(-e, e, -e, e, config.near, config.far);
    projection * view
}

/// Perspective view-projection covering a spot light's outer cone
pub fn spot_light_space(light: &SpotLight, config: &ShadowConfig) -> Mat4 {
    let direction = light_direction(light.direction);
    let view = Mat4::look_at_rh(light.position, light.position + direction, up_for(direction));
    let fov = (light.outer_angle * 2.0).clamp(0.01, std::f32::consts::PI - 0.01);
    let projection = Mat4::perspective_rh_gl(fov, 1.0, config.near, config.far);
    projection * view
}

/// 90 degree view-projection for one face of a point light's cube map
pub fn point_face_space(position: Vec3, face: CubeFace, config: &ShadowConfig) -> Mat4 {
    let (direction, up) = face.basis();
    let view = Mat4::look_at_rh(position, position + direction, up);
    let projection = Mat4::perspective_rh_gl(FRAC_PI_2, 1.0, config.near, config.far);
    projection * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_pass_order() {
        let layout = LightLayout::none().with_directional(true).with_spots(2).with_points(1);
        let passes = shadow_passes(&layout);

        assert_eq!(passes.len(), 1 + 2 + 6);
        assert_eq!(passes[0], ShadowPass::Directional);
        assert_eq!(passes[1], ShadowPass::Spot(0));
        assert_eq!(passes[2], ShadowPass::Spot(1));
        assert_eq!(passes[3], ShadowPass::Point(0, CubeFace::PositiveX));
        assert_eq!(passes[8], ShadowPass::Point(0, CubeFace::NegativeZ));
    }

    #[test]
    fn test_no_lights_no_passes() {
        assert!(shadow_passes(&LightLayout::none()).is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(ShadowConfig::default().validate().is_ok());
        assert!(ShadowConfig::default().with_resolution(0).validate().is_err());
        assert!(ShadowConfig::default().with_planes(1.0, 0.5).validate().is_err());
    }

    #[test]
    fn test_directional_space_keeps_origin_in_view() {
        let light = DirectionalLight {
            direction: Vec3::NEG_Y,
            ..Default::default()
        };
        let clip = directional_light_space(&light, &ShadowConfig::default()) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.abs().max_element() <= 1.0, "{ndc:?}");
    }

    #[test]
    fn test_zero_direction_shines_down() {
        let config = ShadowConfig::default();
        let zero = DirectionalLight {
            direction: Vec3::ZERO,
            ..Default::default()
        };
        let down = DirectionalLight {
            direction: Vec3::NEG_Y,
            ..Default::default()
        };
        let space = directional_light_space(&zero, &config);
        assert!(space.is_finite());
        assert_eq!(space, directional_light_space(&down, &config));

        let spot = SpotLight {
            direction: Vec3::ZERO,
            ..Default::default()
        };
        assert!(spot_light_space(&spot, &config).is_finite());
    }

    #[test]
    fn test_point_face_sees_along_axis() {
        let config = ShadowConfig::default();
        let space = point_face_space(Vec3::ZERO, CubeFace::PositiveX, &config);
        let clip = space * Vec4::new(5.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }
}
