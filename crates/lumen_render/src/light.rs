//! Light descriptions fed to lit and shadow passes

use glam::Vec3;
use lumen_shader::LightLayout;
use serde::{Deserialize, Serialize};

/// Infinitely distant light
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    /// Direction the light travels in
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.3, -1.0, -0.2),
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.6),
            specular: Vec3::splat(0.5),
        }
    }
}

/// Distance attenuation `1 / (constant + linear * d + quadratic * d^2)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    /// Roughly 50 units of range
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl Attenuation {
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// Omnidirectional light
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 0.0),
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            attenuation: Attenuation::default(),
        }
    }
}

/// Cone light with a soft edge between the inner and outer angle
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
    /// Full-intensity half angle, radians
    pub inner_angle: f32,
    /// Zero-intensity half angle, radians
    pub outer_angle: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 0.0),
            direction: Vec3::NEG_Y,
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            attenuation: Attenuation::default(),
            inner_angle: 12.5_f32.to_radians(),
            outer_angle: 17.5_f32.to_radians(),
        }
    }
}

/// Every light of one frame
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightData {
    pub directional: Option<DirectionalLight>,
    pub points: Vec<PointLight>,
    pub spots: Vec<SpotLight>,
}

impl LightData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directional(mut self, light: DirectionalLight) -> Self {
        self.directional = Some(light);
        self
    }

    pub fn with_point(mut self, light: PointLight) -> Self {
        self.points.push(light);
        self
    }

    pub fn with_spot(mut self, light: SpotLight) -> Self {
        self.spots.push(light);
        self
    }

    /// Shader light layout that exactly fits these lights
    pub fn layout(&self) -> LightLayout {
        LightLayout::none()
            .with_directional(self.directional.is_some())
            .with_points(self.points.len() as u32)
            .with_spots(self.spots.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_layout_from_lights() {
        let lights = LightData::new()
            .with_directional(DirectionalLight::default())
            .with_point(PointLight::default())
            .with_point(PointLight::default());
        let layout = lights.layout();
        assert!(layout.directional);
        assert_eq!(layout.point_count, 2);
        assert_eq!(layout.spot_count, 0);
    }

    #[test]
    fn test_attenuation_is_one_at_source() {
        assert_relative_eq!(Attenuation::default().factor(0.0), 1.0);
        assert!(Attenuation::default().factor(10.0) < 0.5);
    }

    #[test]
    fn test_partial_light_data_fills_defaults() {
        let lights: LightData =
            serde_json::from_str(r#"{ "points": [{ "position": [1.0, 2.0, 3.0] }] }"#).unwrap();
        assert!(lights.directional.is_none());
        assert_eq!(lights.points.len(), 1);
        assert_eq!(lights.points[0].position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(lights.points[0].attenuation, Attenuation::default());
    }

    #[test]
    fn test_spot_angles_ordered() {
        let spot = SpotLight::default();
        assert!(spot.inner_angle < spot.outer_angle);
    }
}
