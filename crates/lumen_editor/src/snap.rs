//! Snapping and ray/plane helpers

use glam::Vec3;
use lumen_render::Ray;
use serde::{Deserialize, Serialize};

/// Snap increments for gizmo operations
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    /// Translation step, world units
    pub translate: f32,
    /// Rotation step, degrees
    pub rotate: f32,
    /// Scale factor step
    pub scale: f32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            translate: 0.5,
            rotate: 15.0,
            scale: 0.1,
        }
    }
}

impl SnapSettings {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    pub(crate) fn translation(&self, value: Vec3) -> Vec3 {
        if self.enabled {
            Vec3::new(
                snap_value(value.x, self.translate),
                snap_value(value.y, self.translate),
                snap_value(value.z, self.translate),
            )
        } else {
            value
        }
    }

    /// `angle` in radians
    pub(crate) fn angle(&self, angle: f32) -> f32 {
        if self.enabled {
            snap_value(angle, self.rotate.to_radians())
        } else {
            angle
        }
    }

    pub(crate) fn factor(&self, factor: f32) -> f32 {
        if self.enabled {
            snap_value(factor, self.scale)
        } else {
            factor
        }
    }
}

/// Round `value` to the nearest multiple of `snap`. Non-positive steps disable snapping.
pub fn snap_value(value: f32, snap: f32) -> f32 {
    if snap > 0.0 {
        (value / snap).round() * snap
    } else {
        value
    }
}

/// Where `ray` crosses the plane through `point` with `normal`, if in front of the origin
pub fn ray_plane_intersection(ray: &Ray, point: Vec3, normal: Vec3) -> Option<Vec3> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-4 {
        return None;
    }

    let t = (point - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(ray.at(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_snap_value() {
        assert_relative_eq!(snap_value(1.2, 0.5), 1.0);
        assert_relative_eq!(snap_value(1.3, 0.5), 1.5);
        assert_relative_eq!(snap_value(-0.8, 0.5), -1.0);
        assert_relative_eq!(snap_value(0.37, 0.0), 0.37);
    }

    #[test]
    fn test_disabled_snap_passes_through() {
        let snap = SnapSettings::default();
        assert_eq!(snap.translation(Vec3::splat(0.3)), Vec3::splat(0.3));
        assert_relative_eq!(snap.angle(0.3), 0.3);
    }

    #[test]
    fn test_angle_snaps_in_degrees() {
        let snap = SnapSettings::enabled();
        assert_relative_eq!(snap.angle(20.0_f32.to_radians()), 15.0_f32.to_radians(), epsilon = 1e-6);
        assert_relative_eq!(snap.factor(1.23), 1.2, epsilon = 1e-6);
    }

    #[test]
    fn test_ray_plane_intersection() {
        let ray = Ray::new(Vec3::new(1.0, 5.0, 2.0), Vec3::NEG_Y);
        let hit = ray_plane_intersection(&ray, Vec3::ZERO, Vec3::Y).unwrap();
        assert_relative_eq!(hit.x, 1.0);
        assert_relative_eq!(hit.y, 0.0);
        assert_relative_eq!(hit.z, 2.0);
    }

    #[test]
    fn test_parallel_or_behind_plane_misses() {
        let parallel = Ray::new(Vec3::Y, Vec3::X);
        assert!(ray_plane_intersection(&parallel, Vec3::ZERO, Vec3::Y).is_none());
        let away = Ray::new(Vec3::Y, Vec3::Y);
        assert!(ray_plane_intersection(&away, Vec3::ZERO, Vec3::Y).is_none());
    }
}
