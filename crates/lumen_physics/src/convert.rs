//! glam <-> nalgebra conversions. Nothing outside this crate sees Rapier math types.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;

pub(crate) fn to_vector(v: Vec3) -> rapier::Vector<f32> {
    rapier::Vector::new(v.x, v.y, v.z)
}

pub(crate) fn to_point(v: Vec3) -> rapier::Point<f32> {
    rapier::Point::new(v.x, v.y, v.z)
}

pub(crate) fn from_point(p: &rapier::Point<f32>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

pub(crate) fn from_vector(v: &rapier::Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn to_rotation(q: Quat) -> UnitQuaternion<f32> {
    // nalgebra takes w first
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub(crate) fn from_rotation(q: &UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

pub(crate) fn to_isometry(position: Vec3, rotation: Quat) -> rapier::Isometry<f32> {
    rapier::Isometry::from_parts(
        rapier::Translation::new(position.x, position.y, position.z),
        to_rotation(rotation),
    )
}

pub(crate) fn from_isometry(iso: &rapier::Isometry<f32>) -> (Vec3, Quat) {
    (from_vector(&iso.translation.vector), from_rotation(&iso.rotation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_round_trip() {
        let q = Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.0);
        let back = from_rotation(&to_rotation(q));
        assert!(q.dot(back).abs() > 0.9999);
    }

    #[test]
    fn test_isometry_applies_rotation_then_translation() {
        let iso = to_isometry(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let moved = from_point(&(iso * to_point(Vec3::Z)));
        assert!((moved - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }
}
