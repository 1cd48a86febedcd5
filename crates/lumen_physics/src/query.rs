//! Ray casting

use crate::collider::ColliderHandle;
use crate::convert::{from_point, to_point, to_vector};
use glam::Vec3;
use rapier3d::prelude as rapier;

/// One ray/collider intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// Hit point in world space
    pub point: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Every collider pierced by the ray, in the order the broad phase reports them.
pub(crate) fn cast_ray_all(
    query_pipeline: &rapier::QueryPipeline,
    bodies: &rapier::RigidBodySet,
    colliders: &rapier::ColliderSet,
    origin: Vec3,
    direction: Vec3,
) -> Vec<RayHit> {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return Vec::new();
    }

    let ray = rapier::Ray::new(to_point(origin), to_vector(direction));
    let mut hits = Vec::new();

    query_pipeline.intersections_with_ray(
        bodies,
        colliders,
        &ray,
        f32::MAX,
        true,
        rapier::QueryFilter::default(),
        |handle, intersection| {
            hits.push(RayHit {
                collider: ColliderHandle(handle),
                point: from_point(&ray.point_at(intersection.time_of_impact)),
                distance: intersection.time_of_impact,
            });
            true // Continue searching
        },
    );

    hits
}
