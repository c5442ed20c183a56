//! Raycasting for ground contact, camera collision and line-of-sight queries.

use crate::{CollisionGroup, PhysicsWorld};
use engine_core::Vec3;
use rapier3d::prelude::*;

/// How far above the feet a ground probe starts, so a body resting exactly on
/// the surface still registers contact.
const GROUND_PROBE_LIFT: f32 = 0.5;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl PhysicsWorld {
    /// Cast a ray against the environment and return the first hit.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let filter = QueryFilter::default().groups(CollisionGroup::environment_query());

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }

    /// Probe for ground under a body whose origin is at its feet.
    ///
    /// Returns the hit if there is walkable surface within `probe_distance` below the feet.
    pub fn ground_probe(&self, feet: Vec3, probe_distance: f32) -> Option<RaycastHit> {
        let origin = feet + Vec3::Y * GROUND_PROBE_LIFT;
        self.raycast(origin, -Vec3::Y, GROUND_PROBE_LIFT + probe_distance)
    }

    /// Check if there's a clear line of sight between two points.
    pub fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let direction = to - from;
        let distance = direction.length();
        if distance < 0.001 {
            return true;
        }

        let direction = direction / distance;
        self.raycast(from, direction, distance).is_none()
    }

    /// Distance from `origin` to the first obstruction along `direction`, if any within `max_distance`.
    pub fn obstruction_distance(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        self.raycast(origin, direction, max_distance).map(|hit| hit.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_ground_plane(0.0);
        world.add_static_cuboid(Vec3::new(0.0, 2.0, -10.0), 0.0, Vec3::new(5.0, 2.0, 0.5));
        world.update_query_pipeline();
        world
    }

    #[test]
    fn ground_probe_finds_surface_under_feet() {
        let world = flat_world();
        let hit = world.ground_probe(Vec3::new(1.0, 0.2, 1.0), 0.4).expect("ground below");
        assert!(hit.point.y.abs() < 1e-3);
        assert!(hit.normal.y > 0.9);
    }

    #[test]
    fn ground_probe_misses_when_airborne() {
        let world = flat_world();
        assert!(world.ground_probe(Vec3::new(1.0, 3.0, 1.0), 0.4).is_none());
    }

    #[test]
    fn wall_blocks_line_of_sight() {
        let world = flat_world();
        let from = Vec3::new(0.0, 1.0, 0.0);
        assert!(!world.line_of_sight(from, Vec3::new(0.0, 1.0, -20.0)));
        assert!(world.line_of_sight(from, Vec3::new(0.0, 1.0, 5.0)));
    }

    #[test]
    fn obstruction_distance_reports_wall() {
        let world = flat_world();
        let d = world
            .obstruction_distance(Vec3::new(0.0, 1.0, 0.0), -Vec3::Z, 20.0)
            .expect("wall in range");
        assert!((d - 9.5).abs() < 1e-3);
        assert!(world.obstruction_distance(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, 20.0).is_none());
    }
}
