use avian3d::prelude::*;
use bevy::prelude::*;

use crate::enemy_ai::GroundProbe;

/// Sweep-and-slide movement for kinematic characters.
///
/// [`KinematicMover::resolve`] sweeps the collider along the requested
/// displacement. On contact it stops `skin_width` short of the surface,
/// projects the leftover displacement onto the contact plane and sweeps
/// again, at most `max_slides` times. A sweep that is moving down and gets
/// stopped by a walkable surface marks the character as grounded.
///
/// A collider the character already overlaps only blocks the sweep when the
/// move pushes further into it. Otherwise the overlap is skipped, so a
/// character pressed against a wall can still step away from it.
#[derive(Component, Clone, Debug)]
pub struct KinematicMover {
    pub skin_width: f32,
    pub max_slides: u8,
    /// Steepest surface, in radians from straight up, that still counts as ground.
    pub max_ground_angle: f32,
}

impl Default for KinematicMover {
    fn default() -> Self {
        Self {
            skin_width: 0.02,
            max_slides: 4,
            max_ground_angle: 45f32.to_radians(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveResolution {
    pub translation: Vec3,
    pub grounded: bool,
}

/// Hit distance below which the shape is taken to start inside the collider.
const OVERLAP_TOLERANCE: f32 = 1e-4;

impl KinematicMover {
    pub fn resolve(
        &self,
        spatial_query: &SpatialQuery,
        collider: &Collider,
        origin: Vec3,
        rotation: Quat,
        displacement: Vec3,
        filter: &SpatialQueryFilter,
    ) -> MoveResolution {
        let mut resolution = MoveResolution {
            translation: origin,
            grounded: false,
        };
        let mut remaining = displacement;

        for _ in 0..self.max_slides {
            let length = remaining.length();
            let Ok(direction) = Dir3::new(remaining) else {
                break;
            };

            let Some(hit) = sweep(
                spatial_query,
                collider,
                resolution.translation,
                rotation,
                direction,
                length + self.skin_width,
                filter,
            ) else {
                resolution.translation += remaining;
                break;
            };

            let travel = (hit.distance - self.skin_width).clamp(0.0, length);
            resolution.translation += direction * travel;

            if remaining.y < 0.0 && is_walkable(hit.normal1, self.max_ground_angle) {
                resolution.grounded = true;
            }

            remaining = slide_along(remaining - direction * travel, hit.normal1);
        }

        resolution
    }
}

/// Casts `collider` and returns the first hit that stops the motion.
///
/// Starting overlaps that `direction` leaves or slides past are excluded and
/// the cast is repeated.
fn sweep(
    spatial_query: &SpatialQuery,
    collider: &Collider,
    origin: Vec3,
    rotation: Quat,
    direction: Dir3,
    max_distance: f32,
    filter: &SpatialQueryFilter,
) -> Option<ShapeHitData> {
    let config = ShapeCastConfig::from_max_distance(max_distance);
    let mut filter = filter.clone();

    loop {
        let hit =
            spatial_query.cast_shape(collider, origin, rotation, direction, &config, &filter)?;
        if blocks_sweep(hit.distance, hit.normal1, direction.as_vec3()) {
            return Some(hit);
        }
        filter.excluded_entities.insert(hit.entity);
    }
}

/// Whether a shape-cast hit stops a move along `direction`.
///
/// `normal` is the outward normal of the surface that was hit. A hit at zero
/// distance is an overlap the cast started in; it only blocks a move that
/// heads into that surface.
pub fn blocks_sweep(distance: f32, normal: Vec3, direction: Vec3) -> bool {
    distance > OVERLAP_TOLERANCE || normal.dot(direction) < -OVERLAP_TOLERANCE
}

/// Removes the component of `remaining` that points into the surface.
pub fn slide_along(remaining: Vec3, normal: Vec3) -> Vec3 {
    let into_surface = remaining.dot(normal);
    if into_surface < 0.0 {
        remaining - normal * into_surface
    } else {
        remaining
    }
}

pub fn is_walkable(normal: Vec3, max_angle: f32) -> bool {
    normal.normalize_or_zero().dot(Vec3::Y) >= max_angle.cos()
}

/// Downward ray probe over the physics world.
pub struct RayGroundProbe<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    filter: SpatialQueryFilter,
}

impl<'a, 'w, 's> RayGroundProbe<'a, 'w, 's> {
    /// Builds a probe that ignores `owner`'s own collider.
    pub fn new(spatial_query: &'a SpatialQuery<'w, 's>, owner: Entity) -> Self {
        Self {
            spatial_query,
            filter: SpatialQueryFilter::default().with_excluded_entities([owner]),
        }
    }
}

impl GroundProbe for RayGroundProbe<'_, '_, '_> {
    fn is_grounded(&self, origin: Vec3, max_distance: f32) -> bool {
        self.spatial_query
            .cast_ray(origin, Dir3::NEG_Y, max_distance, true, &self.filter)
            .is_some()
    }
}
