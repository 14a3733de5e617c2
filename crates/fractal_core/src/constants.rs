//! Geometry ratios shared by the generator and the occupancy check.

use glam::Vec3;

/// Child centre sits `CHILD_OFFSET_RATIO * (parent_size + child_size)` away
/// from the parent centre, so the two cubes share a face.
pub const CHILD_OFFSET_RATIO: f32 = 0.5;

/// Half-extent of the occupancy test box, relative to the candidate edge.
///
/// 0.4 keeps the box strictly inside the candidate cube, so a face-adjacent
/// parent never reports itself as an obstacle.
pub const OCCUPANCY_HALF_EXTENT_RATIO: f32 = 0.4;

/// Expansion directions in evaluation order: +X, -X, +Y, -Y, +Z, -Z.
pub const AXIS_DIRECTIONS: [Vec3; 6] = [
  Vec3::X,
  Vec3::NEG_X,
  Vec3::Y,
  Vec3::NEG_Y,
  Vec3::Z,
  Vec3::NEG_Z,
];

/// Offset between a parent centre and a child centre along one axis.
#[inline]
pub fn child_offset(parent_size: f32, child_size: f32) -> f32 {
  CHILD_OFFSET_RATIO * (parent_size + child_size)
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
