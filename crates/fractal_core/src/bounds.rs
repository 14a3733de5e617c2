//! Axis-aligned bounding box used by the occupancy check.

use glam::Vec3;

/// Single-precision axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
  /// Minimum corner.
  pub min: Vec3,
  /// Maximum corner.
  pub max: Vec3,
}

impl Aabb3 {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    debug_assert!(
      min.cmple(max).all(),
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create a new AABB from center and half-extents.
  pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Bounds of a cube with the given centre and edge length.
  pub fn from_cube(center: Vec3, edge: f32) -> Self {
    Self::from_center_half_extents(center, Vec3::splat(edge * 0.5))
  }

  /// Check if this AABB overlaps with another.
  ///
  /// Strict: boxes that only share a face, edge or corner do not overlap.
  #[inline]
  pub fn overlaps(&self, other: &Aabb3) -> bool {
    self.min.x < other.max.x
      && self.max.x > other.min.x
      && self.min.y < other.max.y
      && self.max.y > other.min.y
      && self.min.z < other.max.z
      && self.max.z > other.min.z
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  /// Get the half-extents of the AABB.
  #[inline]
  pub fn half_extents(&self) -> Vec3 {
    self.size() * 0.5
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }
}
