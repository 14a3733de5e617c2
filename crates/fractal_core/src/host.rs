//! Collaborator interface implemented by the embedding engine.
//!
//! The core never renders or queries a physics scene itself. It asks the host
//! to realise containers and cubes, to destroy them, and whether a region is
//! blocked by scene geometry the core does not track.

use std::fmt::Debug;
use std::hash::Hash;

use glam::Vec3;

use crate::bounds::Aabb3;
use crate::color::Rgba;

/// Everything the host needs to realise one cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeSpawn {
  /// Centre in the container's local frame.
  pub position: Vec3,
  /// Edge length (uniform scale of a unit cube).
  pub size: f32,
  /// Recursion depth.
  pub depth: u32,
  /// Depth gradient color.
  pub color: Rgba,
}

/// Renderer, transform and spatial query services of the embedding engine.
pub trait FractalHost {
  /// Handle of a realised container or cube.
  type Handle: Copy + Eq + Hash + Debug;

  /// Create an empty container positioned at `seed`.
  fn spawn_container(&mut self, seed: Vec3) -> Self::Handle;

  /// Destroy a container and anything still attached to it.
  fn despawn_container(&mut self, container: Self::Handle);

  /// Create a cube attached to `container`.
  fn spawn_cube(&mut self, container: Self::Handle, cube: &CubeSpawn) -> Self::Handle;

  /// Destroy a cube. Returns false when it was already gone.
  fn despawn_cube(&mut self, cube: Self::Handle) -> bool;

  /// Whether scene geometry outside the fractal intersects `region`.
  ///
  /// `region` is expressed in the current container's local frame.
  fn is_region_occupied(&self, _region: &Aabb3) -> bool {
    false
  }
}
