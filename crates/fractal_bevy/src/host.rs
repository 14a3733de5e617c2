//! FractalHost implementation on top of Bevy commands and avian3d queries.

use avian3d::prelude::{Collider, SpatialQuery, SpatialQueryFilter};
use bevy::prelude::*;
use fractal_core::{Aabb3, ContainerSpin, CubeSpawn, FractalHost};

use crate::components::{ContainerSpinner, FractalContainer, FractalCube};
use crate::resources::{cube_material, CubeAssets, DepthMaterials};

/// Scene geometry lookup used by the occupancy check.
///
/// Boxes are given in world space as centre, half-extents and rotation.
pub trait ObstacleQuery {
  fn intersects_box(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> bool;
}

impl ObstacleQuery for SpatialQuery<'_, '_> {
  fn intersects_box(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> bool {
    let size = half_extents * 2.0;
    let shape = Collider::cuboid(size.x, size.y, size.z);
    !self
      .shape_intersections(&shape, center, rotation, &SpatialQueryFilter::default())
      .is_empty()
  }
}

/// Per-fractal host built fresh each frame inside the cycle system.
pub struct BevyFractalHost<'a, 'w, 's> {
  commands: &'a mut Commands<'w, 's>,
  materials: &'a mut Assets<StandardMaterial>,
  cube_assets: &'a CubeAssets,
  depth_materials: Option<&'a DepthMaterials>,
  obstacles: Option<&'a dyn ObstacleQuery>,
  /// Entity carrying the engine.
  owner: Entity,
  /// World pose of the live container, for local → world conversion.
  container_pose: Transform,
  /// Spin rate handed to new containers, degrees per second.
  rotation_speed: f32,
}

impl<'a, 'w, 's> BevyFractalHost<'a, 'w, 's> {
  pub fn new(
    commands: &'a mut Commands<'w, 's>,
    materials: &'a mut Assets<StandardMaterial>,
    cube_assets: &'a CubeAssets,
    owner: Entity,
    container_pose: Transform,
    rotation_speed: f32,
  ) -> Self {
    Self {
      commands,
      materials,
      cube_assets,
      depth_materials: None,
      obstacles: None,
      owner,
      container_pose,
      rotation_speed,
    }
  }

  /// Use cached per-depth materials where the colors match.
  pub fn with_depth_materials(mut self, depth_materials: Option<&'a DepthMaterials>) -> Self {
    self.depth_materials = depth_materials;
    self
  }

  /// Block growth into scene geometry found by `obstacles`.
  pub fn with_obstacles(mut self, obstacles: &'a dyn ObstacleQuery) -> Self {
    self.obstacles = Some(obstacles);
    self
  }

  fn material_for(&mut self, cube: &CubeSpawn) -> Handle<StandardMaterial> {
    self
      .depth_materials
      .and_then(|cache| cache.get(cube.depth, cube.color))
      .unwrap_or_else(|| self.materials.add(cube_material(cube.color)))
  }
}

impl FractalHost for BevyFractalHost<'_, '_, '_> {
  type Handle = Entity;

  fn spawn_container(&mut self, seed: Vec3) -> Entity {
    // A fresh container starts unrotated.
    self.container_pose = Transform::from_translation(seed);
    self
      .commands
      .spawn((
        Name::new("FractalContainer"),
        FractalContainer { owner: self.owner },
        ContainerSpinner(ContainerSpin::new(self.rotation_speed)),
        self.container_pose,
        Visibility::default(),
      ))
      .id()
  }

  fn despawn_container(&mut self, container: Entity) {
    if let Ok(mut entity) = self.commands.get_entity(container) {
      entity.try_despawn();
    }
  }

  fn spawn_cube(&mut self, container: Entity, cube: &CubeSpawn) -> Entity {
    let material = self.material_for(cube);
    self
      .commands
      .spawn((
        Name::new(format!("FractalCube d{}", cube.depth)),
        FractalCube {
          owner: self.owner,
          depth: cube.depth,
        },
        Mesh3d(self.cube_assets.mesh.clone()),
        MeshMaterial3d(material),
        Transform::from_translation(cube.position).with_scale(Vec3::splat(cube.size)),
        ChildOf(container),
      ))
      .id()
  }

  fn despawn_cube(&mut self, cube: Entity) -> bool {
    match self.commands.get_entity(cube) {
      Ok(mut entity) => {
        entity.try_despawn();
        true
      }
      Err(_) => false,
    }
  }

  fn is_region_occupied(&self, region: &Aabb3) -> bool {
    let Some(obstacles) = self.obstacles else {
      return false;
    };
    let pose = self.container_pose;
    obstacles.intersects_box(
      pose.transform_point(region.center()),
      region.half_extents() * pose.scale,
      pose.rotation,
    )
  }
}

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;
