//! In-memory host for simulations, tests and benchmarks.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;

use crate::bounds::Aabb3;
use crate::host::{CubeSpawn, FractalHost};

/// Handle issued by [`HeadlessScene`].
pub type HeadlessHandle = u32;

/// One host call, in the order the engine made it.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneOp {
  SpawnContainer {
    handle: HeadlessHandle,
    seed: Vec3,
  },
  DespawnContainer {
    handle: HeadlessHandle,
  },
  SpawnCube {
    handle: HeadlessHandle,
    container: HeadlessHandle,
    cube: CubeSpawn,
  },
  DespawnCube {
    handle: HeadlessHandle,
    depth: u32,
  },
}

/// Host that keeps containers and cubes as plain records.
#[derive(Debug, Default)]
pub struct HeadlessScene {
  next_handle: HeadlessHandle,
  containers: BTreeMap<HeadlessHandle, Vec3>,
  cubes: BTreeMap<HeadlessHandle, (HeadlessHandle, CubeSpawn)>,
  /// Scene geometry that is not part of the fractal, in container space.
  obstacles: Vec<Aabb3>,
  log: Vec<SceneOp>,
}

impl HeadlessScene {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add static geometry that blocks growth.
  pub fn add_obstacle(&mut self, bounds: Aabb3) {
    self.obstacles.push(bounds);
  }

  /// Remove a cube behind the engine's back, as a physics or gameplay
  /// system might.
  pub fn remove_externally(&mut self, handle: HeadlessHandle) -> Option<CubeSpawn> {
    self.cubes.remove(&handle).map(|(_, cube)| cube)
  }

  pub fn live_cubes(&self) -> impl Iterator<Item = (HeadlessHandle, &CubeSpawn)> {
    self.cubes.iter().map(|(&handle, (_, cube))| (handle, cube))
  }

  /// True while `handle` names a live cube or container.
  pub fn is_live(&self, handle: HeadlessHandle) -> bool {
    self.cubes.contains_key(&handle) || self.containers.contains_key(&handle)
  }

  pub fn live_cube_count(&self) -> usize {
    self.cubes.len()
  }

  /// Live containers and their seed positions.
  pub fn containers(&self) -> impl Iterator<Item = (HeadlessHandle, Vec3)> + '_ {
    self.containers.iter().map(|(&handle, &seed)| (handle, seed))
  }

  pub fn container_count(&self) -> usize {
    self.containers.len()
  }

  /// Every host call so far.
  pub fn log(&self) -> &[SceneOp] {
    &self.log
  }

  /// Return and forget the recorded host calls.
  pub fn take_log(&mut self) -> Vec<SceneOp> {
    std::mem::take(&mut self.log)
  }

  fn allocate(&mut self) -> HeadlessHandle {
    self.next_handle += 1;
    self.next_handle
  }
}

impl FractalHost for HeadlessScene {
  type Handle = HeadlessHandle;

  fn spawn_container(&mut self, seed: Vec3) -> HeadlessHandle {
    let handle = self.allocate();
    self.containers.insert(handle, seed);
    self.log.push(SceneOp::SpawnContainer { handle, seed });
    handle
  }

  fn despawn_container(&mut self, container: HeadlessHandle) {
    if self.containers.remove(&container).is_some() {
      self.cubes.retain(|_, (owner, _)| *owner != container);
      self.log.push(SceneOp::DespawnContainer { handle: container });
    }
  }

  fn spawn_cube(&mut self, container: HeadlessHandle, cube: &CubeSpawn) -> HeadlessHandle {
    let handle = self.allocate();
    self.cubes.insert(handle, (container, *cube));
    self.log.push(SceneOp::SpawnCube {
      handle,
      container,
      cube: *cube,
    });
    handle
  }

  fn despawn_cube(&mut self, cube: HeadlessHandle) -> bool {
    match self.cubes.remove(&cube) {
      Some((_, spawn)) => {
        self.log.push(SceneOp::DespawnCube {
          handle: cube,
          depth: spawn.depth,
        });
        true
      }
      None => false,
    }
  }

  fn is_region_occupied(&self, region: &Aabb3) -> bool {
    self.obstacles.iter().any(|obstacle| obstacle.overlaps(region))
  }
}

/// Counts of spawned and despawned cubes in a slice of the log.
pub fn count_cube_ops(ops: &[SceneOp]) -> (usize, usize) {
  ops.iter().fold((0, 0), |(spawned, despawned), op| match op {
    SceneOp::SpawnCube { .. } => (spawned + 1, despawned),
    SceneOp::DespawnCube { .. } => (spawned, despawned + 1),
    _ => (spawned, despawned),
  })
}

/// Distinct depths spawned so far, for quick assertions.
pub fn spawned_depths(ops: &[SceneOp]) -> BTreeSet<u32> {
  ops
    .iter()
    .filter_map(|op| match op {
      SceneOp::SpawnCube { cube, .. } => Some(cube.depth),
      _ => None,
    })
    .collect()
}
