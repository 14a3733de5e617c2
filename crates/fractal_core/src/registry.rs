//! Live cube arena and depth index for one fractal instance.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use glam::Vec3;

use crate::bounds::Aabb3;

/// Identity of a cube within one [`CubeRegistry`].
///
/// Allocated in creation order and never reused within a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubeId(u64);

/// A placed cube.
///
/// `H` is the host's handle type for realised primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct CubeNode<H> {
  /// Centre in the container's local frame.
  pub position: Vec3,
  /// Edge length.
  pub size: f32,
  /// Recursion depth, 0 = root.
  pub depth: u32,
  /// Host primitive realising this cube.
  pub handle: H,
  /// Host container the cube is attached to.
  pub container: H,
}

impl<H> CubeNode<H> {
  /// Bounding box in the container's local frame.
  pub fn bounds(&self) -> Aabb3 {
    Aabb3::from_cube(self.position, self.size)
  }
}

/// Cubes sharing one depth, torn down together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthBatch {
  pub depth: u32,
  /// Members in creation order.
  pub cubes: Vec<CubeId>,
}

/// Mapping from live cube to recursion depth.
#[derive(Clone, Debug, Default)]
pub struct DepthIndex {
  depths: HashMap<CubeId, u32>,
}

impl DepthIndex {
  pub fn insert(&mut self, id: CubeId, depth: u32) {
    self.depths.insert(id, depth);
  }

  pub fn remove(&mut self, id: CubeId) -> Option<u32> {
    self.depths.remove(&id)
  }

  pub fn get(&self, id: CubeId) -> Option<u32> {
    self.depths.get(&id).copied()
  }

  pub fn len(&self) -> usize {
    self.depths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.depths.is_empty()
  }

  pub fn clear(&mut self) {
    self.depths.clear();
  }

  /// Group cubes by depth, deepest first. Empty depths are omitted.
  pub fn batches_deepest_first(&self) -> Vec<DepthBatch> {
    let mut groups: BTreeMap<u32, Vec<CubeId>> = BTreeMap::new();
    for (&id, &depth) in &self.depths {
      groups.entry(depth).or_default().push(id);
    }

    groups
      .into_iter()
      .rev()
      .map(|(depth, mut cubes)| {
        cubes.sort_unstable();
        DepthBatch { depth, cubes }
      })
      .collect()
  }
}

/// Arena of live cubes keyed by [`CubeId`], with a handle reverse lookup.
#[derive(Clone, Debug)]
pub struct CubeRegistry<H> {
  nodes: BTreeMap<CubeId, CubeNode<H>>,
  by_handle: HashMap<H, CubeId>,
  depths: DepthIndex,
  next_id: u64,
}

impl<H> Default for CubeRegistry<H> {
  fn default() -> Self {
    Self {
      nodes: BTreeMap::new(),
      by_handle: HashMap::new(),
      depths: DepthIndex::default(),
      next_id: 0,
    }
  }
}

impl<H: Copy + Eq + Hash + Debug> CubeRegistry<H> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a placed cube and its depth.
  pub fn insert(&mut self, node: CubeNode<H>) -> CubeId {
    let id = CubeId(self.next_id);
    self.next_id += 1;

    self.depths.insert(id, node.depth);
    self.by_handle.insert(node.handle, id);
    self.nodes.insert(id, node);
    id
  }

  /// Unregister a cube, returning it if it was live.
  pub fn remove(&mut self, id: CubeId) -> Option<CubeNode<H>> {
    let node = self.nodes.remove(&id)?;
    self.depths.remove(id);
    self.by_handle.remove(&node.handle);
    Some(node)
  }

  /// Unregister the cube realised by `handle`.
  pub fn remove_by_handle(&mut self, handle: H) -> Option<CubeNode<H>> {
    let id = self.id_of(handle)?;
    self.remove(id)
  }

  pub fn get(&self, id: CubeId) -> Option<&CubeNode<H>> {
    self.nodes.get(&id)
  }

  pub fn id_of(&self, handle: H) -> Option<CubeId> {
    self.by_handle.get(&handle).copied()
  }

  pub fn depth_index(&self) -> &DepthIndex {
    &self.depths
  }

  /// Live cubes in creation order.
  pub fn iter(&self) -> impl Iterator<Item = (CubeId, &CubeNode<H>)> {
    self.nodes.iter().map(|(&id, node)| (id, node))
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Drop every cube. IDs keep increasing afterwards.
  pub fn clear(&mut self) {
    self.nodes.clear();
    self.by_handle.clear();
    self.depths.clear();
  }

  /// True when any live cube's bounds overlap `region`.
  pub fn overlaps(&self, region: &Aabb3) -> bool {
    self.nodes.values().any(|node| node.bounds().overlaps(region))
  }

  /// Number of live cubes per depth, index = depth.
  pub fn depth_histogram(&self) -> Vec<usize> {
    let mut counts = Vec::new();
    for node in self.nodes.values() {
      let depth = node.depth as usize;
      if counts.len() <= depth {
        counts.resize(depth + 1, 0);
      }
      counts[depth] += 1;
    }
    counts
  }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
