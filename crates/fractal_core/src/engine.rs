//! FractalEngine - recursive generation, depth-ordered teardown and the
//! build/hold/destroy/pause cycle.
//!
//! Every suspension point of the generation and teardown flow is an explicit
//! wake-up in a [`Scheduler`]:
//!
//! ```text
//! Building ──(root subtree complete)──▶ Holding ──(cycle_delay)──▶ Destroying
//!     ▲                                                               │
//!     └────────────(pause_delay)──── Pausing ◀──(last depth cleared)──┘
//! ```
//!
//! A generation task places its cube when launched, sleeps `create_delay`,
//! then checks occupancy for all six directions. Every expansion due in the
//! same tick is checked before any of them launches a child, so cubes of one
//! level only see geometry from shallower levels. A task completes once every
//! launched child subtree has completed.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use glam::Vec3;

use crate::bounds::Aabb3;
use crate::config::{ConfigError, FractalConfig};
use crate::constants::{child_offset, AXIS_DIRECTIONS, OCCUPANCY_HALF_EXTENT_RATIO};
use crate::host::{CubeSpawn, FractalHost};
use crate::registry::{CubeNode, CubeRegistry, DepthBatch};
use crate::scheduler::Scheduler;

/// Cycle driver state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CyclePhase {
  /// Not started, or stopped by [`FractalEngine::reset`].
  #[default]
  Idle,
  /// Generation tasks are running.
  Building,
  /// Complete fractal on display.
  Holding,
  /// Depth batches are being removed.
  Destroying,
  /// Empty container, waiting for the next build.
  Pausing,
}

/// Work done during one [`FractalEngine::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
  /// Cubes placed.
  pub placed: usize,
  /// Cubes destroyed by teardown.
  pub destroyed: usize,
  /// Teardown entries that were already gone.
  pub skipped: usize,
  /// Phase transitions.
  pub transitions: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TaskId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wake {
  /// A placed cube finished its pacing delay and may expand.
  Expand(TaskId),
  HoldElapsed,
  TeardownStep,
  PauseElapsed,
}

/// One pending `Generate(position, size, depth)` call.
#[derive(Clone, Debug)]
struct GenTask {
  position: Vec3,
  size: f32,
  depth: u32,
  parent: Option<TaskId>,
  /// Launched children whose subtrees have not completed yet.
  pending_children: usize,
}

/// Children a woken task will launch.
struct Expansion {
  task: TaskId,
  /// Unoccupied child centres, in axis order.
  free: Vec<Vec3>,
  child_size: f32,
  child_depth: u32,
}

/// Owner of one fractal instance and its cooperative task tree.
pub struct FractalEngine<H> {
  config: FractalConfig,
  /// World position of every container this engine creates.
  seed: Vec3,
  create_delay: Duration,
  destroy_delay: Duration,
  cycle_delay: Duration,
  pause_delay: Duration,

  registry: CubeRegistry<H>,
  container: Option<H>,
  scheduler: Scheduler<Wake>,

  /// Task arena; `None` slots are free and listed in `free_tasks`.
  tasks: Vec<Option<GenTask>>,
  free_tasks: Vec<usize>,
  /// Remaining batches of the running teardown.
  teardown: VecDeque<DepthBatch>,

  phase: CyclePhase,
  cycle: u64,
  last_build_size: usize,
}

impl<H: Copy + Eq + Hash + Debug> FractalEngine<H> {
  /// Create an idle engine. Nothing is spawned until the first tick.
  pub fn new(config: FractalConfig, seed: Vec3) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Self {
      create_delay: config.create_delay(),
      destroy_delay: config.destroy_delay(),
      cycle_delay: config.cycle_delay(),
      pause_delay: config.pause_delay(),
      config,
      seed,
      registry: CubeRegistry::new(),
      container: None,
      scheduler: Scheduler::new(),
      tasks: Vec::new(),
      free_tasks: Vec::new(),
      teardown: VecDeque::new(),
      phase: CyclePhase::Idle,
      cycle: 0,
      last_build_size: 0,
    })
  }

  /// Advance the cycle by one frame.
  ///
  /// An idle engine creates its container and places the root cube in the
  /// first tick. Wake-ups scheduled during this tick resume in a later one.
  #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
  pub fn tick<T>(&mut self, dt: Duration, host: &mut T) -> TickReport
  where
    T: FractalHost<Handle = H>,
  {
    let mut report = TickReport::default();
    self.scheduler.advance(dt);

    if self.phase == CyclePhase::Idle {
      self.begin_building(host, &mut report);
    }

    let mut due_expansions = Vec::new();
    while let Some(wake) = self.scheduler.pop_due() {
      match wake {
        Wake::Expand(task) => due_expansions.push(task),
        Wake::HoldElapsed => self.begin_teardown(host, &mut report),
        Wake::TeardownStep => self.step_teardown(host, &mut report),
        Wake::PauseElapsed => self.begin_building(host, &mut report),
      }
    }
    self.expand_level(due_expansions, host, &mut report);

    report
  }

  /// Destroy everything this engine owns and return to [`CyclePhase::Idle`].
  ///
  /// The next tick starts a fresh cycle.
  pub fn reset<T>(&mut self, host: &mut T)
  where
    T: FractalHost<Handle = H>,
  {
    for (_, node) in self.registry.iter() {
      host.despawn_cube(node.handle);
    }
    if let Some(container) = self.container.take() {
      host.despawn_container(container);
    }

    self.registry.clear();
    self.scheduler.clear();
    self.tasks.clear();
    self.free_tasks.clear();
    self.teardown.clear();
    self.set_phase(CyclePhase::Idle, &mut TickReport::default());
  }

  /// Forget a cube that was removed outside the engine.
  ///
  /// Frees its cell for later occupancy checks. Returns false when the
  /// handle is not a live cube of this engine.
  pub fn release(&mut self, handle: H) -> bool {
    let released = self.registry.remove_by_handle(handle).is_some();
    if released {
      #[cfg(feature = "tracing")]
      tracing::debug!(?handle, "released externally removed cube");
    }
    released
  }

  /// Whether a cube of edge `size` centred at `center` (container space)
  /// would intersect existing geometry.
  pub fn is_occupied<T>(&self, center: Vec3, size: f32, host: &T) -> bool
  where
    T: FractalHost<Handle = H>,
  {
    let region = occupancy_region(center, size);
    self.registry.overlaps(&region) || host.is_region_occupied(&region)
  }

  pub fn config(&self) -> &FractalConfig {
    &self.config
  }

  pub fn seed(&self) -> Vec3 {
    self.seed
  }

  pub fn phase(&self) -> CyclePhase {
    self.phase
  }

  /// Number of builds started so far.
  pub fn cycle(&self) -> u64 {
    self.cycle
  }

  /// The live container, if one has been created.
  pub fn container(&self) -> Option<H> {
    self.container
  }

  pub fn registry(&self) -> &CubeRegistry<H> {
    &self.registry
  }

  pub fn live_count(&self) -> usize {
    self.registry.len()
  }

  /// Cube count of the most recently completed build.
  pub fn last_build_size(&self) -> usize {
    self.last_build_size
  }

  /// Generation tasks that have not completed.
  pub fn active_tasks(&self) -> usize {
    self.tasks.iter().filter(|slot| slot.is_some()).count()
  }

  // ===========================================================================
  // Building
  // ===========================================================================

  fn begin_building<T>(&mut self, host: &mut T, report: &mut TickReport)
  where
    T: FractalHost<Handle = H>,
  {
    self.cycle += 1;
    self.set_phase(CyclePhase::Building, report);
    self.launch(None, Vec3::ZERO, self.config.initial_size, 0, host, report);
  }

  /// Place one cube and schedule its expansion.
  fn launch<T>(
    &mut self,
    parent: Option<TaskId>,
    position: Vec3,
    size: f32,
    depth: u32,
    host: &mut T,
    report: &mut TickReport,
  ) where
    T: FractalHost<Handle = H>,
  {
    debug_assert!(depth <= self.config.max_depth);

    let container = self.ensure_container(host);
    let spawn = CubeSpawn {
      position,
      size,
      depth,
      color: self.config.color_at(depth),
    };
    let handle = host.spawn_cube(container, &spawn);
    self.registry.insert(CubeNode {
      position,
      size,
      depth,
      handle,
      container,
    });
    report.placed += 1;

    let task = self.alloc_task(GenTask {
      position,
      size,
      depth,
      parent,
      pending_children: 0,
    });
    self
      .scheduler
      .schedule_after(self.create_delay, Wake::Expand(task));
  }

  /// Expand every task that woke this tick.
  ///
  /// All candidates are checked before the first child is launched, so no
  /// task sees cubes placed by another task of the same level.
  fn expand_level<T>(&mut self, due: Vec<TaskId>, host: &mut T, report: &mut TickReport)
  where
    T: FractalHost<Handle = H>,
  {
    if due.is_empty() {
      return;
    }

    let plans: Vec<Expansion> = due
      .into_iter()
      .filter_map(|id| self.plan_expansion(id, &*host))
      .collect();

    for plan in plans {
      if plan.free.is_empty() {
        self.complete(plan.task, report);
        continue;
      }

      if let Some(task) = self.tasks.get_mut(plan.task.0).and_then(Option::as_mut) {
        task.pending_children = plan.free.len();
      }
      for candidate in plan.free {
        self.launch(
          Some(plan.task),
          candidate,
          plan.child_size,
          plan.child_depth,
          host,
          report,
        );
      }
    }
  }

  /// Free child positions of one task against the current geometry.
  fn plan_expansion<T>(&self, id: TaskId, host: &T) -> Option<Expansion>
  where
    T: FractalHost<Handle = H>,
  {
    let task = self.tasks.get(id.0)?.as_ref()?;

    if task.depth >= self.config.max_depth {
      return Some(Expansion {
        task: id,
        free: Vec::new(),
        child_size: 0.0,
        child_depth: task.depth,
      });
    }

    let child_size = self.config.size_at(task.depth + 1);
    let offset = child_offset(task.size, child_size);
    let free = AXIS_DIRECTIONS
      .iter()
      .map(|dir| task.position + *dir * offset)
      .filter(|&candidate| !self.is_occupied(candidate, child_size, host))
      .collect();

    Some(Expansion {
      task: id,
      free,
      child_size,
      child_depth: task.depth + 1,
    })
  }

  /// Retire a task and propagate completion to ancestors whose children
  /// have all finished.
  fn complete(&mut self, id: TaskId, report: &mut TickReport) {
    let mut current = Some(id);
    while let Some(id) = current {
      let Some(task) = self.free_task(id) else {
        return;
      };

      current = match task.parent {
        Some(parent) => self
          .tasks
          .get_mut(parent.0)
          .and_then(Option::as_mut)
          .and_then(|p| {
            p.pending_children = p.pending_children.saturating_sub(1);
            (p.pending_children == 0).then_some(parent)
          }),
        None => {
          self.finish_building(report);
          None
        }
      };
    }
  }

  fn finish_building(&mut self, report: &mut TickReport) {
    self.last_build_size = self.registry.len();
    #[cfg(feature = "tracing")]
    tracing::info!(
      cycle = self.cycle,
      cubes = self.last_build_size,
      depths = ?self.registry.depth_histogram(),
      "fractal built"
    );
    self.set_phase(CyclePhase::Holding, report);
    self
      .scheduler
      .schedule_after(self.cycle_delay, Wake::HoldElapsed);
  }

  // ===========================================================================
  // Teardown
  // ===========================================================================

  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(cycle = self.cycle))
  )]
  fn begin_teardown<T>(&mut self, host: &mut T, report: &mut TickReport)
  where
    T: FractalHost<Handle = H>,
  {
    self.set_phase(CyclePhase::Destroying, report);
    self.teardown = self.registry.depth_index().batches_deepest_first().into();
    self.step_teardown(host, report);
  }

  /// Remove the next depth batch, or finish once none remain.
  fn step_teardown<T>(&mut self, host: &mut T, report: &mut TickReport)
  where
    T: FractalHost<Handle = H>,
  {
    let Some(batch) = self.teardown.pop_front() else {
      self.finish_teardown(host, report);
      return;
    };

    let (mut destroyed, mut skipped) = (0, 0);
    for id in batch.cubes {
      match self.registry.remove(id) {
        Some(node) if host.despawn_cube(node.handle) => destroyed += 1,
        _ => skipped += 1,
      }
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(depth = batch.depth, destroyed, skipped, "depth cleared");

    report.destroyed += destroyed;
    report.skipped += skipped;
    self
      .scheduler
      .schedule_after(self.destroy_delay, Wake::TeardownStep);
  }

  /// Replace the container with a fresh one at the seed.
  fn finish_teardown<T>(&mut self, host: &mut T, report: &mut TickReport)
  where
    T: FractalHost<Handle = H>,
  {
    if let Some(container) = self.container.take() {
      host.despawn_container(container);
    }
    self.registry.clear();
    self.container = Some(host.spawn_container(self.seed));

    #[cfg(feature = "tracing")]
    tracing::info!(cycle = self.cycle, "fractal cleared");
    self.set_phase(CyclePhase::Pausing, report);
    self
      .scheduler
      .schedule_after(self.pause_delay, Wake::PauseElapsed);
  }

  // ===========================================================================
  // Helpers
  // ===========================================================================

  fn ensure_container<T>(&mut self, host: &mut T) -> H
  where
    T: FractalHost<Handle = H>,
  {
    match self.container {
      Some(container) => container,
      None => {
        let container = host.spawn_container(self.seed);
        self.container = Some(container);
        container
      }
    }
  }

  fn alloc_task(&mut self, task: GenTask) -> TaskId {
    match self.free_tasks.pop() {
      Some(slot) => {
        self.tasks[slot] = Some(task);
        TaskId(slot)
      }
      None => {
        self.tasks.push(Some(task));
        TaskId(self.tasks.len() - 1)
      }
    }
  }

  fn free_task(&mut self, id: TaskId) -> Option<GenTask> {
    let task = self.tasks.get_mut(id.0)?.take()?;
    self.free_tasks.push(id.0);
    Some(task)
  }

  fn set_phase(&mut self, phase: CyclePhase, report: &mut TickReport) {
    if self.phase != phase {
      #[cfg(feature = "tracing")]
      tracing::debug!(cycle = self.cycle, from = ?self.phase, to = ?phase, "phase change");
      self.phase = phase;
      report.transitions += 1;
    }
  }
}

/// Test box for a candidate cube of edge `size` centred at `center`.
pub fn occupancy_region(center: Vec3, size: f32) -> Aabb3 {
  Aabb3::from_center_half_extents(center, Vec3::splat(OCCUPANCY_HALF_EXTENT_RATIO * size))
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
