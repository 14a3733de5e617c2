use std::collections::BTreeSet;

use super::*;
use crate::color::Rgba;
use crate::headless::{count_cube_ops, spawned_depths, HeadlessHandle, HeadlessScene, SceneOp};

const FRAME: Duration = Duration::from_millis(10);
const MAX_TICKS: usize = 10_000;

fn fast_config(max_depth: u32) -> FractalConfig {
  FractalConfig {
    max_depth,
    create_delay: 0.05,
    destroy_delay: 0.05,
    cycle_delay: 0.1,
    pause_delay: 0.1,
    ..FractalConfig::default()
  }
}

fn new_engine(config: FractalConfig) -> FractalEngine<HeadlessHandle> {
  FractalEngine::new(config, Vec3::new(1.0, 2.0, 3.0)).expect("valid config")
}

/// Tick until the engine enters `phase`, returning the per-tick reports.
fn run_until(
  engine: &mut FractalEngine<HeadlessHandle>,
  scene: &mut HeadlessScene,
  phase: CyclePhase,
) -> Vec<TickReport> {
  let mut reports = Vec::new();
  for _ in 0..MAX_TICKS {
    reports.push(engine.tick(FRAME, scene));
    if engine.phase() == phase {
      return reports;
    }
  }
  panic!("engine never reached {phase:?}, stuck in {:?}", engine.phase());
}

fn depth_one_positions(engine: &FractalEngine<HeadlessHandle>) -> Vec<Vec3> {
  engine
    .registry()
    .iter()
    .filter(|(_, node)| node.depth == 1)
    .map(|(_, node)| node.position)
    .collect()
}

// =============================================================================
// Building
// =============================================================================

#[test]
fn test_first_tick_places_root_in_new_container() {
  let mut engine = new_engine(fast_config(2));
  let mut scene = HeadlessScene::new();

  let report = engine.tick(FRAME, &mut scene);

  assert_eq!(engine.phase(), CyclePhase::Building);
  assert_eq!(engine.cycle(), 1);
  assert_eq!(report.placed, 1);
  assert_eq!(scene.container_count(), 1);
  let (container, seed) = scene.containers().next().expect("container");
  assert_eq!(seed, engine.seed());
  assert_eq!(engine.container(), Some(container));

  let root = engine.registry().iter().next().expect("root").1;
  assert_eq!(root.depth, 0);
  assert_eq!(root.position, Vec3::ZERO);
  assert_eq!(root.size, 1.0);
  assert_eq!(root.container, container);
}

#[test]
fn test_zero_max_depth_builds_single_cube() {
  let mut engine = new_engine(fast_config(0));
  let mut scene = HeadlessScene::new();

  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  assert_eq!(engine.live_count(), 1);
  assert_eq!(scene.live_cube_count(), 1);
  let (_, root) = scene.live_cubes().next().expect("root");
  assert_eq!(root.color, Rgba::WHITE);
}

/// max_depth 1, scale 0.5: root plus six children, each 0.75 * initial_size
/// away along one axis.
#[test]
fn test_single_level_expansion_geometry() {
  let config = FractalConfig {
    initial_size: 2.0,
    ..fast_config(1)
  };
  let mut engine = new_engine(config);
  let mut scene = HeadlessScene::new();

  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  assert_eq!(engine.live_count(), 7);
  let children = depth_one_positions(&engine);
  assert_eq!(children.len(), 6);

  for dir in AXIS_DIRECTIONS {
    let expected = dir * 1.5;
    assert!(
      children.iter().any(|p| *p == expected),
      "missing child at {expected:?}"
    );
  }
  for (_, node) in engine.registry().iter().filter(|(_, n)| n.depth == 1) {
    assert_eq!(node.size, 1.0);
  }
}

#[test]
fn test_two_levels_without_collisions() {
  let mut engine = new_engine(fast_config(2));
  let mut scene = HeadlessScene::new();

  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  assert_eq!(engine.live_count(), 37);
  assert_eq!(engine.registry().depth_histogram(), vec![1, 6, 30]);
  assert_eq!(engine.last_build_size(), 37);
  assert_eq!(engine.active_tasks(), 0);
}

/// Cubes of one level are checked against shallower geometry only, so two
/// branches growing into the same cell both place their cube.
#[test]
fn test_same_level_branches_share_one_occupancy_snapshot() {
  let config = FractalConfig {
    scale_factor: 0.6,
    ..fast_config(2)
  };
  let mut engine = FractalEngine::new(config, Vec3::ZERO).expect("valid config");
  let mut scene = HeadlessScene::new();

  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  assert_eq!(engine.live_count(), 37);
  assert_eq!(engine.registry().depth_histogram(), vec![1, 6, 30]);

  let deepest: Vec<(Vec3, Aabb3)> = engine
    .registry()
    .iter()
    .filter(|(_, node)| node.depth == 2)
    .map(|(_, node)| (node.position, node.bounds()))
    .collect();

  // One doubled cell between every pair of perpendicular arms.
  let overlapping = deepest
    .iter()
    .enumerate()
    .flat_map(|(i, a)| deepest[i + 1..].iter().map(move |b| (a, b)))
    .filter(|(a, b)| a.1.overlaps(&b.1))
    .count();
  assert_eq!(overlapping, 12);

  // Axis order leaves no mark: the level is point symmetric.
  for (position, _) in &deepest {
    assert!(
      deepest
        .iter()
        .any(|(other, _)| other.abs_diff_eq(-*position, 1e-5)),
      "no mirror for {position}"
    );
  }
}

#[test]
fn test_node_count_never_exceeds_bound() {
  for max_depth in 0..=4 {
    let config = fast_config(max_depth);
    let bound = config.node_upper_bound();
    let mut engine = new_engine(config);
    let mut scene = HeadlessScene::new();

    run_until(&mut engine, &mut scene, CyclePhase::Holding);

    assert!(
      engine.live_count() as u64 <= bound,
      "depth {max_depth}: {} > {bound}",
      engine.live_count()
    );
  }
}

#[test]
fn test_recorded_depth_matches_creation_depth() {
  let config = fast_config(3);
  let mut engine = new_engine(config.clone());
  let mut scene = HeadlessScene::new();

  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  assert_eq!(
    spawned_depths(scene.log()),
    (0..=3).collect::<BTreeSet<u32>>()
  );
  for (_, node) in engine.registry().iter() {
    assert!(node.depth <= config.max_depth);
    assert_eq!(node.size, config.size_at(node.depth));
  }
  for op in scene.log() {
    if let SceneOp::SpawnCube { handle, cube, .. } = op {
      let id = engine.registry().id_of(*handle).expect("registered");
      assert_eq!(engine.registry().depth_index().get(id), Some(cube.depth));
      assert_eq!(cube.color, config.color_at(cube.depth));
    }
  }
}

#[test]
fn test_gradient_endpoints_on_built_cubes() {
  let mut engine = new_engine(fast_config(2));
  let mut scene = HeadlessScene::new();

  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  for (_, cube) in scene.live_cubes() {
    match cube.depth {
      0 => assert_eq!(cube.color, Rgba::WHITE),
      2 => assert_eq!(cube.color, Rgba::BLUE),
      _ => {}
    }
  }
}

/// Children appear one pacing delay after their parent, not all at once.
#[test]
fn test_growth_is_paced_by_create_delay() {
  let mut engine = new_engine(fast_config(2));
  let mut scene = HeadlessScene::new();

  let reports = run_until(&mut engine, &mut scene, CyclePhase::Holding);
  let placing: Vec<usize> = reports
    .iter()
    .map(|r| r.placed)
    .filter(|&placed| placed > 0)
    .collect();

  assert_eq!(placing, vec![1, 6, 30]);
}

#[test]
fn test_host_obstacle_suppresses_direction() {
  let mut engine = new_engine(fast_config(1));
  let mut scene = HeadlessScene::new();
  scene.add_obstacle(Aabb3::from_cube(Vec3::new(1.0, 0.0, 0.0), 0.5));

  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  assert_eq!(engine.live_count(), 6);
  assert!(depth_one_positions(&engine).iter().all(|p| p.x <= 0.0));
}

#[test]
fn test_fully_enclosed_root_completes_build() {
  let mut engine = new_engine(fast_config(3));
  let mut scene = HeadlessScene::new();
  scene.add_obstacle(Aabb3::from_cube(Vec3::ZERO, 10.0));

  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  assert_eq!(engine.live_count(), 1);
}

#[test]
fn test_occupancy_test_box_ignores_parent_face() {
  let mut engine = new_engine(fast_config(1));
  let mut scene = HeadlessScene::new();
  engine.tick(FRAME, &mut scene);

  // Flush against the root: free. Pushed into the root: occupied.
  assert!(!engine.is_occupied(Vec3::new(0.75, 0.0, 0.0), 0.5, &scene));
  assert!(engine.is_occupied(Vec3::new(0.6, 0.0, 0.0), 0.5, &scene));
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn test_teardown_runs_deepest_first() {
  let mut engine = new_engine(fast_config(3));
  let mut scene = HeadlessScene::new();
  run_until(&mut engine, &mut scene, CyclePhase::Holding);
  let built = engine.live_count();
  scene.take_log();

  let mut batches: Vec<Vec<u32>> = Vec::new();
  for _ in 0..MAX_TICKS {
    engine.tick(FRAME, &mut scene);
    let depths: Vec<u32> = scene
      .take_log()
      .into_iter()
      .filter_map(|op| match op {
        SceneOp::DespawnCube { depth, .. } => Some(depth),
        _ => None,
      })
      .collect();
    if !depths.is_empty() {
      batches.push(depths);
    }
    if engine.phase() == CyclePhase::Pausing {
      break;
    }
  }

  let batch_depths: Vec<u32> = batches
    .iter()
    .map(|batch| {
      assert!(batch.iter().all(|d| *d == batch[0]), "mixed batch {batch:?}");
      batch[0]
    })
    .collect();
  assert_eq!(batch_depths, vec![3, 2, 1, 0]);
  assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), built);
}

#[test]
fn test_teardown_empties_and_recreates_container_at_seed() {
  let mut engine = new_engine(fast_config(2));
  let mut scene = HeadlessScene::new();
  run_until(&mut engine, &mut scene, CyclePhase::Holding);
  let old_container = engine.container().expect("container");

  run_until(&mut engine, &mut scene, CyclePhase::Pausing);

  assert_eq!(engine.live_count(), 0);
  assert!(engine.registry().depth_index().is_empty());
  assert_eq!(scene.live_cube_count(), 0);
  assert_eq!(scene.container_count(), 1);

  let new_container = engine.container().expect("fresh container");
  assert_ne!(new_container, old_container);
  assert!(!scene.is_live(old_container));
  let (handle, seed) = scene.containers().next().expect("container");
  assert_eq!(handle, new_container);
  assert_eq!(seed, engine.seed());
}

#[test]
fn test_externally_removed_cube_is_skipped() {
  let mut engine = new_engine(fast_config(1));
  let mut scene = HeadlessScene::new();
  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  let (victim, _) = scene
    .live_cubes()
    .find(|(_, cube)| cube.depth == 1)
    .expect("child");
  scene.remove_externally(victim);

  let reports = run_until(&mut engine, &mut scene, CyclePhase::Pausing);
  let destroyed: usize = reports.iter().map(|r| r.destroyed).sum();
  let skipped: usize = reports.iter().map(|r| r.skipped).sum();

  assert_eq!(destroyed, 6);
  assert_eq!(skipped, 1);
  assert_eq!(engine.live_count(), 0);
}

#[test]
fn test_release_frees_cell_and_skips_teardown() {
  let mut engine = new_engine(fast_config(1));
  let mut scene = HeadlessScene::new();
  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  let (handle, cube) = scene
    .live_cubes()
    .find(|(_, cube)| cube.depth == 1)
    .map(|(handle, cube)| (handle, *cube))
    .expect("child");
  assert!(engine.is_occupied(cube.position, cube.size, &scene));

  scene.remove_externally(handle);
  assert!(engine.release(handle));
  assert!(!engine.release(handle));
  assert!(!engine.is_occupied(cube.position, cube.size, &scene));
  assert_eq!(engine.live_count(), 6);

  let reports = run_until(&mut engine, &mut scene, CyclePhase::Pausing);
  assert_eq!(reports.iter().map(|r| r.destroyed).sum::<usize>(), 6);
  assert_eq!(reports.iter().map(|r| r.skipped).sum::<usize>(), 0);
}

// =============================================================================
// Cycle driver
// =============================================================================

#[test]
fn test_phase_sequence() {
  let mut engine = new_engine(fast_config(1));
  let mut scene = HeadlessScene::new();

  let mut phases = vec![engine.phase()];
  for _ in 0..MAX_TICKS {
    engine.tick(FRAME, &mut scene);
    if phases.last() != Some(&engine.phase()) {
      phases.push(engine.phase());
    }
    if engine.cycle() == 2 {
      break;
    }
  }

  assert_eq!(
    phases,
    vec![
      CyclePhase::Idle,
      CyclePhase::Building,
      CyclePhase::Holding,
      CyclePhase::Destroying,
      CyclePhase::Pausing,
      CyclePhase::Building,
    ]
  );
}

#[test]
fn test_hold_lasts_cycle_delay() {
  let mut engine = new_engine(fast_config(1));
  let mut scene = HeadlessScene::new();
  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  let ticks = run_until(&mut engine, &mut scene, CyclePhase::Destroying).len();

  // 100 ms at 10 ms per frame, plus at most one frame of rounding.
  assert!((10..=11).contains(&ticks), "held for {ticks} ticks");
}

#[test]
fn test_second_cycle_matches_first() {
  let mut engine = new_engine(fast_config(3));
  let mut scene = HeadlessScene::new();

  run_until(&mut engine, &mut scene, CyclePhase::Holding);
  let first = engine.live_count();
  let first_histogram = engine.registry().depth_histogram();

  run_until(&mut engine, &mut scene, CyclePhase::Building);
  run_until(&mut engine, &mut scene, CyclePhase::Holding);

  assert_eq!(engine.cycle(), 2);
  assert_eq!(engine.live_count(), first);
  assert_eq!(engine.registry().depth_histogram(), first_histogram);
  assert_eq!(scene.live_cube_count(), first);
  assert_eq!(scene.container_count(), 1);
  let (_, seed) = scene.containers().next().expect("container");
  assert_eq!(seed, engine.seed());
}

/// Zero delays still advance at most one suspension per frame.
#[test]
fn test_zero_delays_terminate_each_tick() {
  let config = FractalConfig {
    create_delay: 0.0,
    destroy_delay: 0.0,
    cycle_delay: 0.0,
    pause_delay: 0.0,
    ..fast_config(2)
  };
  let mut engine = new_engine(config);
  let mut scene = HeadlessScene::new();

  let mut ticks = 0;
  while engine.cycle() < 3 {
    engine.tick(Duration::ZERO, &mut scene);
    ticks += 1;
    assert!(ticks < 100, "cycle never advanced");
  }

  let (spawned, despawned) = count_cube_ops(scene.log());
  assert_eq!(spawned - despawned, engine.live_count());
}

#[test]
fn test_reset_destroys_everything_and_restarts() {
  let mut engine = new_engine(fast_config(3));
  let mut scene = HeadlessScene::new();
  for _ in 0..8 {
    engine.tick(FRAME, &mut scene);
  }
  assert!(engine.live_count() > 1);

  engine.reset(&mut scene);

  assert_eq!(engine.phase(), CyclePhase::Idle);
  assert_eq!(engine.live_count(), 0);
  assert_eq!(engine.active_tasks(), 0);
  assert_eq!(engine.container(), None);
  assert_eq!(scene.live_cube_count(), 0);
  assert_eq!(scene.container_count(), 0);

  engine.tick(FRAME, &mut scene);
  assert_eq!(engine.phase(), CyclePhase::Building);
  assert_eq!(engine.cycle(), 2);
  assert_eq!(engine.live_count(), 1);
}

#[test]
fn test_rejects_invalid_config() {
  let config = FractalConfig {
    scale_factor: 1.0,
    ..FractalConfig::default()
  };
  let result = FractalEngine::<HeadlessHandle>::new(config, Vec3::ZERO);
  assert!(matches!(result, Err(ConfigError::ScaleFactor(_))));
}
