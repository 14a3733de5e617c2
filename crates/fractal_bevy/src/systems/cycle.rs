//! Systems driving the build / hold / destroy / pause cycle.

use avian3d::prelude::SpatialQuery;
use bevy::prelude::*;
use fractal_core::{CyclePhase, FractalEngine};

use crate::components::{CubeFractal, FractalContainer, FractalCube, FractalSeed};
use crate::host::BevyFractalHost;
use crate::resources::{CubeAssets, DepthMaterials, FractalSettings, FractalStats};

/// Create an engine for every new [`FractalSeed`].
///
/// The seed's translation is the fractal origin. A seed with an invalid
/// config falls back to the plugin settings.
pub fn initialize_fractals(
  mut commands: Commands,
  settings: Res<FractalSettings>,
  seeds: Query<(Entity, &FractalSeed, &Transform), Without<CubeFractal>>,
) {
  for (entity, seed, transform) in &seeds {
    let origin = transform.translation;
    let config = seed
      .config
      .clone()
      .unwrap_or_else(|| settings.config.clone());

    let engine = match FractalEngine::new(config, origin) {
      Ok(engine) => engine,
      Err(err) => {
        error!("[Fractal] Seed {entity} has an invalid config ({err}), using plugin settings");
        match FractalEngine::new(settings.config.clone(), origin) {
          Ok(engine) => engine,
          Err(err) => {
            error!("[Fractal] Plugin settings rejected ({err}), seed {entity} skipped");
            continue;
          }
        }
      }
    };

    info!(
      "[Fractal] Seed {entity} at {origin}: max_depth {}, up to {} cubes per cycle",
      engine.config().max_depth,
      engine.config().node_upper_bound()
    );
    commands.entity(entity).insert(CubeFractal { engine });
  }
}

/// Restart fractals whose seed config or position changed.
///
/// The old engine's cubes and container are despawned and a fresh engine
/// starts growing on the next tick. An invalid new config keeps the running
/// fractal.
pub fn restart_changed_fractals(
  mut commands: Commands,
  mut materials: ResMut<Assets<StandardMaterial>>,
  cube_assets: Option<Res<CubeAssets>>,
  settings: Res<FractalSettings>,
  mut fractals: Query<
    (Entity, &FractalSeed, &Transform, &mut CubeFractal),
    Or<(Changed<FractalSeed>, Changed<Transform>)>,
  >,
) {
  let Some(cube_assets) = cube_assets else {
    return;
  };

  for (owner, seed, transform, mut fractal) in &mut fractals {
    let origin = transform.translation;
    let config = seed
      .config
      .clone()
      .unwrap_or_else(|| settings.config.clone());
    if fractal.engine.config() == &config && fractal.engine.seed() == origin {
      continue;
    }

    let engine = match FractalEngine::new(config, origin) {
      Ok(engine) => engine,
      Err(err) => {
        error!("[Fractal] Seed {owner} changed to an invalid config ({err}), keeping the old one");
        continue;
      }
    };

    let pose = Transform::from_translation(fractal.engine.seed());
    let mut host =
      BevyFractalHost::new(&mut commands, &mut materials, &cube_assets, owner, pose, 0.0);
    fractal.engine.reset(&mut host);
    fractal.engine = engine;

    info!("[Fractal] Seed {owner} restarted at {origin}");
  }
}

/// Forget cubes that were despawned by something other than their engine.
pub fn release_removed_cubes(
  mut removed: RemovedComponents<FractalCube>,
  mut fractals: Query<&mut CubeFractal>,
) {
  for cube in removed.read() {
    // Cubes torn down by their engine are already unregistered.
    for mut fractal in &mut fractals {
      if fractal.engine.registry().id_of(cube).is_some() {
        fractal.engine.release(cube);
        break;
      }
    }
  }
}

/// Tick every engine once with this frame's delta.
pub fn drive_fractal_cycles(
  time: Res<Time>,
  mut commands: Commands,
  mut materials: ResMut<Assets<StandardMaterial>>,
  cube_assets: Option<Res<CubeAssets>>,
  depth_materials: Option<Res<DepthMaterials>>,
  spatial_query: SpatialQuery,
  mut stats: ResMut<FractalStats>,
  mut fractals: Query<(Entity, &mut CubeFractal)>,
  containers: Query<&Transform, With<FractalContainer>>,
) {
  let Some(cube_assets) = cube_assets else {
    return;
  };
  let dt = time.delta();

  stats.fractals = 0;
  stats.live_cubes = 0;

  for (owner, mut fractal) in &mut fractals {
    let engine = &mut fractal.engine;
    let pose = engine
      .container()
      .and_then(|container| containers.get(container).ok())
      .copied()
      .unwrap_or_else(|| Transform::from_translation(engine.seed()));
    let rotation_speed = engine.config().rotation_speed;
    let phase_before = engine.phase();

    let mut host = BevyFractalHost::new(
      &mut commands,
      &mut materials,
      &cube_assets,
      owner,
      pose,
      rotation_speed,
    )
    .with_depth_materials(depth_materials.as_deref())
    .with_obstacles(&spatial_query);
    let report = engine.tick(dt, &mut host);

    if report.transitions > 0 && engine.phase() == CyclePhase::Holding {
      info!(
        "[Fractal] {owner} cycle {} built {} cubes",
        engine.cycle(),
        engine.last_build_size()
      );
    } else if report.transitions > 0 && phase_before == CyclePhase::Destroying {
      info!(
        "[Fractal] {owner} cycle {} torn down ({} skipped this frame)",
        engine.cycle(),
        report.skipped
      );
    }

    stats.record(&report);
    stats.fractals += 1;
    stats.live_cubes += engine.live_count();
  }
}

/// Despawn containers whose owning fractal entity is gone.
pub fn cleanup_despawned_fractals(
  mut removed: RemovedComponents<CubeFractal>,
  mut commands: Commands,
  containers: Query<(Entity, &FractalContainer)>,
  live_fractals: Query<(), With<CubeFractal>>,
) {
  // Only run when a CubeFractal was actually removed
  if removed.read().next().is_none() {
    return;
  }

  for (entity, container) in &containers {
    if live_fractals.get(container.owner).is_err() {
      // Cubes are children and go with the container.
      commands.entity(entity).try_despawn();
    }
  }
}

#[cfg(test)]
#[path = "cycle_test.rs"]
mod cycle_test;
