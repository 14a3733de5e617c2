//! Bevy presentation layer for fractal_core.
//!
//! This crate bridges the engine-independent fractal simulation with Bevy:
//! containers and cubes become entities, occupancy also consults avian3d
//! colliders in the scene, and each container spins every frame.
//!
//! Requires avian3d's `PhysicsPlugins` for the spatial query pipeline.

pub mod components;
pub mod host;
pub mod resources;
pub mod systems;

use bevy::prelude::*;
pub use components::*;
use fractal_core::FractalConfig;
pub use host::{BevyFractalHost, ObstacleQuery};
pub use resources::*;

/// Bevy plugin driving every [`CubeFractal`] in the world.
///
/// `config` overrides [`FractalConfig::default`] for seeds that do not carry
/// their own. An invalid override is logged and replaced by the defaults.
#[derive(Default)]
pub struct FractalPlugin {
  pub config: Option<FractalConfig>,
}

impl Plugin for FractalPlugin {
  fn build(&self, app: &mut App) {
    let config = match self.config.clone() {
      Some(config) => match config.validate() {
        Ok(()) => config,
        Err(err) => {
          error!("[Fractal] Invalid plugin config ({err}), using defaults");
          FractalConfig::default()
        }
      },
      None => FractalConfig::default(),
    };

    app
      .insert_resource(FractalSettings { config })
      .init_resource::<FractalStats>()
      .add_systems(Startup, systems::startup::setup_cube_assets)
      .add_systems(
        Update,
        (
          systems::cycle::initialize_fractals,
          systems::cycle::restart_changed_fractals,
          systems::cycle::release_removed_cubes,
          systems::cycle::drive_fractal_cycles,
          systems::cycle::cleanup_despawned_fractals,
        )
          .chain(),
      )
      // Containers spin in every phase. Spinning first hands the cycle
      // this frame's container pose for obstacle queries.
      .add_systems(
        Update,
        systems::spin::spin_fractal_containers.before(systems::cycle::drive_fractal_cycles),
      );
  }
}
