//! Bevy components for fractal entities.

use bevy::prelude::*;
use fractal_core::{ContainerSpin, FractalConfig, FractalEngine};

/// Marks where a fractal should grow.
///
/// The entity's `Transform` translation becomes the seed. `config` overrides
/// the plugin-wide [`FractalSettings`](crate::FractalSettings).
///
/// # Example
/// ```ignore
/// commands.spawn((
///     FractalSeed::default(),
///     Transform::from_xyz(0.0, 1.5, 0.0),
/// ));
/// ```
#[derive(Component, Default, Clone)]
pub struct FractalSeed {
  pub config: Option<FractalConfig>,
}

/// Component wrapping a FractalEngine for Bevy ECS.
///
/// Inserted on the seed entity once its engine has been created. Despawning
/// the entity despawns its container and cubes.
#[derive(Component)]
pub struct CubeFractal {
  /// The underlying engine; host handles are entities.
  pub engine: FractalEngine<Entity>,
}

/// Parent entity of one cycle's cubes.
#[derive(Component)]
pub struct FractalContainer {
  /// Entity carrying the [`CubeFractal`] that owns this container.
  pub owner: Entity,
}

/// Spin state of a container.
#[derive(Component)]
pub struct ContainerSpinner(pub ContainerSpin);

/// One generated cube.
#[derive(Component)]
pub struct FractalCube {
  /// Entity carrying the owning [`CubeFractal`].
  pub owner: Entity,
  /// Recursion depth, 0 = root.
  pub depth: u32,
}
