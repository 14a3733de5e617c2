//! Bevy resources for fractal rendering and bookkeeping.

use bevy::prelude::*;
use fractal_core::{FractalConfig, Rgba, TickReport};

/// Plugin-wide configuration, used by seeds without their own.
#[derive(Resource, Clone)]
pub struct FractalSettings {
  pub config: FractalConfig,
}

/// Shared unit cube mesh.
#[derive(Resource)]
pub struct CubeAssets {
  pub mesh: Handle<Mesh>,
}

/// Resource containing depth-colored materials for the configured gradient.
#[derive(Resource)]
pub struct DepthMaterials {
  /// Index = depth. Each entry keeps the color it was built from.
  pub materials: Vec<(Rgba, Handle<StandardMaterial>)>,
}

impl DepthMaterials {
  /// Build one material per depth of `config`.
  pub fn from_config(config: &FractalConfig, materials: &mut Assets<StandardMaterial>) -> Self {
    let materials = (0..=config.max_depth)
      .map(|depth| {
        let color = config.color_at(depth);
        (color, materials.add(cube_material(color)))
      })
      .collect();
    Self { materials }
  }

  /// Material for `depth`, if the cached one has exactly `color`.
  pub fn get(&self, depth: u32, color: Rgba) -> Option<Handle<StandardMaterial>> {
    self
      .materials
      .get(depth as usize)
      .filter(|(cached, _)| *cached == color)
      .map(|(_, handle)| handle.clone())
  }
}

/// Convert a core color to a Bevy color.
pub fn to_bevy_color(color: Rgba) -> Color {
  Color::srgba(color.r, color.g, color.b, color.a)
}

/// Material used for a cube of the given color.
pub fn cube_material(color: Rgba) -> StandardMaterial {
  StandardMaterial {
    base_color: to_bevy_color(color),
    perceptual_roughness: 0.6,
    ..default()
  }
}

/// Running totals across all fractals.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct FractalStats {
  /// Fractals driven this frame.
  pub fractals: usize,
  /// Cubes alive across all fractals.
  pub live_cubes: usize,
  pub placed_total: u64,
  pub destroyed_total: u64,
  /// Teardown entries that were already despawned.
  pub skipped_total: u64,
}

impl FractalStats {
  pub fn record(&mut self, report: &TickReport) {
    self.placed_total += report.placed as u64;
    self.destroyed_total += report.destroyed as u64;
    self.skipped_total += report.skipped as u64;
  }
}
