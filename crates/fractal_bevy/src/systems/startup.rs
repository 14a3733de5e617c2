//! Startup system for shared fractal assets.

use bevy::prelude::*;

use crate::resources::{CubeAssets, DepthMaterials, FractalSettings};

/// Create the unit cube mesh and the per-depth materials of the plugin config.
pub fn setup_cube_assets(
  mut commands: Commands,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
  settings: Res<FractalSettings>,
) {
  let mesh = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
  let depth_materials = DepthMaterials::from_config(&settings.config, &mut materials);

  info!(
    "[Fractal] Cube assets ready: {} depth materials (max_depth {})",
    depth_materials.materials.len(),
    settings.config.max_depth
  );

  commands.insert_resource(CubeAssets { mesh });
  commands.insert_resource(depth_materials);
}
