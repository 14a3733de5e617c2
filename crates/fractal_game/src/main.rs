//! fractal_game - Bevy demo of the cube fractal
//!
//! A fractal grows from a seed above a ground slab, holds, tears itself
//! down deepest first and starts over. The slab and a pillar are avian3d
//! colliders, so growth stops short of them.

mod scene;
mod stats_ui;

use avian3d::prelude::PhysicsPlugins;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use fractal_bevy::FractalPlugin;
use stats_ui::StatsUiPlugin;

fn main() {
  App::new()
    .add_plugins(DefaultPlugins.set(WindowPlugin {
      primary_window: Some(Window {
        title: "Cube Fractal".into(),
        resolution: (1280, 720).into(),
        ..default()
      }),
      ..default()
    }))
    .add_plugins(PhysicsPlugins::default())
    .add_plugins(FrameTimeDiagnosticsPlugin::default())
    .add_plugins(EguiPlugin::default())
    .add_plugins(FractalPlugin::default())
    .add_plugins(StatsUiPlugin)
    .add_systems(Startup, scene::setup_scene)
    .run();
}
