//! Read-only egui window with fractal and frame statistics.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use fractal_bevy::{CubeFractal, FractalStats};

/// Plugin for the stats window.
pub struct StatsUiPlugin;

impl Plugin for StatsUiPlugin {
  fn build(&self, app: &mut App) {
    app.add_systems(EguiPrimaryContextPass, render_stats_window);
  }
}

fn render_stats_window(
  mut contexts: EguiContexts,
  diagnostics: Res<DiagnosticsStore>,
  stats: Res<FractalStats>,
  fractals: Query<&CubeFractal>,
) {
  let Ok(ctx) = contexts.ctx_mut() else {
    return;
  };

  let fps = diagnostics
    .get(&FrameTimeDiagnosticsPlugin::FPS)
    .and_then(|fps| fps.smoothed())
    .unwrap_or(0.0);

  egui::Window::new("Fractal")
    .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
    .resizable(false)
    .collapsible(true)
    .show(ctx, |ui| {
      egui::Grid::new("fractal_stats")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
          ui.label("FPS");
          ui.label(format!("{fps:.0}"));
          ui.end_row();

          for fractal in &fractals {
            let engine = &fractal.engine;
            ui.label("Phase");
            ui.label(format!("{:?} (cycle {})", engine.phase(), engine.cycle()));
            ui.end_row();

            ui.label("Cubes");
            ui.label(format!(
              "{} / {}",
              engine.live_count(),
              engine.config().node_upper_bound()
            ));
            ui.end_row();

            ui.label("Last build");
            ui.label(format!("{}", engine.last_build_size()));
            ui.end_row();
          }

          ui.label("Placed");
          ui.label(format!("{}", stats.placed_total));
          ui.end_row();

          ui.label("Destroyed");
          ui.label(format!("{}", stats.destroyed_total));
          ui.end_row();

          ui.label("Skipped");
          ui.label(format!("{}", stats.skipped_total));
          ui.end_row();
        });
    });
}
