//! Container spin, independent of the fractal cycle.

use bevy::prelude::*;

use crate::components::ContainerSpinner;

/// Rotate every container about its vertical axis.
pub fn spin_fractal_containers(
  time: Res<Time>,
  mut containers: Query<(&mut ContainerSpinner, &mut Transform)>,
) {
  let dt = time.delta();
  for (mut spinner, mut transform) in &mut containers {
    spinner.0.advance(dt);
    transform.rotation = spinner.0.rotation();
  }
}
