//! Continuous container spin, independent of the build/teardown cycle.

use std::f32::consts::TAU;
use std::time::Duration;

use glam::Quat;

/// Yaw accumulator for a container spinning about the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerSpin {
  /// Angular rate in degrees per second.
  pub degrees_per_second: f32,
  /// Accumulated yaw in radians, wrapped to `[0, TAU)`.
  yaw: f32,
}

impl ContainerSpin {
  pub fn new(degrees_per_second: f32) -> Self {
    Self {
      degrees_per_second,
      yaw: 0.0,
    }
  }

  /// Advance by one frame and return the yaw delta in radians.
  pub fn advance(&mut self, dt: Duration) -> f32 {
    let delta = self.degrees_per_second.to_radians() * dt.as_secs_f32();
    self.yaw = (self.yaw + delta).rem_euclid(TAU);
    delta
  }

  /// Current orientation.
  pub fn rotation(&self) -> Quat {
    Quat::from_rotation_y(self.yaw)
  }

}
