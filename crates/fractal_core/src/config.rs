//! FractalConfig - tunable parameters for one fractal instance.

use std::time::Duration;

use thiserror::Error;

use crate::color::{DepthGradient, Rgba};

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("initial_size must be finite and positive, got {0}")]
  InitialSize(f32),
  #[error("scale_factor must lie in (0, 1), got {0}")]
  ScaleFactor(f32),
  #[error("{name} must be a finite, non-negative number of seconds, got {value}")]
  Delay { name: &'static str, value: f32 },
  #[error("rotation_speed must be finite, got {0}")]
  RotationSpeed(f32),
  #[error("{name} color has a non-finite channel")]
  Color { name: &'static str },
}

/// Configuration for cube fractal generation and pacing.
///
/// Delays are in seconds, `rotation_speed` in degrees per second.
#[derive(Clone, Debug, PartialEq)]
pub struct FractalConfig {
  /// Deepest recursion level. Depth 0 is the root cube.
  pub max_depth: u32,

  /// Edge length of the root cube.
  pub initial_size: f32,

  /// Child edge / parent edge.
  pub scale_factor: f32,

  /// Color at depth 0. Falls back to [`Rgba::DEFAULT_CUBE`] when either
  /// endpoint is unset.
  pub start_color: Option<Rgba>,

  /// Color at `max_depth`.
  pub end_color: Option<Rgba>,

  /// Pause after each cube is placed, before its children are evaluated.
  pub create_delay: f32,

  /// Pause after each depth level is torn down.
  pub destroy_delay: f32,

  /// Time the completed fractal stays visible.
  pub cycle_delay: f32,

  /// Pause between teardown and the next build.
  pub pause_delay: f32,

  /// Spin of the container about the vertical axis.
  pub rotation_speed: f32,
}

impl Default for FractalConfig {
  fn default() -> Self {
    let gradient = DepthGradient::default();
    Self {
      max_depth: 3,
      initial_size: 1.0,
      scale_factor: 0.5,
      start_color: Some(gradient.start),
      end_color: Some(gradient.end),
      create_delay: 0.1,
      destroy_delay: 0.5,
      cycle_delay: 2.0,
      pause_delay: 1.0,
      rotation_speed: 30.0,
    }
  }
}

impl FractalConfig {
  /// Check every field, returning the first violation.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.initial_size.is_finite() || self.initial_size <= 0.0 {
      return Err(ConfigError::InitialSize(self.initial_size));
    }
    if !(self.scale_factor > 0.0 && self.scale_factor < 1.0) {
      return Err(ConfigError::ScaleFactor(self.scale_factor));
    }
    for (name, value) in [
      ("create_delay", self.create_delay),
      ("destroy_delay", self.destroy_delay),
      ("cycle_delay", self.cycle_delay),
      ("pause_delay", self.pause_delay),
    ] {
      if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Delay { name, value });
      }
    }
    if !self.rotation_speed.is_finite() {
      return Err(ConfigError::RotationSpeed(self.rotation_speed));
    }
    for (name, color) in [("start", self.start_color), ("end", self.end_color)] {
      if color.is_some_and(|c| !c.is_finite()) {
        return Err(ConfigError::Color { name });
      }
    }
    Ok(())
  }

  /// Gradient from the configured colors, if both are set.
  pub fn gradient(&self) -> Option<DepthGradient> {
    Some(DepthGradient::new(self.start_color?, self.end_color?))
  }

  /// Color for a cube at `depth`.
  pub fn color_at(&self, depth: u32) -> Rgba {
    self
      .gradient()
      .map(|g| g.sample(depth, self.max_depth))
      .unwrap_or(Rgba::DEFAULT_CUBE)
  }

  /// Edge length of cubes at `depth`.
  pub fn size_at(&self, depth: u32) -> f32 {
    self.initial_size * self.scale_factor.powi(depth as i32)
  }

  /// Upper bound on cubes one build can place.
  ///
  /// The root expands into 6 children; every deeper cube has its parent on
  /// one face and expands into at most the remaining 5.
  /// `1 + 6 * (1 + 5 + 5^2 + ... + 5^(max_depth - 1))`, saturating.
  pub fn node_upper_bound(&self) -> u64 {
    let mut total: u64 = 1;
    let mut level: u64 = 6;
    for _ in 0..self.max_depth {
      total = total.saturating_add(level);
      level = level.saturating_mul(5);
    }
    total
  }

  pub fn create_delay(&self) -> Duration {
    Duration::from_secs_f32(self.create_delay)
  }

  pub fn destroy_delay(&self) -> Duration {
    Duration::from_secs_f32(self.destroy_delay)
  }

  pub fn cycle_delay(&self) -> Duration {
    Duration::from_secs_f32(self.cycle_delay)
  }

  pub fn pause_delay(&self) -> Duration {
    Duration::from_secs_f32(self.pause_delay)
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
