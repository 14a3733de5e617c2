//! Depth gradient colors.

/// Straight (non-premultiplied) sRGB color with alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
  pub r: f32,
  pub g: f32,
  pub b: f32,
  pub a: f32,
}

impl Rgba {
  pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
  pub const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);
  /// Appearance used when no gradient is configured.
  pub const DEFAULT_CUBE: Rgba = Rgba::new(0.8, 0.8, 0.8, 1.0);

  pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
    Self { r, g, b, a }
  }

  pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
    Self::new(r, g, b, 1.0)
  }

  /// Linear interpolation with `t` clamped to `[0, 1]`.
  ///
  /// Computed as `a * (1 - t) + b * t`, which returns the endpoints exactly
  /// at `t = 0` and `t = 1`.
  pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let s = 1.0 - t;
    Rgba {
      r: self.r * s + other.r * t,
      g: self.g * s + other.g * t,
      b: self.b * s + other.b * t,
      a: self.a * s + other.a * t,
    }
  }

  pub fn to_array(self) -> [f32; 4] {
    [self.r, self.g, self.b, self.a]
  }

  pub fn is_finite(&self) -> bool {
    self.to_array().iter().all(|c| c.is_finite())
  }
}

impl Default for Rgba {
  fn default() -> Self {
    Self::DEFAULT_CUBE
  }
}

/// Start/end pair sampled by recursion depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthGradient {
  pub start: Rgba,
  pub end: Rgba,
}

impl DepthGradient {
  pub const fn new(start: Rgba, end: Rgba) -> Self {
    Self { start, end }
  }

  /// Color for `depth` out of `max_depth`.
  ///
  /// With `max_depth == 0` the only reachable depth is the root, which gets
  /// the start color.
  pub fn sample(&self, depth: u32, max_depth: u32) -> Rgba {
    if max_depth == 0 {
      return self.start;
    }
    self.start.lerp(self.end, depth as f32 / max_depth as f32)
  }
}

impl Default for DepthGradient {
  fn default() -> Self {
    Self::new(Rgba::WHITE, Rgba::BLUE)
  }
}

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;
