//! Bevy systems driving fractal entities.

pub mod cycle;
pub mod spin;
pub mod startup;
