//! fractal_core - Framework/engine independent cube fractal simulation
//!
//! Grows a fractal of cubes outward from a seed along the six principal axes,
//! holds it, tears it down deepest level first, pauses, and repeats. Pacing
//! is driven by a cooperative scheduler ticked once per host frame.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use fractal_core::{CyclePhase, FractalConfig, FractalEngine, HeadlessScene};
//! use glam::Vec3;
//!
//! let config = FractalConfig { max_depth: 1, ..FractalConfig::default() };
//! let mut engine = FractalEngine::new(config, Vec3::ZERO).unwrap();
//! let mut scene = HeadlessScene::new();
//!
//! while engine.phase() != CyclePhase::Holding {
//!     engine.tick(Duration::from_millis(16), &mut scene);
//! }
//! assert_eq!(engine.live_count(), 7);
//! ```

pub mod bounds;
pub mod color;
pub mod config;
pub mod constants;
pub mod engine;
pub mod headless;
pub mod host;
pub mod registry;
pub mod scheduler;
pub mod spin;

// Re-export commonly used items
pub use bounds::Aabb3;
pub use color::{DepthGradient, Rgba};
pub use config::{ConfigError, FractalConfig};
pub use engine::{CyclePhase, FractalEngine, TickReport};
pub use headless::{HeadlessHandle, HeadlessScene, SceneOp};
pub use host::{CubeSpawn, FractalHost};
pub use registry::{CubeId, CubeNode, CubeRegistry, DepthBatch, DepthIndex};
pub use scheduler::Scheduler;
pub use spin::ContainerSpin;
