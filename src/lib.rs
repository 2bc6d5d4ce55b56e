//! Verlet cloth simulation for waving flags.
//!
//! `pennant` advances a rectangular grid of point masses under gravity, wind
//! and damping, relaxes the distance links that hold the sheet together, and
//! anchors it to a hoist. The host drives it once per animation frame and
//! copies the resulting positions into its own render buffer.
//!
//! # Features
//!
//! - **Verlet integration**: Position-based dynamics with implicit velocity
//! - **Cloth links**: Structural, shear and bend distance constraints
//! - **Flag layer**: Edge pinning with stride, hoist-ordered anti-stretch links
//! - **Aerodynamics**: Per-triangle wind force from the surface normal
//! - **Forgiving settings**: Malformed configuration degrades to valid defaults
//! - **Observable**: Monitor physics steps via the `StepObserver` trait
//! - **`no_std` compatible**: Works in embedded and WASM environments
//!
//! # Example
//!
//! ```
//! use pennant::{FlagConfig, FlagSimulation};
//!
//! let mut flag: FlagSimulation<f64> = FlagSimulation::from_config(&FlagConfig::default(), None);
//! let mut vertices = vec![0.0; flag.cloth().particle_count() * 3];
//! for _ in 0..60 {
//!     flag.simulate(1.0 / 60.0);
//!     flag.render(&mut vertices).unwrap();
//! }
//! ```

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod particle;
pub mod constraint;
pub mod config;
pub mod cloth;
pub mod pin;
pub mod flag;
pub mod geometry;
pub mod settings;
pub mod observer;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec, Vec3};
pub use particle::Particle;
pub use constraint::{DistanceConstraint, LinkKind};
pub use config::SolverConfig;
pub use cloth::{ClothConfig, ClothMesh};
pub use pin::{Edge, EdgeSet};
pub use flag::{FlagSimulation, Hoisting, Orientation};
pub use geometry::GridGeometry;
pub use settings::{AssetSize, Dimension, FlagConfig, PinSettings};
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::{FlagError, FlagResult};
