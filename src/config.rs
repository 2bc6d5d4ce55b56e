//! Configuration types for the cloth solver.

use crate::float::Float;
use crate::vec::Vec3;

/// Configuration for integration and constraint relaxation.
///
/// # Builder Pattern
/// ```
/// use pennant::config::SolverConfig;
/// use pennant::vec::Vec3;
///
/// let config: SolverConfig<f64> = SolverConfig::new()
///     .with_iterations(8)
///     .with_gravity(Vec3::new(0.0, -9.81, 0.0))
///     .with_damping(0.97)
///     .with_wind(Vec3::new(4.0, 0.0, 1.0));
/// ```
#[derive(Clone, Debug)]
pub struct SolverConfig<F: Float> {
    /// Relaxation passes over every constraint per sub-step.
    /// More passes = stiffer cloth, more work. Default: 4.
    pub iterations: usize,
    /// Sub-steps per frame. Default: 1.
    pub sub_steps: usize,
    /// Gravity acceleration. Default: (0, -9.81, 0).
    pub gravity: Vec3<F>,
    /// Fraction of velocity kept per step [0, 1]. 1.0 = no damping. Default: 0.97.
    pub damping: F,
    /// Ambient wind velocity. Default: zero.
    pub wind: Vec3<F>,
    /// Scale of the aerodynamic force law. Default: 0.6.
    pub aero_coefficient: F,
    /// Largest `dt` accepted per call; longer frames are clamped. Default: 1/30 s.
    pub max_step: F,
}

impl<F: Float> SolverConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        SolverConfig {
            iterations: 4,
            sub_steps: 1,
            gravity: Vec3::new(F::zero(), F::from_f32(-9.81), F::zero()),
            damping: F::from_f32(0.97),
            wind: Vec3::new(F::zero(), F::zero(), F::zero()),
            aero_coefficient: F::from_f32(0.6),
            max_step: F::one() / F::from_f32(30.0),
        }
    }

    /// Set the number of relaxation passes.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the number of sub-steps.
    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.sub_steps = sub_steps.max(1);
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec3<F>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the damping factor, clamped to [0, 1].
    pub fn with_damping(mut self, damping: F) -> Self {
        self.damping = damping.clamp(F::zero(), F::one());
        self
    }

    /// Set the ambient wind velocity.
    pub fn with_wind(mut self, wind: Vec3<F>) -> Self {
        self.wind = wind;
        self
    }

    /// Set the aerodynamic coefficient.
    pub fn with_aero_coefficient(mut self, coefficient: F) -> Self {
        self.aero_coefficient = coefficient;
        self
    }

    /// Set the largest accepted time step. Non-positive values are ignored.
    pub fn with_max_step(mut self, max_step: F) -> Self {
        if max_step > F::zero() && max_step.is_finite() {
            self.max_step = max_step;
        }
        self
    }
}

impl<F: Float> Default for SolverConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}
