//! Step observer trait for monitoring simulation progress.

/// Trait for observing simulation steps.
///
/// Implement this trait to monitor solver progress (e.g., for debugging,
/// visualization, or performance profiling). All methods have default
/// no-op implementations.
pub trait StepObserver {
    /// Called after all particles have been integrated (Verlet step).
    fn on_integrate(&mut self) {}

    /// Called after each relaxation pass over the cloth constraints.
    fn on_relaxation_pass(&mut self, _pass: usize) {}

    /// Called after pinned particles were snapped back to their anchors.
    fn on_pins_applied(&mut self, _count: usize) {}

    /// Called after the anti-stretch links were applied.
    fn on_length_constraints(&mut self, _count: usize) {}

    /// Called when a simulation step is fully complete.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
