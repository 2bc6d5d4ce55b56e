//! Error types for simulator boundary operations.
//!
//! Configuration problems never surface here: they are clamped or defaulted
//! at construction. Only out-of-range access from a collaborator fails.

use thiserror::Error;

/// Result type alias for simulator operations.
pub type FlagResult<T> = Result<T, FlagError>;

/// Errors raised at the simulator's boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// The render buffer does not hold exactly three floats per particle.
    #[error("render buffer holds {actual} floats, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// A grid coordinate lies outside the particle grid.
    #[error("particle ({x}, {y}) out of bounds ({columns} x {rows} particles)")]
    ParticleOutOfBounds {
        x: usize,
        y: usize,
        columns: usize,
        rows: usize,
    },
}
