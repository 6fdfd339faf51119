//! Solver configuration types.

use crate::types::FixedPoint;

/// Hard cap on Newton iterations. Part of the public contract: every
/// iterative search finishes within this many function evaluations.
pub const MAX_ITERATIONS_CAP: usize = 32;

/// Configuration for the root finder.
///
/// # Example
///
/// ```
/// use quantfix_core::math::solvers::SolverConfig;
/// use quantfix_core::types::FixedPoint;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.max_iterations, 32);
/// assert_eq!(config.tolerance, "0.000000001".parse::<FixedPoint>().unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// The solver stops when `|f(x)| ≤ tolerance`.
    pub tolerance: FixedPoint,

    /// Maximum number of iterations; solvers clamp it to [`MAX_ITERATIONS_CAP`].
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    /// Tolerance `1e-9`, 32 iterations.
    fn default() -> Self {
        Self {
            tolerance: FixedPoint::from_raw_const(1_000_000_000),
            max_iterations: MAX_ITERATIONS_CAP,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with specified values.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance <= 0`, `max_iterations == 0` or
    /// `max_iterations` exceeds [`MAX_ITERATIONS_CAP`].
    pub fn new(tolerance: FixedPoint, max_iterations: usize) -> Self {
        assert!(tolerance.is_positive(), "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        assert!(
            max_iterations <= MAX_ITERATIONS_CAP,
            "max_iterations must not exceed 32"
        );
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Iterations a solver may actually run: `max_iterations` capped at
    /// [`MAX_ITERATIONS_CAP`], since the fields are public and a struct
    /// literal bypasses [`new`](Self::new).
    #[inline]
    pub fn iteration_budget(&self) -> usize {
        self.max_iterations.min(MAX_ITERATIONS_CAP)
    }

    /// Tight tolerance (`1e-12`) with the full iteration budget.
    pub fn high_precision() -> Self {
        Self {
            tolerance: FixedPoint::from_raw_const(1_000_000),
            max_iterations: MAX_ITERATIONS_CAP,
        }
    }

    /// Relaxed tolerance (`1e-6`) and 16 iterations.
    pub fn fast() -> Self {
        Self {
            tolerance: FixedPoint::from_raw_const(1_000_000_000_000),
            max_iterations: 16,
        }
    }
}
