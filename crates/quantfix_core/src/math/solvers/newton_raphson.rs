//! Newton-Raphson root-finding solver.

use super::SolverConfig;
use crate::types::{FixedPoint, SolverError};

/// Why a Newton search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `|f(x)|` fell within the tolerance.
    Converged,
    /// The derivative vanished or the step was not representable.
    DerivativeVanished,
    /// The clamped iterate stopped moving.
    Stagnated,
    /// The iteration budget was exhausted.
    IterationLimit,
}

/// Outcome of a bounded Newton search.
///
/// `root` is the best iterate seen, i.e. the one with the smallest `|f|`,
/// which is not necessarily the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootEstimate {
    /// Best iterate.
    pub root: FixedPoint,
    /// `|f(root)|`.
    pub residual: FixedPoint,
    /// Function evaluations performed.
    pub iterations: usize,
    /// Stop reason.
    pub termination: Termination,
}

impl RootEstimate {
    /// Returns `true` when the residual met the tolerance.
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Bounded Newton-Raphson root finder.
///
/// Uses `x_{n+1} = x_n - f(x_n) / f'(x_n)`. Iterates may be clamped to a
/// closed interval, which keeps searches such as implied volatility inside
/// the region where the objective is defined.
///
/// # Example
///
/// ```
/// use quantfix_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
/// use quantfix_core::types::{ArithmeticError, FixedPoint};
///
/// // Solve x² - 2 = 0
/// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
/// let two = FixedPoint::TWO;
/// let estimate = solver
///     .solve::<_, ArithmeticError>(|x| Ok((x.mul(x)?.sub(two)?, x.mul_int(2)?)), FixedPoint::ONE)
///     .unwrap();
/// assert!(estimate.converged());
/// assert!((estimate.root.as_f64() - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver {
    config: SolverConfig,
    bounds: Option<(FixedPoint, FixedPoint)>,
}

impl NewtonRaphsonSolver {
    /// Create a solver with the given configuration and no bounds.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            bounds: None,
        }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Clamp every iterate into `[lower, upper]`.
    ///
    /// The bounds are reordered if given reversed.
    pub fn with_bounds(mut self, lower: FixedPoint, upper: FixedPoint) -> Self {
        self.bounds = Some((lower.min(upper), lower.max(upper)));
        self
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn clamp(&self, x: FixedPoint) -> FixedPoint {
        match self.bounds {
            Some((lower, upper)) => x.clamp(lower, upper),
            None => x,
        }
    }

    /// Runs the search and always reports the best iterate.
    ///
    /// `fdf` returns `(f(x), f'(x))`. Only errors raised by `fdf` itself are
    /// propagated; a vanishing derivative, a stalled iterate or an exhausted
    /// budget end the search softly with the matching [`Termination`].
    pub fn solve<F, E>(&self, mut fdf: F, x0: FixedPoint) -> Result<RootEstimate, E>
    where
        F: FnMut(FixedPoint) -> Result<(FixedPoint, FixedPoint), E>,
    {
        let mut x = self.clamp(x0);
        let mut best = x;
        let mut best_residual = FixedPoint::MAX;
        let mut termination = Termination::IterationLimit;
        let mut iterations = 0;
        let budget = self.config.iteration_budget();

        while iterations < budget {
            let (value, derivative) = fdf(x)?;
            iterations += 1;

            let residual = value.abs();
            if residual < best_residual {
                best = x;
                best_residual = residual;
            }

            tracing::trace!(iteration = iterations, %x, %value, %derivative, "newton step");

            if residual <= self.config.tolerance {
                termination = Termination::Converged;
                break;
            }

            let step = match value.div(derivative) {
                Ok(step) => step,
                Err(_) => {
                    termination = Termination::DerivativeVanished;
                    break;
                }
            };
            let next = match x.sub(step) {
                Ok(next) => self.clamp(next),
                Err(_) => {
                    termination = Termination::DerivativeVanished;
                    break;
                }
            };
            if next == x {
                termination = Termination::Stagnated;
                break;
            }
            x = next;
        }

        Ok(RootEstimate {
            root: best,
            residual: best_residual,
            iterations,
            termination,
        })
    }

    /// Strict variant of [`solve`](Self::solve): anything but convergence is
    /// an error.
    ///
    /// # Errors
    ///
    /// * `SolverError::DerivativeNearZero` - Derivative vanished at the iterate
    /// * `SolverError::MaxIterationsExceeded` - Budget exhausted or the iterate stalled
    pub fn find_root<F, E>(&self, fdf: F, x0: FixedPoint) -> Result<FixedPoint, E>
    where
        F: FnMut(FixedPoint) -> Result<(FixedPoint, FixedPoint), E>,
        E: From<SolverError>,
    {
        let estimate = self.solve(fdf, x0)?;
        match estimate.termination {
            Termination::Converged => Ok(estimate.root),
            Termination::DerivativeVanished => {
                Err(SolverError::DerivativeNearZero { x: estimate.root }.into())
            }
            Termination::Stagnated | Termination::IterationLimit => {
                Err(SolverError::MaxIterationsExceeded {
                    iterations: estimate.iterations,
                    best: estimate.root,
                }
                .into())
            }
        }
    }
}
