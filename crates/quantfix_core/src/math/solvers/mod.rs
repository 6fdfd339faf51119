//! Root-finding for implied-volatility style searches.
//!
//! ## Available Solvers
//!
//! - [`NewtonRaphsonSolver`]: Newton iteration with optional clamping bounds
//!
//! ## Configuration
//!
//! [`SolverConfig`] sets:
//! - `tolerance`: Absolute tolerance on `|f(x)|` (default: 1e-9)
//! - `max_iterations`: Iteration budget (default and hard cap: 32)
//!
//! ## Soft and strict searches
//!
//! [`NewtonRaphsonSolver::solve`] always returns a [`RootEstimate`] holding
//! the best iterate and the reason the search stopped.
//! [`NewtonRaphsonSolver::find_root`] turns every non-converged outcome into
//! a [`SolverError`](crate::types::SolverError).

mod config;
mod newton_raphson;

// Re-export public types at module level
pub use config::{SolverConfig, MAX_ITERATIONS_CAP};
pub use newton_raphson::{NewtonRaphsonSolver, RootEstimate, Termination};
