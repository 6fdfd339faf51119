//! Error types for structured error handling.
//!
//! This module provides:
//! - `ArithmeticError`: Failures of fixed-point primitives and elementary functions
//! - `PricingError`: Errors from pricing engines and volatility estimation
//! - `SolverError`: Errors from the Newton-Raphson root finder
//!
//! Every variant that rejects a value carries it as a [`FixedPoint`], so the
//! caller sees the exact scaled integer that was refused.

use crate::types::FixedPoint;
use thiserror::Error;

/// Failures of fixed-point arithmetic and elementary functions.
///
/// # Variants
/// - `DomainError`: Operand outside the function's domain (e.g. `ln` of a non-positive value)
/// - `DivideByZero`: Division with a zero divisor
/// - `RangeOverflow`: Result not representable in the scaled 128-bit range
/// - `ParseError`: Malformed decimal literal
///
/// # Examples
/// ```
/// use quantfix_core::types::{ArithmeticError, FixedPoint};
///
/// let err = FixedPoint::ONE.div(FixedPoint::ZERO).unwrap_err();
/// assert!(matches!(err, ArithmeticError::DivideByZero { .. }));
/// assert_eq!(format!("{}", err), "Division by zero: 1 / 0");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    /// Operand outside the domain of the operation.
    #[error("Domain error in {operation}: {value}")]
    DomainError {
        /// Name of the operation that rejected the operand
        operation: &'static str,
        /// The offending operand
        value: FixedPoint,
    },

    /// Division by zero.
    #[error("Division by zero: {dividend} / 0")]
    DivideByZero {
        /// The dividend of the failed division
        dividend: FixedPoint,
    },

    /// Result exceeds the representable range.
    #[error("Range overflow in {operation}")]
    RangeOverflow {
        /// Name of the operation that overflowed
        operation: &'static str,
    },

    /// Failed to parse a decimal literal.
    #[error("Decimal parse error: {0}")]
    ParseError(String),
}

impl ArithmeticError {
    /// Shorthand for a [`ArithmeticError::RangeOverflow`].
    #[inline]
    pub fn overflow(operation: &'static str) -> Self {
        ArithmeticError::RangeOverflow { operation }
    }

    /// Shorthand for a [`ArithmeticError::DomainError`].
    #[inline]
    pub fn domain(operation: &'static str, value: FixedPoint) -> Self {
        ArithmeticError::DomainError { operation, value }
    }
}

/// Root-finding solver errors.
///
/// # Examples
/// ```
/// use quantfix_core::types::{FixedPoint, SolverError};
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 32, best: FixedPoint::HALF };
/// assert!(format!("{}", err).contains("32 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Solver failed to converge within the iteration budget.
    #[error("Failed to converge after {iterations} iterations (best estimate {best})")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
        /// Best iterate found
        best: FixedPoint,
    },

    /// Derivative is zero at the current iterate.
    #[error("Derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// The iterate where the derivative vanished
        x: FixedPoint,
    },

    /// Arithmetic failure while evaluating the objective.
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

/// Categorised pricing errors.
///
/// Fatal conditions carry the offending value and are never clamped.
/// `NonConvergence` is the only soft condition: it still reports the best
/// estimate found so the caller may decide whether to use it.
///
/// # Examples
/// ```
/// use quantfix_core::types::{FixedPoint, PricingError};
///
/// let err = PricingError::InvalidParameter { field: "spot", value: FixedPoint::ZERO };
/// assert_eq!(format!("{}", err), "Invalid parameter spot: 0");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// A parameter violates its validity constraint.
    #[error("Invalid parameter {field}: {value}")]
    InvalidParameter {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: FixedPoint,
    },

    /// Arithmetic failure inside a pricing routine.
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    /// Lattice risk-neutral probability outside the open interval (0, 1).
    #[error("Risk-neutral probability {probability} outside (0, 1)")]
    InvalidProbability {
        /// The derived probability
        probability: FixedPoint,
    },

    /// Iterative search exhausted its budget.
    #[error("No convergence after {iterations} iterations (best estimate {best_estimate})")]
    NonConvergence {
        /// Iterations performed
        iterations: usize,
        /// Best iterate found
        best_estimate: FixedPoint,
    },

    /// Requested step count exceeds the hard cap.
    #[error("Step budget exceeded: requested {requested}, maximum {max}")]
    StepBudgetExceeded {
        /// Steps requested by the caller
        requested: usize,
        /// Hard step cap
        max: usize,
    },

    /// Observation timestamp not strictly after the previous one.
    #[error("Out-of-order observation: received {received} after {previous}")]
    OutOfOrderObservation {
        /// Timestamp of the last accepted observation
        previous: u64,
        /// Timestamp of the rejected observation
        received: u64,
    },

    /// Root finder failure.
    #[error("Solver error: {0}")]
    Solver(SolverError),
}

impl From<SolverError> for PricingError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::MaxIterationsExceeded { iterations, best } => {
                PricingError::NonConvergence {
                    iterations,
                    best_estimate: best,
                }
            }
            SolverError::Arithmetic(inner) => PricingError::Arithmetic(inner),
            other => PricingError::Solver(other),
        }
    }
}
