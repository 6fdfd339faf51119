//! Core numeric and error types.
//!
//! This module provides:
//! - `fixed_point`: The 18-digit signed fixed-point decimal every component computes with
//! - `error`: Structured error types for arithmetic, pricing and solver operations
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`FixedPoint`], [`DECIMALS`], [`SCALE`] from `fixed_point`
//! - [`ArithmeticError`], [`PricingError`], [`SolverError`] from `error`

pub mod error;
pub mod fixed_point;
mod wide;

// Re-export commonly used types at module level
pub use error::{ArithmeticError, PricingError, SolverError};
pub use fixed_point::{FixedPoint, DECIMALS, SCALE};
