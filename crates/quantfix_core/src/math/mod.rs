//! Numerical kernels built on [`FixedPoint`](crate::types::FixedPoint).
//!
//! - [`constants`]: `π`, `ln 2`, `1/√(2π)` and friends at 18 digits
//! - [`elementary`]: `exp`, `ln`, `sqrt`
//! - [`trig`]: `sin_cos`, `atan`, `atan2`
//! - [`complex`]: complex pairs with explicit polar decomposition
//! - [`quadrature`]: composite 8-point Gauss-Legendre
//! - [`solvers`]: bounded Newton-Raphson

pub mod complex;
pub mod constants;
pub mod elementary;
pub mod quadrature;
pub mod solvers;
pub mod trig;
