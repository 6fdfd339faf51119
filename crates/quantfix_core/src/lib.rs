//! # quantfix_core: Deterministic Numerical Foundation
//!
//! ## Layer 1 (Foundation) Role
//!
//! quantfix_core is the bottom layer of the quantfix workspace, providing:
//! - The 18-digit fixed-point decimal type (`types::FixedPoint`)
//! - Elementary functions `exp`, `ln`, `sqrt` (`math::elementary`)
//! - Trigonometry for polar decomposition (`math::trig`)
//! - Complex arithmetic on fixed-point pairs (`math::complex`)
//! - Fixed-order Gauss-Legendre quadrature (`math::quadrature`)
//! - A bounded Newton-Raphson root finder (`math::solvers`)
//! - Error types: `ArithmeticError`, `PricingError`, `SolverError` (`types::error`)
//!
//! ## Determinism
//!
//! No floating-point arithmetic is used on any computational path. Every
//! multiplication and division truncates toward zero, every series has a
//! fixed term count and every iterative routine has a fixed iteration cap,
//! so two conforming implementations produce bit-identical results.
//!
//! ## Usage Examples
//!
//! ```rust
//! use quantfix_core::types::FixedPoint;
//!
//! let spot: FixedPoint = "3000".parse().unwrap();
//! let strike: FixedPoint = "3100".parse().unwrap();
//!
//! let log_moneyness = spot.div(strike).unwrap().ln().unwrap();
//! assert!(log_moneyness.is_negative());
//!
//! let root = FixedPoint::from_int(2).sqrt().unwrap();
//! assert_eq!(root.to_string(), "1.414213562373095048");
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialise `FixedPoint` as its raw scaled `i128`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
