//! # Quantfix Models (L2: Pricing Engines)
//!
//! Option pricing on top of the deterministic fixed-point kernel in
//! `quantfix_core`.
//!
//! This crate provides:
//! - Option parameter records, option type and exercise style
//! - Cumulative normal approximations (A&S 26.2.17 and a shorter four-coefficient fit)
//! - Black-Scholes-Merton prices, Greeks and implied volatility
//! - Heston stochastic-volatility pricing by characteristic-function quadrature
//! - A CRR binomial lattice for American and European exercise
//! - A liquidity-sensitive implied volatility surface with an EWMA realized-volatility estimator
//! - Engine configuration, verification diagnostics and batch pricing
//!
//! ## Design Principles
//!
//! - **Fixed-point only**: no floating-point arithmetic on any pricing path
//! - **Bounded work**: lattice steps, Newton iterations and quadrature panels are capped
//! - **Pure engines**: the realized-volatility estimator is the only evolving state and
//!   is passed explicitly as a versioned value

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
#[cfg(feature = "parallel")]
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod instruments;
pub mod lattice;
pub mod models;
pub mod volatility;
