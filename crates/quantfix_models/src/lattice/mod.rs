//! Binomial lattice pricing with early exercise.
//!
//! - [`BinomialLattice`]: CRR engine for American and European exercise
//! - [`LatticeConfig`]: per-step constants derived once per (parameters, steps)
//! - [`LatticeResult`]: root price and first-step delta
//!
//! The step count is capped at [`MAX_STEPS`]; larger requests fail with
//! `PricingError::StepBudgetExceeded` rather than being truncated.

pub mod crr;

pub use crr::{BinomialLattice, LatticeConfig, LatticeResult, DEFAULT_STEPS, MAX_STEPS};
