//! Model parameter sets.
//!
//! - [`HestonParameters`]: stochastic-volatility inputs with Feller diagnostics
//!
//! The Black-Scholes inputs live in [`crate::instruments::OptionParameters`]
//! since they are shared with the lattice engine.

pub mod heston;

pub use heston::HestonParameters;
