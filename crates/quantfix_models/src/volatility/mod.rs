//! Volatility inputs for the pricing engines.
//!
//! - [`LiquiditySurface`]: realized volatility shaped by strike skew and pool utilization
//! - [`RealizedVolatilityEstimator`]: versioned EWMA estimate over a price series
//!
//! The estimator is the only piece of evolving state in the crate. It is a
//! plain value: callers hold the current version and replace it with the
//! result of each update.

pub mod realized;
pub mod surface;

pub use realized::{RealizedVolatilityEstimator, DEFAULT_LAMBDA};
pub use surface::{LiquiditySurface, SkewParameters, VolatilitySurfacePoint};
