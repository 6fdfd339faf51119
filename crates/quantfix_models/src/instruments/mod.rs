//! Option contract inputs.
//!
//! - [`OptionParameters`]: spot, strike, volatility, rate and expiry, validated on construction
//! - [`OptionType`]: call or put, with the intrinsic payoff
//! - [`ExerciseStyle`]: European or American, consumed by the lattice engine
//!
//! # Examples
//!
//! ```
//! use quantfix_models::instruments::{ExerciseStyle, OptionParameters, OptionType};
//! use quantfix_core::types::FixedPoint;
//!
//! let params = OptionParameters::new(
//!     FixedPoint::from_int(100),
//!     FixedPoint::from_int(110),
//!     "0.3".parse().unwrap(),
//!     "0.05".parse().unwrap(),
//!     FixedPoint::ONE,
//! )
//! .unwrap();
//! assert!(OptionType::Put.intrinsic(params.spot, params.strike).unwrap().is_positive());
//! assert!(ExerciseStyle::American.allows_early_exercise());
//! ```

mod exercise;
mod params;
mod payoff;

pub use exercise::ExerciseStyle;
pub use params::OptionParameters;
pub(crate) use params::require_positive;
pub use payoff::OptionType;
