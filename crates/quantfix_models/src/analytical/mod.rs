//! Analytical and semi-analytical pricing for European options.
//!
//! This module provides:
//! - Cumulative normal approximations with selectable precision
//! - Black-Scholes-Merton prices and Greeks (Delta, Gamma, Theta, Vega, Rho)
//! - Implied volatility inversion by bounded Newton-Raphson
//! - Heston stochastic-volatility pricing by Fourier quadrature
//!
//! ## Design Principles
//!
//! - **Single pass**: d₁ and d₂ are computed once and shared by price and Greeks
//! - **Floored premiums**: approximation error never produces a negative price
//! - **Bounded work**: fixed quadrature order, capped Newton iterations

pub mod black_scholes;
pub mod distributions;
pub mod heston;
pub mod implied_vol;

pub use black_scholes::{BlackScholes, Greeks};
pub use distributions::{norm_cdf, norm_pdf, CdfPrecision, CumulativeNormal};
pub use heston::HestonEngine;
pub use implied_vol::{ImpliedVolatility, VOLATILITY_LOWER_BOUND, VOLATILITY_UPPER_BOUND};
