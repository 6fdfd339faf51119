//! Heston stochastic volatility parameters.
//!
//! The Heston model is described by the SDEs:
//! ```text
//! dS = r * S * dt + sqrt(V) * S * dW_S
//! dV = kappa * (theta - V) * dt + xi * sqrt(V) * dW_V
//! E[dW_S * dW_V] = rho * dt
//! ```
//! where:
//! - S = asset price
//! - V = instantaneous variance
//! - r = risk-free rate
//! - kappa = mean reversion speed
//! - theta = long-run variance
//! - xi = volatility of variance
//! - rho = correlation between the asset and variance shocks
//!
//! ## Feller Condition
//!
//! Variance stays strictly positive when:
//! ```text
//! 2 * kappa * theta > xi^2
//! ```
//! The condition is a diagnostic only. Pricing proceeds when it fails and
//! the engine logs a warning.
//!
//! ## Example
//!
//! ```
//! use quantfix_models::models::HestonParameters;
//! use quantfix_core::types::FixedPoint;
//!
//! let fp = |s: &str| s.parse::<FixedPoint>().unwrap();
//! let params = HestonParameters::new(
//!     fp("100"), fp("100"), fp("0.05"), fp("1"),
//!     fp("0.04"), fp("0.04"), fp("1.5"), fp("0.3"), fp("-0.7"),
//! )
//! .unwrap();
//! assert!(params.satisfies_feller().unwrap());
//! ```

use quantfix_core::types::{ArithmeticError, FixedPoint, PricingError};

use crate::instruments::{require_positive, OptionParameters};

/// Inputs to the Heston engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParameters {
    /// Current price of the underlying.
    pub spot: FixedPoint,
    /// Strike price.
    pub strike: FixedPoint,
    /// Continuously compounded risk-free rate.
    pub risk_free_rate: FixedPoint,
    /// Time to expiry in years.
    pub time_to_expiry: FixedPoint,
    /// Initial variance.
    pub v0: FixedPoint,
    /// Long-run variance.
    pub theta: FixedPoint,
    /// Mean reversion speed.
    pub kappa: FixedPoint,
    /// Volatility of variance.
    pub xi: FixedPoint,
    /// Correlation between asset and variance, within [-1, 1].
    pub rho: FixedPoint,
}

impl HestonParameters {
    /// Creates a validated parameter set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spot: FixedPoint,
        strike: FixedPoint,
        risk_free_rate: FixedPoint,
        time_to_expiry: FixedPoint,
        v0: FixedPoint,
        theta: FixedPoint,
        kappa: FixedPoint,
        xi: FixedPoint,
        rho: FixedPoint,
    ) -> Result<Self, PricingError> {
        let params = Self {
            spot,
            strike,
            risk_free_rate,
            time_to_expiry,
            v0,
            theta,
            kappa,
            xi,
            rho,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks every invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), PricingError> {
        require_positive("spot", self.spot)?;
        require_positive("strike", self.strike)?;
        require_positive("time_to_expiry", self.time_to_expiry)?;
        if self.risk_free_rate.is_negative() {
            return Err(PricingError::InvalidParameter {
                field: "risk_free_rate",
                value: self.risk_free_rate,
            });
        }
        require_positive("v0", self.v0)?;
        require_positive("theta", self.theta)?;
        require_positive("kappa", self.kappa)?;
        require_positive("xi", self.xi)?;
        if self.rho < -FixedPoint::ONE || self.rho > FixedPoint::ONE {
            return Err(PricingError::InvalidParameter {
                field: "rho",
                value: self.rho,
            });
        }
        Ok(())
    }

    /// Feller ratio `2·kappa·theta / xi²`; the condition holds above one.
    pub fn feller_ratio(&self) -> Result<FixedPoint, ArithmeticError> {
        let numerator = self.kappa.mul(self.theta)?.mul_int(2)?;
        numerator.div(self.xi.mul(self.xi)?)
    }

    /// Returns whether `2·kappa·theta > xi²`.
    pub fn satisfies_feller(&self) -> Result<bool, ArithmeticError> {
        let lhs = self.kappa.mul(self.theta)?.mul_int(2)?;
        Ok(lhs > self.xi.mul(self.xi)?)
    }

    /// Black-Scholes inputs with constant volatility `√v0`.
    pub fn bsm_equivalent(&self) -> Result<OptionParameters, PricingError> {
        OptionParameters::new(
            self.spot,
            self.strike,
            self.v0.sqrt()?,
            self.risk_free_rate,
            self.time_to_expiry,
        )
    }
}
