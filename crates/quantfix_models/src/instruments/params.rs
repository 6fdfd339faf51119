//! Option parameter record with validation.

use quantfix_core::types::{FixedPoint, PricingError};

/// Market and contract inputs shared by the Black-Scholes and lattice engines.
///
/// # Invariants
/// `spot > 0`, `strike > 0`, `volatility > 0`, `time_to_expiry > 0` and
/// `risk_free_rate >= 0`. Engines call [`validate`](Self::validate) before
/// computing anything.
///
/// # Examples
/// ```
/// use quantfix_models::instruments::OptionParameters;
/// use quantfix_core::types::FixedPoint;
///
/// let params = OptionParameters::new(
///     FixedPoint::from_int(3000),
///     FixedPoint::from_int(3100),
///     "0.65".parse().unwrap(),
///     "0.05".parse().unwrap(),
///     "0.0833".parse().unwrap(),
/// )
/// .unwrap();
/// assert_eq!(params.strike, FixedPoint::from_int(3100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionParameters {
    /// Current price of the underlying.
    pub spot: FixedPoint,
    /// Strike price.
    pub strike: FixedPoint,
    /// Annualised volatility σ.
    pub volatility: FixedPoint,
    /// Continuously compounded risk-free rate.
    pub risk_free_rate: FixedPoint,
    /// Time to expiry in years.
    pub time_to_expiry: FixedPoint,
}

impl OptionParameters {
    /// Creates a validated parameter record.
    ///
    /// # Errors
    /// `PricingError::InvalidParameter` naming the first offending field.
    pub fn new(
        spot: FixedPoint,
        strike: FixedPoint,
        volatility: FixedPoint,
        risk_free_rate: FixedPoint,
        time_to_expiry: FixedPoint,
    ) -> Result<Self, PricingError> {
        let params = Self {
            spot,
            strike,
            volatility,
            risk_free_rate,
            time_to_expiry,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks every invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), PricingError> {
        require_positive("spot", self.spot)?;
        require_positive("strike", self.strike)?;
        require_positive("volatility", self.volatility)?;
        require_positive("time_to_expiry", self.time_to_expiry)?;
        if self.risk_free_rate.is_negative() {
            return Err(PricingError::InvalidParameter {
                field: "risk_free_rate",
                value: self.risk_free_rate,
            });
        }
        Ok(())
    }

    /// Returns a copy with a different volatility, as used by implied
    /// volatility searches.
    #[inline]
    pub fn with_volatility(&self, volatility: FixedPoint) -> Self {
        Self { volatility, ..*self }
    }

    /// Returns a copy with a different spot.
    #[inline]
    pub fn with_spot(&self, spot: FixedPoint) -> Self {
        Self { spot, ..*self }
    }
}

/// Fails with `InvalidParameter` unless `value > 0`.
pub(crate) fn require_positive(field: &'static str, value: FixedPoint) -> Result<(), PricingError> {
    if value.is_positive() {
        Ok(())
    } else {
        Err(PricingError::InvalidParameter { field, value })
    }
}
