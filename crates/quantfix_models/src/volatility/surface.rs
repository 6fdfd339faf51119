//! Liquidity-sensitive implied volatility surface.
//!
//! ```text
//! iv = realized · (1 + α·m² + β·m + γ·u/(1 - u)),   m = K/S - 1
//! ```
//!
//! The quadratic term curves the smile, the linear term tilts it and the
//! utilization premium grows without bound as pool utilization `u`
//! approaches one. The result is clamped to `[iv_floor, iv_ceiling]`.
//! Utilization outside `[0, 1)` is rejected, never clamped.

use quantfix_core::types::{FixedPoint, PricingError};

use crate::instruments::{require_positive, OptionParameters};

/// Shape coefficients of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkewParameters {
    /// Curvature `α`.
    pub alpha: FixedPoint,
    /// Tilt `β`.
    pub beta: FixedPoint,
    /// Utilization sensitivity `γ`.
    pub gamma: FixedPoint,
}

impl Default for SkewParameters {
    /// `α = 0.5`, `β = -0.1`, `γ = 0.1`.
    fn default() -> Self {
        Self {
            alpha: FixedPoint::HALF,
            beta: FixedPoint::from_raw_const(-100_000_000_000_000_000),
            gamma: FixedPoint::from_raw_const(100_000_000_000_000_000),
        }
    }
}

/// A single quote on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolatilitySurfacePoint {
    /// Strike price.
    pub strike: FixedPoint,
    /// `K/S - 1`.
    pub moneyness: FixedPoint,
    /// Time to expiry in years.
    pub time_to_expiry: FixedPoint,
    /// Clamped implied volatility.
    pub implied_volatility: FixedPoint,
}

impl VolatilitySurfacePoint {
    /// Black-Scholes inputs priced at this point's volatility.
    pub fn to_option_parameters(
        &self,
        spot: FixedPoint,
        risk_free_rate: FixedPoint,
    ) -> Result<OptionParameters, PricingError> {
        OptionParameters::new(
            spot,
            self.strike,
            self.implied_volatility,
            risk_free_rate,
            self.time_to_expiry,
        )
    }
}

/// Implied volatility surface driven by realized volatility and utilization.
///
/// # Examples
/// ```
/// use quantfix_models::volatility::{LiquiditySurface, SkewParameters};
/// use quantfix_core::types::FixedPoint;
///
/// let fp = |s: &str| s.parse::<FixedPoint>().unwrap();
/// let surface = LiquiditySurface::new(SkewParameters::default(), fp("0.05"), fp("5")).unwrap();
///
/// // At the money with an idle pool the surface returns realized volatility.
/// let iv = surface
///     .implied_volatility(fp("0.6"), fp("100"), fp("100"), FixedPoint::ZERO)
///     .unwrap();
/// assert_eq!(iv, fp("0.6"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiquiditySurface {
    skew: SkewParameters,
    iv_floor: FixedPoint,
    iv_ceiling: FixedPoint,
}

impl Default for LiquiditySurface {
    /// Default skew with the band `[0.05, 5]`.
    fn default() -> Self {
        Self {
            skew: SkewParameters::default(),
            iv_floor: FixedPoint::from_raw_const(50_000_000_000_000_000),
            iv_ceiling: FixedPoint::from_int(5),
        }
    }
}

impl LiquiditySurface {
    /// Creates a surface with the given shape and clamp band.
    ///
    /// # Errors
    /// `InvalidParameter` unless `0 < iv_floor ≤ iv_ceiling`.
    pub fn new(skew: SkewParameters, iv_floor: FixedPoint, iv_ceiling: FixedPoint) -> Result<Self, PricingError> {
        require_positive("iv_floor", iv_floor)?;
        if iv_ceiling < iv_floor {
            return Err(PricingError::InvalidParameter {
                field: "iv_ceiling",
                value: iv_ceiling,
            });
        }
        Ok(Self {
            skew,
            iv_floor,
            iv_ceiling,
        })
    }

    /// Shape coefficients.
    pub fn skew_parameters(&self) -> &SkewParameters {
        &self.skew
    }

    /// `(iv_floor, iv_ceiling)`.
    pub fn bounds(&self) -> (FixedPoint, FixedPoint) {
        (self.iv_floor, self.iv_ceiling)
    }

    /// `α·m² + β·m` with `m = K/S - 1`.
    pub fn skew(&self, strike: FixedPoint, spot: FixedPoint) -> Result<FixedPoint, PricingError> {
        let m = moneyness(strike, spot)?;
        let curvature = self.skew.alpha.mul(m.mul(m)?)?;
        Ok(curvature.add(self.skew.beta.mul(m)?)?)
    }

    /// `γ·u/(1 - u)`.
    ///
    /// # Errors
    /// `InvalidParameter` when `u < 0` or `u ≥ 1`.
    pub fn utilization_premium(&self, utilization: FixedPoint) -> Result<FixedPoint, PricingError> {
        if utilization.is_negative() || utilization >= FixedPoint::ONE {
            return Err(PricingError::InvalidParameter {
                field: "utilization",
                value: utilization,
            });
        }
        let odds = utilization.div(FixedPoint::ONE.sub(utilization)?)?;
        Ok(self.skew.gamma.mul(odds)?)
    }

    /// Clamped implied volatility for one strike.
    pub fn implied_volatility(
        &self,
        realized_volatility: FixedPoint,
        strike: FixedPoint,
        spot: FixedPoint,
        utilization: FixedPoint,
    ) -> Result<FixedPoint, PricingError> {
        require_positive("realized_volatility", realized_volatility)?;
        let premium = self.utilization_premium(utilization)?;
        let multiplier = FixedPoint::ONE.add(self.skew(strike, spot)?)?.add(premium)?;
        let raw = realized_volatility.mul(multiplier)?;
        Ok(raw.clamp(self.iv_floor, self.iv_ceiling))
    }

    /// Surface point for one strike and expiry.
    pub fn point(
        &self,
        realized_volatility: FixedPoint,
        strike: FixedPoint,
        spot: FixedPoint,
        time_to_expiry: FixedPoint,
        utilization: FixedPoint,
    ) -> Result<VolatilitySurfacePoint, PricingError> {
        require_positive("time_to_expiry", time_to_expiry)?;
        Ok(VolatilitySurfacePoint {
            strike,
            moneyness: moneyness(strike, spot)?,
            time_to_expiry,
            implied_volatility: self.implied_volatility(realized_volatility, strike, spot, utilization)?,
        })
    }

    /// Surface points across a strike grid at one expiry.
    pub fn smile(
        &self,
        realized_volatility: FixedPoint,
        spot: FixedPoint,
        strikes: &[FixedPoint],
        time_to_expiry: FixedPoint,
        utilization: FixedPoint,
    ) -> Result<Vec<VolatilitySurfacePoint>, PricingError> {
        strikes
            .iter()
            .map(|&strike| self.point(realized_volatility, strike, spot, time_to_expiry, utilization))
            .collect()
    }
}

fn moneyness(strike: FixedPoint, spot: FixedPoint) -> Result<FixedPoint, PricingError> {
    require_positive("strike", strike)?;
    require_positive("spot", spot)?;
    Ok(strike.div(spot)?.sub(FixedPoint::ONE)?)
}
