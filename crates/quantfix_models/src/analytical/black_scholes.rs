//! Black-Scholes-Merton pricing for European options.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·(1 - N(d₂)) - S·(1 - N(d₁))
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! d₁ and d₂ are computed once per call and shared by the price and every
//! Greek. Prices are floored at zero so approximation error never yields a
//! negative premium.

use quantfix_core::types::{FixedPoint, PricingError};

use super::distributions::{CdfPrecision, CumulativeNormal};
use crate::instruments::{OptionParameters, OptionType};

/// Price and first-order sensitivities of a European option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks {
    /// Option premium, never negative.
    pub price: FixedPoint,
    /// ∂V/∂S.
    pub delta: FixedPoint,
    /// ∂²V/∂S², never negative.
    pub gamma: FixedPoint,
    /// ∂V/∂t per year, usually negative.
    pub theta: FixedPoint,
    /// ∂V/∂σ, never negative.
    pub vega: FixedPoint,
    /// ∂V/∂r.
    pub rho: FixedPoint,
}

/// Quantities shared between the price and the Greeks.
struct Terms {
    sqrt_t: FixedPoint,
    discounted_strike: FixedPoint,
    nd1: FixedPoint,
    nd2: FixedPoint,
    pdf_d1: FixedPoint,
}

/// Black-Scholes-Merton engine.
///
/// Stateless apart from the choice of cumulative normal approximation.
///
/// # Examples
/// ```
/// use quantfix_models::analytical::BlackScholes;
/// use quantfix_models::instruments::{OptionParameters, OptionType};
/// use quantfix_core::types::FixedPoint;
///
/// let params = OptionParameters::new(
///     FixedPoint::from_int(100),
///     FixedPoint::from_int(100),
///     "0.2".parse().unwrap(),
///     "0.05".parse().unwrap(),
///     FixedPoint::ONE,
/// )
/// .unwrap();
///
/// let bs = BlackScholes::default();
/// let call = bs.price(&params, OptionType::Call).unwrap();
/// let put = bs.price(&params, OptionType::Put).unwrap();
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let forward = 100.0 - 100.0 * (-0.05_f64).exp();
/// assert!((call.as_f64() - put.as_f64() - forward).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlackScholes {
    normal: CumulativeNormal,
}

impl BlackScholes {
    /// Creates an engine using the given cumulative normal.
    pub fn new(precision: CdfPrecision) -> Self {
        Self {
            normal: CumulativeNormal::new(precision),
        }
    }

    /// Returns the cumulative normal in use.
    #[inline]
    pub fn distribution(&self) -> &CumulativeNormal {
        &self.normal
    }

    /// Computes `(d₁, d₂)`.
    ///
    /// # Errors
    /// `InvalidParameter` for invalid inputs, `Arithmetic` if an
    /// intermediate leaves the representable range.
    pub fn d1_d2(&self, params: &OptionParameters) -> Result<(FixedPoint, FixedPoint), PricingError> {
        params.validate()?;
        let sqrt_t = params.time_to_expiry.sqrt()?;
        let (d1, d2) = d_terms(params, sqrt_t)?;
        Ok((d1, d2))
    }

    /// Premium of a call or put.
    pub fn price(&self, params: &OptionParameters, option_type: OptionType) -> Result<FixedPoint, PricingError> {
        let terms = self.terms(params)?;
        premium(params, &terms, option_type)
    }

    /// Call and put premiums from a single evaluation of d₁ and d₂.
    pub fn price_pair(&self, params: &OptionParameters) -> Result<(FixedPoint, FixedPoint), PricingError> {
        let terms = self.terms(params)?;
        Ok((
            premium(params, &terms, OptionType::Call)?,
            premium(params, &terms, OptionType::Put)?,
        ))
    }

    /// Vega `S·√T·φ(d₁)`, identical for calls and puts.
    pub fn vega(&self, params: &OptionParameters) -> Result<FixedPoint, PricingError> {
        let terms = self.terms(params)?;
        Ok(params.spot.mul(terms.sqrt_t)?.mul(terms.pdf_d1)?)
    }

    /// Price and all Greeks in one pass.
    ///
    /// - Delta: `N(d₁)` for a call, `N(d₁) - 1` for a put
    /// - Gamma: `φ(d₁) / (S·σ·√T)`
    /// - Vega: `S·√T·φ(d₁)`
    /// - Theta: `-(S·σ·φ(d₁))/(2√T) ∓ r·K·e^(-rT)·N(±d₂)`
    /// - Rho: `±K·T·e^(-rT)·N(±d₂)`
    pub fn greeks(&self, params: &OptionParameters, option_type: OptionType) -> Result<Greeks, PricingError> {
        let t = self.terms(params)?;
        let price = premium(params, &t, option_type)?;

        let sigma_sqrt_t = params.volatility.mul(t.sqrt_t)?;
        let gamma = t.pdf_d1.div(params.spot.mul(sigma_sqrt_t)?)?;
        let vega = params.spot.mul(t.sqrt_t)?.mul(t.pdf_d1)?;

        // -(S·σ·φ(d₁)) / (2√T)
        let decay = -params
            .spot
            .mul(params.volatility)?
            .mul(t.pdf_d1)?
            .div(t.sqrt_t.mul_int(2)?)?;
        let rate_term = params.risk_free_rate.mul(t.discounted_strike)?;
        let strike_time = t.discounted_strike.mul(params.time_to_expiry)?;

        let (delta, theta, rho) = match option_type {
            OptionType::Call => (
                t.nd1,
                decay.sub(rate_term.mul(t.nd2)?)?,
                strike_time.mul(t.nd2)?,
            ),
            OptionType::Put => {
                let n_minus_d2 = FixedPoint::ONE.sub(t.nd2)?;
                (
                    t.nd1.sub(FixedPoint::ONE)?,
                    decay.add(rate_term.mul(n_minus_d2)?)?,
                    -strike_time.mul(n_minus_d2)?,
                )
            }
        };

        Ok(Greeks {
            price,
            delta,
            gamma,
            theta,
            vega,
            rho,
        })
    }

    fn terms(&self, params: &OptionParameters) -> Result<Terms, PricingError> {
        params.validate()?;
        let sqrt_t = params.time_to_expiry.sqrt()?;
        let (d1, d2) = d_terms(params, sqrt_t)?;
        let discount = (-params.risk_free_rate.mul(params.time_to_expiry)?).exp()?;
        Ok(Terms {
            sqrt_t,
            discounted_strike: params.strike.mul(discount)?,
            nd1: self.normal.cdf(d1)?,
            nd2: self.normal.cdf(d2)?,
            pdf_d1: self.normal.pdf(d1)?,
        })
    }
}

fn d_terms(params: &OptionParameters, sqrt_t: FixedPoint) -> Result<(FixedPoint, FixedPoint), PricingError> {
    let sigma_sqrt_t = params.volatility.mul(sqrt_t)?;
    let log_moneyness = params.spot.div(params.strike)?.ln()?;
    let half_variance = params.volatility.mul(params.volatility)?.half();
    let drift = params.risk_free_rate.add(half_variance)?.mul(params.time_to_expiry)?;
    let d1 = log_moneyness.add(drift)?.div(sigma_sqrt_t)?;
    let d2 = d1.sub(sigma_sqrt_t)?;
    Ok((d1, d2))
}

fn premium(params: &OptionParameters, t: &Terms, option_type: OptionType) -> Result<FixedPoint, PricingError> {
    let value = match option_type {
        OptionType::Call => params
            .spot
            .mul(t.nd1)?
            .sub(t.discounted_strike.mul(t.nd2)?)?,
        OptionType::Put => {
            let strike_leg = t.discounted_strike.mul(FixedPoint::ONE.sub(t.nd2)?)?;
            let spot_leg = params.spot.mul(FixedPoint::ONE.sub(t.nd1)?)?;
            strike_leg.sub(spot_leg)?
        }
    };
    Ok(value.max(FixedPoint::ZERO))
}
