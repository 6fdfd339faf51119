//! Heston pricing by characteristic-function quadrature.
//!
//! The call price is `C = S·P₁ - K·e^(-rT)·P₂` with
//!
//! ```text
//! P_j = 1/2 + (1/π) ∫₀^U Re[ e^(-iφ ln K) f_j(φ) / (iφ) ] dφ
//! ```
//!
//! integrated with the composite 8-point Gauss-Legendre rule over a fixed
//! upper limit `U`. The characteristic function uses the rotation-stable
//! ("little trap") form:
//!
//! ```text
//! d = sqrt((b - iρξφ)² + ξ²(φ² - 2iuφ))
//! g = (b - iρξφ - d) / (b - iρξφ + d)
//! D = (b - iρξφ - d)/ξ² · (1 - e^(-dT)) / (1 - g·e^(-dT))
//! C = irφT + κθ/ξ² · [(b - iρξφ - d)T - 2 ln((1 - g·e^(-dT)) / (1 - g))]
//! f = exp(C + D·v0 + iφ ln S)
//! ```
//!
//! with `u₁ = 1/2, b₁ = κ - ρξ` and `u₂ = -1/2, b₂ = κ`.

use quantfix_core::math::complex::Complex;
use quantfix_core::math::constants::FRAC_1_PI;
use quantfix_core::math::quadrature::GaussLegendre;
use quantfix_core::math::solvers::SolverConfig;
use quantfix_core::types::{ArithmeticError, FixedPoint, PricingError};

use super::black_scholes::BlackScholes;
use super::distributions::CdfPrecision;
use super::implied_vol::{search, ImpliedVolatility};
use crate::instruments::{require_positive, OptionType};
use crate::models::HestonParameters;

/// Default upper limit of the Fourier integral.
pub const DEFAULT_INTEGRATION_LIMIT: FixedPoint = FixedPoint::from_int(100);

/// Default number of Gauss-Legendre panels.
pub const DEFAULT_PANELS: usize = GaussLegendre::DEFAULT_PANELS;

/// Which of the two risk-neutral probabilities is being recovered.
#[derive(Debug, Clone, Copy)]
enum Measure {
    /// Stock numeraire, yields `P₁`.
    Spot,
    /// Money-market numeraire, yields `P₂`.
    Money,
}

/// Per-measure constants of the characteristic function.
struct Characteristic<'a> {
    params: &'a HestonParameters,
    b: FixedPoint,
    u: FixedPoint,
    rho_xi: FixedPoint,
    xi_squared: FixedPoint,
    kappa_theta_over_xi_squared: FixedPoint,
    log_spot_over_strike: FixedPoint,
}

impl<'a> Characteristic<'a> {
    fn new(params: &'a HestonParameters, measure: Measure, log_spot_over_strike: FixedPoint) -> Result<Self, ArithmeticError> {
        let rho_xi = params.rho.mul(params.xi)?;
        let xi_squared = params.xi.mul(params.xi)?;
        let (b, u) = match measure {
            Measure::Spot => (params.kappa.sub(rho_xi)?, FixedPoint::HALF),
            Measure::Money => (params.kappa, -FixedPoint::HALF),
        };
        Ok(Self {
            params,
            b,
            u,
            rho_xi,
            xi_squared,
            kappa_theta_over_xi_squared: params.kappa.mul(params.theta)?.div(xi_squared)?,
            log_spot_over_strike,
        })
    }

    /// `Re[e^(-iφ ln K) f(φ) / (iφ)]`, i.e. `Im[f̃(φ)] / φ` where `f̃`
    /// carries `ln(S/K)` in place of `ln S`.
    fn integrand(&self, phi: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
        let p = self.params;
        let one = Complex::ONE;

        let beta = Complex::new(self.b, -self.rho_xi.mul(phi)?);
        let spread = Complex::new(
            self.xi_squared.mul(phi.mul(phi)?)?,
            -self.xi_squared.mul(self.u.mul(phi)?.mul_int(2)?)?,
        );
        let d = beta.mul(beta)?.add(spread)?.sqrt()?;

        let beta_minus_d = beta.sub(d)?;
        let g = beta_minus_d.div(beta.add(d)?)?;
        let decay = d.scale(-p.time_to_expiry)?.exp()?;

        let one_minus_decay = one.sub(decay)?;
        let one_minus_g_decay = one.sub(g.mul(decay)?)?;

        let d_coefficient = Complex::new(
            beta_minus_d.re.div(self.xi_squared)?,
            beta_minus_d.im.div(self.xi_squared)?,
        )
        .mul(one_minus_decay)?
        .div(one_minus_g_decay)?;

        let log_term = one_minus_g_decay.div(one.sub(g)?)?.ln()?;
        let bracket = beta_minus_d
            .scale(p.time_to_expiry)?
            .sub(log_term.scale(FixedPoint::TWO)?)?;
        let c_coefficient = Complex::from_imag(p.risk_free_rate.mul(phi)?.mul(p.time_to_expiry)?)
            .add(bracket.scale(self.kappa_theta_over_xi_squared)?)?;

        let exponent = c_coefficient
            .add(d_coefficient.scale(p.v0)?)?
            .add(Complex::from_imag(phi.mul(self.log_spot_over_strike)?))?;
        let f = exponent.exp()?;
        f.im.div(phi)
    }
}

/// Heston engine with a fixed quadrature budget.
///
/// # Examples
/// ```
/// use quantfix_models::analytical::HestonEngine;
/// use quantfix_models::models::HestonParameters;
/// use quantfix_core::types::FixedPoint;
///
/// let fp = |s: &str| s.parse::<FixedPoint>().unwrap();
/// let params = HestonParameters::new(
///     fp("100"), fp("100"), fp("0.05"), fp("1"),
///     fp("0.04"), fp("0.04"), fp("1.5"), fp("0.3"), fp("-0.7"),
/// )
/// .unwrap();
///
/// let call = HestonEngine::default().price(&params).unwrap();
/// assert!((call.as_f64() - 10.3619).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HestonEngine {
    integration_limit: FixedPoint,
    quadrature: GaussLegendre,
    bsm: BlackScholes,
}

impl Default for HestonEngine {
    fn default() -> Self {
        Self {
            integration_limit: DEFAULT_INTEGRATION_LIMIT,
            quadrature: GaussLegendre::default(),
            bsm: BlackScholes::default(),
        }
    }
}

impl HestonEngine {
    /// Creates an engine integrating over `[0, integration_limit]` with
    /// `panels` Gauss-Legendre panels.
    ///
    /// # Errors
    /// `InvalidParameter` when the limit is not positive or `panels` is zero.
    pub fn new(integration_limit: FixedPoint, panels: usize) -> Result<Self, PricingError> {
        require_positive("integration_limit", integration_limit)?;
        let quadrature = GaussLegendre::new(panels).map_err(|_| PricingError::InvalidParameter {
            field: "panels",
            value: FixedPoint::ZERO,
        })?;
        Ok(Self {
            integration_limit,
            quadrature,
            bsm: BlackScholes::default(),
        })
    }

    /// Uses the given cumulative normal for implied volatility inversion.
    pub fn with_precision(mut self, precision: CdfPrecision) -> Self {
        self.bsm = BlackScholes::new(precision);
        self
    }

    /// Upper limit of the Fourier integral.
    pub fn integration_limit(&self) -> FixedPoint {
        self.integration_limit
    }

    /// Quadrature rule in use.
    pub fn quadrature(&self) -> &GaussLegendre {
        &self.quadrature
    }

    /// Returns whether the Feller condition holds, logging a warning when
    /// it does not. Pricing is not affected either way.
    pub fn check_feller_condition(&self, params: &HestonParameters) -> Result<bool, PricingError> {
        let satisfied = params.satisfies_feller()?;
        if !satisfied {
            tracing::warn!(
                kappa = %params.kappa,
                theta = %params.theta,
                xi = %params.xi,
                feller_ratio = %params.feller_ratio()?,
                "Feller condition 2*kappa*theta > xi^2 violated; variance may reach zero"
            );
        }
        Ok(satisfied)
    }

    /// Risk-neutral probabilities `(P₁, P₂)`.
    pub fn probabilities(&self, params: &HestonParameters) -> Result<(FixedPoint, FixedPoint), PricingError> {
        params.validate()?;
        let log_spot_over_strike = params.spot.div(params.strike)?.ln()?;
        let p1 = self.probability(params, Measure::Spot, log_spot_over_strike)?;
        let p2 = self.probability(params, Measure::Money, log_spot_over_strike)?;
        Ok((p1, p2))
    }

    fn probability(
        &self,
        params: &HestonParameters,
        measure: Measure,
        log_spot_over_strike: FixedPoint,
    ) -> Result<FixedPoint, PricingError> {
        let characteristic = Characteristic::new(params, measure, log_spot_over_strike)?;
        let integral = self.quadrature.integrate::<_, ArithmeticError>(
            |phi| characteristic.integrand(phi),
            FixedPoint::ZERO,
            self.integration_limit,
        )?;
        tracing::debug!(
            ?measure,
            evaluations = self.quadrature.evaluations(),
            %integral,
            "heston probability integral"
        );
        Ok(FixedPoint::HALF.add(integral.mul(FRAC_1_PI)?)?)
    }

    /// European call price, floored at zero.
    pub fn price(&self, params: &HestonParameters) -> Result<FixedPoint, PricingError> {
        self.check_feller_condition(params)?;
        let (p1, p2) = self.probabilities(params)?;
        let discounted_strike = discounted_strike(params)?;
        let call = params.spot.mul(p1)?.sub(discounted_strike.mul(p2)?)?;
        Ok(call.max(FixedPoint::ZERO))
    }

    /// European put price via put-call parity, floored at zero.
    pub fn put(&self, params: &HestonParameters) -> Result<FixedPoint, PricingError> {
        let call = self.price(params)?;
        let put = call.sub(params.spot)?.add(discounted_strike(params)?)?;
        Ok(put.max(FixedPoint::ZERO))
    }

    /// Black-Scholes volatility reproducing the Heston call price.
    ///
    /// Newton-Raphson against BSM vega, starting at `√v0`, bounded to
    /// `[1e-6, 5]`. The best iterate is always returned; check
    /// [`ImpliedVolatility::converged`].
    pub fn implied_volatility(
        &self,
        params: &HestonParameters,
        config: &SolverConfig,
    ) -> Result<ImpliedVolatility, PricingError> {
        let target = self.price(params)?;
        let start = params.bsm_equivalent()?;
        if target.is_zero() {
            return Err(PricingError::InvalidParameter {
                field: "heston_price",
                value: target,
            });
        }
        search(&self.bsm, &start, OptionType::Call, target, config)
    }

    /// Strict variant of [`implied_volatility`](Self::implied_volatility):
    /// non-convergence is `NonConvergence`.
    pub fn implied_volatility_strict(
        &self,
        params: &HestonParameters,
        config: &SolverConfig,
    ) -> Result<FixedPoint, PricingError> {
        self.implied_volatility(params, config)?.into_result()
    }
}

fn discounted_strike(params: &HestonParameters) -> Result<FixedPoint, ArithmeticError> {
    let discount = (-params.risk_free_rate.mul(params.time_to_expiry)?).exp()?;
    params.strike.mul(discount)
}
