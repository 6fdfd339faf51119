//! Black-Scholes implied volatility by bounded Newton-Raphson.
//!
//! The objective is `BS(σ) - target` with derivative vega. Iterates are
//! clamped to `[1e-6, 5]` and the search runs at most
//! [`MAX_ITERATIONS_CAP`](quantfix_core::math::solvers::MAX_ITERATIONS_CAP)
//! times. The best iterate is always reported together with a convergence
//! flag; [`ImpliedVolatility::into_result`] turns a miss into
//! `PricingError::NonConvergence`.

use quantfix_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
use quantfix_core::types::{FixedPoint, PricingError};

use super::black_scholes::BlackScholes;
use crate::instruments::{require_positive, OptionParameters, OptionType};

/// Smallest volatility the search will visit.
pub const VOLATILITY_LOWER_BOUND: FixedPoint = FixedPoint::from_raw_const(1_000_000_000_000);

/// Largest volatility the search will visit.
pub const VOLATILITY_UPPER_BOUND: FixedPoint = FixedPoint::from_int(5);

/// Result of an implied volatility search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImpliedVolatility {
    /// Best volatility found.
    pub volatility: FixedPoint,
    /// Newton iterations performed.
    pub iterations: usize,
    /// Whether `|BS(σ) - target|` met the tolerance.
    pub converged: bool,
    /// `|BS(σ) - target|` at the reported volatility.
    pub residual: FixedPoint,
}

impl ImpliedVolatility {
    /// Strict projection: the volatility if converged, otherwise
    /// `NonConvergence` carrying the best iterate.
    pub fn into_result(self) -> Result<FixedPoint, PricingError> {
        if self.converged {
            Ok(self.volatility)
        } else {
            Err(PricingError::NonConvergence {
                iterations: self.iterations,
                best_estimate: self.volatility,
            })
        }
    }
}

impl BlackScholes {
    /// Volatility at which this engine reproduces `market_price`.
    ///
    /// `params.volatility` is the starting point of the search.
    ///
    /// # Errors
    /// `InvalidParameter` for invalid inputs or a non-positive price;
    /// arithmetic failures while pricing are propagated. Non-convergence is
    /// reported through [`ImpliedVolatility::converged`].
    ///
    /// # Examples
    /// ```
    /// use quantfix_models::analytical::BlackScholes;
    /// use quantfix_models::instruments::{OptionParameters, OptionType};
    /// use quantfix_core::math::solvers::SolverConfig;
    /// use quantfix_core::types::FixedPoint;
    ///
    /// let bs = BlackScholes::default();
    /// let params = OptionParameters::new(
    ///     FixedPoint::from_int(100),
    ///     FixedPoint::from_int(100),
    ///     "0.3".parse().unwrap(),
    ///     "0.05".parse().unwrap(),
    ///     FixedPoint::ONE,
    /// )
    /// .unwrap();
    /// let price = bs.price(&params, OptionType::Call).unwrap();
    ///
    /// let guess = params.with_volatility("0.2".parse().unwrap());
    /// let iv = bs
    ///     .implied_volatility(&guess, OptionType::Call, price, &SolverConfig::default())
    ///     .unwrap();
    /// assert!(iv.converged);
    /// assert!((iv.volatility.as_f64() - 0.3).abs() < 1e-9);
    /// ```
    pub fn implied_volatility(
        &self,
        params: &OptionParameters,
        option_type: OptionType,
        market_price: FixedPoint,
        config: &SolverConfig,
    ) -> Result<ImpliedVolatility, PricingError> {
        params.validate()?;
        require_positive("market_price", market_price)?;
        search(self, params, option_type, market_price, config)
    }

    /// Strict variant of [`implied_volatility`](Self::implied_volatility).
    pub fn implied_volatility_strict(
        &self,
        params: &OptionParameters,
        option_type: OptionType,
        market_price: FixedPoint,
        config: &SolverConfig,
    ) -> Result<FixedPoint, PricingError> {
        self.implied_volatility(params, option_type, market_price, config)?
            .into_result()
    }
}

/// Newton search for `σ` with `BS(σ) = target`, starting at `params.volatility`.
pub(crate) fn search(
    engine: &BlackScholes,
    params: &OptionParameters,
    option_type: OptionType,
    target: FixedPoint,
    config: &SolverConfig,
) -> Result<ImpliedVolatility, PricingError> {
    let solver = NewtonRaphsonSolver::new(*config).with_bounds(VOLATILITY_LOWER_BOUND, VOLATILITY_UPPER_BOUND);
    let estimate = solver.solve::<_, PricingError>(
        |sigma| {
            let trial = params.with_volatility(sigma);
            let greeks = engine.greeks(&trial, option_type)?;
            Ok((greeks.price.sub(target)?, greeks.vega))
        },
        params.volatility,
    )?;

    let result = ImpliedVolatility {
        volatility: estimate.root,
        iterations: estimate.iterations,
        converged: estimate.converged(),
        residual: estimate.residual,
    };
    if !result.converged {
        tracing::warn!(
            iterations = result.iterations,
            best = %result.volatility,
            residual = %result.residual,
            termination = ?estimate.termination,
            "implied volatility search did not converge"
        );
    }
    Ok(result)
}
