//! Verification diagnostics.
//!
//! Scalar checks a verification harness runs against the engines: normal
//! CDF symmetry and monotonicity, put-call parity, lattice convergence
//! towards Black-Scholes and the gap between Heston and its Black-Scholes
//! limit. None of these are preconditions for pricing.

use quantfix_core::types::{ArithmeticError, FixedPoint, PricingError};

use crate::analytical::{BlackScholes, CumulativeNormal, HestonEngine};
use crate::instruments::{ExerciseStyle, OptionParameters, OptionType};
use crate::lattice::BinomialLattice;
use crate::models::HestonParameters;

/// `|Φ(x) + Φ(-x) - 1|`.
pub fn cdf_symmetry_residual(normal: &CumulativeNormal, x: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
    let sum = normal.cdf(x)?.add(normal.cdf(-x)?)?;
    Ok(sum.sub(FixedPoint::ONE)?.abs())
}

/// Adjacent pairs `(a, b)` with `a < b` but `Φ(b) < Φ(a)`.
///
/// The points are sorted before comparison, so any order is accepted.
pub fn cdf_monotonicity_violations(
    normal: &CumulativeNormal,
    points: &[FixedPoint],
) -> Result<Vec<(FixedPoint, FixedPoint)>, ArithmeticError> {
    let mut sorted = points.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let values = sorted
        .iter()
        .map(|&x| normal.cdf(x))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sorted
        .windows(2)
        .zip(values.windows(2))
        .filter(|(_, v)| v[1] < v[0])
        .map(|(x, _)| (x[0], x[1]))
        .collect())
}

/// `|C - P - (S - K·e^(-rT))|` for the Black-Scholes engine.
pub fn put_call_parity_residual(engine: &BlackScholes, params: &OptionParameters) -> Result<FixedPoint, PricingError> {
    let (call, put) = engine.price_pair(params)?;
    let discount = (-params.risk_free_rate.mul(params.time_to_expiry)?).exp()?;
    let forward_value = params.spot.sub(params.strike.mul(discount)?)?;
    Ok(call.sub(put)?.sub(forward_value)?.abs())
}

/// Whether the parity residual is within `tolerance`.
pub fn satisfies_put_call_parity(
    engine: &BlackScholes,
    params: &OptionParameters,
    tolerance: FixedPoint,
) -> Result<bool, PricingError> {
    Ok(put_call_parity_residual(engine, params)? <= tolerance)
}

/// One row of a lattice convergence profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergencePoint {
    /// Lattice steps.
    pub steps: usize,
    /// European lattice price.
    pub lattice_price: FixedPoint,
    /// `|lattice - Black-Scholes|`.
    pub error: FixedPoint,
}

/// European lattice prices against the Black-Scholes price for each step count.
///
/// The CRR error shrinks roughly as `1/N`; the profile makes that visible.
pub fn lattice_convergence_profile(
    lattice: &BinomialLattice,
    engine: &BlackScholes,
    params: &OptionParameters,
    option_type: OptionType,
    step_counts: &[usize],
) -> Result<Vec<ConvergencePoint>, PricingError> {
    let reference = engine.price(params, option_type)?;
    step_counts
        .iter()
        .map(|&steps| {
            let result = lattice.price(params, option_type, ExerciseStyle::European, steps)?;
            Ok(ConvergencePoint {
                steps,
                lattice_price: result.price,
                error: result.price.sub(reference)?.abs(),
            })
        })
        .collect()
}

/// Signed `Heston call - Black-Scholes call` at `σ = √v₀`.
///
/// With `θ = v₀` the gap tends to zero as `ξ → 0`.
pub fn heston_bsm_gap(
    heston: &HestonEngine,
    engine: &BlackScholes,
    params: &HestonParameters,
) -> Result<FixedPoint, PricingError> {
    let stochastic = heston.price(params)?;
    let flat = engine.price(&params.bsm_equivalent()?, OptionType::Call)?;
    Ok(stochastic.sub(flat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::CdfPrecision;
    use approx::assert_abs_diff_eq;

    fn fp(s: &str) -> FixedPoint {
        s.parse().unwrap()
    }

    fn atm() -> OptionParameters {
        OptionParameters::new(fp("100"), fp("100"), fp("0.2"), fp("0.05"), fp("1")).unwrap()
    }

    fn grid() -> Vec<FixedPoint> {
        (-24..=24).map(|i| FixedPoint::from_ratio(i, 4).unwrap()).collect()
    }

    // ==========================================================
    // Cumulative Normal Tests
    // ==========================================================

    #[test]
    fn test_symmetry_residual_is_zero() {
        for precision in [CdfPrecision::High, CdfPrecision::Fast] {
            let normal = CumulativeNormal::new(precision);
            for x in grid() {
                assert_eq!(cdf_symmetry_residual(&normal, x).unwrap(), FixedPoint::ZERO);
            }
        }
    }

    #[test]
    fn test_no_monotonicity_violations() {
        for precision in [CdfPrecision::High, CdfPrecision::Fast] {
            let normal = CumulativeNormal::new(precision);
            assert!(cdf_monotonicity_violations(&normal, &grid()).unwrap().is_empty());
        }
    }

    #[test]
    fn test_monotonicity_accepts_unsorted_points() {
        let normal = CumulativeNormal::default();
        let mut points = grid();
        points.reverse();
        points.push(FixedPoint::ZERO);
        assert!(cdf_monotonicity_violations(&normal, &points).unwrap().is_empty());
        assert!(cdf_monotonicity_violations(&normal, &[]).unwrap().is_empty());
    }

    // ==========================================================
    // Parity Tests
    // ==========================================================

    #[test]
    fn test_parity_residual_small() {
        let engine = BlackScholes::default();
        for strike in ["80", "100", "120"] {
            let params = OptionParameters::new(fp("100"), fp(strike), fp("0.3"), fp("0.05"), fp("0.5")).unwrap();
            let residual = put_call_parity_residual(&engine, &params).unwrap();
            assert!(residual < fp("0.000001"), "strike {strike}: {residual}");
            assert!(satisfies_put_call_parity(&engine, &params, fp("0.000001")).unwrap());
        }
    }

    #[test]
    fn test_parity_rejects_invalid_parameters() {
        let mut params = atm();
        params.volatility = FixedPoint::ZERO;
        assert!(put_call_parity_residual(&BlackScholes::default(), &params).is_err());
    }

    // ==========================================================
    // Lattice Convergence Tests
    // ==========================================================

    #[test]
    fn test_convergence_profile_shrinks() {
        let profile = lattice_convergence_profile(
            &BinomialLattice::default(),
            &BlackScholes::default(),
            &atm(),
            OptionType::Call,
            &[8, 16, 32, 64],
        )
        .unwrap();

        assert_eq!(profile.len(), 4);
        assert_eq!(profile[3].steps, 64);
        for pair in profile.windows(2) {
            assert!(pair[1].error < pair[0].error);
        }
        assert_abs_diff_eq!(profile[0].error.as_f64(), 0.2455, epsilon = 2e-3);
        assert_abs_diff_eq!(profile[3].error.as_f64(), 0.0312, epsilon = 2e-3);
    }

    #[test]
    fn test_convergence_profile_respects_budget() {
        let lattice = BinomialLattice::new(16).unwrap();
        let result = lattice_convergence_profile(&lattice, &BlackScholes::default(), &atm(), OptionType::Put, &[8, 32]);
        assert!(matches!(result, Err(PricingError::StepBudgetExceeded { requested: 32, max: 16 })));
    }

    // ==========================================================
    // Heston Gap Tests
    // ==========================================================

    #[test]
    fn test_heston_gap_vanishes_without_vol_of_vol() {
        let params = HestonParameters::new(
            fp("100"), fp("100"), fp("0.05"), fp("1"),
            fp("0.04"), fp("0.04"), fp("1.5"), fp("0.01"), fp("-0.7"),
        )
        .unwrap();
        let gap = heston_bsm_gap(&HestonEngine::default(), &BlackScholes::default(), &params).unwrap();
        assert!(gap.abs() < fp("0.02"), "gap {gap}");
    }

    #[test]
    fn test_heston_gap_with_negative_correlation() {
        let params = HestonParameters::new(
            fp("100"), fp("100"), fp("0.05"), fp("1"),
            fp("0.04"), fp("0.04"), fp("1.5"), fp("0.3"), fp("-0.7"),
        )
        .unwrap();
        let gap = heston_bsm_gap(&HestonEngine::default(), &BlackScholes::default(), &params).unwrap();
        // 10.3619 - 10.4506
        assert!(gap.is_negative());
        assert_abs_diff_eq!(gap.as_f64(), -0.0887, epsilon = 2e-3);
    }
}
