//! Cox-Ross-Rubinstein binomial lattice.
//!
//! Parameterisation per step `Δt = T/N`:
//!
//! - up factor `u = e^(σ√Δt)`, down factor `d = 1/u`
//! - risk-neutral probability `p = (e^(rΔt) - d) / (u - d)`
//! - discount `e^(-rΔt)`
//!
//! Terminal payoffs are set at the `N + 1` leaves and rolled back with
//! `V = e^(-rΔt)·(p·V_up + (1-p)·V_down)`. American exercise takes the
//! maximum with the intrinsic value at every node. Node spots come from a
//! precomputed table of powers of `u` and `d`, so every node is priced from
//! the same rounded factors regardless of the path leading to it.

use quantfix_core::types::{FixedPoint, PricingError};

use crate::instruments::{ExerciseStyle, OptionParameters, OptionType};

/// Hard cap on lattice depth.
pub const MAX_STEPS: usize = 64;

/// Step count used when a caller does not choose one.
pub const DEFAULT_STEPS: usize = 32;

/// Per-step constants derived once from the parameters and step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeConfig {
    /// `Δt = T/N`.
    pub step_size: FixedPoint,
    /// `u = e^(σ√Δt)`.
    pub up_factor: FixedPoint,
    /// `d = 1/u`.
    pub down_factor: FixedPoint,
    /// `p`, strictly within (0, 1).
    pub risk_neutral_probability: FixedPoint,
    /// `e^(-rΔt)`.
    pub discount_per_step: FixedPoint,
}

impl LatticeConfig {
    /// Derives the per-step constants.
    ///
    /// # Errors
    /// - `InvalidParameter` for invalid inputs or zero steps
    /// - `StepBudgetExceeded` above [`MAX_STEPS`]
    /// - `InvalidProbability` when `p ∉ (0, 1)`, which happens when the
    ///   per-step drift outruns the volatility
    pub fn derive(params: &OptionParameters, steps: usize) -> Result<Self, PricingError> {
        params.validate()?;
        check_steps(steps, MAX_STEPS)?;

        let step_size = params.time_to_expiry.div_int(steps as i64)?;
        let up_factor = params.volatility.mul(step_size.sqrt()?)?.exp()?;
        let down_factor = FixedPoint::ONE.div(up_factor)?;
        let growth = params.risk_free_rate.mul(step_size)?.exp()?;
        let probability = growth.sub(down_factor)?.div(up_factor.sub(down_factor)?)?;
        if !probability.is_positive() || probability >= FixedPoint::ONE {
            return Err(PricingError::InvalidProbability { probability });
        }
        let discount_per_step = (-params.risk_free_rate.mul(step_size)?).exp()?;

        Ok(Self {
            step_size,
            up_factor,
            down_factor,
            risk_neutral_probability: probability,
            discount_per_step,
        })
    }
}

/// Lattice price with the root delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeResult {
    /// Option value at the root, never negative.
    pub price: FixedPoint,
    /// `(V_u - V_d) / (S·u - S·d)` from the two nodes after the first step.
    pub delta: FixedPoint,
    /// Number of steps used.
    pub steps: usize,
    /// Per-step constants used.
    pub config: LatticeConfig,
}

/// CRR binomial engine with a configurable step budget.
///
/// # Examples
/// ```
/// use quantfix_models::instruments::{ExerciseStyle, OptionParameters, OptionType};
/// use quantfix_models::lattice::BinomialLattice;
/// use quantfix_core::types::FixedPoint;
///
/// let params = OptionParameters::new(
///     FixedPoint::from_int(100),
///     FixedPoint::from_int(110),
///     "0.3".parse().unwrap(),
///     "0.05".parse().unwrap(),
///     FixedPoint::ONE,
/// )
/// .unwrap();
///
/// let lattice = BinomialLattice::default();
/// let american = lattice.price(&params, OptionType::Put, ExerciseStyle::American, 32).unwrap();
/// let european = lattice.price(&params, OptionType::Put, ExerciseStyle::European, 32).unwrap();
/// assert!(american.price >= european.price);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinomialLattice {
    max_steps: usize,
    default_steps: usize,
}

impl Default for BinomialLattice {
    fn default() -> Self {
        Self {
            max_steps: MAX_STEPS,
            default_steps: DEFAULT_STEPS,
        }
    }
}

impl BinomialLattice {
    /// Creates an engine accepting at most `max_steps` steps.
    ///
    /// # Errors
    /// `StepBudgetExceeded` above [`MAX_STEPS`], `InvalidParameter` for zero.
    ///
    /// The default step count is [`DEFAULT_STEPS`], lowered to `max_steps`
    /// when the budget is smaller.
    pub fn new(max_steps: usize) -> Result<Self, PricingError> {
        check_steps(max_steps, MAX_STEPS)?;
        Ok(Self {
            max_steps,
            default_steps: DEFAULT_STEPS.min(max_steps),
        })
    }

    /// Replaces the step count used by [`price_default`](Self::price_default).
    ///
    /// # Errors
    /// `StepBudgetExceeded` above the engine's budget, `InvalidParameter` for zero.
    pub fn with_default_steps(self, default_steps: usize) -> Result<Self, PricingError> {
        check_steps(default_steps, self.max_steps)?;
        Ok(Self { default_steps, ..self })
    }

    /// Largest accepted step count.
    #[inline]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Step count used when the caller does not supply one.
    #[inline]
    pub fn default_steps(&self) -> usize {
        self.default_steps
    }

    /// Prices over the engine's default step count.
    pub fn price_default(
        &self,
        params: &OptionParameters,
        option_type: OptionType,
        exercise: ExerciseStyle,
    ) -> Result<LatticeResult, PricingError> {
        self.price(params, option_type, exercise, self.default_steps)
    }

    /// Prices by backward induction over `steps` steps.
    pub fn price(
        &self,
        params: &OptionParameters,
        option_type: OptionType,
        exercise: ExerciseStyle,
        steps: usize,
    ) -> Result<LatticeResult, PricingError> {
        check_steps(steps, self.max_steps)?;
        let config = LatticeConfig::derive(params, steps)?;
        tracing::debug!(
            steps,
            probability = %config.risk_neutral_probability,
            up = %config.up_factor,
            ?exercise,
            "building binomial lattice"
        );

        let powers = power_table(&config, steps)?;
        let spot_at = |ups_minus_downs: i64| -> Result<FixedPoint, PricingError> {
            let index = (ups_minus_downs + steps as i64) as usize;
            Ok(params.spot.mul(powers[index])?)
        };

        let n = steps as i64;
        let mut values = Vec::with_capacity(steps + 1);
        for j in 0..=n {
            values.push(option_type.intrinsic(spot_at(2 * j - n)?, params.strike)?);
        }

        let p = config.risk_neutral_probability;
        let q = FixedPoint::ONE.sub(p)?;
        let disc = config.discount_per_step;
        let mut first_step = (values[0], values[1]);

        for i in (0..steps).rev() {
            if i == 0 {
                first_step = (values[0], values[1]);
            }
            for j in 0..=i {
                let continuation = disc.mul(p.mul(values[j + 1])?.add(q.mul(values[j])?)?)?;
                values[j] = if exercise.allows_early_exercise() {
                    let node_spot = spot_at(2 * j as i64 - i as i64)?;
                    continuation.max(option_type.intrinsic(node_spot, params.strike)?)
                } else {
                    continuation
                };
            }
        }

        let (down_value, up_value) = first_step;
        let spread = params
            .spot
            .mul(config.up_factor)?
            .sub(params.spot.mul(config.down_factor)?)?;
        let delta = up_value.sub(down_value)?.div(spread)?;

        Ok(LatticeResult {
            price: values[0].max(FixedPoint::ZERO),
            delta,
            steps,
            config,
        })
    }

    /// `max(American - European, 0)` on the same lattice.
    pub fn early_exercise_premium(
        &self,
        params: &OptionParameters,
        option_type: OptionType,
        steps: usize,
    ) -> Result<FixedPoint, PricingError> {
        let american = self.price(params, option_type, ExerciseStyle::American, steps)?;
        let european = self.price(params, option_type, ExerciseStyle::European, steps)?;
        Ok(american.price.sub(european.price)?.max(FixedPoint::ZERO))
    }
}

fn check_steps(steps: usize, max: usize) -> Result<(), PricingError> {
    if steps == 0 {
        return Err(PricingError::InvalidParameter {
            field: "steps",
            value: FixedPoint::ZERO,
        });
    }
    if steps > max {
        return Err(PricingError::StepBudgetExceeded { requested: steps, max });
    }
    Ok(())
}

/// `u^m` for `m ∈ [-N, N]`, stored at index `m + N`; negative powers use `d`.
fn power_table(config: &LatticeConfig, steps: usize) -> Result<Vec<FixedPoint>, PricingError> {
    let mut table = vec![FixedPoint::ONE; 2 * steps + 1];
    for m in 1..=steps {
        table[steps + m] = table[steps + m - 1].mul(config.up_factor)?;
        table[steps - m] = table[steps - m + 1].mul(config.down_factor)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::BlackScholes;
    use approx::assert_abs_diff_eq;

    fn fp(s: &str) -> FixedPoint {
        s.parse().unwrap()
    }

    fn atm() -> OptionParameters {
        OptionParameters::new(fp("100"), fp("100"), fp("0.2"), fp("0.05"), fp("1")).unwrap()
    }

    fn itm_put() -> OptionParameters {
        OptionParameters::new(fp("100"), fp("110"), fp("0.3"), fp("0.05"), fp("1")).unwrap()
    }

    // ==========================================================
    // Config Tests
    // ==========================================================

    #[test]
    fn test_config_derivation() {
        let config = LatticeConfig::derive(&atm(), 4).unwrap();
        assert_eq!(config.step_size, fp("0.25"));
        // u = e^(0.2 * 0.5) = e^0.1
        assert_abs_diff_eq!(config.up_factor.as_f64(), 0.1_f64.exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(config.down_factor.as_f64(), (-0.1_f64).exp(), epsilon = 1e-15);
        let p = ((0.0125_f64).exp() - (-0.1_f64).exp()) / (0.1_f64.exp() - (-0.1_f64).exp());
        assert_abs_diff_eq!(config.risk_neutral_probability.as_f64(), p, epsilon = 1e-14);
        assert_abs_diff_eq!(config.discount_per_step.as_f64(), (-0.0125_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn test_invalid_probability() {
        let params = OptionParameters::new(fp("100"), fp("100"), fp("0.01"), fp("0.5"), fp("1")).unwrap();
        match LatticeConfig::derive(&params, 4) {
            Err(PricingError::InvalidProbability { probability }) => assert!(probability >= FixedPoint::ONE),
            other => panic!("expected InvalidProbability, got {other:?}"),
        }
    }

    #[test]
    fn test_step_budget() {
        let lattice = BinomialLattice::default();
        let err = lattice
            .price(&atm(), OptionType::Call, ExerciseStyle::European, 65)
            .unwrap_err();
        assert_eq!(err, PricingError::StepBudgetExceeded { requested: 65, max: 64 });

        let small = BinomialLattice::new(16).unwrap();
        assert_eq!(small.max_steps(), 16);
        assert!(matches!(
            small.price(&atm(), OptionType::Call, ExerciseStyle::European, 32),
            Err(PricingError::StepBudgetExceeded { requested: 32, max: 16 })
        ));
        assert!(BinomialLattice::new(65).is_err());
    }

    #[test]
    fn test_default_steps() {
        assert_eq!(BinomialLattice::default().default_steps(), DEFAULT_STEPS);
        assert_eq!(BinomialLattice::new(16).unwrap().default_steps(), 16);

        let lattice = BinomialLattice::new(48).unwrap().with_default_steps(24).unwrap();
        let implicit = lattice
            .price_default(&atm(), OptionType::Put, ExerciseStyle::American)
            .unwrap();
        let explicit = lattice
            .price(&atm(), OptionType::Put, ExerciseStyle::American, 24)
            .unwrap();
        assert_eq!(implicit, explicit);
        assert_eq!(implicit.steps, 24);

        assert!(matches!(
            lattice.with_default_steps(49),
            Err(PricingError::StepBudgetExceeded { requested: 49, max: 48 })
        ));
        assert!(lattice.with_default_steps(0).is_err());
    }

    #[test]
    fn test_zero_steps_rejected() {
        assert!(matches!(
            BinomialLattice::default().price(&atm(), OptionType::Call, ExerciseStyle::European, 0),
            Err(PricingError::InvalidParameter { field: "steps", .. })
        ));
    }

    // ==========================================================
    // Pricing Tests
    // ==========================================================

    #[test]
    fn test_european_converges_to_black_scholes() {
        let lattice = BinomialLattice::default();
        let bsm = BlackScholes::default().price(&atm(), OptionType::Call).unwrap().as_f64();
        let mut previous_error = f64::MAX;
        for steps in [8, 16, 32, 64] {
            let price = lattice
                .price(&atm(), OptionType::Call, ExerciseStyle::European, steps)
                .unwrap()
                .price
                .as_f64();
            let error = (price - bsm).abs();
            assert!(error < previous_error, "error grew at {steps} steps");
            previous_error = error;
        }
        assert!(previous_error < 0.05);
    }

    #[test]
    fn test_american_put_reference() {
        let lattice = BinomialLattice::default();
        let american = lattice
            .price(&itm_put(), OptionType::Put, ExerciseStyle::American, 32)
            .unwrap();
        let european = lattice
            .price(&itm_put(), OptionType::Put, ExerciseStyle::European, 32)
            .unwrap();
        assert_abs_diff_eq!(american.price.as_f64(), 15.5968, epsilon = 1e-3);
        assert_abs_diff_eq!(european.price.as_f64(), 14.6211, epsilon = 1e-3);
        assert!(american.price >= european.price);
        assert_eq!(american.steps, 32);
    }

    #[test]
    fn test_early_exercise_premium() {
        let lattice = BinomialLattice::default();
        let premium = lattice.early_exercise_premium(&itm_put(), OptionType::Put, 32).unwrap();
        assert_abs_diff_eq!(premium.as_f64(), 15.5968 - 14.6211, epsilon = 2e-3);

        // Without dividends an American call is never exercised early.
        let call_premium = lattice.early_exercise_premium(&atm(), OptionType::Call, 32).unwrap();
        assert!(call_premium.as_f64() < 1e-12);
    }

    #[test]
    fn test_delta_signs() {
        let lattice = BinomialLattice::default();
        let call = lattice.price(&atm(), OptionType::Call, ExerciseStyle::European, 32).unwrap();
        let put = lattice.price(&atm(), OptionType::Put, ExerciseStyle::European, 32).unwrap();
        assert!(call.delta > fp("0.55") && call.delta < fp("0.7"));
        assert!(put.delta.is_negative());
        assert_abs_diff_eq!(call.delta.as_f64() - put.delta.as_f64(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_step_lattice() {
        let result = BinomialLattice::default()
            .price(&atm(), OptionType::Call, ExerciseStyle::European, 1)
            .unwrap();
        let c = result.config;
        let up = 100.0 * c.up_factor.as_f64() - 100.0;
        let expected = c.discount_per_step.as_f64() * c.risk_neutral_probability.as_f64() * up;
        assert_abs_diff_eq!(result.price.as_f64(), expected, epsilon = 1e-12);
    }
}
