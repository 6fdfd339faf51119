//! Composite fixed-order Gauss-Legendre quadrature.
//!
//! The interval is split into equal panels and each panel is integrated with
//! the 8-point rule. There is no adaptive refinement: the number of
//! integrand evaluations is exactly `8 · panels`, which makes the cost and
//! the rounding sequence fully deterministic.

use crate::types::{ArithmeticError, FixedPoint};

/// Positive nodes of the 8-point rule on `[-1, 1]`. The rule is symmetric.
const NODES: [FixedPoint; 4] = [
    FixedPoint::from_raw_const(183_434_642_495_649_805),
    FixedPoint::from_raw_const(525_532_409_916_328_986),
    FixedPoint::from_raw_const(796_666_477_413_626_740),
    FixedPoint::from_raw_const(960_289_856_497_536_232),
];

/// Weights matching [`NODES`]; they sum to exactly one.
const WEIGHTS: [FixedPoint; 4] = [
    FixedPoint::from_raw_const(362_683_783_378_361_983),
    FixedPoint::from_raw_const(313_706_645_877_887_287),
    FixedPoint::from_raw_const(222_381_034_453_374_471),
    FixedPoint::from_raw_const(101_228_536_290_376_259),
];

/// Composite 8-point Gauss-Legendre rule.
///
/// # Examples
/// ```
/// use quantfix_core::math::quadrature::GaussLegendre;
/// use quantfix_core::types::{ArithmeticError, FixedPoint};
///
/// let rule = GaussLegendre::new(4).unwrap();
/// // ∫₀² x³ dx = 4
/// let area = rule
///     .integrate::<_, ArithmeticError>(
///         |x| x.mul(x)?.mul(x),
///         FixedPoint::ZERO,
///         FixedPoint::TWO,
///     )
///     .unwrap();
/// assert!((area.as_f64() - 4.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaussLegendre {
    panels: usize,
}

impl Default for GaussLegendre {
    /// [`GaussLegendre::DEFAULT_PANELS`] panels.
    fn default() -> Self {
        Self {
            panels: Self::DEFAULT_PANELS,
        }
    }
}

impl GaussLegendre {
    /// Points per panel.
    pub const ORDER: usize = 8;

    /// Panel count of the default rule.
    pub const DEFAULT_PANELS: usize = 32;

    /// Creates a rule with the given number of equal panels.
    ///
    /// # Errors
    /// `DomainError` when `panels` is zero.
    pub fn new(panels: usize) -> Result<Self, ArithmeticError> {
        if panels == 0 {
            return Err(ArithmeticError::domain("quadrature panels", FixedPoint::ZERO));
        }
        Ok(Self { panels })
    }

    /// Number of panels.
    pub fn panels(&self) -> usize {
        self.panels
    }

    /// Total integrand evaluations per call.
    pub fn evaluations(&self) -> usize {
        self.panels * Self::ORDER
    }

    /// Integrates `f` over `[a, b]`.
    ///
    /// The integrand may fail with any error type that arithmetic failures
    /// convert into; the first failure aborts the integration.
    pub fn integrate<F, E>(&self, mut f: F, a: FixedPoint, b: FixedPoint) -> Result<FixedPoint, E>
    where
        F: FnMut(FixedPoint) -> Result<FixedPoint, E>,
        E: From<ArithmeticError>,
    {
        let panels = i64::try_from(self.panels).map_err(|_| ArithmeticError::overflow("panels"))?;
        let width = b.sub(a)?.div_int(panels)?;
        let half = width.half();

        let mut acc = FixedPoint::ZERO;
        for k in 0..panels {
            let mid = a.add(width.mul_int(k)?)?.add(half)?;
            for (node, weight) in NODES.iter().zip(WEIGHTS.iter()) {
                let offset = half.mul(*node)?;
                let left = f(mid.sub(offset)?)?;
                let right = f(mid.add(offset)?)?;
                acc = acc.add(weight.mul(left)?)?.add(weight.mul(right)?)?;
            }
        }

        tracing::debug!(
            panels = self.panels,
            evaluations = self.evaluations(),
            "gauss-legendre integration complete"
        );

        Ok(acc.mul(half)?)
    }
}
