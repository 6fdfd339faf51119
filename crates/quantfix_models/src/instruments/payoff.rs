//! Vanilla option payoffs.

use quantfix_core::types::{ArithmeticError, FixedPoint};

/// Call or put.
///
/// # Examples
/// ```
/// use quantfix_models::instruments::OptionType;
/// use quantfix_core::types::FixedPoint;
///
/// let payoff = OptionType::Put
///     .intrinsic(FixedPoint::from_int(90), FixedPoint::from_int(100))
///     .unwrap();
/// assert_eq!(payoff, FixedPoint::from_int(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Right to buy at the strike.
    Call,
    /// Right to sell at the strike.
    Put,
}

impl OptionType {
    /// Exercise value `max(S - K, 0)` for a call, `max(K - S, 0)` for a put.
    #[inline]
    pub fn intrinsic(&self, spot: FixedPoint, strike: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
        let value = match self {
            OptionType::Call => spot.sub(strike)?,
            OptionType::Put => strike.sub(spot)?,
        };
        Ok(value.max(FixedPoint::ZERO))
    }

    /// Returns `true` for a call.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, OptionType::Call)
    }

    /// Returns `true` for a put.
    #[inline]
    pub fn is_put(&self) -> bool {
        matches!(self, OptionType::Put)
    }
}
