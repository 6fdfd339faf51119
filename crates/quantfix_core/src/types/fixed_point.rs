//! Signed fixed-point decimal with 18 fractional digits.
//!
//! [`FixedPoint`] wraps an `i128` holding the value multiplied by `10^18`.
//! The representable range is symmetric, `[-MAX, MAX]`: the raw value
//! `i128::MIN` is never produced, so negation and `abs` cannot overflow.
//!
//! ## Rounding
//!
//! `mul` and `div` truncate toward zero. The exact 256-bit intermediate is
//! kept whenever the 128-bit fast path would overflow, so each operation
//! loses at most one unit in the last place.
//!
//! ## Boundary
//!
//! The raw scaled integer is the wire format: [`FixedPoint::raw`] and
//! [`FixedPoint::from_raw`] are exact, and the optional `serde` feature
//! serialises the raw `i128` directly.

use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use num_traits::{Bounded, ToPrimitive};

use super::error::ArithmeticError;
use super::wide::{div_u256_by_u128, mul_u128};

/// Number of fractional decimal digits.
pub const DECIMALS: u32 = 18;

/// Scale factor `10^18` between a value and its raw representation.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

const SCALE_U: u128 = SCALE as u128;

/// An 18-digit signed fixed-point decimal.
///
/// Immutable value type; all fallible arithmetic returns
/// `Result<FixedPoint, ArithmeticError>`.
///
/// # Examples
///
/// ```
/// use quantfix_core::types::FixedPoint;
///
/// let a: FixedPoint = "1.5".parse().unwrap();
/// let b = FixedPoint::from_int(2);
/// assert_eq!(a.mul(b).unwrap(), FixedPoint::from_int(3));
/// assert_eq!(a.raw(), 1_500_000_000_000_000_000);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "i128", into = "i128")
)]
pub struct FixedPoint(i128);

#[allow(clippy::should_implement_trait)]
impl FixedPoint {
    /// Zero.
    pub const ZERO: Self = Self(0);
    /// One.
    pub const ONE: Self = Self(SCALE);
    /// Two.
    pub const TWO: Self = Self(2 * SCALE);
    /// One half.
    pub const HALF: Self = Self(SCALE / 2);
    /// Largest representable value.
    pub const MAX: Self = Self(i128::MAX);
    /// Smallest representable value, `-MAX`.
    pub const MIN: Self = Self(-i128::MAX);
    /// One unit in the last place, `10^-18`.
    pub const EPSILON: Self = Self(1);

    // ========================================
    // Construction
    // ========================================

    /// Creates a value from its raw scaled integer.
    ///
    /// # Errors
    /// `RangeOverflow` for `i128::MIN`, which lies outside the symmetric range.
    #[inline]
    pub fn from_raw(raw: i128) -> Result<Self, ArithmeticError> {
        if raw == i128::MIN {
            return Err(ArithmeticError::overflow("from_raw"));
        }
        Ok(Self(raw))
    }

    /// Compile-time constructor for constants.
    ///
    /// Fails const evaluation when given `i128::MIN`.
    #[inline]
    pub const fn from_raw_const(raw: i128) -> Self {
        assert!(raw != i128::MIN, "raw value outside the symmetric range");
        Self(raw)
    }

    /// Returns the raw scaled integer.
    #[inline]
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Converts an integer. Every `i64` is representable.
    #[inline]
    pub const fn from_int(value: i64) -> Self {
        Self(value as i128 * SCALE)
    }

    /// Converts a 128-bit integer, failing when it is out of range.
    pub fn try_from_int(value: i128) -> Result<Self, ArithmeticError> {
        value
            .checked_mul(SCALE)
            .ok_or(ArithmeticError::overflow("from_int"))
            .and_then(Self::from_raw)
    }

    /// Exact-as-possible quotient `numerator / denominator`.
    ///
    /// # Errors
    /// `DivideByZero` when `denominator` is zero.
    pub fn from_ratio(numerator: i64, denominator: i64) -> Result<Self, ArithmeticError> {
        Self::from_int(numerator).div(Self::from_int(denominator))
    }

    // ========================================
    // Predicates
    // ========================================

    /// Returns `true` for zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` for values strictly above zero.
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` for values strictly below zero.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    // ========================================
    // Arithmetic
    // ========================================

    /// Checked addition.
    #[inline]
    pub fn add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        Self::checked(self.0.checked_add(rhs.0), "add")
    }

    /// Checked subtraction.
    #[inline]
    pub fn sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        Self::checked(self.0.checked_sub(rhs.0), "sub")
    }

    /// Multiplication truncated toward zero.
    ///
    /// # Errors
    /// `RangeOverflow` when the product is out of range.
    pub fn mul(self, rhs: Self) -> Result<Self, ArithmeticError> {
        if let Some(product) = self.0.checked_mul(rhs.0) {
            return Self::checked(Some(product / SCALE), "mul");
        }
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let (high, low) = mul_u128(self.0.unsigned_abs(), rhs.0.unsigned_abs());
        let magnitude =
            div_u256_by_u128(high, low, SCALE_U).ok_or(ArithmeticError::overflow("mul"))?;
        Self::from_magnitude(magnitude, negative, "mul")
    }

    /// Division truncated toward zero.
    ///
    /// # Errors
    /// `DivideByZero` when `rhs` is zero, `RangeOverflow` when the quotient
    /// is out of range.
    pub fn div(self, rhs: Self) -> Result<Self, ArithmeticError> {
        if rhs.0 == 0 {
            return Err(ArithmeticError::DivideByZero { dividend: self });
        }
        if let Some(scaled) = self.0.checked_mul(SCALE) {
            return Self::checked(scaled.checked_div(rhs.0), "div");
        }
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let (high, low) = mul_u128(self.0.unsigned_abs(), SCALE_U);
        let magnitude = div_u256_by_u128(high, low, rhs.0.unsigned_abs())
            .ok_or(ArithmeticError::overflow("div"))?;
        Self::from_magnitude(magnitude, negative, "div")
    }

    /// Multiplication by an integer (exact).
    #[inline]
    pub fn mul_int(self, rhs: i64) -> Result<Self, ArithmeticError> {
        Self::checked(self.0.checked_mul(rhs as i128), "mul_int")
    }

    /// Division by an integer, truncated toward zero.
    #[inline]
    pub fn div_int(self, rhs: i64) -> Result<Self, ArithmeticError> {
        if rhs == 0 {
            return Err(ArithmeticError::DivideByZero { dividend: self });
        }
        Self::checked(self.0.checked_div(rhs as i128), "div_int")
    }

    /// Half of the value, truncated toward zero.
    #[inline]
    pub const fn half(self) -> Self {
        Self(self.0 / 2)
    }

    /// Absolute value. Never overflows on the symmetric range.
    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Integer power by binary exponentiation.
    ///
    /// Each multiplication truncates; negative exponents take the reciprocal
    /// of the positive power.
    pub fn powi(self, exponent: i32) -> Result<Self, ArithmeticError> {
        let mut result = Self::ONE;
        let mut base = self;
        let mut n = exponent.unsigned_abs();
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(base)?;
            }
            n >>= 1;
            if n > 0 {
                base = base.mul(base)?;
            }
        }
        if exponent < 0 {
            Self::ONE.div(result)
        } else {
            Ok(result)
        }
    }

    // ========================================
    // Integer projections
    // ========================================

    /// Integer part, truncated toward zero.
    #[inline]
    pub const fn trunc_to_int(self) -> i128 {
        self.0 / SCALE
    }

    /// Nearest integer, ties away from zero.
    pub const fn round_to_int(self) -> i128 {
        let whole = self.0 / SCALE;
        let rem = self.0 % SCALE;
        if rem.abs() * 2 >= SCALE {
            whole + self.0.signum()
        } else {
            whole
        }
    }

    /// Lossy conversion for reporting. Never used on a computational path.
    pub fn as_f64(self) -> f64 {
        (self.0 / SCALE) as f64 + (self.0 % SCALE) as f64 / SCALE as f64
    }

    // ========================================
    // Helpers
    // ========================================

    #[inline]
    fn checked(raw: Option<i128>, operation: &'static str) -> Result<Self, ArithmeticError> {
        match raw {
            Some(value) if value != i128::MIN => Ok(Self(value)),
            _ => Err(ArithmeticError::overflow(operation)),
        }
    }

    fn from_magnitude(
        magnitude: u128,
        negative: bool,
        operation: &'static str,
    ) -> Result<Self, ArithmeticError> {
        let value = i128::try_from(magnitude).map_err(|_| ArithmeticError::overflow(operation))?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Neg for FixedPoint {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl From<i64> for FixedPoint {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl From<i32> for FixedPoint {
    fn from(value: i32) -> Self {
        Self::from_int(value as i64)
    }
}

impl TryFrom<i128> for FixedPoint {
    type Error = ArithmeticError;

    /// Interprets the integer as a raw scaled value.
    fn try_from(raw: i128) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<FixedPoint> for i128 {
    fn from(value: FixedPoint) -> Self {
        value.0
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / SCALE_U;
        let frac = magnitude % SCALE_U;
        if self.0 < 0 {
            f.write_str("-")?;
        }
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:018}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint({})", self)
    }
}

impl FromStr for FixedPoint {
    type Err = ArithmeticError;

    /// Parses `[+-]digits[.digits]` with at most 18 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || ArithmeticError::ParseError(s.to_string());

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty()
            || (body.contains('.') && frac.is_empty())
            || frac.len() > DECIMALS as usize
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(parse_err());
        }

        let overflow = || ArithmeticError::overflow("parse");
        let mut magnitude: u128 = 0;
        for digit in whole.bytes().chain(frac.bytes()) {
            magnitude = magnitude
                .checked_mul(10)
                .and_then(|m| m.checked_add((digit - b'0') as u128))
                .ok_or_else(overflow)?;
        }
        for _ in frac.len()..DECIMALS as usize {
            magnitude = magnitude.checked_mul(10).ok_or_else(overflow)?;
        }
        Self::from_magnitude(magnitude, negative, "parse")
    }
}

impl ToPrimitive for FixedPoint {
    fn to_i64(&self) -> Option<i64> {
        i64::try_from(self.trunc_to_int()).ok()
    }

    fn to_u64(&self) -> Option<u64> {
        u64::try_from(self.trunc_to_int()).ok()
    }

    fn to_i128(&self) -> Option<i128> {
        Some(self.trunc_to_int())
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.as_f64())
    }
}

impl Bounded for FixedPoint {
    fn min_value() -> Self {
        Self::MIN
    }

    fn max_value() -> Self {
        Self::MAX
    }
}
