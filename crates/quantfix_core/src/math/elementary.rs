//! Elementary functions: `exp`, `ln`, `sqrt`.
//!
//! All three are pure integer algorithms over [`FixedPoint`] with fixed
//! term counts, so results are bit-identical on every platform.
//!
//! ## Error bounds
//!
//! | function | method | bound |
//! |---|---|---|
//! | `exp` | `x = k·ln2 + r`, 18-term Taylor in `r`, scale by `2^k` | relative `< 5e-17` for `x ≥ 0`, absolute `< 1e-17` for `x < 0` |
//! | `ln` | normalise to `[√½, √2]`, 14-term `atanh` series in `(m-1)/(m+1)` | absolute `< 1e-16` |
//! | `sqrt` | integer Newton on `raw·10^18` | floor of the exact root |

use crate::math::constants::{LN2, SQRT_2};
use crate::types::{ArithmeticError, FixedPoint, SCALE};

/// Taylor terms for `exp` on `|r| ≤ ln2/2`.
pub const EXP_TERMS: i64 = 18;

/// `atanh` series terms for `ln` on `|s| ≤ 0.172`.
pub const LN_TERMS: i64 = 14;

/// Below this argument `exp` underflows to zero.
const EXP_UNDERFLOW: i128 = -42 * SCALE;

/// Above this argument `exp` cannot be represented (`ln MAX ≈ 46.58`).
const EXP_OVERFLOW: i128 = 47 * SCALE;

/// Nearest integer multiple of `unit` to `x`, ties away from zero.
///
/// Both arguments are raw values; `unit` must be positive.
pub(crate) fn nearest_multiple(x: i128, unit: i128) -> i128 {
    let half = unit / 2;
    let shifted = if x >= 0 {
        x.saturating_add(half)
    } else {
        x.saturating_sub(half)
    };
    shifted / unit
}

/// Remainder `x - k·unit` for an integer multiple `k`.
pub(crate) fn reduce(x: FixedPoint, k: i128, unit: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
    k.checked_mul(unit.raw())
        .and_then(|offset| x.raw().checked_sub(offset))
        .ok_or(ArithmeticError::overflow("reduce"))
        .and_then(FixedPoint::from_raw)
}

/// Natural exponential `e^x`.
///
/// # Errors
/// `RangeOverflow` when `e^x` exceeds [`FixedPoint::MAX`].
///
/// # Examples
/// ```
/// use quantfix_core::math::elementary::exp;
/// use quantfix_core::types::FixedPoint;
///
/// assert_eq!(exp(FixedPoint::ZERO).unwrap(), FixedPoint::ONE);
/// assert_eq!(exp(FixedPoint::from_int(-50)).unwrap(), FixedPoint::ZERO);
/// ```
pub fn exp(x: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
    if x.raw() < EXP_UNDERFLOW {
        return Ok(FixedPoint::ZERO);
    }
    if x.raw() > EXP_OVERFLOW {
        return Err(ArithmeticError::overflow("exp"));
    }

    let k = nearest_multiple(x.raw(), LN2.raw());
    let r = reduce(x, k, LN2)?;

    let mut term = FixedPoint::ONE;
    let mut acc = FixedPoint::ONE;
    for n in 1..=EXP_TERMS {
        term = term.mul(r)?.div_int(n)?;
        acc = acc.add(term)?;
    }

    if k >= 0 {
        if k > 126 {
            return Err(ArithmeticError::overflow("exp"));
        }
        acc.raw()
            .checked_mul(1_i128 << k)
            .ok_or(ArithmeticError::overflow("exp"))
            .and_then(FixedPoint::from_raw)
    } else if k <= -127 {
        Ok(FixedPoint::ZERO)
    } else {
        FixedPoint::from_raw(acc.raw() >> (-k))
    }
}

/// Natural logarithm.
///
/// # Errors
/// `DomainError` when `x ≤ 0`.
///
/// # Examples
/// ```
/// use quantfix_core::math::elementary::ln;
/// use quantfix_core::types::FixedPoint;
///
/// assert_eq!(ln(FixedPoint::ONE).unwrap(), FixedPoint::ZERO);
/// assert!(ln(FixedPoint::ZERO).is_err());
/// ```
pub fn ln(x: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
    if !x.is_positive() {
        return Err(ArithmeticError::domain("ln", x));
    }

    // Normalise the mantissa into [1, 2), then fold into [√½, √2].
    let mut m = x.raw();
    let mut k: i64 = 0;
    while m >= 2 * SCALE {
        m >>= 1;
        k += 1;
    }
    while m < SCALE {
        m <<= 1;
        k -= 1;
    }
    if m > SQRT_2.raw() {
        m >>= 1;
        k += 1;
    }
    let m = FixedPoint::from_raw(m)?;

    let s = m.sub(FixedPoint::ONE)?.div(m.add(FixedPoint::ONE)?)?;
    let s2 = s.mul(s)?;
    let mut term = s;
    let mut acc = s;
    for n in 1..LN_TERMS {
        term = term.mul(s2)?;
        acc = acc.add(term.div_int(2 * n + 1)?)?;
    }

    acc.mul_int(2)?.add(LN2.mul_int(k)?)
}

/// Square root, the floor of the exact root at 18 digits.
///
/// # Errors
/// `DomainError` when `x < 0`. The square root of zero is zero.
///
/// # Examples
/// ```
/// use quantfix_core::math::elementary::sqrt;
/// use quantfix_core::types::FixedPoint;
///
/// assert_eq!(sqrt(FixedPoint::from_int(9)).unwrap(), FixedPoint::from_int(3));
/// assert_eq!(sqrt(FixedPoint::ZERO).unwrap(), FixedPoint::ZERO);
/// ```
pub fn sqrt(x: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
    if x.is_negative() {
        return Err(ArithmeticError::domain("sqrt", x));
    }
    if x.is_zero() {
        return Ok(FixedPoint::ZERO);
    }

    let raw = x.raw().unsigned_abs();
    let scale = SCALE as u128;
    let root = match raw.checked_mul(scale) {
        Some(n) => isqrt(n),
        None => {
            // sqrt(raw·S) = sqrt((raw / 4^j)·S) · 2^j
            let mut j = 0;
            while (raw >> (2 * j)).checked_mul(scale).is_none() {
                j += 1;
            }
            isqrt((raw >> (2 * j)) * scale) << j
        }
    };
    i128::try_from(root)
        .map_err(|_| ArithmeticError::overflow("sqrt"))
        .and_then(FixedPoint::from_raw)
}

/// Integer square root by Newton's method, `floor(√n)`.
pub(crate) fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x: u128 = 1 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

impl FixedPoint {
    /// `e^self`. See [`exp`].
    pub fn exp(self) -> Result<Self, ArithmeticError> {
        exp(self)
    }

    /// `ln(self)`. See [`ln`].
    pub fn ln(self) -> Result<Self, ArithmeticError> {
        ln(self)
    }

    /// `√self`. See [`sqrt`].
    pub fn sqrt(self) -> Result<Self, ArithmeticError> {
        sqrt(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn fp(s: &str) -> FixedPoint {
        s.parse().unwrap()
    }

    // ========================================
    // exp
    // ========================================

    #[test]
    fn test_exp_one_is_e() {
        let e = exp(FixedPoint::ONE).unwrap();
        assert!((e.raw() - crate::math::constants::E.raw()).abs() <= 200);
    }

    #[test]
    fn test_exp_matches_f64() {
        for s in ["0.1", "1.7", "10", "30"] {
            let x = fp(s);
            assert_relative_eq!(
                exp(x).unwrap().as_f64(),
                x.as_f64().exp(),
                max_relative = 1e-14
            );
        }
        // Negative arguments carry an absolute bound.
        for s in ["-20", "-3.5", "-0.5"] {
            let x = fp(s);
            assert_abs_diff_eq!(exp(x).unwrap().as_f64(), x.as_f64().exp(), epsilon = 1e-16);
        }
    }

    #[test]
    fn test_exp_underflow_and_overflow() {
        assert_eq!(exp(fp("-42.5")).unwrap(), FixedPoint::ZERO);
        assert!(exp(fp("-41")).unwrap().is_positive());
        assert!(exp(fp("46")).is_ok());
        assert_eq!(
            exp(fp("47")).unwrap_err(),
            ArithmeticError::RangeOverflow { operation: "exp" }
        );
        assert!(exp(FixedPoint::MAX).is_err());
        assert_eq!(exp(FixedPoint::MIN).unwrap(), FixedPoint::ZERO);
    }

    #[test]
    fn test_exp_is_monotone_on_grid() {
        let mut previous = FixedPoint::ZERO;
        for i in -400..=400 {
            let value = exp(FixedPoint::from_ratio(i, 10).unwrap()).unwrap();
            assert!(value >= previous);
            previous = value;
        }
    }

    // ========================================
    // ln
    // ========================================

    #[test]
    fn test_ln_two() {
        let l = ln(FixedPoint::TWO).unwrap();
        assert!((l.raw() - LN2.raw()).abs() <= 100);
    }

    #[test]
    fn test_ln_matches_f64() {
        for s in ["0.000001", "0.5", "0.9677", "1.5", "3.7", "1000", "1000000000"] {
            let x = fp(s);
            assert_abs_diff_eq!(ln(x).unwrap().as_f64(), x.as_f64().ln(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ln_extremes() {
        assert_abs_diff_eq!(
            ln(FixedPoint::EPSILON).unwrap().as_f64(),
            -18.0 * std::f64::consts::LN_10,
            epsilon = 1e-12
        );
        assert!(ln(FixedPoint::MAX).is_ok());
    }

    #[test]
    fn test_ln_domain() {
        assert_eq!(
            ln(fp("-1")).unwrap_err(),
            ArithmeticError::DomainError {
                operation: "ln",
                value: fp("-1")
            }
        );
        assert!(ln(FixedPoint::ZERO).is_err());
    }

    #[test]
    fn test_ln_inverts_exp() {
        for s in ["-5", "-0.25", "0.75", "4"] {
            let x = fp(s);
            let back = ln(exp(x).unwrap()).unwrap();
            assert_abs_diff_eq!(back.as_f64(), x.as_f64(), epsilon = 1e-15);
        }
    }

    // ========================================
    // sqrt
    // ========================================

    #[test]
    fn test_sqrt_exact_squares() {
        assert_eq!(sqrt(fp("2.25")).unwrap(), fp("1.5"));
        assert_eq!(sqrt(fp("0.0001")).unwrap(), fp("0.01"));
        assert_eq!(sqrt(FixedPoint::ONE).unwrap(), FixedPoint::ONE);
    }

    #[test]
    fn test_sqrt_two_is_floor() {
        assert_eq!(sqrt(FixedPoint::TWO).unwrap().raw(), 1_414_213_562_373_095_048);
    }

    #[test]
    fn test_sqrt_large_operand() {
        let big = FixedPoint::try_from_int(100_000_000_000_000_000_000).unwrap();
        assert_relative_eq!(sqrt(big).unwrap().as_f64(), 1e10, max_relative = 1e-15);
        let root = sqrt(FixedPoint::MAX).unwrap();
        assert_relative_eq!(root.as_f64(), FixedPoint::MAX.as_f64().sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn test_sqrt_negative_is_domain_error() {
        assert!(matches!(
            sqrt(fp("-0.01")),
            Err(ArithmeticError::DomainError { operation: "sqrt", .. })
        ));
    }

    #[test]
    fn test_isqrt_small() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(u128::MAX), u64::MAX as u128);
    }

    #[test]
    fn test_nearest_multiple_ties_away_from_zero() {
        assert_eq!(nearest_multiple(15, 10), 2);
        assert_eq!(nearest_multiple(-15, 10), -2);
        assert_eq!(nearest_multiple(14, 10), 1);
        assert_eq!(nearest_multiple(-4, 10), 0);
    }
}
