//! Trigonometric kernel for polar decomposition of complex values.
//!
//! Angles are reduced in two stages: first to `[-π, π]` by the nearest
//! multiple of `2π`, then by the nearest quadrant `q·π/2`, leaving
//! `|y| ≤ π/4` for the Taylor series. The quadrant rotation is exact.
//!
//! Arguments much larger than `2π` lose accuracy at roughly one unit in the
//! last place per multiple of `2π` removed, since the stored `2π` is rounded.

use crate::math::constants::{HALF_PI, PI, TWO_PI};
use crate::math::elementary::{nearest_multiple, reduce, sqrt};
use crate::types::{ArithmeticError, FixedPoint};

/// Taylor terms beyond the leading term for `sin` and `cos`.
pub const SIN_COS_TERMS: i64 = 10;

/// Series terms for `atan` after argument halving.
pub const ATAN_TERMS: i64 = 14;

/// Simultaneous sine and cosine, returned as `(sin x, cos x)`.
///
/// # Examples
/// ```
/// use quantfix_core::math::trig::sin_cos;
/// use quantfix_core::math::constants::HALF_PI;
/// use quantfix_core::types::FixedPoint;
///
/// let (s, c) = sin_cos(HALF_PI).unwrap();
/// assert_eq!(s, FixedPoint::ONE);
/// assert!(c.abs().raw() < 10);
/// ```
pub fn sin_cos(x: FixedPoint) -> Result<(FixedPoint, FixedPoint), ArithmeticError> {
    let turns = nearest_multiple(x.raw(), TWO_PI.raw());
    let r = reduce(x, turns, TWO_PI)?;

    let quadrant = nearest_multiple(r.raw(), HALF_PI.raw());
    let y = reduce(r, quadrant, HALF_PI)?;
    let y2 = y.mul(y)?;

    let mut sin = y;
    let mut term = y;
    for n in 1..=SIN_COS_TERMS {
        term = -term.mul(y2)?.div_int((2 * n) * (2 * n + 1))?;
        sin = sin.add(term)?;
    }

    let mut cos = FixedPoint::ONE;
    let mut term = FixedPoint::ONE;
    for n in 1..=SIN_COS_TERMS {
        term = -term.mul(y2)?.div_int((2 * n - 1) * (2 * n))?;
        cos = cos.add(term)?;
    }

    Ok(match quadrant.rem_euclid(4) {
        0 => (sin, cos),
        1 => (cos, -sin),
        2 => (-sin, -cos),
        _ => (-cos, sin),
    })
}

/// Arctangent for `|z| ≤ 1`.
///
/// Halves the angle twice with `z / (1 + √(1 + z²))` so the series argument
/// stays below `tan(π/16)`, then scales the result by four.
fn atan_unit(z: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
    let mut z = z;
    for _ in 0..2 {
        let radius = sqrt(FixedPoint::ONE.add(z.mul(z)?)?)?;
        z = z.div(FixedPoint::ONE.add(radius)?)?;
    }

    let z2 = z.mul(z)?;
    let mut term = z;
    let mut acc = z;
    for n in 1..ATAN_TERMS {
        term = -term.mul(z2)?;
        acc = acc.add(term.div_int(2 * n + 1)?)?;
    }
    acc.mul_int(4)
}

/// Arctangent over the full line, result in `(-π/2, π/2)`.
///
/// # Examples
/// ```
/// use quantfix_core::math::trig::atan;
/// use quantfix_core::types::FixedPoint;
///
/// let a = atan(FixedPoint::ONE).unwrap();
/// assert!((a.as_f64() - std::f64::consts::FRAC_PI_4).abs() < 1e-16);
/// ```
pub fn atan(x: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
    if x.abs() <= FixedPoint::ONE {
        return atan_unit(x);
    }
    let inner = atan_unit(FixedPoint::ONE.div(x)?)?;
    if x.is_positive() {
        HALF_PI.sub(inner)
    } else {
        (-HALF_PI).sub(inner)
    }
}

/// Four-quadrant arctangent of `y / x`, result in `[-π, π]`.
///
/// On the negative real axis (`y = 0`, `x < 0`) the result is `+π`. The
/// value `-π` only appears when `y < 0` and `y / x` truncates to zero.
///
/// # Errors
/// `DomainError` when both arguments are zero.
pub fn atan2(y: FixedPoint, x: FixedPoint) -> Result<FixedPoint, ArithmeticError> {
    if x.is_zero() && y.is_zero() {
        return Err(ArithmeticError::domain("atan2", x));
    }

    if x.abs() >= y.abs() {
        let angle = atan_unit(y.div(x)?)?;
        if x.is_positive() {
            Ok(angle)
        } else if y.is_negative() {
            angle.sub(PI)
        } else {
            angle.add(PI)
        }
    } else {
        let angle = atan_unit(x.div(y)?)?;
        let axis = if y.is_positive() { HALF_PI } else { -HALF_PI };
        axis.sub(angle)
    }
}
