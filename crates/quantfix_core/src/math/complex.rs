//! Complex arithmetic on ordered pairs of [`FixedPoint`] values.
//!
//! ## Branch convention
//!
//! - `arg z` is the principal argument; the negative real axis maps to `+π`
//!   (see [`atan2`] for the truncation edge at `-π`).
//! - `sqrt z = √|z| · (cos θ/2, sin θ/2)` with `θ = arg z`, so the result
//!   always has a non-negative real part.
//! - `ln z = (ln |z|, arg z)`.
//!
//! Every operation is fallible because each component goes through checked
//! fixed-point arithmetic.

use std::fmt;
use std::ops::Neg;

use crate::math::elementary::{exp, ln, sqrt};
use crate::math::trig::{atan2, sin_cos};
use crate::types::{ArithmeticError, FixedPoint};

/// A complex number `re + i·im`.
///
/// # Examples
/// ```
/// use quantfix_core::math::complex::Complex;
/// use quantfix_core::types::FixedPoint;
///
/// let z = Complex::new(FixedPoint::from_int(3), FixedPoint::from_int(4));
/// assert_eq!(z.modulus().unwrap(), FixedPoint::from_int(5));
///
/// let w = Complex::I.mul(Complex::I).unwrap();
/// assert_eq!(w, Complex::from_real(-FixedPoint::ONE));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Complex {
    /// Real part.
    pub re: FixedPoint,
    /// Imaginary part.
    pub im: FixedPoint,
}

#[allow(clippy::should_implement_trait)]
impl Complex {
    /// `0 + 0i`.
    pub const ZERO: Self = Self::new(FixedPoint::ZERO, FixedPoint::ZERO);
    /// `1 + 0i`.
    pub const ONE: Self = Self::new(FixedPoint::ONE, FixedPoint::ZERO);
    /// The imaginary unit.
    pub const I: Self = Self::new(FixedPoint::ZERO, FixedPoint::ONE);

    /// Creates `re + i·im`.
    #[inline]
    pub const fn new(re: FixedPoint, im: FixedPoint) -> Self {
        Self { re, im }
    }

    /// Embeds a real value.
    #[inline]
    pub const fn from_real(re: FixedPoint) -> Self {
        Self::new(re, FixedPoint::ZERO)
    }

    /// Creates a purely imaginary value.
    #[inline]
    pub const fn from_imag(im: FixedPoint) -> Self {
        Self::new(FixedPoint::ZERO, im)
    }

    /// Returns `true` when both parts are zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    /// Complex conjugate.
    #[inline]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// Multiplication by `i`, exact.
    #[inline]
    pub fn mul_i(self) -> Self {
        Self::new(-self.im, self.re)
    }

    /// Component-wise sum.
    pub fn add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        Ok(Self::new(self.re.add(rhs.re)?, self.im.add(rhs.im)?))
    }

    /// Component-wise difference.
    pub fn sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        Ok(Self::new(self.re.sub(rhs.re)?, self.im.sub(rhs.im)?))
    }

    /// Product `(a + bi)(c + di) = (ac - bd) + (ad + bc)i`.
    pub fn mul(self, rhs: Self) -> Result<Self, ArithmeticError> {
        let re = self.re.mul(rhs.re)?.sub(self.im.mul(rhs.im)?)?;
        let im = self.re.mul(rhs.im)?.add(self.im.mul(rhs.re)?)?;
        Ok(Self::new(re, im))
    }

    /// Scales both parts by a real factor.
    pub fn scale(self, factor: FixedPoint) -> Result<Self, ArithmeticError> {
        Ok(Self::new(self.re.mul(factor)?, self.im.mul(factor)?))
    }

    /// Quotient by Smith's algorithm, which avoids forming `c² + d²`.
    ///
    /// # Errors
    /// `DivideByZero` when `rhs` is zero.
    pub fn div(self, rhs: Self) -> Result<Self, ArithmeticError> {
        let (a, b) = (self.re, self.im);
        let (c, d) = (rhs.re, rhs.im);
        if rhs.is_zero() {
            return Err(ArithmeticError::DivideByZero { dividend: a });
        }

        if c.abs() >= d.abs() {
            let ratio = d.div(c)?;
            let denom = c.add(d.mul(ratio)?)?;
            let re = a.add(b.mul(ratio)?)?.div(denom)?;
            let im = b.sub(a.mul(ratio)?)?.div(denom)?;
            Ok(Self::new(re, im))
        } else {
            let ratio = c.div(d)?;
            let denom = c.mul(ratio)?.add(d)?;
            let re = a.mul(ratio)?.add(b)?.div(denom)?;
            let im = b.mul(ratio)?.sub(a)?.div(denom)?;
            Ok(Self::new(re, im))
        }
    }

    /// Modulus `|z|`, computed as `m·√(1 + q²)` with `m = max(|re|, |im|)`
    /// and `q = min/max` so the squares never overflow.
    pub fn modulus(self) -> Result<FixedPoint, ArithmeticError> {
        let (x, y) = (self.re.abs(), self.im.abs());
        let (large, small) = if x >= y { (x, y) } else { (y, x) };
        if large.is_zero() {
            return Ok(FixedPoint::ZERO);
        }
        let q = small.div(large)?;
        let root = sqrt(FixedPoint::ONE.add(q.mul(q)?)?)?;
        large.mul(root)
    }

    /// Principal argument, `+π` on the negative real axis.
    ///
    /// # Errors
    /// `DomainError` for zero.
    pub fn arg(self) -> Result<FixedPoint, ArithmeticError> {
        atan2(self.im, self.re)
    }

    /// Principal square root. The square root of zero is zero.
    pub fn sqrt(self) -> Result<Self, ArithmeticError> {
        if self.is_zero() {
            return Ok(Self::ZERO);
        }
        let radius = sqrt(self.modulus()?)?;
        let (sin, cos) = sin_cos(self.arg()?.half())?;
        Ok(Self::new(radius.mul(cos)?, radius.mul(sin)?))
    }

    /// Principal natural logarithm `(ln |z|, arg z)`.
    ///
    /// # Errors
    /// `DomainError` for zero.
    pub fn ln(self) -> Result<Self, ArithmeticError> {
        if self.is_zero() {
            return Err(ArithmeticError::domain("complex ln", FixedPoint::ZERO));
        }
        Ok(Self::new(ln(self.modulus()?)?, self.arg()?))
    }

    /// Exponential `e^re · (cos im + i sin im)`.
    pub fn exp(self) -> Result<Self, ArithmeticError> {
        let magnitude = exp(self.re)?;
        let (sin, cos) = sin_cos(self.im)?;
        Ok(Self::new(magnitude.mul(cos)?, magnitude.mul(sin)?))
    }
}

impl Neg for Complex {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl From<FixedPoint> for Complex {
    fn from(re: FixedPoint) -> Self {
        Self::from_real(re)
    }
}

impl fmt::Debug for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Complex({} + {}i)", self.re, self.im)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_negative() {
            write!(f, "{} - {}i", self.re, self.im.abs())
        } else {
            write!(f, "{} + {}i", self.re, self.im)
        }
    }
}
