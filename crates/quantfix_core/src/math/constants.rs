//! Mathematical constants at 18-digit precision.
//!
//! Each raw value is the exact constant multiplied by `10^18` and rounded to
//! the nearest integer.

use crate::types::FixedPoint;

/// Euler's number `e`.
pub const E: FixedPoint = FixedPoint::from_raw_const(2_718_281_828_459_045_235);

/// `ln 2`.
pub const LN2: FixedPoint = FixedPoint::from_raw_const(693_147_180_559_945_309);

/// `π`.
pub const PI: FixedPoint = FixedPoint::from_raw_const(3_141_592_653_589_793_238);

/// `2π`.
pub const TWO_PI: FixedPoint = FixedPoint::from_raw_const(6_283_185_307_179_586_477);

/// `π/2`.
pub const HALF_PI: FixedPoint = FixedPoint::from_raw_const(1_570_796_326_794_896_619);

/// `1/π`.
pub const FRAC_1_PI: FixedPoint = FixedPoint::from_raw_const(318_309_886_183_790_672);

/// `1/√(2π)`, the standard normal density at zero.
pub const FRAC_1_SQRT_2PI: FixedPoint = FixedPoint::from_raw_const(398_942_280_401_432_678);

/// `√2`.
pub const SQRT_2: FixedPoint = FixedPoint::from_raw_const(1_414_213_562_373_095_049);
