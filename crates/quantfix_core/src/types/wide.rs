//! 256-bit intermediates for fixed-point multiplication and division.
//!
//! A product of two scaled `i128` values needs up to 254 bits before it is
//! rescaled. These helpers keep that intermediate exact so the only rounding
//! step is the final truncating division.

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two unsigned 128-bit values as `(high, low)`.
#[inline]
pub(crate) fn mul_u128(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LOW_MASK);
    let (b1, b0) = (b >> 64, b & LOW_MASK);

    let ll = a0 * b0;
    let lh = a0 * b1;
    let hl = a1 * b0;
    let hh = a1 * b1;

    // Each addend is below 2^64, so the sum fits comfortably.
    let mid = (ll >> 64) + (lh & LOW_MASK) + (hl & LOW_MASK);

    let low = (ll & LOW_MASK) | (mid << 64);
    let high = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (high, low)
}

/// Truncating division of the 256-bit value `(high, low)` by `divisor`.
///
/// Returns `None` when the divisor is zero or the quotient does not fit in
/// 128 bits. Runs a fixed 128-step shift-subtract loop.
pub(crate) fn div_u256_by_u128(high: u128, low: u128, divisor: u128) -> Option<u128> {
    if divisor == 0 || high >= divisor {
        return None;
    }

    let mut remainder = high;
    let mut quotient: u128 = 0;

    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        // With the carry set the shifted remainder is at least 2^128 > divisor.
        if carry == 1 || remainder >= divisor {
            remainder = remainder.wrapping_sub(divisor);
            quotient |= 1;
        }
    }

    Some(quotient)
}
