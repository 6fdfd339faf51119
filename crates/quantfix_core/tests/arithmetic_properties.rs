//! Property-based tests for fixed-point arithmetic and elementary functions.

use proptest::prelude::*;
use quantfix_core::math::complex::Complex;
use quantfix_core::math::constants::PI;
use quantfix_core::math::trig::{atan2, sin_cos};
use quantfix_core::types::{FixedPoint, SCALE};

/// Raw values covering the full symmetric range.
fn any_fixed() -> impl Strategy<Value = FixedPoint> {
    (-i128::MAX..=i128::MAX).prop_map(|raw| FixedPoint::from_raw(raw).unwrap())
}

/// Values in `[-bound, bound]` with full fractional precision.
fn bounded(bound: i64) -> impl Strategy<Value = FixedPoint> {
    let limit = bound as i128 * SCALE;
    (-limit..=limit).prop_map(|raw| FixedPoint::from_raw(raw).unwrap())
}

fn positive(bound: i64) -> impl Strategy<Value = FixedPoint> {
    let limit = bound as i128 * SCALE;
    (1..=limit).prop_map(|raw| FixedPoint::from_raw(raw).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // ========================================
    // Representation
    // ========================================

    #[test]
    fn display_parse_identity(x in any_fixed()) {
        let text = x.to_string();
        prop_assert_eq!(text.parse::<FixedPoint>().unwrap(), x);
    }

    #[test]
    fn negation_is_involutive(x in any_fixed()) {
        prop_assert_eq!(-(-x), x);
        prop_assert_eq!((-x).abs(), x.abs());
    }

    // ========================================
    // Field operations
    // ========================================

    #[test]
    fn add_sub_inverse(a in bounded(1_000_000_000), b in bounded(1_000_000_000)) {
        prop_assert_eq!(a.add(b).unwrap().sub(b).unwrap(), a);
        prop_assert_eq!(a.add(b).unwrap(), b.add(a).unwrap());
    }

    #[test]
    fn mul_is_commutative_and_sign_symmetric(a in bounded(1_000_000), b in bounded(1_000_000)) {
        let ab = a.mul(b).unwrap();
        prop_assert_eq!(ab, b.mul(a).unwrap());
        prop_assert_eq!((-a).mul(b).unwrap(), -ab);
        prop_assert_eq!(a.mul(FixedPoint::ONE).unwrap(), a);
    }

    #[test]
    fn div_then_mul_within_one_ulp_per_step(a in bounded(1_000), b in positive(1_000)) {
        prop_assume!(b >= "0.001".parse::<FixedPoint>().unwrap());
        let q = a.div(b).unwrap();
        let back = q.mul(b).unwrap();
        // Truncation of q costs at most |b| units; the product adds one more.
        let slack = b.raw() / SCALE + 2;
        prop_assert!((back.raw() - a.raw()).abs() <= slack);
    }

    // ========================================
    // Elementary functions
    // ========================================

    #[test]
    fn sqrt_is_exact_floor(raw in 0_i128..=340_000_000_000_000_000_000) {
        let x = FixedPoint::from_raw(raw).unwrap();
        let r = x.sqrt().unwrap().raw() as u128;
        let n = raw as u128 * SCALE as u128;
        prop_assert!(r * r <= n);
        prop_assert!((r + 1) * (r + 1) > n);
    }

    #[test]
    fn ln_inverts_exp(x in bounded(40)) {
        prop_assume!(x >= FixedPoint::from_int(-5));
        let back = x.exp().unwrap().ln().unwrap();
        prop_assert!((back.raw() - x.raw()).abs() < 10_000);
    }

    #[test]
    fn exp_matches_f64(x in bounded(40)) {
        let expected = x.as_f64().exp();
        let actual = x.exp().unwrap().as_f64();
        prop_assert!((actual - expected).abs() <= 1e-13 * expected.max(1.0));
    }

    #[test]
    fn ln_of_product_is_sum(a in positive(1_000), b in positive(1_000)) {
        prop_assume!(a >= "0.1".parse::<FixedPoint>().unwrap());
        prop_assume!(b >= "0.1".parse::<FixedPoint>().unwrap());
        let lhs = a.mul(b).unwrap().ln().unwrap();
        let rhs = a.ln().unwrap().add(b.ln().unwrap()).unwrap();
        prop_assert!((lhs.raw() - rhs.raw()).abs() < 10_000);
    }

    // ========================================
    // Trigonometry and complex values
    // ========================================

    #[test]
    fn pythagorean_identity(x in bounded(100)) {
        let (s, c) = sin_cos(x).unwrap();
        let norm = s.mul(s).unwrap().add(c.mul(c).unwrap()).unwrap();
        prop_assert!((norm.raw() - SCALE).abs() < 100);
    }

    #[test]
    fn atan2_in_principal_range(y in bounded(1_000), x in bounded(1_000)) {
        prop_assume!(!(x.is_zero() && y.is_zero()));
        let angle = atan2(y, x).unwrap();
        prop_assert!(angle >= -PI && angle <= PI);
        prop_assert!((angle.as_f64() - y.as_f64().atan2(x.as_f64())).abs() < 1e-14);
    }

    #[test]
    fn modulus_is_multiplicative(a in bounded(100), b in bounded(100), c in bounded(100), d in bounded(100)) {
        let z = Complex::new(a, b);
        let w = Complex::new(c, d);
        let lhs = z.mul(w).unwrap().modulus().unwrap().as_f64();
        let rhs = z.modulus().unwrap().as_f64() * w.modulus().unwrap().as_f64();
        prop_assert!((lhs - rhs).abs() <= 1e-13 * rhs.max(1.0));
    }

    #[test]
    fn complex_sqrt_has_non_negative_real_part(a in bounded(100), b in bounded(100)) {
        let root = Complex::new(a, b).sqrt().unwrap();
        prop_assert!(!root.re.is_negative());
    }
}
