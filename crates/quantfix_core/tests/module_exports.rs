//! Integration tests for module exports.
//!
//! Verify that all public modules and types are correctly exported and
//! accessible via absolute paths.

/// Test that the numeric type and its constants are reachable.
#[test]
fn test_types_module_exports() {
    use quantfix_core::types::error::{ArithmeticError, PricingError, SolverError};
    use quantfix_core::types::fixed_point::{FixedPoint, DECIMALS, SCALE};

    assert_eq!(DECIMALS, 18);
    assert_eq!(SCALE, 10_i128.pow(DECIMALS));
    assert_eq!(FixedPoint::ONE.raw(), SCALE);

    let arithmetic = ArithmeticError::overflow("mul");
    let pricing: PricingError = arithmetic.clone().into();
    let solver: SolverError = arithmetic.into();
    assert!(matches!(pricing, PricingError::Arithmetic(_)));
    assert!(matches!(solver, SolverError::Arithmetic(_)));
}

/// Test that the math modules are accessible via absolute path.
#[test]
fn test_math_module_exports() {
    use quantfix_core::math::complex::Complex;
    use quantfix_core::math::constants::{E, FRAC_1_PI, FRAC_1_SQRT_2PI, LN2, PI};
    use quantfix_core::math::elementary::{exp, ln, sqrt, EXP_TERMS, LN_TERMS};
    use quantfix_core::math::quadrature::GaussLegendre;
    use quantfix_core::math::solvers::{
        NewtonRaphsonSolver, RootEstimate, SolverConfig, Termination, MAX_ITERATIONS_CAP,
    };
    use quantfix_core::math::trig::{atan, atan2, sin_cos, ATAN_TERMS, SIN_COS_TERMS};
    use quantfix_core::types::FixedPoint;

    assert_eq!(EXP_TERMS, 18);
    assert_eq!(LN_TERMS, 14);
    assert_eq!(SIN_COS_TERMS, 10);
    assert_eq!(ATAN_TERMS, 14);
    assert_eq!(MAX_ITERATIONS_CAP, 32);
    assert_eq!(GaussLegendre::ORDER, 8);

    assert!(exp(FixedPoint::ONE).unwrap() > FixedPoint::TWO);
    assert!((ln(E).unwrap().raw() - FixedPoint::ONE.raw()).abs() < 100);
    assert_eq!(sqrt(FixedPoint::from_int(4)).unwrap(), FixedPoint::TWO);
    assert!(atan(FixedPoint::ONE).unwrap() < PI);
    assert!(atan2(FixedPoint::ONE, FixedPoint::ONE).is_ok());
    assert!(sin_cos(LN2).is_ok());
    assert!(FRAC_1_PI < FRAC_1_SQRT_2PI);
    assert_eq!(Complex::ONE.modulus().unwrap(), FixedPoint::ONE);

    let estimate: RootEstimate = NewtonRaphsonSolver::new(SolverConfig::default())
        .solve::<_, quantfix_core::types::ArithmeticError>(
            |x| Ok((x.sub(FixedPoint::HALF)?, FixedPoint::ONE)),
            FixedPoint::ZERO,
        )
        .unwrap();
    assert_eq!(estimate.termination, Termination::Converged);
    assert_eq!(estimate.root, FixedPoint::HALF);
}
