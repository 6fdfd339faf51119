//! Property-based tests for the pricing engines.
//!
//! Inputs are drawn on decimal grids inside the ranges where every engine
//! is well conditioned; the properties themselves are model-free bounds,
//! parity relations and orderings.

use proptest::prelude::*;
use quantfix_core::math::solvers::SolverConfig;
use quantfix_core::types::FixedPoint;
use quantfix_models::analytical::BlackScholes;
use quantfix_models::config::EngineConfig;
use quantfix_models::diagnostics::{cdf_symmetry_residual, satisfies_put_call_parity};
use quantfix_models::instruments::{ExerciseStyle, OptionParameters, OptionType};
use quantfix_models::lattice::BinomialLattice;
use quantfix_models::models::HestonParameters;
use quantfix_models::volatility::{LiquiditySurface, RealizedVolatilityEstimator};

/// `lo/100 ..= hi/100` in steps of 0.01.
fn hundredths(lo: i64, hi: i64) -> impl Strategy<Value = FixedPoint> {
    (lo..=hi).prop_map(|n| FixedPoint::from_ratio(n, 100).unwrap())
}

fn option_type() -> impl Strategy<Value = OptionType> {
    prop_oneof![Just(OptionType::Call), Just(OptionType::Put)]
}

/// Spot 100, strike within ±15%, moderate volatility and expiry.
fn option_parameters() -> impl Strategy<Value = OptionParameters> {
    (hundredths(8500, 11500), hundredths(15, 100), hundredths(0, 10), hundredths(25, 200)).prop_map(
        |(strike, volatility, rate, expiry)| {
            OptionParameters::new(FixedPoint::from_int(100), strike, volatility, rate, expiry).unwrap()
        },
    )
}

/// Spot 100 with volatility between 0.01% and 5%, where vega drops below
/// one unit of least precision.
fn low_volatility_parameters() -> impl Strategy<Value = OptionParameters> {
    (hundredths(8500, 11500), 1_i64..=500, hundredths(0, 10), hundredths(25, 200)).prop_map(
        |(strike, volatility, rate, expiry)| {
            let volatility = FixedPoint::from_ratio(volatility, 10_000).unwrap();
            OptionParameters::new(FixedPoint::from_int(100), strike, volatility, rate, expiry).unwrap()
        },
    )
}

/// Truncation noise allowed when comparing premiums of about 100.
const ROUNDING_SLACK: FixedPoint = FixedPoint::from_raw_const(1_000);

fn discounted(value: FixedPoint, params: &OptionParameters) -> FixedPoint {
    let df = (-params.risk_free_rate.mul(params.time_to_expiry).unwrap()).exp().unwrap();
    value.mul(df).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ========================================
    // Cumulative normal
    // ========================================

    #[test]
    fn cdf_is_a_probability(raw in -10_000_i64..=10_000) {
        let x = FixedPoint::from_ratio(raw, 1000).unwrap();
        let engine = BlackScholes::default();
        let p = engine.distribution().cdf(x).unwrap();
        prop_assert!(p >= FixedPoint::ZERO && p <= FixedPoint::ONE);
        prop_assert_eq!(cdf_symmetry_residual(engine.distribution(), x).unwrap(), FixedPoint::ZERO);
    }

    // ========================================
    // Black-Scholes
    // ========================================

    #[test]
    fn bsm_respects_no_arbitrage_bounds(params in option_parameters()) {
        let (call, put) = BlackScholes::default().price_pair(&params).unwrap();
        let pv_strike = discounted(params.strike, &params);
        let slack = "0.00001".parse::<FixedPoint>().unwrap();

        prop_assert!(call <= params.spot);
        prop_assert!(put <= pv_strike);
        prop_assert!(call.add(slack).unwrap() >= params.spot.sub(pv_strike).unwrap().max(FixedPoint::ZERO));
        prop_assert!(put.add(slack).unwrap() >= pv_strike.sub(params.spot).unwrap().max(FixedPoint::ZERO));
    }

    #[test]
    fn bsm_parity_within_configured_tolerance(params in option_parameters()) {
        let config = EngineConfig::default();
        prop_assert!(satisfies_put_call_parity(&config.black_scholes(), &params, config.parity_tolerance).unwrap());
    }

    #[test]
    fn greeks_have_the_right_signs(params in option_parameters(), option_type in option_type()) {
        let greeks = BlackScholes::default().greeks(&params, option_type).unwrap();
        prop_assert!(!greeks.gamma.is_negative());
        prop_assert!(!greeks.vega.is_negative());
        prop_assert!(!greeks.price.is_negative());
        match option_type {
            OptionType::Call => {
                prop_assert!(greeks.delta >= FixedPoint::ZERO && greeks.delta <= FixedPoint::ONE);
                prop_assert!(!greeks.rho.is_negative());
            }
            OptionType::Put => {
                prop_assert!(greeks.delta >= -FixedPoint::ONE && greeks.delta <= FixedPoint::ZERO);
                prop_assert!(!greeks.rho.is_positive());
            }
        }
    }

    #[test]
    fn call_price_falls_with_strike(params in option_parameters()) {
        let engine = BlackScholes::default();
        let higher = OptionParameters { strike: params.strike.add(FixedPoint::from_int(5)).unwrap(), ..params };
        prop_assert!(engine.price(&higher, OptionType::Call).unwrap() <= engine.price(&params, OptionType::Call).unwrap());
        prop_assert!(engine.price(&higher, OptionType::Put).unwrap() >= engine.price(&params, OptionType::Put).unwrap());
    }

    #[test]
    fn premiums_follow_spot(params in option_parameters(), bump in hundredths(1, 500)) {
        let engine = BlackScholes::default();
        let (call, put) = engine.price_pair(&params).unwrap();
        let (call_up, put_up) = engine.price_pair(&params.with_spot(params.spot.add(bump).unwrap())).unwrap();
        prop_assert!(call_up >= call);
        prop_assert!(put_up <= put);
    }

    #[test]
    fn call_rises_with_volatility(params in option_parameters(), bump in hundredths(1, 50)) {
        let engine = BlackScholes::default();
        let call = engine.price(&params, OptionType::Call).unwrap();
        let wider = params.with_volatility(params.volatility.add(bump).unwrap());
        prop_assert!(engine.price(&wider, OptionType::Call).unwrap() >= call);
    }

    #[test]
    fn low_volatility_orderings_hold_within_rounding(
        params in low_volatility_parameters(),
        spot_bump in hundredths(1, 100),
        vol_bump in 1_i64..=100,
    ) {
        let engine = BlackScholes::default();
        let (call, put) = engine.price_pair(&params).unwrap();
        let (call_up, put_up) = engine.price_pair(&params.with_spot(params.spot.add(spot_bump).unwrap())).unwrap();
        let wider = params.with_volatility(params.volatility.add(FixedPoint::from_ratio(vol_bump, 10_000).unwrap()).unwrap());
        let call_wider = engine.price(&wider, OptionType::Call).unwrap();

        prop_assert!(call_up.add(ROUNDING_SLACK).unwrap() >= call);
        prop_assert!(put_up <= put.add(ROUNDING_SLACK).unwrap());
        prop_assert!(call_wider.add(ROUNDING_SLACK).unwrap() >= call);
    }

    #[test]
    fn implied_volatility_recovers_input(
        strike in hundredths(9000, 11000),
        volatility in hundredths(15, 80),
        expiry in hundredths(50, 200),
        option_type in option_type(),
    ) {
        let engine = BlackScholes::default();
        let params = OptionParameters::new(FixedPoint::from_int(100), strike, volatility, "0.05".parse().unwrap(), expiry).unwrap();
        let price = engine.price(&params, option_type).unwrap();
        let guess = params.with_volatility(volatility.add("0.1".parse().unwrap()).unwrap());

        let iv = engine.implied_volatility(&guess, option_type, price, &SolverConfig::default()).unwrap();
        prop_assert!(iv.converged);
        prop_assert!(iv.volatility.sub(volatility).unwrap().abs() < "0.000001".parse().unwrap());
    }

    // ========================================
    // Lattice
    // ========================================

    #[test]
    fn american_never_below_european(
        params in option_parameters(),
        option_type in option_type(),
        steps in 1_usize..=64,
    ) {
        let lattice = BinomialLattice::default();
        let american = lattice.price(&params, option_type, ExerciseStyle::American, steps).unwrap();
        let european = lattice.price(&params, option_type, ExerciseStyle::European, steps).unwrap();
        prop_assert!(american.price >= european.price);
        prop_assert!(american.price >= option_type.intrinsic(params.spot, params.strike).unwrap());
        prop_assert_eq!(american.steps, steps);
    }

    // ========================================
    // Volatility surface and estimator
    // ========================================

    #[test]
    fn surface_stays_in_band_and_rises_with_utilization(
        realized in hundredths(1, 300),
        strike in hundredths(5000, 20000),
        utilization in 0_i64..=9_899,
    ) {
        let surface = LiquiditySurface::default();
        let (floor, ceiling) = surface.bounds();
        let spot = FixedPoint::from_int(100);
        let u = FixedPoint::from_ratio(utilization, 10_000).unwrap();
        let busier = FixedPoint::from_ratio(utilization + 100, 10_000).unwrap();

        let iv = surface.implied_volatility(realized, strike, spot, u).unwrap();
        let iv_busier = surface.implied_volatility(realized, strike, spot, busier).unwrap();
        prop_assert!(iv >= floor && iv <= ceiling);
        prop_assert!(iv_busier >= iv);
    }

    #[test]
    fn estimator_variance_stays_non_negative(moves in prop::collection::vec(-500_i64..=500, 1..40)) {
        let mut price = FixedPoint::from_int(100);
        let observations: Vec<(u64, FixedPoint)> = moves
            .iter()
            .enumerate()
            .map(|(i, &bp)| {
                let factor = FixedPoint::ONE.add(FixedPoint::from_ratio(bp, 10_000).unwrap()).unwrap();
                price = price.mul(factor).unwrap();
                (i as u64 + 1, price)
            })
            .collect();

        let seed = RealizedVolatilityEstimator::with_default_lambda(FixedPoint::from_int(100), 0, FixedPoint::ZERO).unwrap();
        let state = seed.replay(observations.clone()).unwrap();
        prop_assert!(!state.variance().is_negative());
        prop_assert_eq!(state.version(), observations.len() as u64);
        prop_assert_eq!(state.last_timestamp(), observations.len() as u64);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    // ========================================
    // Heston
    // ========================================

    #[test]
    fn heston_call_within_bounds(
        strike in hundredths(8000, 12000),
        expiry in hundredths(50, 200),
        v0 in hundredths(3, 9),
        theta in hundredths(3, 9),
        kappa in hundredths(100, 300),
        xi in hundredths(10, 30),
        rho in hundredths(-80, 0),
    ) {
        let params = HestonParameters::new(
            FixedPoint::from_int(100), strike, "0.05".parse().unwrap(), expiry,
            v0, theta, kappa, xi, rho,
        )
        .unwrap();
        let engine = EngineConfig::default().heston_engine().unwrap();
        let call = engine.price(&params).unwrap();
        let put = engine.put(&params).unwrap();

        let bsm = params.bsm_equivalent().unwrap();
        let pv_strike = discounted(strike, &bsm);
        let slack = "0.005".parse::<FixedPoint>().unwrap();
        prop_assert!(call <= params.spot);
        prop_assert!(call.add(slack).unwrap() >= params.spot.sub(pv_strike).unwrap().max(FixedPoint::ZERO));
        prop_assert!(!put.is_negative());
    }
}
