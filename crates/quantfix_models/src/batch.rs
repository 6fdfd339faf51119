//! Batch pricing across rayon's thread pool.
//!
//! Each request owns its scratch storage (the lattice value vector, the
//! quadrature accumulators), so requests share nothing but the immutable
//! engines. Results come back in request order, one `Result` per request,
//! and are bit-identical to pricing the same requests one by one.
//!
//! ```
//! use quantfix_models::batch::BatchPricer;
//! use quantfix_models::instruments::{OptionParameters, OptionType};
//! use quantfix_core::types::FixedPoint;
//!
//! let fp = |s: &str| s.parse::<FixedPoint>().unwrap();
//! let requests: Vec<_> = ["90", "100", "110"]
//!     .iter()
//!     .map(|k| (OptionParameters::new(fp("100"), fp(k), fp("0.2"), fp("0.05"), fp("1")).unwrap(), OptionType::Call))
//!     .collect();
//!
//! let results = BatchPricer::default().greeks(&requests);
//! assert_eq!(results.len(), 3);
//! assert!(results.iter().all(|r| r.is_ok()));
//! ```

use rayon::prelude::*;

use quantfix_core::types::{FixedPoint, PricingError};

use crate::analytical::{BlackScholes, Greeks, HestonEngine};
use crate::config::EngineConfig;
use crate::instruments::{ExerciseStyle, OptionParameters, OptionType};
use crate::lattice::{BinomialLattice, LatticeResult};
use crate::models::HestonParameters;

/// Configuration for batch pricing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Minimum requests per thread before parallelisation kicks in.
    pub min_requests_per_thread: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_requests_per_thread: 4,
        }
    }
}

impl BatchConfig {
    /// Determines if parallelisation should be used for the given batch size.
    #[inline]
    pub fn should_parallelise(&self, n_requests: usize) -> bool {
        n_requests >= self.min_requests_per_thread * rayon::current_num_threads()
    }
}

/// One lattice pricing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeRequest {
    /// Option inputs.
    pub params: OptionParameters,
    /// Call or put.
    pub option_type: OptionType,
    /// Exercise style.
    pub exercise: ExerciseStyle,
    /// Step count; `None` uses the engine's default.
    pub steps: Option<usize>,
}

/// Prices slices of requests with shared, immutable engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchPricer {
    config: BatchConfig,
    black_scholes: BlackScholes,
    lattice: BinomialLattice,
    heston: HestonEngine,
}

impl BatchPricer {
    /// Creates a pricer from explicit engines.
    pub fn new(config: BatchConfig, black_scholes: BlackScholes, lattice: BinomialLattice, heston: HestonEngine) -> Self {
        Self {
            config,
            black_scholes,
            lattice,
            heston,
        }
    }

    /// Creates a pricer with the engines described by `engine_config`.
    pub fn from_config(config: BatchConfig, engine_config: &EngineConfig) -> Result<Self, PricingError> {
        Ok(Self::new(
            config,
            engine_config.black_scholes(),
            engine_config.lattice()?,
            engine_config.heston_engine()?,
        ))
    }

    /// Batch configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Black-Scholes price and Greeks per request.
    pub fn greeks(&self, requests: &[(OptionParameters, OptionType)]) -> Vec<Result<Greeks, PricingError>> {
        self.run(requests, |(params, option_type)| {
            self.black_scholes.greeks(params, *option_type)
        })
    }

    /// Lattice price per request.
    pub fn lattice(&self, requests: &[LatticeRequest]) -> Vec<Result<LatticeResult, PricingError>> {
        self.run(requests, |request| {
            let steps = request.steps.unwrap_or(self.lattice.default_steps());
            self.lattice
                .price(&request.params, request.option_type, request.exercise, steps)
        })
    }

    /// Heston call price per request.
    pub fn heston(&self, requests: &[HestonParameters]) -> Vec<Result<FixedPoint, PricingError>> {
        self.run(requests, |params| self.heston.price(params))
    }

    fn run<T, R, F>(&self, requests: &[T], price: F) -> Vec<Result<R, PricingError>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R, PricingError> + Send + Sync,
    {
        if !self.config.should_parallelise(requests.len()) {
            return requests.iter().map(&price).collect();
        }
        tracing::debug!(
            requests = requests.len(),
            threads = rayon::current_num_threads(),
            "pricing batch in parallel"
        );
        requests.par_iter().map(&price).collect()
    }
}
