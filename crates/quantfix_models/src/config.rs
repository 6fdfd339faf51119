//! Engine configuration management
//!
//! Loads engine settings from a TOML file and environment variables.
//! Decimal settings are written as strings and parsed exactly into
//! [`FixedPoint`], so no value passes through a binary float.
//!
//! Priority (highest to lowest):
//! 1. Environment variables (`QUANTFIX_*`)
//! 2. Config file
//! 3. Default values
//!
//! ```toml
//! cdf_precision = "high"
//! parity_tolerance = "0.000001"
//!
//! [lattice]
//! max_steps = 64
//! default_steps = 32
//!
//! [heston]
//! integration_limit = "100"
//! panels = 32
//! implied_vol_max_iterations = 32
//! implied_vol_tolerance = "0.000000001"
//!
//! [surface]
//! alpha = "0.5"
//! beta = "-0.1"
//! gamma = "0.1"
//! iv_floor = "0.05"
//! iv_ceiling = "5"
//! ewma_lambda = "0.94"
//! ```

use std::path::Path;
use std::str::FromStr;

use quantfix_core::math::solvers::{SolverConfig, MAX_ITERATIONS_CAP};
use quantfix_core::types::{FixedPoint, PricingError};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::analytical::{BlackScholes, CdfPrecision, HestonEngine};
use crate::lattice::{BinomialLattice, DEFAULT_STEPS, MAX_STEPS};
use crate::volatility::{LiquiditySurface, RealizedVolatilityEstimator, SkewParameters, DEFAULT_LAMBDA};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "QUANTFIX_";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    FileError(String),

    /// An environment variable could not be parsed.
    #[error("Environment variable error: {0}")]
    EnvError(String),

    /// A setting is outside its permitted range.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Lattice settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LatticeSettings {
    /// Step budget, at most [`MAX_STEPS`].
    pub max_steps: usize,
    /// Step count used when a caller does not choose one.
    pub default_steps: usize,
}

impl Default for LatticeSettings {
    fn default() -> Self {
        Self {
            max_steps: MAX_STEPS,
            default_steps: DEFAULT_STEPS,
        }
    }
}

/// Heston quadrature and implied volatility settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HestonSettings {
    /// Upper limit of the Fourier integral.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub integration_limit: FixedPoint,
    /// Gauss-Legendre panels.
    pub panels: usize,
    /// Newton iteration budget.
    pub implied_vol_max_iterations: usize,
    /// Absolute price tolerance of the Newton search.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub implied_vol_tolerance: FixedPoint,
}

impl Default for HestonSettings {
    fn default() -> Self {
        let solver = SolverConfig::default();
        Self {
            integration_limit: FixedPoint::from_int(100),
            panels: 32,
            implied_vol_max_iterations: solver.max_iterations,
            implied_vol_tolerance: solver.tolerance,
        }
    }
}

/// Volatility surface and estimator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    /// Smile curvature.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub alpha: FixedPoint,
    /// Smile tilt.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub beta: FixedPoint,
    /// Utilization sensitivity.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub gamma: FixedPoint,
    /// Lower clamp.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub iv_floor: FixedPoint,
    /// Upper clamp.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub iv_ceiling: FixedPoint,
    /// EWMA decay factor.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub ewma_lambda: FixedPoint,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        let skew = SkewParameters::default();
        let (iv_floor, iv_ceiling) = LiquiditySurface::default().bounds();
        Self {
            alpha: skew.alpha,
            beta: skew.beta,
            gamma: skew.gamma,
            iv_floor,
            iv_ceiling,
            ewma_lambda: DEFAULT_LAMBDA,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cumulative normal coefficient set.
    pub cdf_precision: CdfPrecision,
    /// Accepted put-call parity residual.
    #[serde(deserialize_with = "deserialize_decimal")]
    pub parity_tolerance: FixedPoint,
    /// Lattice settings.
    pub lattice: LatticeSettings,
    /// Heston settings.
    pub heston: HestonSettings,
    /// Surface settings.
    pub surface: SurfaceSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cdf_precision: CdfPrecision::High,
            parity_tolerance: FixedPoint::from_raw_const(1_000_000_000_000),
            lattice: LatticeSettings::default(),
            heston: HestonSettings::default(),
            surface: SurfaceSettings::default(),
        }
    }
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<FixedPoint, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    FixedPoint::from_str(&s).map_err(serde::de::Error::custom)
}

fn parse_precision(s: &str) -> Result<CdfPrecision, ConfigError> {
    match s.to_lowercase().as_str() {
        "high" => Ok(CdfPrecision::High),
        "fast" => Ok(CdfPrecision::Fast),
        _ => Err(ConfigError::EnvError(format!(
            "unknown cdf precision '{s}', expected 'high' or 'fast'"
        ))),
    }
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::EnvError(format!("{ENV_PREFIX}{name}: {e}")))
}

impl EngineConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Defaults overridden by `QUANTFIX_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// File (when given) overridden by environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from `lookup`, which maps an unprefixed variable
    /// name such as `LATTICE_MAX_STEPS` to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CDF_PRECISION") {
            self.cdf_precision = parse_precision(&v)?;
        }
        if let Some(v) = lookup("PARITY_TOLERANCE") {
            self.parity_tolerance = parse_env("PARITY_TOLERANCE", &v)?;
        }
        if let Some(v) = lookup("LATTICE_MAX_STEPS") {
            self.lattice.max_steps = parse_env("LATTICE_MAX_STEPS", &v)?;
        }
        if let Some(v) = lookup("LATTICE_DEFAULT_STEPS") {
            self.lattice.default_steps = parse_env("LATTICE_DEFAULT_STEPS", &v)?;
        }
        if let Some(v) = lookup("HESTON_INTEGRATION_LIMIT") {
            self.heston.integration_limit = parse_env("HESTON_INTEGRATION_LIMIT", &v)?;
        }
        if let Some(v) = lookup("HESTON_PANELS") {
            self.heston.panels = parse_env("HESTON_PANELS", &v)?;
        }
        if let Some(v) = lookup("HESTON_IV_MAX_ITERATIONS") {
            self.heston.implied_vol_max_iterations = parse_env("HESTON_IV_MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("HESTON_IV_TOLERANCE") {
            self.heston.implied_vol_tolerance = parse_env("HESTON_IV_TOLERANCE", &v)?;
        }
        if let Some(v) = lookup("SURFACE_ALPHA") {
            self.surface.alpha = parse_env("SURFACE_ALPHA", &v)?;
        }
        if let Some(v) = lookup("SURFACE_BETA") {
            self.surface.beta = parse_env("SURFACE_BETA", &v)?;
        }
        if let Some(v) = lookup("SURFACE_GAMMA") {
            self.surface.gamma = parse_env("SURFACE_GAMMA", &v)?;
        }
        if let Some(v) = lookup("SURFACE_IV_FLOOR") {
            self.surface.iv_floor = parse_env("SURFACE_IV_FLOOR", &v)?;
        }
        if let Some(v) = lookup("SURFACE_IV_CEILING") {
            self.surface.iv_ceiling = parse_env("SURFACE_IV_CEILING", &v)?;
        }
        if let Some(v) = lookup("EWMA_LAMBDA") {
            self.surface.ewma_lambda = parse_env("EWMA_LAMBDA", &v)?;
        }
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &'static str, reason: String| Err(ConfigError::InvalidValue { key, reason });

        if self.lattice.max_steps == 0 || self.lattice.max_steps > MAX_STEPS {
            return invalid(
                "lattice.max_steps",
                format!("{} is outside [1, {MAX_STEPS}]", self.lattice.max_steps),
            );
        }
        if self.lattice.default_steps == 0 || self.lattice.default_steps > self.lattice.max_steps {
            return invalid(
                "lattice.default_steps",
                format!("{} is outside [1, {}]", self.lattice.default_steps, self.lattice.max_steps),
            );
        }
        if self.heston.panels == 0 {
            return invalid("heston.panels", "must be at least 1".to_string());
        }
        if !self.heston.integration_limit.is_positive() {
            return invalid(
                "heston.integration_limit",
                format!("{} must be positive", self.heston.integration_limit),
            );
        }
        let iterations = self.heston.implied_vol_max_iterations;
        if iterations == 0 || iterations > MAX_ITERATIONS_CAP {
            return invalid(
                "heston.implied_vol_max_iterations",
                format!("{iterations} is outside [1, {MAX_ITERATIONS_CAP}]"),
            );
        }
        if !self.heston.implied_vol_tolerance.is_positive() {
            return invalid(
                "heston.implied_vol_tolerance",
                format!("{} must be positive", self.heston.implied_vol_tolerance),
            );
        }
        if self.parity_tolerance.is_negative() {
            return invalid(
                "parity_tolerance",
                format!("{} must not be negative", self.parity_tolerance),
            );
        }
        let lambda = self.surface.ewma_lambda;
        if !lambda.is_positive() || lambda >= FixedPoint::ONE {
            return invalid("surface.ewma_lambda", format!("{lambda} is outside (0, 1)"));
        }
        if !self.surface.iv_floor.is_positive() {
            return invalid(
                "surface.iv_floor",
                format!("{} must be positive", self.surface.iv_floor),
            );
        }
        if self.surface.iv_ceiling < self.surface.iv_floor {
            return invalid(
                "surface.iv_ceiling",
                format!(
                    "{} is below the floor {}",
                    self.surface.iv_ceiling, self.surface.iv_floor
                ),
            );
        }
        Ok(())
    }

    /// Newton settings for implied volatility searches.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            tolerance: self.heston.implied_vol_tolerance,
            max_iterations: self.heston.implied_vol_max_iterations,
        }
    }

    /// Black-Scholes engine with the configured cumulative normal.
    pub fn black_scholes(&self) -> BlackScholes {
        BlackScholes::new(self.cdf_precision)
    }

    /// Heston engine with the configured quadrature budget.
    pub fn heston_engine(&self) -> Result<HestonEngine, PricingError> {
        Ok(HestonEngine::new(self.heston.integration_limit, self.heston.panels)?
            .with_precision(self.cdf_precision))
    }

    /// Lattice engine with the configured step budget and default depth.
    pub fn lattice(&self) -> Result<BinomialLattice, PricingError> {
        BinomialLattice::new(self.lattice.max_steps)?.with_default_steps(self.lattice.default_steps)
    }

    /// Volatility surface with the configured shape and band.
    pub fn surface(&self) -> Result<LiquiditySurface, PricingError> {
        let skew = SkewParameters {
            alpha: self.surface.alpha,
            beta: self.surface.beta,
            gamma: self.surface.gamma,
        };
        LiquiditySurface::new(skew, self.surface.iv_floor, self.surface.iv_ceiling)
    }

    /// Realized volatility estimator seeded with one observation.
    pub fn estimator(
        &self,
        initial_price: FixedPoint,
        timestamp: u64,
        initial_variance: FixedPoint,
    ) -> Result<RealizedVolatilityEstimator, PricingError> {
        RealizedVolatilityEstimator::new(initial_price, timestamp, initial_variance, self.surface.ewma_lambda)
    }
}
