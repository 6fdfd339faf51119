//! EWMA realized volatility estimator.
//!
//! ```text
//! σ²_n = λ·σ²_(n-1) + (1 - λ)·r_n²,   r_n = ln(P_n / P_(n-1))
//! ```
//!
//! The estimator is an immutable, versioned value: [`update`] returns the
//! next state and leaves the receiver untouched. Observations must arrive in
//! strictly increasing timestamp order; anything else is rejected with
//! `PricingError::OutOfOrderObservation` and no state is rolled back.
//!
//! [`update`]: RealizedVolatilityEstimator::update

use quantfix_core::types::{FixedPoint, PricingError};

use crate::instruments::require_positive;

/// Default decay factor `λ = 0.94`.
pub const DEFAULT_LAMBDA: FixedPoint = FixedPoint::from_raw_const(940_000_000_000_000_000);

/// Decaying variance estimate over a price series.
///
/// # Examples
/// ```
/// use quantfix_models::volatility::RealizedVolatilityEstimator;
/// use quantfix_core::types::FixedPoint;
///
/// let fp = |s: &str| s.parse::<FixedPoint>().unwrap();
/// let start = RealizedVolatilityEstimator::with_default_lambda(fp("100"), 1, fp("0.0004")).unwrap();
/// let next = start.update(fp("101"), 2).unwrap();
///
/// assert_eq!(start.version(), 0);
/// assert_eq!(next.version(), 1);
/// assert!(next.update(fp("102"), 2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "PersistedState")
)]
pub struct RealizedVolatilityEstimator {
    lambda: FixedPoint,
    variance: FixedPoint,
    last_price: FixedPoint,
    last_timestamp: u64,
    version: u64,
}

/// Wire form of a persisted estimator, checked through
/// [`RealizedVolatilityEstimator::new`] on the way back in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PersistedState {
    lambda: FixedPoint,
    variance: FixedPoint,
    last_price: FixedPoint,
    last_timestamp: u64,
    version: u64,
}

#[cfg(feature = "serde")]
impl TryFrom<PersistedState> for RealizedVolatilityEstimator {
    type Error = PricingError;

    fn try_from(state: PersistedState) -> Result<Self, Self::Error> {
        let estimator = Self::new(state.last_price, state.last_timestamp, state.variance, state.lambda)?;
        Ok(Self {
            version: state.version,
            ..estimator
        })
    }
}

impl RealizedVolatilityEstimator {
    /// Seeds the estimator with a first price observation.
    ///
    /// # Errors
    /// `InvalidParameter` when the price is not positive, the variance is
    /// negative or `λ ∉ (0, 1)`.
    pub fn new(
        initial_price: FixedPoint,
        timestamp: u64,
        initial_variance: FixedPoint,
        lambda: FixedPoint,
    ) -> Result<Self, PricingError> {
        require_positive("price", initial_price)?;
        if initial_variance.is_negative() {
            return Err(PricingError::InvalidParameter {
                field: "initial_variance",
                value: initial_variance,
            });
        }
        if !lambda.is_positive() || lambda >= FixedPoint::ONE {
            return Err(PricingError::InvalidParameter {
                field: "lambda",
                value: lambda,
            });
        }
        Ok(Self {
            lambda,
            variance: initial_variance,
            last_price: initial_price,
            last_timestamp: timestamp,
            version: 0,
        })
    }

    /// Seeds the estimator with `λ = 0.94`.
    pub fn with_default_lambda(
        initial_price: FixedPoint,
        timestamp: u64,
        initial_variance: FixedPoint,
    ) -> Result<Self, PricingError> {
        Self::new(initial_price, timestamp, initial_variance, DEFAULT_LAMBDA)
    }

    /// Folds one observation into the estimate, returning the next state.
    ///
    /// # Errors
    /// - `OutOfOrderObservation` unless `timestamp` is strictly later than
    ///   the last accepted observation
    /// - `InvalidParameter` for a non-positive price
    pub fn update(&self, price: FixedPoint, timestamp: u64) -> Result<Self, PricingError> {
        if timestamp <= self.last_timestamp {
            return Err(PricingError::OutOfOrderObservation {
                previous: self.last_timestamp,
                received: timestamp,
            });
        }
        require_positive("price", price)?;

        let log_return = price.div(self.last_price)?.ln()?;
        let decayed = self.lambda.mul(self.variance)?;
        let innovation = FixedPoint::ONE
            .sub(self.lambda)?
            .mul(log_return.mul(log_return)?)?;
        let variance = decayed.add(innovation)?;
        let version = self.version + 1;

        tracing::debug!(version, %variance, %log_return, timestamp, "realized variance update");

        Ok(Self {
            lambda: self.lambda,
            variance,
            last_price: price,
            last_timestamp: timestamp,
            version,
        })
    }

    /// Applies a time-ordered sequence of `(timestamp, price)` observations.
    ///
    /// Stops at the first rejected observation; the receiver is unchanged.
    pub fn replay<I>(&self, observations: I) -> Result<Self, PricingError>
    where
        I: IntoIterator<Item = (u64, FixedPoint)>,
    {
        observations
            .into_iter()
            .try_fold(*self, |state, (timestamp, price)| state.update(price, timestamp))
    }

    /// Current per-period variance.
    #[inline]
    pub fn variance(&self) -> FixedPoint {
        self.variance
    }

    /// Current per-period volatility `√σ²`.
    pub fn volatility(&self) -> Result<FixedPoint, PricingError> {
        Ok(self.variance.sqrt()?)
    }

    /// Volatility scaled to a year of `periods_per_year` observation periods.
    pub fn annualised_volatility(&self, periods_per_year: u32) -> Result<FixedPoint, PricingError> {
        if periods_per_year == 0 {
            return Err(PricingError::InvalidParameter {
                field: "periods_per_year",
                value: FixedPoint::ZERO,
            });
        }
        Ok(self.variance.mul_int(i64::from(periods_per_year))?.sqrt()?)
    }

    /// Decay factor `λ`.
    #[inline]
    pub fn lambda(&self) -> FixedPoint {
        self.lambda
    }

    /// Last accepted price.
    #[inline]
    pub fn last_price(&self) -> FixedPoint {
        self.last_price
    }

    /// Timestamp of the last accepted observation.
    #[inline]
    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    /// Number of updates applied since seeding.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}
