//! Fetch seams and the bounded-retry policy.
//!
//! Everything expensive in this crate flows through one of two traits:
//! `QuoteSource` (daily OHLCV bars for a symbol) or `SeriesSource`
//! (a single observation of a macro series). Concrete providers live
//! outside the cache and registry, which only ever see the traits.
//!
//! All external fetches are wrapped in `RetryPolicy::run`: a fixed
//! number of attempts with exponentially doubling, jittered delays and
//! an overall deadline. Exhausting the policy surfaces the last error
//! to the caller; nothing here swallows failures or caches them.

use crate::domain::DailyBar;
use chrono::NaiveDate;
use rand::Rng;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Structured error types for external data fetches.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("series not available: {series}")]
    SeriesUnavailable { series: String },

    #[error("hard stop: provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("fetch deadline of {deadline_ms}ms exceeded after {attempts} attempt(s)")]
    DeadlineExceeded { deadline_ms: u64, attempts: u32 },

    #[error("fetch error: {0}")]
    Other(String),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Missing symbols and tripped breakers are terminal; transient
    /// network conditions and throttling are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::NetworkUnreachable(_)
                | FetchError::RateLimited { .. }
                | FetchError::Other(_)
        )
    }
}

/// Bounded retry with exponential backoff and an overall deadline.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each attempt after.
    pub base_delay: Duration,
    /// Backoff ceiling.
    pub max_delay: Duration,
    /// Wall-clock budget for the whole operation, across all attempts.
    pub overall_deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(8),
            overall_deadline: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps, for tests and in-process sources.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            overall_deadline: Duration::from_secs(30),
        }
    }

    /// Backoff before attempt `attempt` (1-based; attempt 1 has none).
    /// Jittered up to +25% so concurrent callers don't re-collide.
    fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let doubled = self.base_delay * 2u32.saturating_pow(attempt - 2);
        let capped = doubled.min(self.max_delay);
        let jitter = rand::thread_rng().gen_range(0.0..0.25);
        capped.mul_f64(1.0 + jitter)
    }

    /// Run `op` under this policy.
    ///
    /// Stops early on non-retryable errors. When the deadline expires
    /// between attempts the *last provider error* is returned if one
    /// exists, since it is more actionable than a generic timeout.
    pub fn run<T>(
        &self,
        mut op: impl FnMut() -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let started = Instant::now();
        let mut last_error: Option<FetchError> = None;

        for attempt in 1..=self.max_attempts.max(1) {
            let delay = self.delay_before(attempt);
            if started.elapsed() + delay >= self.overall_deadline {
                return Err(last_error.unwrap_or(FetchError::DeadlineExceeded {
                    deadline_ms: self.overall_deadline.as_millis() as u64,
                    attempts: attempt - 1,
                }));
            }
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    tracing::debug!(attempt, error = %e, "fetch attempt failed, will retry");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(FetchError::DeadlineExceeded {
            deadline_ms: self.overall_deadline.as_millis() as u64,
            attempts: self.max_attempts,
        }))
    }
}

/// Daily OHLCV bars for a symbol, up to and including the as-of date.
///
/// Implementations must never return bars dated after `as_of`: the
/// lookahead guard lives at this seam, not in every extractor.
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` ending at `as_of` (inclusive).
    fn fetch_bars(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<DailyBar>, FetchError>;

    /// Whether the source is currently usable (not banned, not throttled).
    fn is_available(&self) -> bool {
        true
    }
}

/// One observation of a named external series as of a date.
///
/// This is the generic `fetch(series, asOfDate) -> raw data` collaborator
/// interface: the tiered cache wraps calls to it, the cache itself never
/// knows which provider sits behind the trait.
pub trait SeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the observation of `series` effective at `as_of`.
    fn fetch(&self, series: &str, as_of: NaiveDate) -> Result<serde_json::Value, FetchError>;
}
