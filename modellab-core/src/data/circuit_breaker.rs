//! Circuit breaker for quote-API rate limiting and bans.
//!
//! After `failure_threshold` consecutive failures (or one explicit ban)
//! the breaker opens and refuses all requests until the cooldown
//! expires. Keeps a batch extraction job from hammering a provider
//! that has already started rejecting it.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed,
    Open { tripped_at: Instant },
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
}

/// Trip-after-N-failures breaker with a fixed cooldown.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold,
        }
    }

    /// Default for external quote APIs: 15-minute cooldown, 3 strikes.
    pub fn for_quote_api() -> Self {
        Self::new(Duration::from_secs(15 * 60), 3)
    }

    /// Check whether requests are currently allowed.
    ///
    /// An expired cooldown resets the breaker to closed as a side effect.
    pub fn allow(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.cooldown {
                    inner.state = BreakerState::Closed;
                    inner.consecutive_failures = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful request, resetting the failure streak.
    pub fn on_success(&self) {
        self.inner.lock().unwrap().consecutive_failures = 0;
    }

    /// Record a failed request; opens the breaker at the threshold.
    pub fn on_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            tracing::warn!(
                failures = inner.consecutive_failures,
                cooldown_secs = self.cooldown.as_secs(),
                "circuit breaker opened"
            );
            inner.state = BreakerState::Open {
                tripped_at: Instant::now(),
            };
        }
    }

    /// Open the breaker immediately (HTTP 403 / explicit ban).
    pub fn trip(&self) {
        self.inner.lock().unwrap().state = BreakerState::Open {
            tripped_at: Instant::now(),
        };
    }

    /// Remaining cooldown; zero when closed.
    pub fn cooldown_remaining(&self) -> Duration {
        match self.inner.lock().unwrap().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { tripped_at } => self.cooldown.saturating_sub(tripped_at.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        assert!(cb.allow());
    }

    #[test]
    fn opens_at_threshold() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.on_failure();
        cb.on_failure();
        assert!(cb.allow());
        cb.on_failure();
        assert!(!cb.allow());
    }

    #[test]
    fn success_resets_streak() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 2);
        cb.on_failure();
        cb.on_success();
        cb.on_failure();
        assert!(cb.allow());
    }

    #[test]
    fn explicit_trip_opens_immediately() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.trip();
        assert!(!cb.allow());
        assert!(cb.cooldown_remaining() > Duration::ZERO);
    }

    #[test]
    fn closes_after_cooldown() {
        let cb = CircuitBreaker::new(Duration::from_millis(10), 1);
        cb.on_failure();
        assert!(!cb.allow());
        std::thread::sleep(Duration::from_millis(15));
        assert!(cb.allow());
    }
}
