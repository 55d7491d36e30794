//! HTTP quote provider — the reference `QuoteSource` implementation.
//!
//! Talks to a daily-bars JSON endpoint (`{base_url}/daily?symbol=...&end=...`),
//! with status-code triage feeding the circuit breaker and every request
//! running under the shared `RetryPolicy`. The serving stack configures
//! the endpoint; nothing above this module knows it exists.

use super::circuit_breaker::CircuitBreaker;
use super::fetcher::{FetchError, QuoteSource, RetryPolicy};
use crate::domain::DailyBar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Daily-bars endpoint response.
#[derive(Debug, Deserialize)]
struct DailyResponse {
    bars: Option<Vec<BarRow>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BarRow {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u64>,
    adj_close: Option<f64>,
}

/// Blocking HTTP implementation of `QuoteSource`.
pub struct HttpQuoteProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
}

impl HttpQuoteProvider {
    pub fn new(base_url: impl Into<String>, breaker: Arc<CircuitBreaker>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("modellab/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            breaker,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn daily_url(&self, symbol: &str, as_of: NaiveDate) -> String {
        format!(
            "{}/daily?symbol={symbol}&end={}",
            self.base_url.trim_end_matches('/'),
            as_of.format("%Y-%m-%d"),
        )
    }

    /// One HTTP round trip; retry and breaker logic live in the caller.
    fn request_once(&self, symbol: &str, url: &str) -> Result<Vec<BarRow>, FetchError> {
        if !self.breaker.allow() {
            return Err(FetchError::CircuitBreakerTripped);
        }

        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                FetchError::NetworkUnreachable(e.to_string())
            } else {
                FetchError::Other(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            self.breaker.trip();
            return Err(FetchError::CircuitBreakerTripped);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.breaker.on_failure();
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            self.breaker.on_failure();
            return Err(FetchError::Other(format!("HTTP {status} for {symbol}")));
        }

        let parsed: DailyResponse = resp.json().map_err(|e| {
            FetchError::ResponseFormatChanged(format!("bad response for {symbol}: {e}"))
        })?;

        if let Some(err) = parsed.error {
            return Err(FetchError::ResponseFormatChanged(err));
        }
        parsed.bars.ok_or_else(|| {
            FetchError::ResponseFormatChanged("response carries neither bars nor error".into())
        })
    }
}

impl QuoteSource for HttpQuoteProvider {
    fn name(&self) -> &str {
        "http_quotes"
    }

    fn fetch_bars(&self, symbol: &str, as_of: NaiveDate) -> Result<Vec<DailyBar>, FetchError> {
        let url = self.daily_url(symbol, as_of);
        let rows = self.retry.run(|| self.request_once(symbol, &url))?;
        self.breaker.on_success();

        let mut bars: Vec<DailyBar> = rows
            .into_iter()
            // The endpoint is asked for bars ending at as_of, but the
            // lookahead guard does not trust it: drop anything newer,
            // along with placeholder rows for non-trading days.
            .filter(|r| r.date <= as_of)
            .filter(|r| r.close.is_some() || r.adj_close.is_some())
            .map(|r| {
                let close = r.close.unwrap_or(f64::NAN);
                DailyBar {
                    date: r.date,
                    open: r.open.unwrap_or(f64::NAN),
                    high: r.high.unwrap_or(f64::NAN),
                    low: r.low.unwrap_or(f64::NAN),
                    close,
                    volume: r.volume.unwrap_or(0),
                    adj_close: r.adj_close.unwrap_or(close),
                }
            })
            .collect();
        bars.sort_by_key(|b| b.date);

        if bars.is_empty() {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn is_available(&self) -> bool {
        self.breaker.allow()
    }
}
