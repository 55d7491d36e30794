//! HTTP series provider — the reference `SeriesSource` implementation.
//!
//! Fetches one observation of a named series as of a date from a JSON
//! endpoint (`{base_url}/series/{name}?date=...`). Macro publishers are
//! far gentler than quote APIs, so this provider carries no circuit
//! breaker; the retry policy alone bounds it.

use super::fetcher::{FetchError, RetryPolicy, SeriesSource};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    value: Option<serde_json::Value>,
    error: Option<String>,
}

pub struct HttpSeriesProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpSeriesProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("modellab/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn series_url(&self, series: &str, as_of: NaiveDate) -> String {
        format!(
            "{}/series/{series}?date={}",
            self.base_url.trim_end_matches('/'),
            as_of.format("%Y-%m-%d"),
        )
    }

    fn request_once(&self, series: &str, url: &str) -> Result<serde_json::Value, FetchError> {
        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                FetchError::NetworkUnreachable(e.to_string())
            } else {
                FetchError::Other(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::SeriesUnavailable {
                series: series.to_string(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                retry_after_secs: 60,
            });
        }
        if !status.is_success() {
            return Err(FetchError::Other(format!("HTTP {status} for {series}")));
        }

        let parsed: SeriesResponse = resp.json().map_err(|e| {
            FetchError::ResponseFormatChanged(format!("bad response for {series}: {e}"))
        })?;

        if let Some(err) = parsed.error {
            return Err(FetchError::ResponseFormatChanged(err));
        }
        parsed.value.ok_or_else(|| {
            FetchError::ResponseFormatChanged("response carries neither value nor error".into())
        })
    }
}

impl SeriesSource for HttpSeriesProvider {
    fn name(&self) -> &str {
        "http_series"
    }

    fn fetch(&self, series: &str, as_of: NaiveDate) -> Result<serde_json::Value, FetchError> {
        let url = self.series_url(series, as_of);
        self.retry.run(|| self.request_once(series, &url))
    }
}
