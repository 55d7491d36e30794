//! Extraction context: what an extractor is allowed to see.
//!
//! Extractors receive the symbol, the as-of date, the per-call scratch
//! cache, and the shared data sources, nothing else. The tiered caches
//! for macro series are owned here so extractors never talk to a
//! provider directly.

use crate::cache::{CacheError, CachePolicy, KeyGranularity, TieredCache};
use crate::data::{FetchError, QuoteSource, SeriesSource};
use crate::domain::DailyBar;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors from a single feature extraction.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("no cache configured for series '{series}'")]
    UnknownSeries { series: String },

    #[error("non-numeric payload for series '{series}' at {as_of}")]
    NonNumericPayload { series: String, as_of: NaiveDate },

    #[error("insufficient history for '{feature}': need {need} bars, have {have}")]
    InsufficientHistory {
        feature: String,
        need: usize,
        have: usize,
    },
}

/// Tiered caches for macro series, all backed by one source.
pub struct MacroCaches {
    source: Arc<dyn SeriesSource>,
    caches: HashMap<String, TieredCache>,
}

impl MacroCaches {
    /// Open one tiered cache per `(series, granularity)` pair, with
    /// documents under `cache_dir/<series>.json`.
    pub fn open(
        cache_dir: impl AsRef<Path>,
        source: Arc<dyn SeriesSource>,
        series: &[(&str, KeyGranularity)],
        policy: CachePolicy,
    ) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.as_ref();
        let mut caches = HashMap::new();
        for (name, granularity) in series {
            let cache = TieredCache::open(
                *name,
                *granularity,
                cache_dir.join(format!("{name}.json")),
                policy.clone(),
            )?;
            caches.insert(name.to_string(), cache);
        }
        Ok(Self { source, caches })
    }

    /// Numeric observation of `series` as of `as_of`, through the cache.
    pub fn value(&self, series: &str, as_of: NaiveDate) -> Result<f64, FeatureError> {
        let cache = self.caches.get(series).ok_or_else(|| {
            FeatureError::UnknownSeries {
                series: series.to_string(),
            }
        })?;
        let source = Arc::clone(&self.source);
        let series_name = series.to_string();
        let payload = cache.get(as_of, &move |d| source.fetch(&series_name, d))?;
        payload
            .as_f64()
            .or_else(|| payload.get("value").and_then(|v| v.as_f64()))
            .ok_or(FeatureError::NonNumericPayload {
                series: series.to_string(),
                as_of,
            })
    }

    pub fn cache(&self, series: &str) -> Option<&TieredCache> {
        self.caches.get(series)
    }

    pub fn caches(&self) -> impl Iterator<Item = &TieredCache> {
        self.caches.values()
    }
}

/// Shared, process-lifetime data sources for extraction.
pub struct DataSources {
    pub quotes: Arc<dyn QuoteSource>,
    pub macros: MacroCaches,
}

/// Everything one extractor invocation sees.
pub struct ExtractionContext<'a> {
    pub symbol: &'a str,
    pub as_of: NaiveDate,
    pub scratch: &'a super::scratch::ScratchCache,
    pub sources: &'a DataSources,
}

impl ExtractionContext<'_> {
    /// The symbol's daily bars up to the as-of date, fetched at most
    /// once per extraction call via the scratch cache.
    pub fn bars(&self) -> Result<Arc<Vec<DailyBar>>, FeatureError> {
        self.scratch
            .bars(self.symbol, || {
                self.sources.quotes.fetch_bars(self.symbol, self.as_of)
            })
            .map_err(FeatureError::from)
    }

    /// A macro-series observation through the tiered cache.
    pub fn macro_value(&self, series: &str) -> Result<f64, FeatureError> {
        self.sources.macros.value(series, self.as_of)
    }
}
