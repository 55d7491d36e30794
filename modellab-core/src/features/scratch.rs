//! Per-call scratch cache of raw fetched datasets.
//!
//! One extraction call computes many features; several of them derive
//! from the same raw series (a symbol's daily bars). The scratch cache
//! lives for exactly one extraction call and hands every extractor the
//! same fetched dataset instead of refetching per feature. It is not
//! the tiered cache: nothing here persists or expires.

use crate::data::FetchError;
use crate::domain::DailyBar;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct ScratchCache {
    bars: Mutex<HashMap<String, Arc<Vec<DailyBar>>>>,
}

impl ScratchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the bar series for `symbol`, fetching at most once per call.
    ///
    /// The map lock is held across the fetch on purpose: concurrent
    /// extractors asking for the same series wait for the one fetch
    /// instead of duplicating it.
    pub fn bars(
        &self,
        symbol: &str,
        fetch: impl FnOnce() -> Result<Vec<DailyBar>, FetchError>,
    ) -> Result<Arc<Vec<DailyBar>>, FetchError> {
        let mut bars = self.bars.lock().unwrap();
        if let Some(cached) = bars.get(symbol) {
            return Ok(Arc::clone(cached));
        }
        let fetched = Arc::new(fetch()?);
        bars.insert(symbol.to_string(), Arc::clone(&fetched));
        Ok(fetched)
    }
}
