//! Tiered, TTL-aware cache for expensive external lookups.
//!
//! `get(as_of, fetch)` returns the cached payload when a non-expired
//! entry covers the as-of date's bucket; otherwise it runs `fetch`
//! under the retry policy, tags the result with the TTL class derived
//! from the as-of date, persists the document, and returns the payload.
//!
//! Concurrency: misses on the same key are collapsed into one fetch
//! through a per-key in-flight lock; the durable document is written
//! under the entry-map mutex, which is the single-writer discipline
//! for the shared file.

use super::entry::{
    self, bucket_key, CacheEntry, KeyGranularity, TtlClass, ENTRY_FORMAT_VERSION,
};
use super::store::{CacheError, DocumentStore};
use crate::data::{FetchError, RetryPolicy};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// TTLs and retry behavior for one cached series.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// TTL for entries whose as-of date is past the historical cutoff.
    /// Finalized figures for closed periods do not change.
    pub historical_ttl: Duration,
    /// TTL for entries that may still be revised by the publisher.
    pub recent_ttl: Duration,
    pub retry: RetryPolicy,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            historical_ttl: Duration::from_secs(365 * 24 * 3600),
            recent_ttl: Duration::from_secs(24 * 3600),
            retry: RetryPolicy::default(),
        }
    }
}

impl CachePolicy {
    fn ttl_for(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Historical => self.historical_ttl,
            TtlClass::Recent => self.recent_ttl,
        }
    }
}

/// Point-in-time summary of one cache, for operator reporting.
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub series: String,
    pub entries: usize,
    pub historical: usize,
    pub recent: usize,
    pub store_bytes: u64,
}

/// A TTL-aware cache for one external series.
pub struct TieredCache {
    series: String,
    granularity: KeyGranularity,
    policy: CachePolicy,
    store: DocumentStore,
    entries: Mutex<super::store::CacheDocument>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TieredCache {
    /// Open a cache backed by the document at `store_path`, loading it
    /// fully (an absent or corrupt document starts empty).
    pub fn open(
        series: impl Into<String>,
        granularity: KeyGranularity,
        store_path: impl Into<PathBuf>,
        policy: CachePolicy,
    ) -> Result<Self, CacheError> {
        let store = DocumentStore::new(store_path);
        let doc = store.load()?;
        Ok(Self {
            series: series.into(),
            granularity,
            policy,
            store,
            entries: Mutex::new(doc),
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    /// Fetch-through lookup for the bucket covering `as_of`.
    ///
    /// A fetch failure propagates after the retry policy is exhausted;
    /// failures are never cached.
    pub fn get(
        &self,
        as_of: NaiveDate,
        fetch: &(dyn Fn(NaiveDate) -> Result<serde_json::Value, FetchError> + Sync),
    ) -> Result<serde_json::Value, CacheError> {
        let key = bucket_key(as_of, self.granularity);

        if let Some(data) = self.lookup_fresh(&key) {
            return Ok(data);
        }

        // Collapse concurrent misses on this key into one fetch.
        let key_lock = {
            let mut in_flight = self.in_flight.lock().unwrap();
            Arc::clone(in_flight.entry(key.clone()).or_default())
        };
        let _guard = key_lock.lock().unwrap();

        // A concurrent caller may have filled the bucket while we
        // waited on the key lock.
        if let Some(data) = self.lookup_fresh(&key) {
            self.forget_in_flight(&key);
            return Ok(data);
        }

        let fetched = self.policy.retry.run(|| fetch(as_of));
        let data = match fetched {
            Ok(data) => data,
            Err(e) => {
                self.forget_in_flight(&key);
                tracing::warn!(
                    series = %self.series,
                    key = %key,
                    error = %e,
                    "fetch failed after retries"
                );
                return Err(e.into());
            }
        };

        let today = Utc::now().date_naive();
        let class = entry::classify(as_of, today);
        let entry = CacheEntry {
            date: as_of,
            data: data.clone(),
            timestamp: Utc::now().timestamp_millis(),
            version: ENTRY_FORMAT_VERSION,
            is_historical: class == TtlClass::Historical,
        };

        {
            let mut entries = self.entries.lock().unwrap();
            entries.insert(key.clone(), entry);
            self.store.save(&entries)?;
        }
        tracing::debug!(series = %self.series, key = %key, ?class, "cached new entry");

        self.forget_in_flight(&key);
        Ok(data)
    }

    /// Drop the entry covering `as_of`, if any. Returns whether one existed.
    pub fn invalidate(&self, as_of: NaiveDate) -> Result<bool, CacheError> {
        let key = bucket_key(as_of, self.granularity);
        let mut entries = self.entries.lock().unwrap();
        let removed = entries.remove(&key).is_some();
        if removed {
            self.store.save(&entries)?;
        }
        Ok(removed)
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap();
        entries.clear();
        self.store.save(&entries)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> CacheStatus {
        let entries = self.entries.lock().unwrap();
        let historical = entries.values().filter(|e| e.is_historical).count();
        CacheStatus {
            series: self.series.clone(),
            entries: entries.len(),
            historical,
            recent: entries.len() - historical,
            store_bytes: self.store.size_bytes(),
        }
    }

    fn lookup_fresh(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(key)?;
        let ttl = self.policy.ttl_for(entry.ttl_class());
        let now_ms = Utc::now().timestamp_millis();
        if entry::is_expired(entry.timestamp, now_ms, ttl) {
            tracing::debug!(series = %self.series, key, "entry expired");
            return None;
        }
        Some(entry.data.clone())
    }

    fn forget_in_flight(&self, key: &str) {
        self.in_flight.lock().unwrap().remove(key);
    }
}
