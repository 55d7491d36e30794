//! Cache entry wire format, TTL classes, and the boundary rules.
//!
//! Classification and expiry are pure functions over explicit dates and
//! clocks so the boundaries can be pinned down in tests:
//! - as-of age strictly greater than 30 days ⇒ `Historical`; exactly
//!   30 days is `Recent` (revisions to monthly indicators can land
//!   within the publication month plus a grace window, and the short
//!   TTL only costs a fetch, never staleness).
//! - expiry is inclusive: `age >= ttl` is expired.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Current layout version of persisted entries.
pub const ENTRY_FORMAT_VERSION: u32 = 1;

/// As-of dates older than this many days classify as `Historical`.
pub const HISTORICAL_CUTOFF_DAYS: i64 = 30;

/// Staleness class of a cached observation.
///
/// Decided by the age of the *as-of date* being cached, not by the age
/// of the entry: a finalized figure for a closed period will not
/// change, while a recent one may still be revised by the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TtlClass {
    Historical,
    Recent,
}

/// Classify an as-of date relative to `today`.
pub fn classify(as_of: NaiveDate, today: NaiveDate) -> TtlClass {
    let age_days = (today - as_of).num_days();
    if age_days > HISTORICAL_CUTOFF_DAYS {
        TtlClass::Historical
    } else {
        TtlClass::Recent
    }
}

/// Inclusive expiry check: an entry exactly at its TTL is stale.
pub fn is_expired(fetched_at_ms: i64, now_ms: i64, ttl: Duration) -> bool {
    let age_ms = now_ms.saturating_sub(fetched_at_ms);
    age_ms >= ttl.as_millis() as i64
}

/// Key bucketing: match the granularity of the underlying series so
/// daily as-of dates that map to the same monthly observation share one
/// entry instead of missing needlessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyGranularity {
    Daily,
    Monthly,
}

/// Bucket an as-of date into a cache key.
pub fn bucket_key(as_of: NaiveDate, granularity: KeyGranularity) -> String {
    match granularity {
        KeyGranularity::Daily => as_of.format("%Y-%m-%d").to_string(),
        KeyGranularity::Monthly => as_of.format("%Y-%m").to_string(),
    }
}

/// One persisted observation, as stored in the durable document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// As-of date the payload was fetched for.
    pub date: NaiveDate,
    /// Opaque payload from the data source.
    pub data: serde_json::Value,
    /// When the fetch happened, epoch milliseconds.
    pub timestamp: i64,
    /// Entry layout version.
    pub version: u32,
    pub is_historical: bool,
}

impl CacheEntry {
    pub fn ttl_class(&self) -> TtlClass {
        if self.is_historical {
            TtlClass::Historical
        } else {
            TtlClass::Recent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn thirty_one_days_old_is_historical() {
        let today = date(2024, 6, 30);
        assert_eq!(classify(date(2024, 5, 30), today), TtlClass::Historical);
    }

    #[test]
    fn twenty_nine_days_old_is_recent() {
        let today = date(2024, 6, 30);
        assert_eq!(classify(date(2024, 6, 1), today), TtlClass::Recent);
    }

    #[test]
    fn exactly_thirty_days_old_is_recent() {
        // The documented boundary: age == 30 stays on the short TTL.
        let today = date(2024, 6, 30);
        assert_eq!(classify(date(2024, 5, 31), today), TtlClass::Recent);
    }

    #[test]
    fn future_as_of_is_recent() {
        let today = date(2024, 6, 30);
        assert_eq!(classify(date(2024, 7, 5), today), TtlClass::Recent);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let ttl = Duration::from_millis(1000);
        assert!(is_expired(0, 1000, ttl));
        assert!(!is_expired(0, 999, ttl));
        assert!(is_expired(0, 1001, ttl));
    }

    #[test]
    fn monthly_bucketing_collapses_days() {
        let a = bucket_key(date(2024, 3, 1), KeyGranularity::Monthly);
        let b = bucket_key(date(2024, 3, 28), KeyGranularity::Monthly);
        assert_eq!(a, "2024-03");
        assert_eq!(a, b);
    }

    #[test]
    fn daily_bucketing_keeps_days_distinct() {
        let a = bucket_key(date(2024, 3, 1), KeyGranularity::Daily);
        let b = bucket_key(date(2024, 3, 2), KeyGranularity::Daily);
        assert_eq!(a, "2024-03-01");
        assert_ne!(a, b);
    }

    #[test]
    fn entry_wire_format_uses_camel_case() {
        let entry = CacheEntry {
            date: date(2024, 3, 1),
            data: serde_json::json!(3.9),
            timestamp: 1_709_251_200_000,
            version: ENTRY_FORMAT_VERSION,
            is_historical: true,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"isHistorical\":true"));
        assert!(json.contains("\"timestamp\":1709251200000"));
    }
}
