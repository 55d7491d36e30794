//! Raw daily OHLCV bar returned by quote sources.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV row for a symbol (as delivered by a quote source,
/// before any feature math).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

impl DailyBar {
    /// True daily return relative to the previous bar's adjusted close.
    pub fn return_from(&self, prev: &DailyBar) -> f64 {
        if prev.adj_close <= 0.0 {
            return 0.0;
        }
        (self.adj_close - prev.adj_close) / prev.adj_close
    }
}
