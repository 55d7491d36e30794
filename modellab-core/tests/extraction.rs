//! End-to-end extraction scenarios: soft-fail shape preservation,
//! scratch reuse, and custom registration.

use chrono::NaiveDate;
use modellab_core::cache::{CachePolicy, KeyGranularity};
use modellab_core::data::{FetchError, QuoteSource, RetryPolicy, SeriesSource};
use modellab_core::domain::{DailyBar, ModelMetadata};
use modellab_core::features::{
    DataSources, ExtractionContext, FeatureAssembler, FeatureRegistry, MacroCaches,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// ─── Test doubles ────────────────────────────────────────────────────

/// Synthetic quote source: a gently rising series ending at `as_of`.
struct SyntheticQuotes {
    fetches: AtomicU32,
}

impl SyntheticQuotes {
    fn new() -> Self {
        Self {
            fetches: AtomicU32::new(0),
        }
    }
}

impl QuoteSource for SyntheticQuotes {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_bars(&self, _symbol: &str, as_of: NaiveDate) -> Result<Vec<DailyBar>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let bars = (0..120)
            .rev()
            .map(|offset| {
                let date = as_of - chrono::Duration::days(offset);
                let price = 100.0 + (120 - offset) as f64 * 0.5;
                DailyBar {
                    date,
                    open: price,
                    high: price + 1.0,
                    low: price - 1.0,
                    close: price,
                    volume: 1_000_000,
                    adj_close: price,
                }
            })
            .collect();
        Ok(bars)
    }
}

/// Macro source with a fixed value per series; "cpi_yoy" always fails.
struct FlakyMacroSource;

impl SeriesSource for FlakyMacroSource {
    fn name(&self) -> &str {
        "flaky_macro"
    }

    fn fetch(&self, series: &str, _as_of: NaiveDate) -> Result<serde_json::Value, FetchError> {
        match series {
            "cpi_yoy" => Err(FetchError::SeriesUnavailable {
                series: series.to_string(),
            }),
            "unemployment_rate" => Ok(serde_json::json!(3.9)),
            "treasury_10y" => Ok(serde_json::json!(4.25)),
            other => Err(FetchError::SeriesUnavailable {
                series: other.to_string(),
            }),
        }
    }
}

fn test_sources(dir: &std::path::Path, quotes: Arc<dyn QuoteSource>) -> Arc<DataSources> {
    let macros = MacroCaches::open(
        dir,
        Arc::new(FlakyMacroSource),
        &[
            ("unemployment_rate", KeyGranularity::Monthly),
            ("cpi_yoy", KeyGranularity::Monthly),
            ("treasury_10y", KeyGranularity::Daily),
        ],
        CachePolicy {
            retry: RetryPolicy::immediate(2),
            ..CachePolicy::default()
        },
    )
    .unwrap();
    Arc::new(DataSources { quotes, macros })
}

fn metadata(features: &[&str]) -> ModelMetadata {
    ModelMetadata {
        model_version: "test-model".into(),
        features: features.iter().map(|s| s.to_string()).collect(),
        num_features: features.len(),
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────

#[test]
fn missing_extractor_emits_zero_and_warns() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(FeatureRegistry::empty());
    registry.register("a", Arc::new(|_ctx: &ExtractionContext| Ok(1.5)));
    registry.register("c", Arc::new(|_ctx: &ExtractionContext| Ok(-0.25)));

    let sources = test_sources(dir.path(), Arc::new(SyntheticQuotes::new()));
    let assembler = FeatureAssembler::with_workers(registry, sources, 2);

    let meta = metadata(&["a", "b", "c"]);
    let vector = assembler.extract(&meta, "SPY", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

    assert_eq!(vector.values, vec![1.5, 0.0, -0.25]);
    assert_eq!(vector.warnings.len(), 1);
    assert!(vector.warnings[0].contains("'b'"));
}

#[test]
fn failing_macro_source_degrades_one_position() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(FeatureRegistry::with_builtins());
    let sources = test_sources(dir.path(), Arc::new(SyntheticQuotes::new()));
    let assembler = FeatureAssembler::with_workers(registry, sources, 4);

    let meta = metadata(&["unemployment_rate", "cpi_yoy", "treasury_10y"]);
    let vector = assembler.extract(&meta, "SPY", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

    assert_eq!(vector.values.len(), 3);
    assert!((vector.values[0] - 3.9).abs() < 1e-12);
    assert_eq!(vector.values[1], 0.0); // cpi_yoy source is down
    assert!((vector.values[2] - 4.25).abs() < 1e-12);
    assert_eq!(vector.warnings.len(), 1);
    assert!(vector.warnings[0].contains("cpi_yoy"));
}

#[test]
fn bar_features_share_one_quote_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let quotes = Arc::new(SyntheticQuotes::new());
    let registry = Arc::new(FeatureRegistry::with_builtins());
    let sources = test_sources(dir.path(), Arc::clone(&quotes) as Arc<dyn QuoteSource>);
    let assembler = FeatureAssembler::with_workers(registry, sources, 4);

    let meta = metadata(&["mom_10d", "mom_30d", "vol_20d", "rsi_14", "sma_ratio_50"]);
    let vector = assembler.extract(&meta, "SPY", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

    assert_eq!(vector.values.len(), 5);
    assert!(vector.warnings.is_empty(), "{:?}", vector.warnings);
    // All five bar-derived features in one call share one fetch.
    assert_eq!(quotes.fetches.load(Ordering::SeqCst), 1);

    // Rising series: positive momentum, ratio above 1, RSI near 100.
    assert!(vector.values[0] > 0.0);
    assert!(vector.values[4] > 1.0);
    assert!(vector.values[3] > 50.0);
}

#[test]
fn extract_for_model_reads_metadata_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let meta_path = dir.path().join("metadata.json");
    std::fs::write(
        &meta_path,
        r#"{"model_version":"v9","features":["mom_10d","unemployment_rate"],"num_features":2}"#,
    )
    .unwrap();

    let registry = Arc::new(FeatureRegistry::with_builtins());
    let sources = test_sources(dir.path(), Arc::new(SyntheticQuotes::new()));
    let assembler = FeatureAssembler::with_workers(registry, sources, 2);

    let vector = assembler
        .extract_for_model(&meta_path, "SPY", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        .unwrap();
    assert_eq!(vector.model_version, "v9");
    assert_eq!(vector.values.len(), 2);
}

#[test]
fn invalid_metadata_is_the_only_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let meta_path = dir.path().join("metadata.json");
    std::fs::write(
        &meta_path,
        r#"{"model_version":"v9","features":["mom_10d"],"num_features":4}"#,
    )
    .unwrap();

    let registry = Arc::new(FeatureRegistry::with_builtins());
    let sources = test_sources(dir.path(), Arc::new(SyntheticQuotes::new()));
    let assembler = FeatureAssembler::with_workers(registry, sources, 2);

    assert!(assembler
        .extract_for_model(&meta_path, "SPY", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        .is_err());
}

#[test]
fn runtime_registration_overrides_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(FeatureRegistry::with_builtins());
    registry.register("rsi_14", Arc::new(|_ctx: &ExtractionContext| Ok(77.0)));

    let sources = test_sources(dir.path(), Arc::new(SyntheticQuotes::new()));
    let assembler = FeatureAssembler::with_workers(registry, sources, 2);

    let meta = metadata(&["rsi_14"]);
    let vector = assembler.extract(&meta, "SPY", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    assert_eq!(vector.values, vec![77.0]);
}
