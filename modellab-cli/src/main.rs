//! modellab CLI — feature extraction, deployment validation, and cache
//! management commands.
//!
//! Commands:
//! - `extract` — assemble feature vectors for a model over one or more symbols
//! - `validate` — run the deployment gate against a model config + artifact
//! - `cache status` — report per-series cache entry counts and sizes
//! - `cache clear` — drop cached entries (all series, or one date)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modellab_core::cache::{CachePolicy, KeyGranularity, TieredCache};
use modellab_core::data::{CircuitBreaker, HttpQuoteProvider, HttpSeriesProvider};
use modellab_core::features::{
    builtin::MACRO_SERIES, DataSources, FeatureAssembler, FeatureRegistry, MacroCaches,
};
use modellab_gate::{DeploymentGate, ModelConfig, ModelStatus, ValidationThresholds};

#[derive(Parser)]
#[command(
    name = "modellab",
    about = "modellab CLI — model-lifecycle core: feature extraction and deployment gating"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble feature vectors for a model over one or more symbols.
    Extract {
        /// Path to the model metadata JSON document.
        #[arg(long)]
        metadata: PathBuf,

        /// Symbols to extract (e.g., SPY QQQ AAPL).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// As-of date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Base URL of the daily-bars endpoint.
        #[arg(long, default_value = "https://quotes.example.com/v1")]
        quotes_url: String,

        /// Base URL of the macro-series endpoint.
        #[arg(long, default_value = "https://macro.example.com/v2")]
        series_url: String,

        /// Cache directory for macro-series documents. Defaults to ./cache.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Write vectors to this CSV file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Extraction worker-pool width.
        #[arg(long, default_value_t = 4)]
        workers: usize,
    },
    /// Run the deployment gate against a model config and artifact.
    Validate {
        /// Path to the model config JSON document.
        #[arg(long)]
        config: PathBuf,

        /// Path to the trained model artifact.
        #[arg(long)]
        artifact: PathBuf,

        /// Expected blake3 checksum of the artifact (hex).
        #[arg(long)]
        checksum: Option<String>,

        /// TOML file overriding validation thresholds.
        #[arg(long)]
        thresholds: Option<PathBuf>,

        /// Features the serving pipeline can supply (comma-separated).
        /// Defaults to every registered built-in feature.
        #[arg(long, value_delimiter = ',')]
        provided: Option<Vec<String>>,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report entry counts, class split, and store sizes per series.
    Status {
        /// Cache directory. Defaults to ./cache.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
    },
    /// Drop cached entries: everything, or one as-of date across series.
    Clear {
        /// Cache directory. Defaults to ./cache.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Only invalidate the bucket covering this date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract {
            metadata,
            symbols,
            as_of,
            quotes_url,
            series_url,
            cache_dir,
            out,
            workers,
        } => run_extract(
            metadata, symbols, as_of, quotes_url, series_url, cache_dir, out, workers,
        ),
        Commands::Validate {
            config,
            artifact,
            checksum,
            thresholds,
            provided,
        } => run_validate(config, artifact, checksum, thresholds, provided),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clear { cache_dir, date } => run_cache_clear(&cache_dir, date),
        },
    }
}

fn parse_date(value: Option<&str>) -> Result<NaiveDate> {
    Ok(value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("dates must be YYYY-MM-DD")?
        .unwrap_or_else(|| chrono::Local::now().date_naive()))
}

/// Macro series and their key granularities, matching the built-ins.
fn macro_series_config() -> Vec<(&'static str, KeyGranularity)> {
    MACRO_SERIES
        .iter()
        .map(|name| {
            let granularity = if *name == "treasury_10y" {
                KeyGranularity::Daily
            } else {
                KeyGranularity::Monthly
            };
            (*name, granularity)
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn run_extract(
    metadata: PathBuf,
    symbols: Vec<String>,
    as_of: Option<String>,
    quotes_url: String,
    series_url: String,
    cache_dir: PathBuf,
    out: Option<PathBuf>,
    workers: usize,
) -> Result<()> {
    let as_of = parse_date(as_of.as_deref())?;

    let breaker = Arc::new(CircuitBreaker::for_quote_api());
    let quotes = Arc::new(HttpQuoteProvider::new(quotes_url, breaker));
    let macros = MacroCaches::open(
        &cache_dir,
        Arc::new(HttpSeriesProvider::new(series_url)),
        &macro_series_config(),
        CachePolicy::default(),
    )?;

    let registry = Arc::new(FeatureRegistry::with_builtins());
    let sources = Arc::new(DataSources { quotes, macros });
    let assembler = FeatureAssembler::with_workers(registry, sources, workers);

    let meta = modellab_core::domain::ModelMetadata::load(&metadata)?;
    println!(
        "Extracting {} feature(s) for model {} as of {as_of}",
        meta.num_features, meta.model_version
    );

    let mut writer = match &out {
        Some(path) => {
            let mut w = csv::Writer::from_path(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut header = vec!["symbol".to_string(), "as_of".to_string()];
            header.extend(meta.features.iter().cloned());
            w.write_record(&header)?;
            Some(w)
        }
        None => None,
    };

    let mut warned = 0usize;
    for symbol in &symbols {
        let vector = assembler.extract(&meta, symbol, as_of);
        warned += vector.warnings.len();

        match writer.as_mut() {
            Some(w) => {
                let mut record = vec![symbol.clone(), as_of.to_string()];
                record.extend(vector.values.iter().map(|v| format!("{v}")));
                w.write_record(&record)?;
            }
            None => {
                let rendered: Vec<String> =
                    vector.values.iter().map(|v| format!("{v:.6}")).collect();
                println!("{symbol}: [{}]", rendered.join(", "));
            }
        }
        for warning in &vector.warnings {
            eprintln!("WARNING: {symbol}: {warning}");
        }
    }

    if let Some(mut w) = writer {
        w.flush()?;
        println!("Vectors written to {}", out.unwrap().display());
    }
    println!(
        "Done: {} symbol(s), {warned} degraded feature value(s)",
        symbols.len()
    );
    Ok(())
}

fn run_validate(
    config_path: PathBuf,
    artifact: PathBuf,
    checksum: Option<String>,
    thresholds_path: Option<PathBuf>,
    provided: Option<Vec<String>>,
) -> Result<()> {
    let config = ModelConfig::from_file(&config_path)?;
    let thresholds = match thresholds_path {
        Some(path) => ValidationThresholds::from_file(&path)?,
        None => ValidationThresholds::default(),
    };
    let provided = provided.unwrap_or_else(|| FeatureRegistry::with_builtins().names());

    let gate = DeploymentGate::new(thresholds);
    let artifact_for_load = artifact.clone();
    let decision = gate.validate_model_for_deployment(
        &config,
        &artifact,
        move || {
            // Stand-in load: read the artifact fully, as the serving
            // layer would before deserializing weights.
            std::fs::read(&artifact_for_load).map(|_| ()).map_err(Into::into)
        },
        &provided,
        checksum.as_deref(),
    );

    println!();
    println!("=== Deployment Decision: {} ===", config.model_id);
    let rows = [
        ("config", decision.config_check),
        ("performance", decision.performance_check),
        ("size", decision.size_check),
        ("integrity", decision.integrity_check),
        ("feature compatibility", decision.feature_compatibility_check),
        ("hyperparameters", decision.hyperparameter_check),
        ("load time", decision.load_time_check),
    ];
    for (name, passed) in rows {
        println!("  {:<22} {}", name, if passed { "PASS" } else { "FAIL" });
    }
    println!();

    if !decision.errors.is_empty() {
        println!("Errors:");
        for error in &decision.errors {
            println!("  - {error}");
        }
    }
    if !decision.warnings.is_empty() {
        println!("Warnings:");
        for warning in &decision.warnings {
            println!("  - {warning}");
        }
    }

    let next = ModelStatus::Training.after_gate(&decision)?;
    println!();
    if decision.is_valid {
        println!("Result: VALID, model may transition to {next:?}");
        Ok(())
    } else {
        println!("Result: REJECTED, model stays in {next:?}");
        std::process::exit(1);
    }
}

fn open_series_caches(cache_dir: &Path) -> Result<Vec<TieredCache>> {
    macro_series_config()
        .into_iter()
        .map(|(name, granularity)| {
            TieredCache::open(
                name,
                granularity,
                cache_dir.join(format!("{name}.json")),
                CachePolicy::default(),
            )
            .with_context(|| format!("cannot open cache for series '{name}'"))
        })
        .collect()
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    println!("Cache: {}", cache_dir.display());
    println!();
    println!(
        "{:<20} {:>8} {:>11} {:>8} {:>10}",
        "Series", "Entries", "Historical", "Recent", "Size"
    );
    println!("{}", "-".repeat(62));

    for cache in open_series_caches(cache_dir)? {
        let status = cache.status();
        println!(
            "{:<20} {:>8} {:>11} {:>8} {:>10}",
            status.series,
            status.entries,
            status.historical,
            status.recent,
            format_size(status.store_bytes)
        );
    }
    Ok(())
}

fn run_cache_clear(cache_dir: &Path, date: Option<String>) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    match date {
        Some(date) => {
            let as_of = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .context("dates must be YYYY-MM-DD")?;
            let mut removed = 0;
            for cache in open_series_caches(cache_dir)? {
                if cache.invalidate(as_of)? {
                    removed += 1;
                    println!("Invalidated {as_of} in '{}'", cache.series());
                }
            }
            if removed == 0 {
                println!("No cached entries covered {as_of}.");
            }
        }
        None => {
            for cache in open_series_caches(cache_dir)? {
                let entries = cache.len();
                cache.clear()?;
                println!("Cleared '{}' ({entries} entries)", cache.series());
            }
        }
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
