//! Built-in feature extractors.
//!
//! Two families:
//! - Bar-derived features (momentum, volatility, volume, RSI, SMA
//!   ratio) that all share one scratch-cached bar fetch per extraction
//!   call.
//! - Macro-series features (unemployment, CPI, treasury yield) that
//!   flow through the tiered caches.
//!
//! Extractors compute from the bars the source returned for the as-of
//! date; the lookahead guard already lives at the fetch seam.

use super::context::{ExtractionContext, FeatureError};
use super::registry::FeatureRegistry;
use crate::domain::DailyBar;
use std::sync::Arc;

/// Macro series names the standard registry expects caches for.
pub const MACRO_SERIES: &[&str] = &["unemployment_rate", "cpi_yoy", "treasury_10y"];

/// Register the full built-in set.
pub fn install(registry: &FeatureRegistry) {
    registry.register("mom_10d", Arc::new(|ctx: &ExtractionContext| momentum(ctx, "mom_10d", 10)));
    registry.register("mom_30d", Arc::new(|ctx: &ExtractionContext| momentum(ctx, "mom_30d", 30)));
    registry.register("vol_20d", Arc::new(|ctx: &ExtractionContext| realized_vol(ctx, 20)));
    registry.register("volume_ratio_5d", Arc::new(|ctx: &ExtractionContext| volume_ratio(ctx, 5)));
    registry.register("rsi_14", Arc::new(|ctx: &ExtractionContext| rsi(ctx, 14)));
    registry.register("sma_ratio_50", Arc::new(|ctx: &ExtractionContext| sma_ratio(ctx, 50)));

    registry.register(
        "unemployment_rate",
        Arc::new(|ctx: &ExtractionContext| ctx.macro_value("unemployment_rate")),
    );
    registry.register(
        "cpi_yoy",
        Arc::new(|ctx: &ExtractionContext| ctx.macro_value("cpi_yoy")),
    );
    registry.register(
        "treasury_10y",
        Arc::new(|ctx: &ExtractionContext| ctx.macro_value("treasury_10y")),
    );
}

// ─── Bar-derived features ────────────────────────────────────────────

/// Simple momentum: adj close today vs. `window` bars ago, as a fraction.
fn momentum(ctx: &ExtractionContext, feature: &str, window: usize) -> Result<f64, FeatureError> {
    let bars = ctx.bars()?;
    let closes = adj_closes(&bars);
    need(feature, window + 1, closes.len())?;
    let last = closes[closes.len() - 1];
    let base = closes[closes.len() - 1 - window];
    if base <= 0.0 {
        return Ok(0.0);
    }
    Ok(last / base - 1.0)
}

/// Annualized realized volatility of daily returns over `window` bars.
fn realized_vol(ctx: &ExtractionContext, window: usize) -> Result<f64, FeatureError> {
    let bars = ctx.bars()?;
    let closes = adj_closes(&bars);
    need("vol_20d", window + 1, closes.len())?;
    let start = closes.len() - 1 - window;
    let returns: Vec<f64> = (start + 1..closes.len())
        .map(|i| {
            if closes[i - 1] <= 0.0 {
                0.0
            } else {
                closes[i] / closes[i - 1] - 1.0
            }
        })
        .collect();
    Ok(std_dev(&returns) * (252.0_f64).sqrt())
}

/// Latest volume relative to its `window`-bar average.
fn volume_ratio(ctx: &ExtractionContext, window: usize) -> Result<f64, FeatureError> {
    let bars = ctx.bars()?;
    need("volume_ratio_5d", window, bars.len())?;
    let last = bars[bars.len() - 1].volume as f64;
    let avg = bars[bars.len() - window..]
        .iter()
        .map(|b| b.volume as f64)
        .sum::<f64>()
        / window as f64;
    if avg <= 0.0 {
        return Ok(0.0);
    }
    Ok(last / avg)
}

/// Wilder RSI over `period` bars, computed at the last bar.
fn rsi(ctx: &ExtractionContext, period: usize) -> Result<f64, FeatureError> {
    let bars = ctx.bars()?;
    let closes = adj_closes(&bars);
    need("rsi_14", period + 1, closes.len())?;

    let changes: Vec<f64> = (1..closes.len()).map(|i| closes[i] - closes[i - 1]).collect();
    let seed = &changes[..period];
    let mut avg_gain = seed.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss = -seed.iter().filter(|c| **c < 0.0).sum::<f64>() / period as f64;

    let alpha = 1.0 / period as f64;
    for &ch in &changes[period..] {
        let gain = if ch > 0.0 { ch } else { 0.0 };
        let loss = if ch < 0.0 { -ch } else { 0.0 };
        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
    }

    if avg_loss == 0.0 && avg_gain == 0.0 {
        Ok(50.0)
    } else if avg_loss == 0.0 {
        Ok(100.0)
    } else if avg_gain == 0.0 {
        Ok(0.0)
    } else {
        Ok(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}

/// Latest adj close over its `window`-bar simple moving average.
fn sma_ratio(ctx: &ExtractionContext, window: usize) -> Result<f64, FeatureError> {
    let bars = ctx.bars()?;
    let closes = adj_closes(&bars);
    need("sma_ratio_50", window, closes.len())?;
    let sma = closes[closes.len() - window..].iter().sum::<f64>() / window as f64;
    if sma <= 0.0 {
        return Ok(0.0);
    }
    Ok(closes[closes.len() - 1] / sma)
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn adj_closes(bars: &[DailyBar]) -> Vec<f64> {
    bars.iter().map(|b| b.adj_close).collect()
}

fn need(feature: &str, need: usize, have: usize) -> Result<(), FeatureError> {
    if have < need {
        return Err(FeatureError::InsufficientHistory {
            feature: feature.to_string(),
            need,
            have,
        });
    }
    Ok(())
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
