//! Gate thresholds — every named minimum and maximum in one place.
//!
//! Constructed with `Default` or loaded from TOML; nothing in the
//! checks hard-codes a limit. Partial TOML files work: absent fields
//! keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    // ── Performance floors ──
    pub min_accuracy: f64,
    pub min_precision: f64,
    pub min_recall: f64,
    pub min_f1: f64,
    pub min_sharpe: f64,
    /// Metrics passing by less than this margin draw a warning.
    pub metric_warn_margin: f64,
    /// Train/validation accuracy gap beyond this warns of overfitting.
    pub max_overfit_gap: f64,
    /// `val_loss > loss_ratio_warn * train_loss` warns.
    pub loss_ratio_warn: f64,
    /// Sharpe above this smells like leakage and warns.
    pub suspicious_sharpe: f64,

    // ── Artifact size ──
    pub max_artifact_bytes: u64,
    /// Fraction of the max at which the size check starts warning.
    pub size_warn_fraction: f64,
    /// Anything smaller than this is suspicious for a real model.
    pub min_plausible_bytes: u64,

    // ── Config ──
    pub min_feature_count: usize,

    // ── Load time ──
    pub max_load_time_ms: u64,
    /// Fraction of the budget at which the load-time check warns.
    pub load_warn_fraction: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_accuracy: 0.55,
            min_precision: 0.50,
            min_recall: 0.50,
            min_f1: 0.50,
            min_sharpe: 0.50,
            metric_warn_margin: 0.02,
            max_overfit_gap: 0.15,
            loss_ratio_warn: 2.0,
            suspicious_sharpe: 3.0,
            max_artifact_bytes: 100 * 1024 * 1024,
            size_warn_fraction: 0.8,
            min_plausible_bytes: 1024,
            min_feature_count: 3,
            max_load_time_ms: 50,
            load_warn_fraction: 0.7,
        }
    }
}

#[derive(Debug, Error)]
pub enum ThresholdsError {
    #[error("failed to read thresholds file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse thresholds: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ValidationThresholds {
    pub fn from_toml(content: &str) -> Result<Self, ThresholdsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ThresholdsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ThresholdsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let t = ValidationThresholds::default();
        assert_eq!(t.max_artifact_bytes, 100 * 1024 * 1024);
        assert_eq!(t.max_load_time_ms, 50);
        assert!(t.min_accuracy > 0.5);
        assert!(t.size_warn_fraction < 1.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let t = ValidationThresholds::from_toml("min_accuracy = 0.7\nmax_load_time_ms = 100\n")
            .unwrap();
        assert_eq!(t.min_accuracy, 0.7);
        assert_eq!(t.max_load_time_ms, 100);
        // Untouched fields fall back to defaults.
        assert_eq!(t.min_f1, 0.50);
        assert_eq!(t.max_artifact_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(ValidationThresholds::from_toml("min_accuracy = \"high\"").is_err());
    }
}
