//! Model config and metrics — the promotion-time view of a model.
//!
//! Written by training tooling, read-only here. The deployment gate
//! validates this document; it never edits it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Supported model families, each with its own hyperparameter schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    GradientBoosting,
    RandomForest,
    Lstm,
    Ensemble,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GradientBoosting => "gradient_boosting",
            Self::RandomForest => "random_forest",
            Self::Lstm => "lstm",
            Self::Ensemble => "ensemble",
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training and validation metrics reported for a candidate model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub sharpe: f64,
    pub train_loss: f64,
    pub val_loss: f64,
    pub train_accuracy: f64,
    pub val_accuracy: f64,
}

/// Full candidate-model configuration as persisted by training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_id: String,
    pub model_type: ModelType,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deployed_at: Option<DateTime<Utc>>,
    pub features: Vec<String>,
    #[serde(default)]
    pub hyperparameters: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub metrics: ModelMetrics,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read model config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse model config '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

impl ModelConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ModelType::GradientBoosting).unwrap(),
            "\"gradient_boosting\""
        );
        let parsed: ModelType = serde_json::from_str("\"lstm\"").unwrap();
        assert_eq!(parsed, ModelType::Lstm);
    }

    #[test]
    fn config_roundtrip_with_defaults() {
        let json = r#"{
            "model_id": "mdl-spy-direction-004",
            "model_type": "gradient_boosting",
            "version": "1.4.0",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-02T09:30:00Z",
            "features": ["mom_10d", "rsi_14", "unemployment_rate"]
        }"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.model_id, "mdl-spy-direction-004");
        assert!(config.deployed_at.is_none());
        assert!(config.hyperparameters.is_empty());
        assert_eq!(config.metrics.accuracy, 0.0);
    }
}
