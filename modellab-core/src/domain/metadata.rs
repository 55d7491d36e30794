//! Model metadata — the durable document describing what a model expects.
//!
//! Written by training (outside this workspace), read-only here. The
//! feature list is ordered; its order defines the layout of every
//! feature vector handed to that model version.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Metadata for a single trained model version.
///
/// `features.len() == num_features` is checked once at load time, not
/// re-derived downstream; the assembler trusts a loaded metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    pub model_version: String,
    pub features: Vec<String>,
    pub num_features: usize,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read metadata file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse metadata file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error(
        "metadata for model '{model_version}' declares num_features={declared} \
         but lists {actual} feature names"
    )]
    FeatureCountMismatch {
        model_version: String,
        declared: usize,
        actual: usize,
    },
}

impl ModelMetadata {
    /// Load and validate a metadata document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let meta: ModelMetadata =
            serde_json::from_str(&content).map_err(|source| MetadataError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        meta.validate()?;
        Ok(meta)
    }

    /// Check the feature-count invariant.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.features.len() != self.num_features {
            return Err(MetadataError::FeatureCountMismatch {
                model_version: self.model_version.clone(),
                declared: self.num_features,
                actual: self.features.len(),
            });
        }
        Ok(())
    }
}
