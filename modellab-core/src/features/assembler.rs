//! Feature assembler — turns a model's declared feature list into a
//! fixed-order numeric vector.
//!
//! The core invariant: the output vector length always equals the
//! metadata's `num_features`, no matter how many individual extractors
//! fail. A missing registry entry or a failed extraction degrades that
//! position to `0.0` with a logged warning; a single dead data source
//! must dent prediction quality, not halt serving.
//!
//! Extractors run on a small bounded worker pool (third-party sources
//! rate-limit; a handful of concurrent calls is plenty) and each is
//! individually bounded by its fetch layer's retry deadline, so one
//! slow source cannot stall the whole vector.

use super::context::{DataSources, ExtractionContext};
use super::registry::FeatureRegistry;
use super::scratch::ScratchCache;
use crate::domain::{MetadataError, ModelMetadata};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Default worker-pool width for one extraction call.
const DEFAULT_WORKERS: usize = 4;

/// The assembled vector plus everything the caller should surface.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub model_version: String,
    pub symbol: String,
    pub as_of: NaiveDate,
    /// Fixed-order values; `values.len() == metadata.num_features`.
    pub values: Vec<f64>,
    /// One message per soft-failed position, for operator logs.
    pub warnings: Vec<String>,
}

pub struct FeatureAssembler {
    registry: Arc<FeatureRegistry>,
    sources: Arc<DataSources>,
    pool: rayon::ThreadPool,
}

impl FeatureAssembler {
    pub fn new(registry: Arc<FeatureRegistry>, sources: Arc<DataSources>) -> Self {
        Self::with_workers(registry, sources, DEFAULT_WORKERS)
    }

    pub fn with_workers(
        registry: Arc<FeatureRegistry>,
        sources: Arc<DataSources>,
        workers: usize,
    ) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .build()
            .expect("failed to build extraction worker pool");
        Self {
            registry,
            sources,
            pool,
        }
    }

    /// Load metadata from `path` and extract its vector.
    ///
    /// Only an unloadable or invalid metadata document is a hard error;
    /// everything downstream soft-fails per position.
    pub fn extract_for_model(
        &self,
        metadata_path: impl AsRef<Path>,
        symbol: &str,
        as_of: NaiveDate,
    ) -> Result<FeatureVector, MetadataError> {
        let metadata = ModelMetadata::load(metadata_path)?;
        Ok(self.extract(&metadata, symbol, as_of))
    }

    /// Extract the vector for already-loaded metadata.
    pub fn extract(&self, metadata: &ModelMetadata, symbol: &str, as_of: NaiveDate) -> FeatureVector {
        let scratch = ScratchCache::new();
        let ctx = ExtractionContext {
            symbol,
            as_of,
            scratch: &scratch,
            sources: self.sources.as_ref(),
        };

        // Indexed par_iter + collect preserves declaration order.
        let outcomes: Vec<(f64, Option<String>)> = self.pool.install(|| {
            metadata
                .features
                .par_iter()
                .map(|name| self.extract_one(name, &ctx))
                .collect()
        });

        let mut values = Vec::with_capacity(outcomes.len());
        let mut warnings = Vec::new();
        for (value, warning) in outcomes {
            values.push(value);
            if let Some(w) = warning {
                warnings.push(w);
            }
        }

        debug_assert_eq!(values.len(), metadata.num_features);
        FeatureVector {
            model_version: metadata.model_version.clone(),
            symbol: symbol.to_string(),
            as_of,
            values,
            warnings,
        }
    }

    fn extract_one(&self, name: &str, ctx: &ExtractionContext) -> (f64, Option<String>) {
        let Some(extractor) = self.registry.get(name) else {
            let msg = format!("feature '{name}' has no registered extractor, emitting 0.0");
            tracing::warn!(symbol = ctx.symbol, %name, "missing extractor");
            return (0.0, Some(msg));
        };

        match extractor(ctx) {
            Ok(value) => (value, None),
            Err(e) => {
                let msg = format!("feature '{name}' failed ({e}), emitting 0.0");
                tracing::warn!(
                    symbol = ctx.symbol,
                    as_of = %ctx.as_of,
                    %name,
                    error = %e,
                    "feature extraction soft-failed"
                );
                (0.0, Some(msg))
            }
        }
    }
}
