//! modellab-core — the inference-time half of the model lifecycle.
//!
//! - Domain types (model metadata, daily bars)
//! - Fetch seams with bounded retry and a circuit breaker
//! - Tiered, TTL-aware cache over a durable JSON document
//! - Feature registry (name → extractor table) and built-in features
//! - Feature assembler producing fixed-order vectors with soft-fail

pub mod cache;
pub mod data;
pub mod domain;
pub mod features;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types crossing the worker-pool boundary
    /// are Send + Sync. Breaks the build, not the batch job.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::DailyBar>();
        require_sync::<domain::DailyBar>();
        require_send::<domain::ModelMetadata>();
        require_sync::<domain::ModelMetadata>();

        require_send::<cache::TieredCache>();
        require_sync::<cache::TieredCache>();
        require_send::<cache::CacheEntry>();
        require_sync::<cache::CacheEntry>();

        require_send::<features::FeatureRegistry>();
        require_sync::<features::FeatureRegistry>();
        require_send::<features::ScratchCache>();
        require_sync::<features::ScratchCache>();
        require_send::<features::DataSources>();
        require_sync::<features::DataSources>();

        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
    }
}
