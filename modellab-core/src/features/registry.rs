//! Feature registry — a name → extractor table.
//!
//! Models and features evolve independently: a new model version that
//! wants a different feature subset touches nothing but (at most) one
//! `register` call for a genuinely new name. Registration is
//! append-only and last-wins; the table is constructed explicitly at
//! process start, never an ambient global.

use super::context::{ExtractionContext, FeatureError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A registered extractor: `(symbol, as-of, scratch) -> numeric value`.
pub type Extractor =
    Arc<dyn Fn(&ExtractionContext) -> Result<f64, FeatureError> + Send + Sync>;

pub struct FeatureRegistry {
    table: RwLock<HashMap<String, Extractor>>,
}

impl FeatureRegistry {
    /// An empty registry, for tests and custom deployments.
    pub fn empty() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
        }
    }

    /// The standard registry: empty plus the built-in feature set.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        super::builtin::install(&registry);
        registry
    }

    /// Register an extractor under `name`. Re-registering replaces the
    /// previous extractor (last wins).
    pub fn register(&self, name: impl Into<String>, extractor: Extractor) {
        let name = name.into();
        let mut table = self.table.write().unwrap();
        if table.insert(name.clone(), extractor).is_some() {
            tracing::debug!(feature = %name, "extractor re-registered, last wins");
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.table.read().unwrap().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Extractor> {
        self.table.read().unwrap().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.table.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered feature names, sorted for stable reporting.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}
