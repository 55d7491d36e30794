//! Durable backing for a tiered cache: one JSON document per series.
//!
//! The keyspace is small (coarse, time-bucketed keys), so the document
//! is loaded fully on open and rewritten fully on every write. Writes
//! are atomic (write to `.tmp`, rename into place). A corrupt document
//! is moved aside to `*.corrupt` and the cache starts empty; recovery
//! is re-fetching, never a crash.

use super::entry::CacheEntry;
use crate::data::FetchError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from cache operations (durable store or wrapped fetch).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store I/O error at '{path}': {detail}")]
    Io { path: String, detail: String },

    #[error("cache store serialization error: {0}")]
    Serialize(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// The on-disk document, keyed by coarse time bucket.
pub type CacheDocument = BTreeMap<String, CacheEntry>;

/// Single-JSON-document store for one cached series.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full document. Missing file means an empty cache;
    /// a corrupt file is quarantined and also means an empty cache.
    pub fn load(&self) -> Result<CacheDocument, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CacheDocument::new());
            }
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.path.display().to_string(),
                    detail: e.to_string(),
                });
            }
        };

        match serde_json::from_str(&content) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                let quarantine = self.path.with_extension("json.corrupt");
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    quarantine = %quarantine.display(),
                    "cache document is corrupt, quarantining and starting empty"
                );
                let _ = fs::rename(&self.path, &quarantine);
                Ok(CacheDocument::new())
            }
        }
    }

    /// Rewrite the full document atomically.
    pub fn save(&self, doc: &CacheDocument) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.display().to_string(),
                detail: e.to_string(),
            })?;
        }

        let json =
            serde_json::to_string_pretty(doc).map_err(|e| CacheError::Serialize(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| CacheError::Io {
            path: tmp.display().to_string(),
            detail: e.to_string(),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            CacheError::Io {
                path: self.path.display().to_string(),
                detail: format!("atomic rename failed: {e}"),
            }
        })?;
        Ok(())
    }

    /// Byte size of the document on disk (zero if absent).
    pub fn size_bytes(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}
