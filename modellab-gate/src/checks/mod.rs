//! The seven deployment validators.

pub mod artifact;
pub mod compatibility;
pub mod config;
pub mod hyperparameters;
pub mod load_time;
pub mod performance;

pub use artifact::artifact_checksum;
pub use hyperparameters::{schema_for, ParamKind, ParamRule};
pub use load_time::LoadError;
