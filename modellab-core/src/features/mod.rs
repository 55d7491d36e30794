//! Feature registry, built-in extractors, and the assembler.

pub mod assembler;
pub mod builtin;
pub mod context;
pub mod registry;
pub mod scratch;

pub use assembler::{FeatureAssembler, FeatureVector};
pub use context::{DataSources, ExtractionContext, FeatureError, MacroCaches};
pub use registry::{Extractor, FeatureRegistry};
pub use scratch::ScratchCache;
