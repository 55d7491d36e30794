//! Fetch seams, retry policy, and the reference quote provider.

pub mod circuit_breaker;
pub mod fetcher;
pub mod quotes;
pub mod series;

pub use circuit_breaker::CircuitBreaker;
pub use fetcher::{FetchError, QuoteSource, RetryPolicy, SeriesSource};
pub use quotes::HttpQuoteProvider;
pub use series::HttpSeriesProvider;
