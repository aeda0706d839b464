use crate::types::{Result, SearchResult, SourceKind};
use async_trait::async_trait;

/// Trait for pulling search results from one external provider
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which source tag the adapter's results carry
    fn kind(&self) -> SourceKind;

    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Query the provider. Failures come back as `Err`; the aggregator
    /// treats them the same as an empty list.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// One provider attempt inside a fallback chain
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    fn strategy_name(&self) -> &str;

    async fn attempt(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}
