use crate::categorizer::categorize_missing;
use crate::config::ProviderConfig;
use crate::fetcher::Fetcher;
use crate::sources::{
    AcademicSource, ClinicalTrialsSource, NewsSource, PatentSource, PreprintSource,
};
use crate::traits::SourceAdapter;
use crate::types::{
    AggregatorError, Result, SearchOptions, SearchReport, SearchResult, SourceOutcome,
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fans a query out to every enabled source and merges what comes back.
///
/// A failing source contributes nothing and never fails the search.
pub struct MarketAggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl MarketAggregator {
    pub fn new() -> Self {
        Self { adapters: Vec::new() }
    }

    /// Aggregator wired to the five real providers.
    pub fn with_default_sources(fetcher: Fetcher, providers: &ProviderConfig) -> Self {
        Self::new()
            .with_source(Arc::new(AcademicSource::new(fetcher.clone(), providers)))
            .with_source(Arc::new(PatentSource::new(fetcher.clone(), providers)))
            .with_source(Arc::new(ClinicalTrialsSource::new(fetcher.clone(), providers)))
            .with_source(Arc::new(PreprintSource::new(fetcher.clone(), providers)))
            .with_source(Arc::new(NewsSource::new(fetcher, providers)))
    }

    pub fn with_source(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        info!("Registering source: {}", adapter.source_name());
        self.adapters.push(adapter);
        self
    }

    /// Merged, categorized results from every enabled source.
    pub async fn search_all_sources(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        Ok(self.search_with_report(options).await?.results)
    }

    /// Same as `search_all_sources`, plus the per-source outcome.
    pub async fn search_with_report(&self, options: &SearchOptions) -> Result<SearchReport> {
        let query = options.query.trim();
        if query.is_empty() {
            return Err(AggregatorError::InvalidQuery("query must not be empty".to_string()));
        }

        let enabled: Vec<&Arc<dyn SourceAdapter>> = self
            .adapters
            .iter()
            .filter(|adapter| options.sources.is_enabled(adapter.kind()))
            .collect();

        info!("Searching {} sources for '{}'", enabled.len(), query);

        // Settle every adapter; no early exit on failure.
        let settled = join_all(
            enabled
                .iter()
                .map(|adapter| adapter.search(query, options.max_results)),
        )
        .await;

        let mut results = Vec::new();
        let mut outcomes = Vec::with_capacity(settled.len());

        for (adapter, outcome) in enabled.iter().zip(settled) {
            match outcome {
                Ok(records) => {
                    info!("{} returned {} results", adapter.source_name(), records.len());
                    outcomes.push(SourceOutcome {
                        source: adapter.kind(),
                        records: records.len(),
                        error: None,
                    });
                    results.extend(records);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", adapter.source_name(), e);
                    outcomes.push(SourceOutcome {
                        source: adapter.kind(),
                        records: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        categorize_missing(&mut results);

        let report = SearchReport { results, outcomes };
        if report.all_failed() {
            error!("Every enabled source failed for '{}'", query);
        }
        info!("Search for '{}' produced {} results", query, report.results.len());

        Ok(report)
    }
}

impl Default for MarketAggregator {
    fn default() -> Self {
        Self::new()
    }
}
