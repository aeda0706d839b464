use crate::traits::SearchStrategy;
use crate::types::{AggregatorError, Result, SearchResult};
use tracing::{debug, info, warn};

/// Ordered list of provider strategies tried one after another.
///
/// The first attempt that returns at least one record wins. Attempts are
/// independent and none is repeated.
pub struct FallbackChain {
    name: String,
    strategies: Vec<Box<dyn SearchStrategy>>,
}

impl FallbackChain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: Box<dyn SearchStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.strategy_name()).collect()
    }

    /// Run the chain. If every attempt errored the last error is returned;
    /// if any attempt succeeded with no records the result is empty.
    pub async fn run(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let mut last_error = None;
        let mut any_succeeded = false;

        for strategy in &self.strategies {
            match strategy.attempt(query, max_results).await {
                Ok(results) if !results.is_empty() => {
                    info!(
                        "{}: {} returned {} results",
                        self.name,
                        strategy.strategy_name(),
                        results.len()
                    );
                    return Ok(results);
                }
                Ok(_) => {
                    debug!("{}: {} returned no results", self.name, strategy.strategy_name());
                    any_succeeded = true;
                }
                Err(e) => {
                    warn!("{}: {} failed: {}", self.name, strategy.strategy_name(), e);
                    last_error = Some(e);
                }
            }
        }

        if any_succeeded {
            return Ok(Vec::new());
        }

        Err(last_error.unwrap_or_else(|| {
            AggregatorError::General(format!("{} has no search strategies", self.name))
        }))
    }
}
