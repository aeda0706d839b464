use crate::config::ProviderConfig;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::traits::SourceAdapter;
use crate::types::{AggregatorError, ParsedEntry, Result, SearchResult, SourceKind};
use crate::utils::{text::strip_markup, url::extract_domain};
use async_trait::async_trait;
use tracing::{info, warn};

/// Google News RSS search feed.
pub struct NewsSource {
    fetcher: Fetcher,
    base_url: String,
}

impl NewsSource {
    pub fn new(fetcher: Fetcher, providers: &ProviderConfig) -> Self {
        Self {
            fetcher,
            base_url: providers.news_url.clone(),
        }
    }

    fn to_result(entry: ParsedEntry) -> SearchResult {
        let id = entry.guid.clone().unwrap_or_else(|| entry.url.clone());
        let date = entry
            .published_at
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| crate::dates::UNKNOWN_DATE.to_string());
        // Aggregated feeds name the outlet in the author slot when they name it at all
        let publisher = if entry.authors.is_empty() {
            extract_domain(&entry.url)
        } else {
            Some(entry.authors.join(", "))
        };

        SearchResult::new(SourceKind::News, id, strip_markup(&entry.title), entry.url)
            .with_abstract(entry.description.as_deref().map(strip_markup))
            .with_authors(publisher)
            .with_date(Some(date))
    }
}

#[async_trait]
impl SourceAdapter for NewsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    fn source_name(&self) -> String {
        "News".to_string()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let request = self.fetcher.get(&self.base_url).query(&[
            ("q", query),
            ("hl", "en-US"),
            ("gl", "US"),
            ("ceid", "US:en"),
        ]);

        let content = self.fetcher.fetch_text(request).await?;
        if !FeedParser::is_valid_feed_content(&content) {
            warn!("News feed returned something other than RSS for '{}'", query);
            return Err(AggregatorError::Parse("News response is not an RSS feed".to_string()));
        }

        let feed = FeedParser::new().parse_feed(&content)?;
        let results: Vec<SearchResult> = feed
            .entries
            .into_iter()
            .take(max_results)
            .map(Self::to_result)
            .collect();

        info!("Found {} news items for '{}'", results.len(), query);
        Ok(results)
    }
}
