use crate::config::ProviderConfig;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::traits::SourceAdapter;
use crate::types::{ParsedEntry, Result, SearchResult, SourceKind};
use async_trait::async_trait;
use tracing::info;

/// arXiv preprint search via the Atom export API.
pub struct PreprintSource {
    fetcher: Fetcher,
    base_url: String,
}

impl PreprintSource {
    pub fn new(fetcher: Fetcher, providers: &ProviderConfig) -> Self {
        Self {
            fetcher,
            base_url: providers.arxiv_url.clone(),
        }
    }

    /// arXiv's search syntax: every word must appear somewhere.
    fn build_query(query: &str) -> String {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|term| format!("all:{}", term.replace('"', "")))
            .collect();
        terms.join(" AND ")
    }

    fn to_result(entry: ParsedEntry) -> SearchResult {
        // http://arxiv.org/abs/2401.01234v1 -> 2401.01234v1
        let id = entry
            .guid
            .as_deref()
            .and_then(|guid| guid.rsplit("/abs/").next())
            .unwrap_or(entry.url.as_str())
            .to_string();
        let date = entry.published_at.map(|dt| dt.format("%Y-%m-%d").to_string());
        let title = entry.title.split_whitespace().collect::<Vec<_>>().join(" ");
        let summary = entry
            .description
            .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "));
        let authors = if entry.authors.is_empty() {
            None
        } else {
            Some(entry.authors.join(", "))
        };

        SearchResult::new(SourceKind::Preprint, id, title, entry.url)
            .with_abstract(summary)
            .with_authors(authors)
            .with_date(Some(date.unwrap_or_else(|| crate::dates::UNKNOWN_DATE.to_string())))
    }
}

#[async_trait]
impl SourceAdapter for PreprintSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Preprint
    }

    fn source_name(&self) -> String {
        "Preprints (arXiv)".to_string()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let request = self.fetcher.get(&self.base_url).query(&[
            ("search_query", Self::build_query(query)),
            ("start", "0".to_string()),
            ("max_results", max_results.to_string()),
            ("sortBy", "relevance".to_string()),
        ]);

        let content = self.fetcher.fetch_text(request).await?;
        let feed = FeedParser::new().parse_feed(&content)?;

        let results: Vec<SearchResult> = feed
            .entries
            .into_iter()
            .take(max_results)
            .map(Self::to_result)
            .collect();

        info!("Found {} preprints for '{}'", results.len(), query);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_conjunctive_query() {
        assert_eq!(
            PreprintSource::build_query("hydrogen  storage"),
            "all:hydrogen AND all:storage"
        );
        assert_eq!(PreprintSource::build_query("\"mof\""), "all:mof");
    }
}
