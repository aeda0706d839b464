use crate::config::ProviderConfig;
use crate::dates::normalize_date;
use crate::fetcher::Fetcher;
use crate::sources::fallback::FallbackChain;
use crate::traits::{SearchStrategy, SourceAdapter};
use crate::types::{AggregatorError, Result, SearchResult, SourceKind};
use crate::utils::text::strip_markup;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

const SEMANTIC_SCHOLAR_FIELDS: &str = "title,abstract,authors,year,publicationDate,url,venue";

/// Academic literature search: Semantic Scholar (keyed), then OpenAlex, then Crossref.
pub struct AcademicSource {
    chain: FallbackChain,
}

impl AcademicSource {
    pub fn new(fetcher: Fetcher, providers: &ProviderConfig) -> Self {
        let chain = FallbackChain::new("Academic")
            .then(Box::new(SemanticScholarStrategy {
                fetcher: fetcher.clone(),
                base_url: providers.semantic_scholar_url.clone(),
                api_key: providers.semantic_scholar_api_key.clone(),
            }))
            .then(Box::new(OpenAlexStrategy {
                fetcher: fetcher.clone(),
                base_url: providers.openalex_url.clone(),
                contact_email: providers.contact_email.clone(),
            }))
            .then(Box::new(CrossrefStrategy {
                fetcher,
                base_url: providers.crossref_url.clone(),
                contact_email: providers.contact_email.clone(),
            }));

        Self { chain }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.chain.strategy_names()
    }
}

#[async_trait]
impl SourceAdapter for AcademicSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Academic
    }

    fn source_name(&self) -> String {
        "Academic Research".to_string()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!("Searching academic literature for '{}'", query);
        self.chain.run(query, max_results).await
    }
}

// --- Semantic Scholar -------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SemanticScholarResponse {
    #[serde(default)]
    data: Vec<SemanticScholarPaper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SemanticScholarPaper {
    paper_id: String,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    authors: Vec<NamedAuthor>,
    year: Option<i32>,
    publication_date: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedAuthor {
    name: Option<String>,
}

struct SemanticScholarStrategy {
    fetcher: Fetcher,
    base_url: String,
    api_key: Option<String>,
}

#[async_trait]
impl SearchStrategy for SemanticScholarStrategy {
    fn strategy_name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn attempt(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| AggregatorError::NotConfigured {
            source_name: "Semantic Scholar".to_string(),
            reason: "SEMANTIC_SCHOLAR_API_KEY is not set".to_string(),
        })?;

        let request = self
            .fetcher
            .get(&self.base_url)
            .header("x-api-key", api_key)
            .query(&[
                ("query", query.to_string()),
                ("limit", max_results.min(100).to_string()),
                ("fields", SEMANTIC_SCHOLAR_FIELDS.to_string()),
            ]);

        let response: SemanticScholarResponse = self.fetcher.fetch_json(request).await?;

        Ok(response
            .data
            .into_iter()
            .take(max_results)
            .map(|paper| {
                let url = paper
                    .url
                    .unwrap_or_else(|| {
                        format!("https://www.semanticscholar.org/paper/{}", paper.paper_id)
                    });
                let raw_date = paper.publication_date.or_else(|| paper.year.map(|y| y.to_string()));

                SearchResult::new(
                    SourceKind::Academic,
                    paper.paper_id,
                    paper.title.unwrap_or_else(|| "Untitled".to_string()),
                    url,
                )
                .with_abstract(paper.abstract_text)
                .with_authors(join_names(paper.authors.into_iter().filter_map(|a| a.name)))
                .with_date(Some(normalize_date(raw_date.as_deref())))
            })
            .collect())
    }
}

// --- OpenAlex ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OpenAlexResponse {
    #[serde(default)]
    results: Vec<OpenAlexWork>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexWork {
    id: String,
    title: Option<String>,
    display_name: Option<String>,
    publication_date: Option<String>,
    doi: Option<String>,
    #[serde(default)]
    authorships: Vec<OpenAlexAuthorship>,
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
    primary_location: Option<OpenAlexLocation>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthorship {
    author: Option<OpenAlexAuthor>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthor {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexLocation {
    landing_page_url: Option<String>,
}

/// OpenAlex ships abstracts as word -> positions; put the words back in order.
fn rebuild_abstract(index: &HashMap<String, Vec<usize>>) -> Option<String> {
    let mut positioned: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |p| (*p, word.as_str())))
        .collect();
    if positioned.is_empty() {
        return None;
    }
    positioned.sort_by_key(|(position, _)| *position);
    Some(positioned.into_iter().map(|(_, word)| word).collect::<Vec<_>>().join(" "))
}

struct OpenAlexStrategy {
    fetcher: Fetcher,
    base_url: String,
    contact_email: Option<String>,
}

#[async_trait]
impl SearchStrategy for OpenAlexStrategy {
    fn strategy_name(&self) -> &str {
        "OpenAlex"
    }

    async fn attempt(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let mut params = vec![
            ("search", query.to_string()),
            ("per-page", max_results.clamp(1, 200).to_string()),
        ];
        if let Some(email) = &self.contact_email {
            params.push(("mailto", email.clone()));
        }

        let request = self.fetcher.get(&self.base_url).query(&params);
        let response: OpenAlexResponse = self.fetcher.fetch_json(request).await?;

        Ok(response
            .results
            .into_iter()
            .take(max_results)
            .map(|work| {
                let id = work.id.rsplit('/').next().unwrap_or(&work.id).to_string();
                let url = work
                    .primary_location
                    .and_then(|l| l.landing_page_url)
                    .or(work.doi)
                    .unwrap_or_else(|| work.id.clone());
                let title = work
                    .title
                    .or(work.display_name)
                    .unwrap_or_else(|| "Untitled".to_string());
                let authors = join_names(
                    work.authorships
                        .into_iter()
                        .filter_map(|a| a.author.and_then(|author| author.display_name)),
                );

                SearchResult::new(SourceKind::Academic, id, title, url)
                    .with_abstract(work.abstract_inverted_index.as_ref().and_then(rebuild_abstract))
                    .with_authors(authors)
                    .with_date(Some(normalize_date(work.publication_date.as_deref())))
            })
            .collect())
    }
}

// --- Crossref ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    message: CrossrefMessage,
}

#[derive(Debug, Deserialize)]
struct CrossrefMessage {
    #[serde(default)]
    items: Vec<CrossrefItem>,
}

#[derive(Debug, Deserialize)]
struct CrossrefItem {
    #[serde(rename = "DOI")]
    doi: String,
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<CrossrefAuthor>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    issued: Option<CrossrefDate>,
    #[serde(rename = "URL")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl CrossrefDate {
    fn to_raw(&self) -> Option<String> {
        let parts = self.date_parts.first()?;
        match parts.as_slice() {
            [Some(y), Some(m), Some(d), ..] => Some(format!("{:04}-{:02}-{:02}", y, m, d)),
            [Some(y), Some(m)] => Some(format!("{:04}-{:02}", y, m)),
            [Some(y), ..] => Some(format!("{:04}", y)),
            _ => None,
        }
    }
}

struct CrossrefStrategy {
    fetcher: Fetcher,
    base_url: String,
    contact_email: Option<String>,
}

#[async_trait]
impl SearchStrategy for CrossrefStrategy {
    fn strategy_name(&self) -> &str {
        "Crossref"
    }

    async fn attempt(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let mut params = vec![
            ("query", query.to_string()),
            ("rows", max_results.clamp(1, 1000).to_string()),
        ];
        if let Some(email) = &self.contact_email {
            params.push(("mailto", email.clone()));
        }

        let request = self.fetcher.get(&self.base_url).query(&params);
        let response: CrossrefResponse = self.fetcher.fetch_json(request).await?;

        Ok(response
            .message
            .items
            .into_iter()
            .take(max_results)
            .map(|item| {
                let title = item
                    .title
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| "Untitled".to_string());
                let url = item
                    .url
                    .unwrap_or_else(|| format!("https://doi.org/{}", item.doi));
                let authors = join_names(item.author.into_iter().map(|a| {
                    match (a.given, a.family) {
                        (Some(given), Some(family)) => format!("{} {}", given, family),
                        (None, Some(family)) => family,
                        (Some(given), None) => given,
                        (None, None) => String::new(),
                    }
                }));
                let raw_date = item.issued.as_ref().and_then(CrossrefDate::to_raw);

                SearchResult::new(SourceKind::Academic, item.doi, strip_markup(&title), url)
                    .with_abstract(item.abstract_text.as_deref().map(strip_markup))
                    .with_authors(authors)
                    .with_date(Some(normalize_date(raw_date.as_deref())))
            })
            .collect())
    }
}

fn join_names(names: impl Iterator<Item = String>) -> Option<String> {
    let names: Vec<String> = names.filter(|n| !n.trim().is_empty()).collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}
