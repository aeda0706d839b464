use crate::config::ProviderConfig;
use crate::dates::normalize_date;
use crate::fetcher::Fetcher;
use crate::traits::SourceAdapter;
use crate::types::{AggregatorError, Result, SearchResult, SourceKind};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// European Patent Office OPS bibliographic search.
///
/// Each search exchanges the consumer key/secret for a fresh bearer token
/// and then runs one CQL query. Tokens are not cached.
pub struct PatentSource {
    fetcher: Fetcher,
    auth_url: String,
    search_url: String,
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl PatentSource {
    pub fn new(fetcher: Fetcher, providers: &ProviderConfig) -> Self {
        Self {
            fetcher,
            auth_url: providers.epo_auth_url.clone(),
            search_url: providers.epo_search_url.clone(),
            consumer_key: providers.epo_consumer_key.clone(),
            consumer_secret: providers.epo_consumer_secret.clone(),
        }
    }

    async fn access_token(&self) -> Result<String> {
        let (Some(key), Some(secret)) = (&self.consumer_key, &self.consumer_secret) else {
            return Err(AggregatorError::NotConfigured {
                source_name: "EPO OPS".to_string(),
                reason: "EPO_CONSUMER_KEY and EPO_CONSUMER_SECRET must be set".to_string(),
            });
        };

        let request = self
            .fetcher
            .post(&self.auth_url)
            .basic_auth(key, Some(secret))
            .form(&[("grant_type", "client_credentials")]);

        let token: TokenResponse = self.fetcher.fetch_json(request).await?;
        debug!("Obtained EPO OPS access token");
        Ok(token.access_token)
    }
}

#[async_trait]
impl SourceAdapter for PatentSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Patent
    }

    fn source_name(&self) -> String {
        "Patents (EPO)".to_string()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let token = self.access_token().await?;

        let cql = format!("txt=\"{}\"", query.replace('"', ""));
        let range = format!("1-{}", max_results.clamp(1, 100));
        let request = self
            .fetcher
            .get(&self.search_url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .query(&[("q", cql.as_str()), ("Range", range.as_str())]);

        let body: Value = self.fetcher.fetch_json(request).await?;
        let results: Vec<SearchResult> = parse_biblio_search(&body)
            .into_iter()
            .take(max_results)
            .collect();

        info!("Found {} patents for '{}'", results.len(), query);
        Ok(results)
    }
}

/// OPS collapses single-element arrays into objects; treat both alike.
fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// `{"$": "text"}`, or a list of those with `@lang`; English preferred.
fn text_of(value: &Value) -> Option<String> {
    let candidates = as_list(value);
    let chosen = candidates
        .iter()
        .find(|v| v.get("@lang").and_then(Value::as_str) == Some("en"))
        .or_else(|| candidates.first())?;

    match chosen.get("$") {
        Some(Value::String(text)) => Some(text.trim().to_string()),
        _ => chosen.as_str().map(|s| s.trim().to_string()),
    }
}

fn abstract_of(document: &Value) -> Option<String> {
    let abstracts = as_list(document.get("abstract")?);
    let chosen = abstracts
        .iter()
        .find(|a| a.get("@lang").and_then(Value::as_str) == Some("en"))
        .or_else(|| abstracts.first())?;

    let paragraphs: Vec<String> = as_list(chosen.get("p")?)
        .into_iter()
        .filter_map(|p| p.get("$").and_then(Value::as_str).map(|s| s.trim().to_string()))
        .collect();

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join(" "))
    }
}

fn applicants_of(biblio: &Value) -> Option<String> {
    let applicants = biblio.pointer("/parties/applicants/applicant")?;
    let mut names: Vec<String> = Vec::new();
    for applicant in as_list(applicants) {
        // Both epodoc and original formats are listed; keep the first spelling.
        if let Some(name) = applicant.pointer("/applicant-name/name").and_then(text_of) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    if names.is_empty() {
        None
    } else {
        Some(names.join("; "))
    }
}

fn parse_document(document: &Value) -> Option<SearchResult> {
    let biblio = document.get("bibliographic-data")?;

    let doc_ids = as_list(biblio.pointer("/publication-reference/document-id")?);
    let docdb = doc_ids
        .iter()
        .find(|d| d.get("@document-id-type").and_then(Value::as_str) == Some("docdb"))
        .or_else(|| doc_ids.first())?;

    let country = docdb.get("country").and_then(text_of).unwrap_or_default();
    let number = docdb.get("doc-number").and_then(text_of)?;
    let kind = docdb.get("kind").and_then(text_of).unwrap_or_default();
    let raw_date = docdb.get("date").and_then(text_of);

    let id = format!("{}{}{}", country, number, kind);
    let title = biblio
        .get("invention-title")
        .and_then(text_of)
        .unwrap_or_else(|| "Untitled patent".to_string());
    let url = format!("https://worldwide.espacenet.com/patent/search?q=pn%3D{}", id);

    Some(
        SearchResult::new(SourceKind::Patent, id, title, url)
            .with_abstract(abstract_of(document))
            .with_authors(applicants_of(biblio))
            .with_date(Some(normalize_date(raw_date.as_deref()))),
    )
}

/// Pull the exchange documents out of a `published-data/search/biblio` reply.
pub fn parse_biblio_search(body: &Value) -> Vec<SearchResult> {
    const DOCUMENTS: &str =
        "/ops:world-patent-data/ops:biblio-search/ops:search-result/exchange-documents";
    let Some(documents) = body.pointer(DOCUMENTS) else {
        return Vec::new();
    };

    as_list(documents)
        .into_iter()
        .flat_map(|wrapper| wrapper.get("exchange-document").map(as_list).unwrap_or_default())
        .filter_map(parse_document)
        .collect()
}
