//! Shared helpers for the integration tests

use market_aggregator::{FetchConfig, Fetcher, ProviderConfig};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::sync::Once;

static INIT: Once = Once::new();

#[allow(dead_code)]
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn test_fetcher() -> Fetcher {
    let config = FetchConfig {
        user_agent: "Market-Intel-Test/1.0".to_string(),
        timeout_seconds: 5,
        ..FetchConfig::default()
    };
    Fetcher::new(config).expect("client builds")
}

/// Every provider pointed at the mock server, EPO credentials set.
#[allow(dead_code)]
pub fn providers_for(server: &ServerGuard) -> ProviderConfig {
    let base = server.url();
    ProviderConfig {
        semantic_scholar_url: format!("{}/s2/paper/search", base),
        semantic_scholar_api_key: Some("s2-key".to_string()),
        openalex_url: format!("{}/openalex/works", base),
        crossref_url: format!("{}/crossref/works", base),
        contact_email: Some("team@example.com".to_string()),
        epo_auth_url: format!("{}/epo/auth", base),
        epo_search_url: format!("{}/epo/search", base),
        epo_consumer_key: Some("key".to_string()),
        epo_consumer_secret: Some("secret".to_string()),
        clinical_trials_url: format!("{}/ctgov/studies", base),
        arxiv_url: format!("{}/arxiv/query", base),
        news_url: format!("{}/news/rss", base),
    }
}

#[allow(dead_code)]
pub async fn json_mock(
    server: &mut ServerGuard,
    method: &str,
    path: &str,
    status: usize,
    body: &Value,
) -> Mock {
    server
        .mock(method, path)
        .match_query(Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[allow(dead_code)]
pub async fn epo_token_mock(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/epo/auth")
        .match_body(Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"tok-123","token_type":"Bearer","expires_in":"1199"}"#)
        .create_async()
        .await
}

#[allow(dead_code)]
pub fn epo_document(
    country: &str,
    number: &str,
    kind: &str,
    date: &str,
    title: &str,
    applicant: &str,
) -> Value {
    json!({
        "bibliographic-data": {
            "publication-reference": {
                "document-id": {
                    "@document-id-type": "docdb",
                    "country": {"$": country},
                    "doc-number": {"$": number},
                    "kind": {"$": kind},
                    "date": {"$": date}
                }
            },
            "invention-title": {"@lang": "en", "$": title},
            "parties": {
                "applicants": {
                    "applicant": {"applicant-name": {"name": {"$": applicant}}}
                }
            }
        }
    })
}

#[allow(dead_code)]
pub fn epo_search_body(documents: Vec<Value>) -> Value {
    json!({
        "ops:world-patent-data": {
            "ops:biblio-search": {
                "@total-result-count": documents.len().to_string(),
                "ops:search-result": {
                    "exchange-documents": documents
                        .into_iter()
                        .map(|doc| json!({"exchange-document": doc}))
                        .collect::<Vec<_>>()
                }
            }
        }
    })
}
