mod common;

use async_trait::async_trait;
use common::{
    epo_document, epo_search_body, epo_token_mock, init_tracing, json_mock, providers_for,
    test_fetcher,
};
use market_aggregator::export::to_csv;
use market_aggregator::sources::{AcademicSource, PatentSource};
use market_aggregator::{
    AggregatorError, InsightCategory, MarketAggregator, Result, SearchOptions, SearchResult,
    SourceAdapter, SourceKind, SourceSelection,
};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct StubSource {
    kind: SourceKind,
    titles: Vec<&'static str>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubSource {
    fn ok(kind: SourceKind, titles: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            titles,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(kind: SourceKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            titles: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SourceAdapter for StubSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn source_name(&self) -> String {
        format!("stub {}", self.kind)
    }

    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AggregatorError::HttpStatus {
                status: 503,
                url: "http://stub".to_string(),
            });
        }
        Ok(self
            .titles
            .iter()
            .take(max_results)
            .enumerate()
            .map(|(i, title)| {
                SearchResult::new(self.kind, format!("{}-{}", self.kind, i), *title, "https://stub")
            })
            .collect())
    }
}

#[tokio::test]
async fn failing_sources_do_not_sink_the_search() {
    init_tracing();

    let aggregator = MarketAggregator::new()
        .with_source(StubSource::ok(SourceKind::Academic, vec!["Hydride research", "Tank study"]))
        .with_source(StubSource::failing(SourceKind::Patent))
        .with_source(StubSource::failing(SourceKind::Clinical))
        .with_source(StubSource::ok(SourceKind::News, vec!["Acme raises Series B"]));

    let report = aggregator
        .search_with_report(&SearchOptions::new("hydrogen"))
        .await
        .unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.failed_sources(), vec![SourceKind::Patent, SourceKind::Clinical]);
    assert!(!report.all_failed());
    assert!(report.results.iter().all(|r| r.insight_categories.len() == 1));
    assert_eq!(report.results[2].insight_categories[0], InsightCategory::InvestmentsFunding);
}

#[tokio::test]
async fn every_source_failing_is_reported_not_raised() {
    init_tracing();

    let aggregator = MarketAggregator::new()
        .with_source(StubSource::failing(SourceKind::Patent))
        .with_source(StubSource::failing(SourceKind::News));

    let options = SearchOptions::new("hydrogen");
    let report = aggregator.search_with_report(&options).await.unwrap();
    assert!(report.all_failed());
    assert!(report.results.is_empty());

    assert!(aggregator.search_all_sources(&options).await.unwrap().is_empty());
}

#[tokio::test]
async fn disabled_sources_are_never_called() {
    init_tracing();

    let academic = StubSource::ok(SourceKind::Academic, vec!["Paper"]);
    let news = StubSource::ok(SourceKind::News, vec!["Story"]);
    let aggregator = MarketAggregator::new()
        .with_source(academic.clone())
        .with_source(news.clone());

    let options =
        SearchOptions::new("hydrogen").with_sources(SourceSelection::only(&[SourceKind::News]));
    let results = aggregator.search_all_sources(&options).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(academic.calls.load(Ordering::SeqCst), 0);
    assert_eq!(news.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let aggregator =
        MarketAggregator::new().with_source(StubSource::ok(SourceKind::News, vec!["x"]));
    let err = aggregator.search_all_sources(&SearchOptions::new("   ")).await.unwrap_err();
    assert!(matches!(err, AggregatorError::InvalidQuery(_)));
}

#[tokio::test]
async fn hydrogen_storage_patents_end_to_end() {
    init_tracing();

    let mut server = Server::new_async().await;
    let token = epo_token_mock(&mut server).await;
    let search = server
        .mock("GET", "/epo/search")
        .match_header("authorization", "Bearer tok-123")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "txt=\"hydrogen storage\"".into()),
            Matcher::UrlEncoded("Range".into(), "1-20".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            epo_search_body(vec![
                epo_document(
                    "EP",
                    "4100001",
                    "A1",
                    "20240110",
                    "Patent: Hydrogen Storage Vessel",
                    "ACME CORP",
                ),
                epo_document(
                    "US",
                    "2024001234",
                    "A1",
                    "20240301",
                    "Cobalt Alloy for H2 Tanks",
                    "METALWORKS INC",
                ),
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let providers = providers_for(&server);
    let patents = PatentSource::new(test_fetcher(), &providers);
    let aggregator = MarketAggregator::new().with_source(Arc::new(patents));

    let options = SearchOptions::new("hydrogen storage")
        .with_sources(SourceSelection::only(&[SourceKind::Patent]));
    let results = aggregator.search_all_sources(&options).await.unwrap();

    token.assert_async().await;
    search.assert_async().await;

    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|r| r.insight_categories == vec![InsightCategory::PatentActivity]));
    assert_eq!(results[0].id, "EP4100001A1");
    assert_eq!(results[1].title, "Cobalt Alloy for H2 Tanks");
    assert_eq!(results[1].date.as_deref(), Some("2024-03-01"));

    let csv = to_csv(&results).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn academic_falls_back_to_openalex() {
    init_tracing();

    let mut server = Server::new_async().await;
    let s2 = json_mock(
        &mut server,
        "GET",
        "/s2/paper/search",
        500,
        &json!({"error": "boom"}),
    )
    .await;
    let openalex = json_mock(
        &mut server,
        "GET",
        "/openalex/works",
        200,
        &json!({
            "results": [{
                "id": "https://openalex.org/W123",
                "title": "Metal hydrides for hydrogen storage",
                "publication_date": "2022-05-04",
                "doi": "https://doi.org/10.1000/xyz",
                "authorships": [{"author": {"display_name": "A. Researcher"}}],
                "abstract_inverted_index": {"Hydrides": [0], "store": [1], "hydrogen": [2]}
            }]
        }),
    )
    .await;
    let crossref = server
        .mock("GET", "/crossref/works")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let source = AcademicSource::new(test_fetcher(), &providers_for(&server));
    assert_eq!(source.strategy_names(), vec!["Semantic Scholar", "OpenAlex", "Crossref"]);

    let results = source.search("hydrogen storage", 10).await.unwrap();

    s2.assert_async().await;
    openalex.assert_async().await;
    crossref.assert_async().await;

    assert_eq!(results.len(), 1);
    let paper = &results[0];
    assert_eq!(paper.id, "W123");
    assert_eq!(paper.abstract_text.as_deref(), Some("Hydrides store hydrogen"));
    assert_eq!(paper.authors.as_deref(), Some("A. Researcher"));
    assert_eq!(paper.date.as_deref(), Some("2022-05-04"));
}

#[tokio::test]
async fn academic_reaches_crossref_when_others_are_empty() {
    init_tracing();

    let mut server = Server::new_async().await;
    let mut providers = providers_for(&server);
    providers.semantic_scholar_api_key = None;

    json_mock(&mut server, "GET", "/openalex/works", 200, &json!({"results": []})).await;
    json_mock(
        &mut server,
        "GET",
        "/crossref/works",
        200,
        &json!({
            "message": {
                "items": [{
                    "DOI": "10.1000/abc",
                    "title": ["Hydrogen tank liners"],
                    "author": [{"given": "Jane", "family": "Doe"}],
                    "abstract": "<jats:p>Polymer liners.</jats:p>",
                    "issued": {"date-parts": [[2021, 7]]},
                    "URL": "https://doi.org/10.1000/abc"
                }]
            }
        }),
    )
    .await;

    let source = AcademicSource::new(test_fetcher(), &providers);
    let results = source.search("hydrogen", 5).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Hydrogen tank liners");
    assert_eq!(results[0].abstract_text.as_deref(), Some("Polymer liners."));
    assert_eq!(results[0].date.as_deref(), Some("2021-07-01"));
}
