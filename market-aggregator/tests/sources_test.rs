mod common;

use common::{init_tracing, json_mock, providers_for, test_fetcher};
use market_aggregator::sources::{ClinicalTrialsSource, NewsSource, PatentSource, PreprintSource};
use market_aggregator::{AggregatorError, ProviderConfig, SourceAdapter, SourceKind};
use mockito::{Matcher, Server};
use serde_json::json;

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: search_query=all:hydrogen</title>
  <id>http://arxiv.org/api/abc</id>
  <updated>2024-02-01T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2401.01234v1</id>
    <updated>2024-01-05T18:00:00Z</updated>
    <published>2024-01-04T18:00:00Z</published>
    <title>Solid-state hydrogen
      storage in MOFs</title>
    <summary>  We report a framework
      with record uptake. </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <link href="http://arxiv.org/abs/2401.01234v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2401.01234v1" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;

const NEWS_FEED: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"hydrogen storage" - Google News</title>
    <link>https://news.google.com</link>
    <description>Google News</description>
    <item>
      <title>Acme and Beta form hydrogen partnership - Reuters</title>
      <link>https://www.reuters.com/business/acme-beta</link>
      <guid isPermaLink="false">CBMiZGh0</guid>
      <pubDate>Mon, 03 Jun 2024 08:00:00 GMT</pubDate>
      <description>&lt;a href="https://www.reuters.com/business/acme-beta"&gt;Acme and Beta form hydrogen partnership&lt;/a&gt;&amp;nbsp;&lt;font color="#6f6f6f"&gt;Reuters&lt;/font&gt;</description>
    </item>
  </channel>
</rss>"##;

#[tokio::test]
async fn clinical_trials_maps_studies() {
    init_tracing();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/ctgov/studies")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query.term".into(), "hydrogen".into()),
            Matcher::UrlEncoded("pageSize".into(), "5".into()),
            Matcher::UrlEncoded("format".into(), "json".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "studies": [
                    {
                        "protocolSection": {
                            "identificationModule": {"nctId": "NCT05550001", "briefTitle": "Hydrogen water and fatigue"},
                            "statusModule": {"overallStatus": "COMPLETED", "startDateStruct": {"date": "2022-09-15"}},
                            "designModule": {"phases": ["NA"], "enrollmentInfo": {"count": 40}}
                        }
                    },
                    {"protocolSection": {"identificationModule": {}}}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let source = ClinicalTrialsSource::new(test_fetcher(), &providers_for(&server));
    let results = source.search("hydrogen", 5).await.unwrap();
    mock.assert_async().await;

    assert_eq!(results.len(), 1);
    let trial = &results[0];
    assert_eq!(trial.source, SourceKind::Clinical);
    assert_eq!(trial.id, "NCT05550001");
    assert_eq!(trial.status.as_deref(), Some("Completed"));
    assert_eq!(trial.enrollment.as_deref(), Some("40"));
    assert_eq!(trial.date.as_deref(), Some("2022-09-15"));
}

#[tokio::test]
async fn clinical_trials_surfaces_http_errors() {
    init_tracing();

    let mut server = Server::new_async().await;
    json_mock(&mut server, "GET", "/ctgov/studies", 503, &json!({"error": "down"})).await;

    let source = ClinicalTrialsSource::new(test_fetcher(), &providers_for(&server));
    let err = source.search("hydrogen", 5).await.unwrap_err();
    assert!(matches!(err, AggregatorError::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn arxiv_entries_become_preprints() {
    init_tracing();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/arxiv/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search_query".into(), "all:hydrogen AND all:storage".into()),
            Matcher::UrlEncoded("max_results".into(), "3".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(ARXIV_FEED)
        .create_async()
        .await;

    let source = PreprintSource::new(test_fetcher(), &providers_for(&server));
    let results = source.search("hydrogen storage", 3).await.unwrap();
    mock.assert_async().await;

    assert_eq!(results.len(), 1);
    let paper = &results[0];
    assert_eq!(paper.source, SourceKind::Preprint);
    assert_eq!(paper.id, "2401.01234v1");
    assert_eq!(paper.title, "Solid-state hydrogen storage in MOFs");
    assert_eq!(paper.abstract_text.as_deref(), Some("We report a framework with record uptake."));
    assert_eq!(paper.authors.as_deref(), Some("Ada Lovelace, Alan Turing"));
    assert_eq!(paper.date.as_deref(), Some("2024-01-04"));
    assert_eq!(paper.url, "http://arxiv.org/abs/2401.01234v1");
}

#[tokio::test]
async fn news_items_are_cleaned() {
    init_tracing();

    let mut server = Server::new_async().await;
    server
        .mock("GET", "/news/rss")
        .match_query(Matcher::UrlEncoded("q".into(), "hydrogen storage".into()))
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(NEWS_FEED)
        .create_async()
        .await;

    let source = NewsSource::new(test_fetcher(), &providers_for(&server));
    let results = source.search("hydrogen storage", 10).await.unwrap();

    assert_eq!(results.len(), 1);
    let item = &results[0];
    assert_eq!(item.source, SourceKind::News);
    assert_eq!(item.title, "Acme and Beta form hydrogen partnership - Reuters");
    assert_eq!(
        item.abstract_text.as_deref(),
        Some("Acme and Beta form hydrogen partnership Reuters")
    );
    assert_eq!(item.date.as_deref(), Some("2024-06-03"));
    assert_eq!(item.authors.as_deref(), Some("www.reuters.com"));
}

#[tokio::test]
async fn news_keeps_items_that_share_a_link() {
    init_tracing();

    let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Google News</title>
    <link>https://news.google.com</link>
    <description>Google News</description>
    <item>
      <title>Acme raises funding</title>
      <link>https://www.example.com/acme</link>
      <guid isPermaLink="false">g-1</guid>
    </item>
    <item>
      <title>Acme closes Series B</title>
      <link>https://www.example.com/acme</link>
      <guid isPermaLink="false">g-2</guid>
    </item>
  </channel>
</rss>"#;

    let mut server = Server::new_async().await;
    server
        .mock("GET", "/news/rss")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(feed)
        .create_async()
        .await;

    let source = NewsSource::new(test_fetcher(), &providers_for(&server));
    let results = source.search("acme", 10).await.unwrap();

    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Acme raises funding", "Acme closes Series B"]);
    assert_eq!(results[0].url, results[1].url);
    assert_eq!(results[0].id, "g-1");
    assert_eq!(results[1].id, "g-2");
}

#[tokio::test]
async fn news_rejects_html_pages() {
    init_tracing();

    let mut server = Server::new_async().await;
    server
        .mock("GET", "/news/rss")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<!DOCTYPE html><html><body>Consent required</body></html>")
        .create_async()
        .await;

    let source = NewsSource::new(test_fetcher(), &providers_for(&server));
    let err = source.search("hydrogen", 10).await.unwrap_err();
    assert!(matches!(err, AggregatorError::Parse(_)));
}

#[tokio::test]
async fn patents_need_credentials() {
    let source = PatentSource::new(test_fetcher(), &ProviderConfig::default());
    let err = source.search("hydrogen", 5).await.unwrap_err();
    assert!(matches!(err, AggregatorError::NotConfigured { .. }));
}

#[tokio::test]
async fn patent_auth_failure_stops_the_search() {
    init_tracing();

    let mut server = Server::new_async().await;
    json_mock(&mut server, "POST", "/epo/auth", 401, &json!({"error": "invalid_client"})).await;
    let search = server
        .mock("GET", "/epo/search")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let source = PatentSource::new(test_fetcher(), &providers_for(&server));
    let err = source.search("hydrogen", 5).await.unwrap_err();

    assert!(matches!(err, AggregatorError::HttpStatus { status: 401, .. }));
    search.assert_async().await;
}
