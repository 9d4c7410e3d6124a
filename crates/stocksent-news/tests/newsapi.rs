//! Integration tests for `NewsApiClient::fetch_window` using wiremock.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use stocksent_core::EmptyDayPolicy;
use stocksent_news::{NewsApiClient, NewsError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> NewsApiClient {
    NewsApiClient::with_base_url("test-key", 5, "stocksent-test/0.1", base_url)
        .expect("client construction should not fail")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn articles(titles: &[&str]) -> serde_json::Value {
    let items: Vec<_> = titles
        .iter()
        .map(|t| {
            json!({
                "source": { "id": null, "name": "Wire" },
                "title": t,
                "publishedAt": "2025-01-01T12:00:00Z",
                "description": format!("{t} description"),
                "url": "https://example.com/a"
            })
        })
        .collect();
    json!({ "status": "ok", "totalResults": items.len(), "articles": items })
}

async fn mount_day(server: &MockServer, date: &str, body: serde_json::Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/everything"))
        .and(query_param("from", date))
        .and(query_param("to", date))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn empty_day_does_not_truncate_later_days() {
    let server = MockServer::start().await;
    mount_day(&server, "2025-01-01", articles(&["Day one story"]), 1).await;
    mount_day(&server, "2025-01-02", articles(&[]), 1).await;
    mount_day(&server, "2025-01-03", articles(&["Third A", "Third B"]), 1).await;

    let batch = test_client(&server.uri())
        .fetch_window("Acme Corp", day(1), day(3))
        .await
        .expect("fetch should succeed");

    assert_eq!(batch.records.len(), 3);
    assert_eq!(batch.requests, 3);
    assert!(batch.anomaly.is_none());
    let headlines: Vec<_> = batch.records.iter().map(|r| r.headline()).collect();
    assert_eq!(headlines, vec!["Day one story", "Third A", "Third B"]);
}

#[tokio::test]
async fn missing_articles_field_stops_iteration() {
    let server = MockServer::start().await;
    mount_day(&server, "2025-01-01", articles(&["Kept"]), 1).await;
    mount_day(
        &server,
        "2025-01-02",
        json!({ "status": "error", "code": "maximumResultsReached", "message": "limit" }),
        1,
    )
    .await;
    mount_day(&server, "2025-01-03", articles(&["Never fetched"]), 0).await;

    let batch = test_client(&server.uri())
        .fetch_window("Acme Corp", day(1), day(3))
        .await
        .expect("anomaly is not an error");

    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.records[0].headline(), "Kept");
    assert_eq!(batch.requests, 2);
    let anomaly = batch.anomaly.expect("anomaly should be reported");
    assert_eq!(anomaly.field, "articles");
    assert_eq!(anomaly.detail.as_deref(), Some("limit"));
}

#[tokio::test]
async fn error_status_with_json_body_is_an_anomaly_not_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/everything"))
        .respond_with(ResponseTemplate::new(429).set_body_json(&json!({
            "status": "error",
            "code": "rateLimited",
            "message": "You have made too many requests recently."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let batch = test_client(&server.uri())
        .fetch_window("Acme Corp", day(1), day(5))
        .await
        .unwrap();
    assert!(batch.records.is_empty());
    assert!(batch.anomaly.is_some());
}

#[tokio::test]
async fn stop_policy_ends_loop_on_empty_day() {
    let server = MockServer::start().await;
    mount_day(&server, "2025-01-01", articles(&["First"]), 1).await;
    mount_day(&server, "2025-01-02", articles(&[]), 1).await;
    mount_day(&server, "2025-01-03", articles(&["Never fetched"]), 0).await;

    let batch = test_client(&server.uri())
        .with_empty_day_policy(EmptyDayPolicy::Stop)
        .fetch_window("Acme Corp", day(1), day(3))
        .await
        .unwrap();

    assert_eq!(batch.records.len(), 1);
    assert!(batch.anomaly.is_none());
}

#[tokio::test]
async fn sends_topic_sort_and_key_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/everything"))
        .and(query_param("q", "Apple Inc."))
        .and(query_param("sortBy", "popularity"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&articles(&["Match"])))
        .expect(1)
        .mount(&server)
        .await;

    let batch = test_client(&server.uri())
        .fetch_window("Apple Inc.", day(7), day(7))
        .await
        .unwrap();
    assert_eq!(batch.records.len(), 1);
}

#[tokio::test]
async fn untitled_articles_are_dropped() {
    let server = MockServer::start().await;
    let body = json!({
        "status": "ok",
        "articles": [
            { "title": null, "publishedAt": "2025-01-01T00:00:00Z", "description": "orphan" },
            { "title": "Titled", "publishedAt": "2025-01-01T00:00:00Z", "description": null }
        ]
    });
    mount_day(&server, "2025-01-01", body, 1).await;

    let batch = test_client(&server.uri())
        .fetch_window("Acme", day(1), day(1))
        .await
        .unwrap();
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.records[0].description(), None);
}

#[tokio::test]
async fn reversed_window_issues_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&articles(&["x"])))
        .expect(0)
        .mount(&server)
        .await;

    let batch = test_client(&server.uri())
        .fetch_window("Acme", day(5), day(4))
        .await
        .unwrap();
    assert!(batch.records.is_empty());
    assert_eq!(batch.requests, 0);
}

#[tokio::test]
async fn non_json_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_window("Acme", day(1), day(2))
        .await
        .unwrap_err();
    assert!(
        matches!(err, NewsError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
    assert!(
        !err.to_string().contains("test-key"),
        "error must not leak the API key: {err}"
    );
}

#[tokio::test]
async fn timeout_propagates_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&articles(&["slow"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = NewsApiClient::with_base_url("test-key", 1, "stocksent-test/0.1", &server.uri())
        .unwrap();
    let err = client
        .fetch_window("Acme", day(1), day(1))
        .await
        .unwrap_err();
    assert!(
        matches!(err, NewsError::Http(ref e) if e.is_timeout()),
        "expected timeout, got: {err:?}"
    );
    assert!(
        !err.to_string().contains("test-key"),
        "error must not leak the API key: {err}"
    );
}
