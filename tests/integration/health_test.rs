use super::common;

use common::test_server::TestServer;
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_health_endpoint() {
    let upstream = MockServer::start().await;
    let server = TestServer::new(&upstream).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["tls_verification"], "enabled");
    assert!(body["uptime_seconds"].is_number());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_ready_and_live() {
    let upstream = MockServer::start().await;
    let server = TestServer::new(&upstream).await;
    let client = reqwest::Client::new();

    let ready = client.get(server.url("/health/ready")).send().await.unwrap();
    assert_eq!(ready.status(), 200);

    let live = client.get(server.url("/health/live")).send().await.unwrap();
    assert_eq!(live.status(), 200);
    let body: serde_json::Value = live.json().await.unwrap();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_metrics_count_upstream_calls() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&upstream)
        .await;

    let server = TestServer::new(&upstream).await;
    let client = reqwest::Client::new();

    client
        .post(server.url("/agent/search/sessions"))
        .json(&json!({ "engine": "e1" }))
        .send()
        .await
        .unwrap();

    let response = client.get(server.url("/metrics")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("search_agent_upstream_requests_total"));
    assert!(body.contains("list_sessions"));
}
