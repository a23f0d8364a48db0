use super::common;

use common::test_server::{TestServer, ENGINE_PATH, TEST_TOKEN};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_sessions_without_sessions_key() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/sessions", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = TestServer::new(&upstream).await;
    let response = reqwest::Client::new()
        .post(server.url("/agent/search/sessions"))
        .json(&json!({ "engine": "e1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "results": [] }));
}

#[tokio::test]
async fn test_list_sessions() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/sessions", ENGINE_PATH)))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [
                {
                    "name": format!("{}/sessions/S1", &ENGINE_PATH[1..]),
                    "state": "IN_PROGRESS",
                    "startTime": "2025-01-10T09:00:00Z",
                    "endTime": "2025-01-10T09:03:00Z"
                },
                { "name": format!("{}/sessions/S2", &ENGINE_PATH[1..]) }
            ]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = TestServer::new(&upstream).await;
    let response = reqwest::Client::new()
        .post(server.url("/agent/search/sessions"))
        .json(&json!({ "engine": "e1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "results": [
                { "id": "S1", "start": "2025-01-10T09:00:00Z", "end": "2025-01-10T09:03:00Z" },
                { "id": "S2", "start": null, "end": null }
            ]
        })
    );
}

#[tokio::test]
async fn test_delete_session_passthrough() {
    let upstream = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/sessions/S1", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": "S1" })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = TestServer::new(&upstream).await;
    let response = reqwest::Client::new()
        .delete(server.url("/agent/search/delete/S1"))
        .json(&json!({ "engine": "e1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "results": { "deleted": "S1" } }));
}

#[tokio::test]
async fn test_delete_unknown_session_mirrors_404() {
    let upstream = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream)
        .await;

    let server = TestServer::new(&upstream).await;
    let response = reqwest::Client::new()
        .delete(server.url("/agent/search/delete/nope"))
        .json(&json!({ "engine": "e1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "results": "Not Found" }));
}

#[tokio::test]
async fn test_missing_engine_is_400() {
    let upstream = MockServer::start().await;
    let server = TestServer::new(&upstream).await;

    let response = reqwest::Client::new()
        .post(server.url("/agent/search/sessions"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["results"].is_string());
}
