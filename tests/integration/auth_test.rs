use super::common;

use async_trait::async_trait;
use common::test_server::{TestServer, ENGINE_PATH};
use search_agent::adapters::token_provider::{AccessToken, TokenProvider};
use search_agent::domain::AuthError;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Hands out a new token per call and counts the calls
#[derive(Default)]
struct CountingTokens {
    calls: AtomicUsize,
}

impl CountingTokens {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for CountingTokens {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new(format!("token-{}", n), Some(3600)))
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

fn session_name(id: &str) -> String {
    format!("{}/sessions/{}", &ENGINE_PATH[1..], id)
}

#[tokio::test]
async fn test_answer_fetches_a_token_per_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/servingConfigs/default_search:search", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionInfo": { "name": session_name("S1"), "queryId": "Q1" }
        })))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/servingConfigs/default_search:answer", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": { "answerText": "Hi" },
            "session": { "name": session_name("S1") }
        })))
        .mount(&upstream)
        .await;

    let tokens = Arc::new(CountingTokens::default());
    let server = TestServer::with_tokens(&upstream, tokens.clone()).await;
    let response = reqwest::Client::new()
        .post(server.url("/agent/search/answer"))
        .json(&json!({ "engine": "e1", "query": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(tokens.calls(), 2);

    // Each upstream call carried its own token
    let requests = upstream.received_requests().await.unwrap();
    let bearers: Vec<_> = requests
        .iter()
        .map(|r| r.headers.get("authorization").unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(bearers, vec!["Bearer token-0", "Bearer token-1"]);
}

#[tokio::test]
async fn test_sessions_and_delete_fetch_one_token_each() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/sessions", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&upstream)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/sessions/S1", ENGINE_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&upstream)
        .await;

    let tokens = Arc::new(CountingTokens::default());
    let server = TestServer::with_tokens(&upstream, tokens.clone()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/agent/search/sessions"))
        .json(&json!({ "engine": "e1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(tokens.calls(), 1);

    let response = client
        .delete(server.url("/agent/search/delete/S1"))
        .json(&json!({ "engine": "e1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(tokens.calls(), 2);
}
