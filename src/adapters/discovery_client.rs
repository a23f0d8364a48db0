//! Discovery Engine REST client.
//!
//! The reqwest client is built once at startup and injected; every call
//! fetches a bearer token first, so an auth failure never reaches the
//! backend.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::metrics_handler::MetricsCollector;
use super::token_provider::TokenProvider;
use crate::application::{AnswerRequestBody, DiscoveryPort, SearchRequestBody};
use crate::config::{DiscoverySettings, TransportSettings};
use crate::domain::resource_name::engine_resource_path;
use crate::domain::{AgentError, AgentResult};

const SERVING_CONFIG: &str = "servingConfigs/default_search";

/// Builds the upstream HTTP client. TLS verification is only disabled when
/// `insecure_skip_tls_verify` is explicitly set.
pub fn build_http_client(transport: &TransportSettings) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(transport.timeout_seconds))
        .connect_timeout(Duration::from_secs(transport.connect_timeout_seconds));

    if transport.insecure_skip_tls_verify {
        warn!("TLS certificate verification is DISABLED for Discovery Engine calls (insecure_skip_tls_verify)");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build()
}

pub struct DiscoveryClient {
    http: Client,
    tokens: Arc<dyn TokenProvider>,
    base_url: String,
    project_id: String,
    metrics: Option<Arc<MetricsCollector>>,
}

impl DiscoveryClient {
    pub fn new(http: Client, tokens: Arc<dyn TokenProvider>, settings: &DiscoverySettings) -> Self {
        Self {
            http,
            tokens,
            base_url: settings.base_url(),
            project_id: settings.project_id.clone(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine_url(&self, engine_id: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            engine_resource_path(&self.project_id, engine_id)
        )
    }

    fn serving_config_url(&self, engine_id: &str, method: &str) -> String {
        format!("{}/{}:{}", self.engine_url(engine_id), SERVING_CONFIG, method)
    }

    fn sessions_url(&self, engine_id: &str) -> String {
        format!("{}/sessions", self.engine_url(engine_id))
    }

    /// Authenticates, sends, and turns a non-2xx status into
    /// [`AgentError::UpstreamHttp`].
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> AgentResult<Value> {
        let token = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.auth_failures_total.with_label_values(&[operation]).inc();
                }
                warn!(operation, provider = self.tokens.name(), error = %e, "Access token unavailable");
                return Err(e.into());
            }
        };

        let started = Instant::now();
        let result = request
            .bearer_auth(token.bearer())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await;
        let elapsed = started.elapsed();

        let status_label = match &result {
            Ok(response) => response.status().as_u16().to_string(),
            Err(_) => "error".to_string(),
        };
        if let Some(metrics) = &self.metrics {
            metrics
                .upstream_requests_total
                .with_label_values(&[operation, status_label.as_str()])
                .inc();
            metrics
                .upstream_duration
                .with_label_values(&[operation])
                .observe(elapsed.as_secs_f64());
        }

        let response = result?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation, status = status.as_u16(), body = %body, "Discovery Engine call failed");
            return Err(AgentError::UpstreamHttp {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Upstream request failed")
                    .to_string(),
            });
        }

        debug!(operation, status = status.as_u16(), elapsed_ms = elapsed.as_millis() as u64, "Discovery Engine call succeeded");

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DiscoveryPort for DiscoveryClient {
    async fn search(&self, engine_id: &str, body: &SearchRequestBody) -> AgentResult<Value> {
        let request = self
            .http
            .post(self.serving_config_url(engine_id, "search"))
            .json(body);
        self.send("search", request).await
    }

    async fn answer(&self, engine_id: &str, body: &AnswerRequestBody) -> AgentResult<Value> {
        let request = self
            .http
            .post(self.serving_config_url(engine_id, "answer"))
            .json(body);
        self.send("answer", request).await
    }

    async fn list_sessions(&self, engine_id: &str) -> AgentResult<Value> {
        let request = self.http.get(self.sessions_url(engine_id));
        self.send("list_sessions", request).await
    }

    async fn delete_session(&self, engine_id: &str, session_id: &str) -> AgentResult<Value> {
        let url = format!("{}/{}", self.sessions_url(engine_id), session_id);
        let request = self.http.delete(url);
        self.send("delete_session", request).await
    }
}
