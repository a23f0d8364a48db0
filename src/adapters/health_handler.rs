use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Settings;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub config: String,
    pub tls_verification: String,
}

pub struct HealthHandler {
    settings: Arc<Settings>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let uptime = self.start_time.elapsed().as_secs();
        let tls_verification = if self.settings.transport.insecure_skip_tls_verify {
            "disabled"
        } else {
            "enabled"
        };
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            checks: HealthChecks {
                config: "ok".to_string(),
                tls_verification: tls_verification.to_string(),
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - settings are validated and the token provider is
    /// built before the listener binds, so a serving instance is ready
    pub async fn ready(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "ready",
            "message": "Server is ready to accept requests",
            "upstream": self.settings.upstream_base_url()
        })))
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "alive",
            "message": "Server is alive"
        })))
    }
}
