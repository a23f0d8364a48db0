//! # search-agent
//!
//! A small REST service in front of the Discovery Engine (Vertex AI Search)
//! API. It answers questions by chaining a `:search` call and an `:answer`
//! call on the same session, and lists or deletes sessions of an engine.
//!
//! ## Endpoints
//!
//! - `POST /agent/search/answer[/:session_id]` - answer a query, optionally
//!   continuing a session
//! - `POST /agent/search/sessions` - list sessions of an engine
//! - `DELETE /agent/search/delete/:session_id` - delete a session
//! - `GET /health`, `/health/ready`, `/health/live`, `/metrics`
//!
//! ## Architecture
//!
//! - **Domain**: request/response types, resource names, errors
//! - **Application**: request builders, response extractors, the
//!   [`application::SearchAgent`] use cases and the
//!   [`application::DiscoveryPort`] they drive
//! - **Adapters**: the Discovery Engine HTTP client, token providers and
//!   axum handlers
//! - **Config**: layered settings and validation

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::MetricsHandler;
use crate::adapters::search_handler::{self, AgentState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(
    agent_state: AgentState,
    health_handler: Arc<HealthHandler>,
    metrics_handler: Arc<MetricsHandler>,
) -> Router {
    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/metrics", get({
            let handler = metrics_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.metrics().await }
            }
        }));

    let agent_router = Router::new()
        .route("/agent/search/answer", post(search_handler::answer_new_session))
        .route("/agent/search/answer/:session_id", post(search_handler::answer_in_session))
        .route("/agent/search/sessions", post(search_handler::list_sessions))
        .route("/agent/search/delete/:session_id", delete(search_handler::delete_session))
        .with_state(agent_state);

    health_router.merge(agent_router).layer(TraceLayer::new_for_http())
}
