//! Use cases and the port they drive.

use async_trait::async_trait;
use serde_json::Value;

pub mod request_builder;
pub mod response_extractor;
pub mod search_agent;

pub use request_builder::{AnswerRequestBody, SearchRequestBody};
pub use search_agent::SearchAgent;

use crate::domain::AgentResult;

/// Outbound calls against the Discovery Engine API. Every call authenticates
/// on its own; implementations return the raw JSON payload of a 2xx answer.
#[async_trait]
pub trait DiscoveryPort: Send + Sync {
    async fn search(&self, engine_id: &str, body: &SearchRequestBody) -> AgentResult<Value>;
    async fn answer(&self, engine_id: &str, body: &AnswerRequestBody) -> AgentResult<Value>;
    async fn list_sessions(&self, engine_id: &str) -> AgentResult<Value>;
    async fn delete_session(&self, engine_id: &str, session_id: &str) -> AgentResult<Value>;
}
