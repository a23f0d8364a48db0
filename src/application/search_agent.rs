//! Search → answer chain and session management.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::request_builder::{build_answer_request, build_search_request};
use super::response_extractor::{
    extract_answer, extract_delete_result, extract_session_info, extract_session_list,
};
use super::DiscoveryPort;
use crate::config::DiscoverySettings;
use crate::domain::{AgentError, AgentInfo, AgentResult, AnswerInfo, SessionSummary};

pub struct SearchAgent {
    discovery: Arc<dyn DiscoveryPort>,
    project_id: String,
    search_prompt: String,
    model_version: String,
}

impl SearchAgent {
    pub fn new(discovery: Arc<dyn DiscoveryPort>, settings: &DiscoverySettings) -> Self {
        Self {
            discovery,
            project_id: settings.project_id.clone(),
            search_prompt: settings.search_prompt.clone(),
            model_version: settings.model_version.clone(),
        }
    }

    /// Preamble attached to every answer request
    pub fn search_prompt(&self) -> &str {
        &self.search_prompt
    }

    /// Runs the search call, then the answer call on the session it returned.
    /// The answer call is skipped when the search call fails.
    pub async fn answer(&self, agent_info: &AgentInfo) -> AgentResult<AnswerInfo> {
        info!(
            engine = %agent_info.engine_id,
            session = agent_info.session_id.as_deref().unwrap_or("-"),
            datastore = agent_info.datastore_id.as_deref().unwrap_or(""),
            "Answering query"
        );

        let search_body = build_search_request(&self.project_id, agent_info);
        let search_response = self
            .discovery
            .search(&agent_info.engine_id, &search_body)
            .await?;
        let session_info = extract_session_info(&search_response)?;
        debug!(session = %session_info.name, query_id = ?session_info.query_id, "Search completed");

        let answer_body = build_answer_request(agent_info, &session_info, &self.model_version);
        let answer_response = self
            .discovery
            .answer(&agent_info.engine_id, &answer_body)
            .await?;

        extract_answer(&answer_response)
    }

    pub async fn list_sessions(&self, agent_info: &AgentInfo) -> AgentResult<Vec<SessionSummary>> {
        info!(engine = %agent_info.engine_id, "Listing sessions");
        let response = self.discovery.list_sessions(&agent_info.engine_id).await?;
        Ok(extract_session_list(&response))
    }

    pub async fn delete_session(&self, agent_info: &AgentInfo) -> AgentResult<Value> {
        let session_id = agent_info
            .session_id
            .as_deref()
            .ok_or_else(|| AgentError::InvalidRequest("missing session id".to_string()))?;

        info!(engine = %agent_info.engine_id, session = %session_id, "Deleting session");
        let response = self
            .discovery
            .delete_session(&agent_info.engine_id, session_id)
            .await?;
        Ok(extract_delete_result(response))
    }
}
