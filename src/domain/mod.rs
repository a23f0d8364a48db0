use serde::{Deserialize, Serialize};

pub mod error;
pub mod resource_name;

pub use error::{AgentError, AgentResult, AuthError};

/// Per-request parameters gathered from the path, query string, body and
/// process configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInfo {
    pub session_id: Option<String>,
    /// Parsed `pagesize` query parameter; absent when missing or not a number
    pub page_size: Option<u32>,
    pub engine_id: String,
    /// Only used as log context
    pub datastore_id: Option<String>,
    pub query: String,
    /// Answer generation preamble
    pub prompt: String,
}

/// Session handle returned by a search call and consumed by the follow-up
/// answer call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionRef {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInfo {
    pub answer: String,
    pub session_info: SessionRef,
}

/// One entry of the list-sessions result
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorInfo {
    pub message: String,
    pub code: u16,
}

impl ErrorInfo {
    /// Statuses below 400 (or none at all) are reported as 500.
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        let code = match status {
            Some(status) if status >= 400 => status,
            _ => 500,
        };
        Self {
            message: message.into(),
            code,
        }
    }
}
