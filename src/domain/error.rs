//! Error types for the search agent

use thiserror::Error;

use super::ErrorInfo;

const AUTH_FAILED: &str = "Authentication error: could not obtain an access token";
const UPSTREAM_UNAVAILABLE: &str = "Discovery Engine request failed";

/// Errors raised while obtaining an upstream bearer token
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable credential source was found
    #[error("Credentials not found: {0}")]
    MissingCredentials(String),

    /// Credential material exists but cannot be used
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The token endpoint could not be reached
    #[error("Token request failed: {0}")]
    TokenRequest(String),

    /// The token endpoint answered with a non-success status
    #[error("Token endpoint returned {status}: {message}")]
    TokenEndpoint { status: u16, message: String },
}

/// Errors that can occur while serving a search agent request
#[derive(Debug, Error)]
pub enum AgentError {
    /// Credential acquisition failed before the upstream call
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The backend answered with a non-2xx status
    #[error("{message}")]
    UpstreamHttp { status: u16, message: String },

    /// A success payload did not have the expected shape
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// Connection, timeout or body read failure
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// The inbound request is missing something we need
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AgentError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AgentError::UpstreamHttp { status, .. } => Some(*status),
            AgentError::InvalidRequest(_) => Some(400),
            _ => None,
        }
    }

    /// Caller-facing message and status. Auth and transport details
    /// (token endpoint bodies, upstream URLs) stay in the logs.
    pub fn error_info(&self) -> ErrorInfo {
        let message = match self {
            AgentError::Auth(_) => AUTH_FAILED.to_string(),
            AgentError::Transport(_) => UPSTREAM_UNAVAILABLE.to_string(),
            other => other.to_string(),
        };
        ErrorInfo::new(message, self.status())
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            AgentError::Transport(format!("Connection error: {}", err))
        } else if err.is_decode() {
            AgentError::MalformedResponse(err.to_string())
        } else {
            AgentError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
