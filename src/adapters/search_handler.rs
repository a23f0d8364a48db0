//! REST endpoints under `/agent/search`.
//!
//! Every response is wrapped as `{"results": ...}`; on failure `results` is
//! the error message and the HTTP status mirrors the upstream status when it
//! is 400 or above, 500 otherwise.

use axum::{
    extract::{rejection::QueryRejection, FromRequest, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::metrics_handler::MetricsCollector;
use crate::application::SearchAgent;
use crate::domain::{AgentError, AgentInfo, AgentResult};

#[derive(Clone)]
pub struct AgentState {
    pub agent: Arc<SearchAgent>,
    pub metrics: Arc<MetricsCollector>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Results<T> {
    pub results: T,
}

/// Body shared by all three endpoints
#[derive(Debug, Deserialize)]
pub struct EngineRequest {
    pub engine: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub datastore: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnswerParams {
    pub pagesize: Option<String>,
}

/// [`EngineRequest`] read from a JSON or `application/x-www-form-urlencoded`
/// body, chosen by `Content-Type`.
pub struct EngineBody(pub EngineRequest);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| {
            value
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
}

#[axum::async_trait]
impl<S> FromRequest<S> for EngineBody
where
    S: Send + Sync,
{
    type Rejection = AgentError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(body) = Form::<EngineRequest>::from_request(req, state)
                .await
                .map_err(|rejection| AgentError::InvalidRequest(rejection.body_text()))?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<EngineRequest>::from_request(req, state)
                .await
                .map_err(|rejection| AgentError::InvalidRequest(rejection.body_text()))?;
            Ok(Self(body))
        }
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let info = self.error_info();
        let status = StatusCode::from_u16(info.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(Results { results: info.message })).into_response()
    }
}

fn parse_page_size(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
}

/// An unparseable query string (e.g. a repeated `pagesize`) means no page size
fn answer_params(params: Result<Query<AnswerParams>, QueryRejection>) -> AnswerParams {
    match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Ignoring unparseable query string");
            AnswerParams::default()
        }
    }
}

fn agent_info(
    agent: &SearchAgent,
    body: EngineRequest,
    session_id: Option<String>,
    page_size: Option<u32>,
) -> AgentInfo {
    AgentInfo {
        session_id,
        page_size,
        engine_id: body.engine,
        datastore_id: body.datastore,
        query: body.query.unwrap_or_default(),
        prompt: agent.search_prompt().to_string(),
    }
}

fn respond<T: Serialize>(state: &AgentState, route: &str, result: AgentResult<T>) -> Response {
    let response = match result {
        Ok(payload) => (StatusCode::OK, Json(Results { results: payload })).into_response(),
        Err(e) => {
            warn!(route, error = %e, "Request failed");
            e.into_response()
        }
    };

    state
        .metrics
        .requests_total
        .with_label_values(&[route, response.status().as_str()])
        .inc();
    response
}

async fn answer(
    state: &AgentState,
    session_id: Option<String>,
    params: AnswerParams,
    body: Result<EngineBody, AgentError>,
) -> Response {
    let result = async {
        let EngineBody(body) = body?;
        if body.query.as_deref().map_or(true, |q| q.trim().is_empty()) {
            return Err(AgentError::InvalidRequest("missing field 'query'".to_string()));
        }
        let info = agent_info(
            &state.agent,
            body,
            session_id,
            parse_page_size(params.pagesize.as_deref()),
        );
        state.agent.answer(&info).await
    }
    .await;

    respond(state, "answer", result)
}

/// POST /agent/search/answer
pub async fn answer_new_session(
    State(state): State<AgentState>,
    params: Result<Query<AnswerParams>, QueryRejection>,
    body: Result<EngineBody, AgentError>,
) -> Response {
    answer(&state, None, answer_params(params), body).await
}

/// POST /agent/search/answer/:session_id
pub async fn answer_in_session(
    State(state): State<AgentState>,
    Path(session_id): Path<String>,
    params: Result<Query<AnswerParams>, QueryRejection>,
    body: Result<EngineBody, AgentError>,
) -> Response {
    answer(&state, Some(session_id), answer_params(params), body).await
}

/// POST /agent/search/sessions
pub async fn list_sessions(
    State(state): State<AgentState>,
    body: Result<EngineBody, AgentError>,
) -> Response {
    let result = async {
        let info = agent_info(&state.agent, body?.0, None, None);
        state.agent.list_sessions(&info).await
    }
    .await;

    respond(&state, "list_sessions", result)
}

/// DELETE /agent/search/delete/:session_id
pub async fn delete_session(
    State(state): State<AgentState>,
    Path(session_id): Path<String>,
    body: Result<EngineBody, AgentError>,
) -> Response {
    let result = async {
        let info = agent_info(&state.agent, body?.0, Some(session_id), None);
        state.agent.delete_session(&info).await
    }
    .await;

    respond(&state, "delete_session", result)
}
