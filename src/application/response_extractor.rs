//! Shapes raw upstream payloads into the public response types. Nested
//! fields are looked up defensively; a success payload without the fields
//! we need is a [`AgentError::MalformedResponse`].

use serde_json::Value;

use crate::domain::resource_name::session_id_from_name;
use crate::domain::{AgentError, AgentResult, AnswerInfo, SessionInfo, SessionRef, SessionSummary};

fn required_str<'a>(payload: &'a Value, pointer: &str) -> AgentResult<&'a str> {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| AgentError::MalformedResponse(format!("missing string field '{}'", pointer)))
}

fn optional_str(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn extract_answer(payload: &Value) -> AgentResult<AnswerInfo> {
    let answer = required_str(payload, "/answer/answerText")?;
    let session_name = required_str(payload, "/session/name")?;

    Ok(AnswerInfo {
        answer: answer.to_string(),
        session_info: SessionRef {
            id: session_id_from_name(session_name).to_string(),
        },
    })
}

/// `sessionInfo` of a search response. Without a session name the answer
/// call cannot be addressed, so its absence is treated as malformed.
pub fn extract_session_info(payload: &Value) -> AgentResult<SessionInfo> {
    let session_info = payload
        .get("sessionInfo")
        .filter(|v| !v.is_null())
        .ok_or_else(|| AgentError::MalformedResponse("missing field 'sessionInfo'".to_string()))?;

    Ok(serde_json::from_value(session_info.clone())?)
}

/// A payload without `sessions` is an empty list, not an error.
pub fn extract_session_list(payload: &Value) -> Vec<SessionSummary> {
    let Some(sessions) = payload.get("sessions").and_then(Value::as_array) else {
        return Vec::new();
    };

    sessions
        .iter()
        .map(|session| SessionSummary {
            id: session
                .get("name")
                .and_then(Value::as_str)
                .map(session_id_from_name)
                .unwrap_or_default()
                .to_string(),
            start: optional_str(session, "startTime"),
            end: optional_str(session, "endTime"),
        })
        .collect()
}

pub fn extract_delete_result(payload: Value) -> Value {
    payload
}
