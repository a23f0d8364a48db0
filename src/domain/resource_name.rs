//! Fully-qualified Discovery Engine resource names.
//!
//! Engines live under
//! `projects/{project}/locations/global/collections/default_collection/engines/{engine}`
//! and sessions are nested below them. The session id `-` asks the backend
//! to open a fresh session for the request.

/// Session id that asks the backend to create a new session.
pub const NEW_SESSION: &str = "-";

pub fn engine_resource_path(project_id: &str, engine_id: &str) -> String {
    format!(
        "projects/{}/locations/global/collections/default_collection/engines/{}",
        project_id, engine_id
    )
}

pub fn session_resource_path(project_id: &str, engine_id: &str, session_id: Option<&str>) -> String {
    format!(
        "{}/sessions/{}",
        engine_resource_path(project_id, engine_id),
        session_id.unwrap_or(NEW_SESSION)
    )
}

/// Trailing path segment of a resource name, e.g. the session id of a
/// fully-qualified session name.
pub fn session_id_from_name(name: &str) -> &str {
    match name.rfind('/') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}
