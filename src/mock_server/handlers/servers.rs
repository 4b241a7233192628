//! Server endpoint handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{authorize, error_response, SharedState};

/// One operation of a server PATCH.
#[derive(Debug, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub member: String,
    pub value: Value,
}

/// GET /v2/servers/{alias}/{id}
pub async fn get_server(
    State(state): State<SharedState>,
    Path((alias, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }

    match state.get_server(&id) {
        Some(server) => (StatusCode::OK, Json(server.clone())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Server {id} not found.")),
    }
}

/// PATCH /v2/servers/{alias}/{id}
///
/// Only the `disks` member is supported.
pub async fn patch_server(
    State(state): State<SharedState>,
    Path((alias, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(operations): Json<Vec<PatchOperation>>,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }
    if state.get_server(&id).is_none() {
        return error_response(StatusCode::NOT_FOUND, format!("Server {id} not found."));
    }
    state.mutations.push(format!("PATCH servers/{id}"));

    for operation in &operations {
        if operation.op != "set" || operation.member != "disks" {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Unsupported operation {} on {}.", operation.op, operation.member),
            );
        }
        let Some(specs) = operation.value.as_array() else {
            return error_response(StatusCode::BAD_REQUEST, "The disks value must be a list.");
        };
        if let Err(message) = state.set_disks(&id, specs) {
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    }

    let link = state.queue_operation("succeeded");
    (StatusCode::OK, Json(link)).into_response()
}
