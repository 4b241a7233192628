//! Operation status handler.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::{authorize, error_response, SharedState};

/// GET /v2/operations/{alias}/status/{id}
pub async fn get_operation_status(
    State(state): State<SharedState>,
    Path((alias, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }

    match state.poll_operation(&id) {
        Some(status) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": status })),
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Operation {id} not found.")),
    }
}
