//! Public IP endpoint handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::{authorize, error_response, SharedState};

fn not_found(ip: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Public IP address {ip} not found."),
    )
}

/// POST /v2/servers/{alias}/{id}/publicIPAddresses
pub async fn add_public_ip(
    State(state): State<SharedState>,
    Path((alias, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }
    if request["ports"].as_array().map_or(true, Vec::is_empty) {
        return error_response(StatusCode::BAD_REQUEST, "At least one port is required.");
    }
    state.mutations.push(format!("POST servers/{id}/publicIPAddresses"));

    match state.add_public_ip(&id, &request) {
        Ok(_) => {
            let link = state.queue_operation("succeeded");
            (StatusCode::ACCEPTED, Json(link)).into_response()
        }
        Err(message) => error_response(StatusCode::BAD_REQUEST, message),
    }
}

/// GET /v2/servers/{alias}/{id}/publicIPAddresses/{ip}
pub async fn get_public_ip(
    State(state): State<SharedState>,
    Path((alias, _id, ip)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }

    match state.public_ips.get(&ip) {
        Some(details) => (StatusCode::OK, Json(details.clone())).into_response(),
        None => not_found(&ip),
    }
}

/// PUT /v2/servers/{alias}/{id}/publicIPAddresses/{ip}
pub async fn update_public_ip(
    State(state): State<SharedState>,
    Path((alias, id, ip)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }
    state.mutations.push(format!("PUT servers/{id}/publicIPAddresses/{ip}"));

    let Some(details) = state.public_ips.get_mut(&ip) else {
        return not_found(&ip);
    };
    details["ports"] = request.get("ports").cloned().unwrap_or_else(|| Value::Array(vec![]));
    details["sourceRestrictions"] = request
        .get("sourceRestrictions")
        .cloned()
        .unwrap_or_else(|| Value::Array(vec![]));

    let link = state.queue_operation("succeeded");
    (StatusCode::ACCEPTED, Json(link)).into_response()
}

/// DELETE /v2/servers/{alias}/{id}/publicIPAddresses/{ip}
pub async fn delete_public_ip(
    State(state): State<SharedState>,
    Path((alias, id, ip)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }
    state.mutations.push(format!("DELETE servers/{id}/publicIPAddresses/{ip}"));

    if !state.remove_public_ip(&id, &ip) {
        return not_found(&ip);
    }
    let link = state.queue_operation("succeeded");
    (StatusCode::ACCEPTED, Json(link)).into_response()
}
