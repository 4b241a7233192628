//! Datacenter and network endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{authorize, error_response, SharedState};

/// Query parameters for a single datacenter.
#[derive(Debug, Default, Deserialize)]
pub struct DatacenterQuery {
    #[serde(rename = "GroupLinks", default)]
    pub group_links: Option<bool>,
}

fn not_found(location: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Datacenter {location} not found."),
    )
}

/// GET /v2/datacenters/{alias}
///
/// Group links are only returned for single datacenters.
pub async fn list_datacenters(
    State(state): State<SharedState>,
    Path(alias): Path<String>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }

    let items: Vec<Value> = state
        .datacenters
        .values()
        .cloned()
        .map(|mut dc| {
            if let Some(links) = dc["links"].as_array_mut() {
                links.retain(|l| l["rel"] != "group");
            }
            dc
        })
        .collect();

    (StatusCode::OK, Json(items)).into_response()
}

/// GET /v2/datacenters/{alias}/{location}
pub async fn get_datacenter(
    State(state): State<SharedState>,
    Path((alias, location)): Path<(String, String)>,
    Query(query): Query<DatacenterQuery>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }

    let Some(dc) = state.datacenters.get(&location.to_uppercase()) else {
        return not_found(&location);
    };

    let mut dc = dc.clone();
    if !query.group_links.unwrap_or(false) {
        if let Some(links) = dc["links"].as_array_mut() {
            links.retain(|l| l["rel"] != "group");
        }
    }
    (StatusCode::OK, Json(dc)).into_response()
}

/// GET /v2/datacenters/{alias}/{location}/deploymentCapabilities
pub async fn get_capabilities(
    State(state): State<SharedState>,
    Path((alias, location)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }

    match state.capabilities.get(&location.to_uppercase()) {
        Some(caps) => (StatusCode::OK, Json(caps.clone())).into_response(),
        None => not_found(&location),
    }
}

/// GET /v2/networks/{alias}/{location}
pub async fn list_networks(
    State(state): State<SharedState>,
    Path((alias, location)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = authorize(&state, &headers, &alias) {
        return denied;
    }

    match state.networks.get(&location.to_uppercase()) {
        Some(networks) => (StatusCode::OK, Json(networks.clone())).into_response(),
        None => not_found(&location),
    }
}
