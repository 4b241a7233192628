//! HTTP request handlers for the mock server.

use std::sync::Arc;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;

pub mod auth;
pub mod datacenters;
pub mod operations;
pub mod public_ips;
pub mod servers;

pub use auth::*;
pub use datacenters::*;
pub use operations::*;
pub use public_ips::*;
pub use servers::*;

pub type SharedState = Arc<RwLock<MockState>>;

/// Error body in the provider's format.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "message": message.into() })),
    )
        .into_response()
}

/// Check the bearer token and the account alias in the path.
pub(crate) fn authorize(state: &MockState, headers: &HeaderMap, alias: &str) -> Result<(), Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if state.is_authorized(token) => {}
        _ => {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "Authorization has been denied for this request.",
            ))
        }
    }

    if !alias.eq_ignore_ascii_case(&state.alias) {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            format!("Account alias {alias} is not accessible."),
        ));
    }

    Ok(())
}
