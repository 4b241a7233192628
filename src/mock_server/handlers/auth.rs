//! Login endpoint handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

use super::{error_response, SharedState};

/// Form fields of a login request.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /v2/authentication/login
pub async fn login(State(state): State<SharedState>, Form(form): Form<LoginForm>) -> Response {
    let mut state = state.write().await;

    match state.login(&form.username, &form.password) {
        Some((token, location)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "userName": form.username,
                "accountAlias": state.alias,
                "locationAlias": location,
                "roles": ["AccountAdmin"],
                "bearerToken": token,
            })),
        )
            .into_response(),
        None => error_response(
            StatusCode::BAD_REQUEST,
            "We didn't recognize the username or password you entered. Please try again.",
        ),
    }
}
