//! `POST /login`: exchange a username and password for a session token.

use axum::extract::State;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorBody};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Form-encoded login fields.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    /// Username.
    #[serde(default)]
    pub u: String,
    /// Password.
    #[serde(default)]
    pub p: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = ApiErrorBody),
        (status = 500, description = "Token store unavailable", body = ApiErrorBody),
    ),
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user_id = state.credentials.verify(&form.u, &form.p).await?;

    let token = state.sessions.issue(user_id).await?;

    tracing::info!(%user_id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.sessions.ttl_secs(),
    }))
}
