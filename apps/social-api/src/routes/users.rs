//! User endpoints. Reads are public; updates and deletes are owner-only.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use social_common::UserId;
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::auth::ownership::ensure_owner;
use crate::auth::password::hash_password_blocking;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::user::{NewUser, UpdateUser, UserResponse};
use crate::routes::parse_id;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{uid}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Treat absent and empty fields alike: neither changes anything.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn validate_username(username: &str, errors: &mut Vec<FieldError>) {
    if username.trim().is_empty() {
        errors.push(FieldError {
            field: "username".into(),
            message: "Username is required".into(),
        });
    } else if username.trim() != username {
        errors.push(FieldError {
            field: "username".into(),
            message: "Username must not start or end with whitespace".into(),
        });
    }
}

// ---------------------------------------------------------------------------
// GET /me
// ---------------------------------------------------------------------------

/// The account behind the presented token. Needs a valid session but no
/// ownership check: the principal is the subject.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 400, description = "Missing or malformed token", body = ApiErrorBody),
        (status = 401, description = "Invalid or expired token", body = ApiErrorBody),
        (status = 404, description = "Account no longer exists", body = ApiErrorBody),
        (status = 500, description = "Token store unavailable", body = ApiErrorBody),
    ),
)]
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .get(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

// ---------------------------------------------------------------------------
// GET /users
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses((status = 200, description = "All users", body = Vec<UserResponse>)),
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// ---------------------------------------------------------------------------
// POST /users
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Validation failed", body = ApiErrorBody),
        (status = 409, description = "Username taken", body = ApiErrorBody),
    ),
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let mut errors = Vec::new();
    validate_username(&body.username, &mut errors);
    if body.password.is_empty() {
        errors.push(FieldError {
            field: "password".into(),
            message: "Password is required".into(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let password_hash = hash_password_blocking(body.password).await?;

    let user = state
        .users
        .create(NewUser {
            id: state.ids.generate(),
            username: body.username,
            password_hash,
            name: body.name,
            email: body.email,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

// ---------------------------------------------------------------------------
// GET /users/{uid}
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/users/{uid}",
    tag = "Users",
    params(("uid" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Malformed id", body = ApiErrorBody),
        (status = 404, description = "No such user", body = ApiErrorBody),
    ),
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let uid: UserId = parse_id(&uid)?;

    let user = state
        .users
        .get(uid)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

// ---------------------------------------------------------------------------
// PUT /users/{uid}
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[utoipa::path(
    put,
    path = "/users/{uid}",
    tag = "Users",
    params(("uid" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Missing token or malformed input", body = ApiErrorBody),
        (status = 401, description = "Invalid token or not the owner", body = ApiErrorBody),
        (status = 404, description = "No such user", body = ApiErrorBody),
        (status = 500, description = "Token store unavailable", body = ApiErrorBody),
    ),
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let uid: UserId = parse_id(&uid)?;
    ensure_owner(&auth, uid)?;
    let Json(body) = body?;

    let username = non_empty(body.username);
    if let Some(ref name) = username {
        let mut errors = Vec::new();
        validate_username(name, &mut errors);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }
    }

    let password_hash = match non_empty(body.password) {
        Some(p) => Some(hash_password_blocking(p).await?),
        None => None,
    };

    let changes = UpdateUser {
        username,
        password_hash,
        name: non_empty(body.name),
        email: non_empty(body.email),
        updated_at: Utc::now(),
    };

    let user = state
        .users
        .update(uid, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = %uid, "user updated");

    Ok(Json(UserResponse::from(user)))
}

// ---------------------------------------------------------------------------
// DELETE /users/{uid}
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/users/{uid}",
    tag = "Users",
    params(("uid" = i64, Path, description = "User id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Deleted user", body = UserResponse),
        (status = 400, description = "Missing token or malformed id", body = ApiErrorBody),
        (status = 401, description = "Invalid token or not the owner", body = ApiErrorBody),
        (status = 404, description = "No such user", body = ApiErrorBody),
        (status = 500, description = "Token store unavailable", body = ApiErrorBody),
    ),
)]
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let uid: UserId = parse_id(&uid)?;
    ensure_owner(&auth, uid)?;

    let user = state
        .users
        .delete(uid)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = %uid, "user deleted");

    Ok(Json(UserResponse::from(user)))
}
