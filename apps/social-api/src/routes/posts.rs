//! Posts nested under their author. Reads are public; writes are owner-only.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use social_common::{PostId, UserId};
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::auth::ownership::ensure_owner;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::post::{NewPost, Post, UpdatePost};
use crate::routes::parse_id;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{uid}/posts", get(list_posts).post(create_post))
        .route(
            "/users/{uid}/posts/{pid}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

fn parse_ids(uid: &str, pid: &str) -> Result<(UserId, PostId), ApiError> {
    Ok((parse_id(uid)?, parse_id(pid)?))
}

fn content_required() -> ApiError {
    ApiError::validation(vec![FieldError {
        field: "content".into(),
        message: "Content is required".into(),
    }])
}

// ---------------------------------------------------------------------------
// GET /users/{uid}/posts
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/users/{uid}/posts",
    tag = "Posts",
    params(("uid" = i64, Path, description = "Author id")),
    responses(
        (status = 200, description = "Posts by the user", body = Vec<Post>),
        (status = 400, description = "Malformed id", body = ApiErrorBody),
    ),
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let uid: UserId = parse_id(&uid)?;
    Ok(Json(state.posts.list_for_user(uid).await?))
}

// ---------------------------------------------------------------------------
// GET /users/{uid}/posts/{pid}
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/users/{uid}/posts/{pid}",
    tag = "Posts",
    params(
        ("uid" = i64, Path, description = "Author id"),
        ("pid" = i64, Path, description = "Post id"),
    ),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 400, description = "Malformed id", body = ApiErrorBody),
        (status = 404, description = "No such post", body = ApiErrorBody),
    ),
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path((uid, pid)): Path<(String, String)>,
) -> Result<Json<Post>, ApiError> {
    let (uid, pid) = parse_ids(&uid, &pid)?;

    let post = state
        .posts
        .get(uid, pid)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(Json(post))
}

// ---------------------------------------------------------------------------
// POST /users/{uid}/posts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub content: String,
}

#[utoipa::path(
    post,
    path = "/users/{uid}/posts",
    tag = "Posts",
    params(("uid" = i64, Path, description = "Author id")),
    request_body = CreatePostRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Missing token or malformed input", body = ApiErrorBody),
        (status = 401, description = "Invalid token or not the owner", body = ApiErrorBody),
        (status = 500, description = "Token store unavailable", body = ApiErrorBody),
    ),
)]
pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let uid: UserId = parse_id(&uid)?;
    ensure_owner(&auth, uid)?;
    let Json(body) = body?;

    if body.content.trim().is_empty() {
        return Err(content_required());
    }

    let post = state
        .posts
        .create(NewPost {
            id: state.ids.generate(),
            user_id: uid.get(),
            content: body.content,
        })
        .await?;

    tracing::info!(user_id = %uid, post_id = post.id, "post created");

    Ok((StatusCode::CREATED, Json(post)))
}

// ---------------------------------------------------------------------------
// PUT /users/{uid}/posts/{pid}
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub likes: Option<i32>,
}

#[utoipa::path(
    put,
    path = "/users/{uid}/posts/{pid}",
    tag = "Posts",
    params(
        ("uid" = i64, Path, description = "Author id"),
        ("pid" = i64, Path, description = "Post id"),
    ),
    request_body = UpdatePostRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 400, description = "Missing token or malformed input", body = ApiErrorBody),
        (status = 401, description = "Invalid token or not the owner", body = ApiErrorBody),
        (status = 404, description = "No such post", body = ApiErrorBody),
        (status = 500, description = "Token store unavailable", body = ApiErrorBody),
    ),
)]
pub async fn update_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((uid, pid)): Path<(String, String)>,
    body: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
    let (uid, pid) = parse_ids(&uid, &pid)?;
    ensure_owner(&auth, uid)?;
    let Json(body) = body?;

    if body.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(content_required());
    }
    if body.likes.is_some_and(|l| l < 0) {
        return Err(ApiError::validation(vec![FieldError {
            field: "likes".into(),
            message: "Likes cannot be negative".into(),
        }]));
    }

    let changes = UpdatePost {
        content: body.content,
        likes: body.likes,
        updated_at: Utc::now(),
    };

    let post = state
        .posts
        .update(uid, pid, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    tracing::info!(user_id = %uid, post_id = %pid, "post updated");

    Ok(Json(post))
}

// ---------------------------------------------------------------------------
// DELETE /users/{uid}/posts/{pid}
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/users/{uid}/posts/{pid}",
    tag = "Posts",
    params(
        ("uid" = i64, Path, description = "Author id"),
        ("pid" = i64, Path, description = "Post id"),
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Deleted post", body = Post),
        (status = 400, description = "Missing token or malformed id", body = ApiErrorBody),
        (status = 401, description = "Invalid token or not the owner", body = ApiErrorBody),
        (status = 404, description = "No such post", body = ApiErrorBody),
        (status = 500, description = "Token store unavailable", body = ApiErrorBody),
    ),
)]
pub async fn delete_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((uid, pid)): Path<(String, String)>,
) -> Result<Json<Post>, ApiError> {
    let (uid, pid) = parse_ids(&uid, &pid)?;
    ensure_owner(&auth, uid)?;

    let post = state
        .posts
        .delete(uid, pid)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    tracing::info!(user_id = %uid, post_id = %pid, "post deleted");

    Ok(Json(post))
}
