pub mod auth;
pub mod health;
pub mod posts;
pub mod users;

use std::str::FromStr;

use axum::Router;
use social_common::ParseIdError;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(posts::router())
}

/// Parse a path segment into a typed id, answering 400 on garbage.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ParseIdError>,
{
    raw.parse()
        .map_err(|e: ParseIdError| ApiError::bad_request(e.to_string()))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login,
        users::me,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            crate::models::user::UserResponse,
            crate::models::post::Post,
            health::HealthResponse,
            auth::LoginForm,
            auth::LoginResponse,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            posts::CreatePostRequest,
            posts::UpdatePostRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Auth", description = "Session login"),
        (name = "Users", description = "User accounts"),
        (name = "Posts", description = "Posts by user"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use social_common::{PostId, UserId};

    #[test]
    fn parse_id_maps_garbage_to_bad_request() {
        let err = parse_id::<UserId>("abc").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "invalid user id");
        assert_eq!(parse_id::<PostId>("3").unwrap(), PostId::new(3));
    }

    #[test]
    fn openapi_lists_protected_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/login"));
        assert!(doc.paths.paths.contains_key("/me"));
        assert!(doc.paths.paths.contains_key("/users/{uid}/posts/{pid}"));
    }
}
