//! Bearer-token authentication extractor.
//!
//! Protected handlers take [`AuthUser`] as their first argument, so the token
//! is checked before any other extractor or handler code runs. Any failure
//! rejects the request; there is no path on which an error lets it through.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use social_common::UserId;

use crate::error::ApiError;
use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller extracted from the `Authorization: Bearer <token>` header.
///
/// Immutable and request-scoped; handlers receive it by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Pull the token out of an `Authorization` header value.
///
/// The literal `"Bearer "` prefix is required verbatim; no whitespace
/// trimming is done.
pub fn bearer_token(header: Option<&str>) -> Result<&str, ApiError> {
    let header =
        header.ok_or_else(|| ApiError::bad_request("no authorization token found in the header"))?;

    match header.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ApiError::bad_request(
            "no authorization token found in the header",
        )),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap_or_default());
        let token = bearer_token(header)?;

        // Store errors propagate as 500; only a clean miss is a 401.
        let user_id = state
            .sessions
            .resolve(token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("invalid token"))?;

        Ok(AuthUser { user_id })
    }
}
