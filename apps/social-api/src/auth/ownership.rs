use social_common::UserId;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;

/// Reject unless the authenticated caller is the user addressed by the path.
///
/// Call before touching the target in any way, including existence checks,
/// so a non-owner learns nothing about whether it exists.
pub fn ensure_owner(auth: &AuthUser, target: UserId) -> Result<(), ApiError> {
    if auth.user_id == target {
        Ok(())
    } else {
        tracing::info!(caller = %auth.user_id, %target, "ownership check failed");
        Err(ApiError::not_owner())
    }
}
