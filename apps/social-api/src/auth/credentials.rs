//! Username/password verification for `POST /login`.

use std::sync::{Arc, OnceLock};

use social_common::UserId;

use crate::auth::password;
use crate::db::UserRepository;
use crate::error::ApiError;

/// The only message a failed login ever produces.
pub const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Hash checked when the username does not exist, so an unknown user costs
/// the same Argon2 pass as a wrong password.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| password::hash_password("not-a-real-password").unwrap_or_default())
}

/// Resolves a username/password pair to the account's id.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserRepository>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Returns the user id on a match and `401 invalid username or password`
    /// otherwise, without revealing which half was wrong. Repository failures
    /// surface as server errors.
    pub async fn verify(&self, username: &str, password: &str) -> Result<UserId, ApiError> {
        if username.is_empty() {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        let user = self.users.find_by_username(username).await?;

        let (hash, id) = match &user {
            Some(u) => (u.password_hash.clone(), Some(u.user_id())),
            None => (dummy_hash().to_string(), None),
        };

        let matched = password::verify_password_blocking(password.to_string(), hash).await?;

        match id {
            Some(id) if matched => Ok(id),
            _ => Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryRepository;
    use crate::models::user::NewUser;

    async fn verifier_with(username: &str, pass: &str) -> CredentialVerifier {
        let repo = MemoryRepository::new();
        repo.create(NewUser {
            id: 14,
            username: username.to_string(),
            password_hash: password::hash_password(pass).unwrap(),
            name: String::new(),
            email: String::new(),
        })
        .await
        .unwrap();
        CredentialVerifier::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn correct_credentials_yield_user_id() {
        let v = verifier_with("blink", "password").await;
        assert_eq!(v.verify("blink", "password").await.unwrap(), UserId::new(14));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let v = verifier_with("blink", "password").await;

        let wrong_pw = v.verify("blink", "nope").await.unwrap_err();
        let no_user = v.verify("ghost", "password").await.unwrap_err();
        let empty = v.verify("", "password").await.unwrap_err();

        for err in [&wrong_pw, &no_user, &empty] {
            assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
            assert_eq!(err.code, "UNAUTHORIZED");
            assert_eq!(err.message, INVALID_CREDENTIALS);
        }
    }

    #[tokio::test]
    async fn username_match_is_case_sensitive() {
        let v = verifier_with("blink", "password").await;
        assert!(v.verify("BLINK", "password").await.is_err());
    }
}
