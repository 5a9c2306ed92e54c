//! Session token issuance and resolution.
//!
//! A session token is an opaque random string mapped to a user id in the
//! key-value store for a fixed TTL. Expiry is left entirely to the store: a
//! token is valid while the key exists and never again afterwards. Nothing is
//! cached in-process, so every validation reads the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use social_common::UserId;

use crate::config::SessionConfig;
use crate::db::kv::KeyValueStore;
use crate::error::ApiError;

/// Prefix on every session token, handy when grepping logs or secret scanners.
pub const TOKEN_PREFIX: &str = "sst";

/// Generate an opaque random token with the given prefix and byte length.
pub fn generate_opaque_token(prefix: &str, bytes: usize) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill(&mut buf[..]);
    format!("{}_{}", prefix, URL_SAFE_NO_PAD.encode(&buf))
}

/// Data stored alongside a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: UserId,
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Issues and resolves session tokens against the shared store.
#[derive(Clone)]
pub struct SessionTokens {
    kv: Arc<dyn KeyValueStore>,
    config: SessionConfig,
}

impl SessionTokens {
    pub fn new(kv: Arc<dyn KeyValueStore>, config: SessionConfig) -> Self {
        Self { kv, config }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.config.ttl_secs
    }

    /// Mint a token for `user_id` and persist it with the configured TTL.
    ///
    /// No token is returned unless the write succeeded.
    pub async fn issue(&self, user_id: UserId) -> Result<String, ApiError> {
        let token = generate_opaque_token(TOKEN_PREFIX, self.config.token_bytes);
        let value = serde_json::to_string(&SessionData { user_id })
            .map_err(|_| ApiError::internal("serialization"))?;

        self.kv
            .set_ex(&session_key(&token), &value, self.config.ttl_secs)
            .await?;

        tracing::debug!(%user_id, ttl_secs = self.config.ttl_secs, "session issued");

        Ok(token)
    }

    /// Look up the user a token was issued to.
    ///
    /// `Ok(None)` means unknown or expired. Store failures are errors, never
    /// `None`, so callers cannot mistake an outage for a missing token.
    pub async fn resolve(&self, token: &str) -> Result<Option<UserId>, ApiError> {
        match self.kv.get(&session_key(token)).await? {
            Some(v) => {
                let data: SessionData = serde_json::from_str(&v).map_err(|_| {
                    tracing::error!("corrupt session data in token store");
                    ApiError::internal("corrupt token data")
                })?;
                Ok(Some(data.user_id))
            }
            None => Ok(None),
        }
    }
}
