pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use auth::credentials::CredentialVerifier;
use auth::tokens::SessionTokens;
use config::SessionConfig;
use db::kv::KeyValueStore;
use db::{PostRepository, UserRepository};
use social_common::SnowflakeGenerator;

/// Shared application state available to all route handlers.
///
/// Every collaborator is injected here at construction; handlers never reach
/// for globals, so tests swap in fakes per component.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub sessions: SessionTokens,
    pub credentials: CredentialVerifier,
    pub ids: Arc<SnowflakeGenerator>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        kv: Arc<dyn KeyValueStore>,
        session: SessionConfig,
    ) -> Self {
        Self {
            credentials: CredentialVerifier::new(users.clone()),
            sessions: SessionTokens::new(kv, session),
            users,
            posts,
            ids: Arc::new(SnowflakeGenerator::new(0)),
        }
    }
}
