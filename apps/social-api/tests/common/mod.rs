use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum_test::TestServer;

use social_api::auth::password::hash_password;
use social_api::config::SessionConfig;
use social_api::db::kv::{KeyValueStore, MemoryStore, StoreError};
use social_api::db::memory::MemoryRepository;
use social_api::db::UserRepository;
use social_api::models::user::{NewUser, User};
use social_api::AppState;

/// Everything a test needs: the server plus handles on its fakes.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub repo: Arc<MemoryRepository>,
}

/// App backed by an in-memory token store and repositories.
pub fn test_app() -> (TestApp, Arc<MemoryStore>) {
    let kv = Arc::new(MemoryStore::new());
    (test_app_with_store(kv.clone()), kv)
}

/// App backed by the given token store, for failure injection.
pub fn test_app_with_store(kv: Arc<dyn KeyValueStore>) -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(repo.clone(), repo.clone(), kv, SessionConfig::default());
    let app = social_api::routes::router().with_state(state.clone());
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        state,
        repo,
    }
}

/// Token store that is always unreachable.
pub struct DownStore;

#[async_trait]
impl KeyValueStore for DownStore {
    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Timeout)
    }
}

/// Insert a user with a real Argon2 hash of `password`.
pub async fn create_user(repo: &MemoryRepository, id: i64, username: &str, password: &str) -> User {
    UserRepository::create(
        repo,
        NewUser {
            id,
            username: username.to_string(),
            password_hash: hash_password(password).expect("argon2 hash"),
            name: format!("{username} name"),
            email: format!("{username}@email.com"),
        },
    )
    .await
    .expect("insert test user")
}

/// Log in through the HTTP endpoint and return the issued token.
pub async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let resp = server
        .post("/login")
        .form(&[("u", username), ("p", password)])
        .await;
    resp.assert_status_ok();
    resp.json::<serde_json::Value>()["token"]
        .as_str()
        .expect("token field")
        .to_string()
}

/// `Authorization: Bearer <token>` header pair.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
    )
}
