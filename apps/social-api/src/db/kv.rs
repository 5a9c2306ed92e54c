use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use tokio::time::Instant;

/// Failure talking to the token store. Callers must treat both variants as
/// "deny": nothing here is ever a reason to let a request through.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token store unavailable: {0}")]
    Unavailable(String),
    #[error("token store call timed out")]
    Timeout,
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Abstraction over the key-value store that holds session tokens.
///
/// Backed by Redis in production and an in-memory map in tests.
/// Entries written with [`set_ex`](KeyValueStore::set_ex) disappear on their
/// own once the TTL elapses; callers never sweep.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

// ---------------------------------------------------------------------------
// Redis implementation
// ---------------------------------------------------------------------------

/// Redis-backed store. Every call is bounded by `timeout`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    /// Connect to Redis, failing if the server cannot be reached within `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Timeout)??;

        tracing::info!("token store connected");

        Ok(Self { conn, timeout })
    }
}

/// Run one store call, giving up with [`StoreError::Timeout`] after `limit`.
async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout),
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        bounded(self.timeout, conn.set_ex::<_, _, ()>(key, value, ttl_secs)).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        bounded(self.timeout, conn.get::<_, Option<String>>(key)).await
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests / local development)
// ---------------------------------------------------------------------------

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process store honouring TTLs on the tokio clock, so tests running with
/// paused time can step past an expiry deterministically.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries not yet expired.
    pub fn live_len(&self) -> usize {
        let now = Instant::now();
        self.data
            .lock()
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        };
        self.data.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut data = self.data.lock();
        match data.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                data.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
