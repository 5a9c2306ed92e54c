use std::time::Duration;

use diesel_async::pooled_connection::deadpool::{Hook, HookError, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

pub type DbPool = Pool<AsyncPgConnection>;

const MAX_CONNECTIONS: usize = 100;
/// Connections older than this are closed instead of reused.
const MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);
/// Connections left unused for longer than this are closed on next checkout.
const MAX_IDLE: Duration = Duration::from_secs(60);

/// Whether a pooled connection is past its lifetime or idle limit.
fn should_retire(age: Duration, idle: Duration) -> bool {
    age > MAX_LIFETIME || idle > MAX_IDLE
}

/// Create a Diesel async connection pool.
pub async fn connect(database_url: &str) -> DbPool {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(manager)
        .max_size(MAX_CONNECTIONS)
        .pre_recycle(Hook::<AsyncPgConnection>::sync_fn(|_conn, metrics| {
            if should_retire(metrics.age(), metrics.last_used()) {
                return Err(HookError::Message("connection retired".into()));
            }
            Ok(())
        }))
        .build()
        .expect("failed to build connection pool");

    tracing::info!(max_size = MAX_CONNECTIONS, "database pool created");

    pool
}
