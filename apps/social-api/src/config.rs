use std::time::Duration;

/// Minimum random bytes in a session token (128 bits).
pub const MIN_TOKEN_BYTES: usize = 16;

/// Session-token settings handed to [`crate::auth::tokens::SessionTokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Hard lifetime of a token from issuance. Never extended on use.
    pub ttl_secs: u64,
    /// Random bytes per token before encoding.
    pub token_bytes: usize,
}

impl SessionConfig {
    pub fn new(ttl_secs: u64, token_bytes: usize) -> Self {
        Self {
            ttl_secs: ttl_secs.max(1),
            token_bytes: token_bytes.max(MIN_TOKEN_BYTES),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(600, 32)
    }
}

/// Social API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Redis connection string for the session token store.
    pub redis_url: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    pub session: SessionConfig,
    /// Upper bound on every token-store round trip.
    pub kv_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        let defaults = SessionConfig::default();
        Self {
            database_url: required_var("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379/0".to_string()),
            port: parsed_var("PORT").unwrap_or(8080),
            session: SessionConfig::new(
                parsed_var("SESSION_TTL_SECS").unwrap_or(defaults.ttl_secs),
                parsed_var("SESSION_TOKEN_BYTES").unwrap_or(defaults.token_bytes),
            ),
            kv_timeout: Duration::from_millis(parsed_var("KV_TIMEOUT_MS").unwrap_or(2000)),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_ten_minutes() {
        let s = SessionConfig::default();
        assert_eq!(s.ttl_secs, 600);
        assert_eq!(s.token_bytes, 32);
    }

    #[test]
    fn token_bytes_never_drop_below_128_bits() {
        assert_eq!(SessionConfig::new(600, 4).token_bytes, MIN_TOKEN_BYTES);
        assert_eq!(SessionConfig::new(0, 64).ttl_secs, 1);
    }
}
