//! API server configuration.

use cliptide_core::auth::jwt;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Access token signing secret.
    pub access_token_secret: String,
    /// Refresh token signing secret.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expiry_secs: i64,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                    | Default                                |
    /// |-----------------------------|----------------------------------------|
    /// | `BIND_ADDR`                 | `127.0.0.1:8080`                       |
    /// | `DATABASE_URL`              | `postgres://localhost:5432/cliptide`   |
    /// | `ACCESS_TOKEN_SECRET`       | generated & persisted to file          |
    /// | `REFRESH_TOKEN_SECRET`      | generated & persisted to file          |
    /// | `ACCESS_TOKEN_EXPIRY_SECS`  | 900 (15 minutes)                       |
    /// | `REFRESH_TOKEN_EXPIRY_SECS` | 2592000 (30 days)                      |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/cliptide".into()),
            access_token_secret: jwt::resolve_secret("ACCESS_TOKEN_SECRET", "access-token-secret"),
            refresh_token_secret: jwt::resolve_secret(
                "REFRESH_TOKEN_SECRET",
                "refresh-token-secret",
            ),
            access_token_expiry_secs: env_i64(
                "ACCESS_TOKEN_EXPIRY_SECS",
                jwt::ACCESS_TOKEN_EXPIRY_SECS,
            ),
            refresh_token_expiry_secs: env_i64(
                "REFRESH_TOKEN_EXPIRY_SECS",
                jwt::REFRESH_TOKEN_EXPIRY_SECS,
            ),
        }
    }
}

fn env_i64(var: &str, default: i64) -> i64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
