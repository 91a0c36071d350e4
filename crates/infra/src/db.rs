//! Database connection bootstrap.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Ping attempts made before giving up on the database at startup.
pub const CONNECT_ATTEMPTS: u32 = 30;

/// Pause between startup ping attempts.
pub const CONNECT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid database url: {0}")]
    InvalidUrl(String),

    #[error("database unreachable after {attempts} attempts: {last_error}")]
    Unreachable { attempts: u32, last_error: String },
}

/// Open a pool and wait until the database answers a ping.
///
/// Retries are bounded; this is the only place in the service that retries.
pub async fn connect_with_retry(
    database_url: &str,
    attempts: u32,
    backoff: Duration,
) -> Result<PgPool, ConnectError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)
        .map_err(|e| ConnectError::InvalidUrl(e.to_string()))?;

    let attempts = attempts.max(1);
    let mut last_error = String::new();
    for attempt in 1..=attempts {
        match sqlx::query("SELECT 1").execute(&pool).await {
            Ok(_) => {
                tracing::info!(attempt, "database reachable");
                return Ok(pool);
            }
            Err(e) => {
                last_error = e.to_string();
                tracing::warn!(attempt, attempts, error = %last_error, "database ping failed");
                if attempt < attempts {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    Err(ConnectError::Unreachable {
        attempts,
        last_error,
    })
}
