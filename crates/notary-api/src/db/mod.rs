//! # Database Persistence Layer
//!
//! Postgres persistence for the local index via SQLx.
//!
//! The database is **optional**. When `DATABASE_URL` is set, users and
//! transaction index entries are stored in PostgreSQL through
//! [`PgIndexStore`]. When absent, the service falls back to the in-memory
//! index (suitable for development and testing; nothing survives restarts).
//!
//! Blobs and ledger records never live here: the database only correlates
//! them with each other and with the uploading user.

pub mod index;

pub use index::PgIndexStore;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set, running with an in-memory index. \
                 Users and transactions will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
