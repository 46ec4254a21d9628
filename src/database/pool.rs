use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{info, warn};

use super::DbError;
use crate::config;

/// Create the shared connection pool. Built once in `main` and handed to
/// repositories through `AppState` - never accessed through a global.
pub async fn create_pool(database_url: &str) -> Result<PgPool, DbError> {
    let cfg = &config::config().database;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect(database_url)
        .await
        .map_err(|e| DbError::ConnectionError(e.to_string()))?;

    info!("Created database pool ({} max connections)", cfg.max_connections);
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DbError::MigrationError(e.to_string()))
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Probe whether the ratings relation exists. Evaluated once at startup;
/// aggregation queries branch on the result instead of catching failed
/// queries at request time.
pub async fn ratings_relation_available(pool: &PgPool) -> bool {
    let probe = sqlx::query_scalar::<_, Option<String>>("SELECT to_regclass('public.ratings')::text")
        .fetch_one(pool)
        .await;

    match probe {
        Ok(reg) => reg.is_some(),
        Err(e) => {
            warn!("Could not probe ratings relation, degrading aggregates to zero: {}", e);
            false
        }
    }
}
