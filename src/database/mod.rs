pub mod models;
pub mod pool;
pub mod ratings;
pub mod sort;
pub mod stores;
pub mod users;
pub mod views;

use thiserror::Error;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    UniqueViolation(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Postgres unique_violation (duplicate key) check, used to turn a lost
/// insert race into a client-facing conflict instead of a 500.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().and_then(|db| db.code()),
        Some(code) if code == "23505"
    )
}
