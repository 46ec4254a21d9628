use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rating {
    pub id: i64,
    pub store_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

/// A store's rating joined with the rater, for owner/admin rating listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RatingWithUser {
    pub id: i64,
    pub store_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
}
