use sqlx::PgPool;

use super::models::{Rating, RatingWithUser};
use super::DbError;

pub struct RatingRepository {
    pool: PgPool,
}

impl RatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_for_user(&self, store_id: i64, user_id: i64) -> Result<Option<Rating>, DbError> {
        let rating = sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE store_id = $1 AND user_id = $2",
        )
        .bind(store_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }

    /// Insert or update in place. The unique constraint on (store_id, user_id)
    /// plus ON CONFLICT makes concurrent submissions by the same user converge
    /// on a single row; a lost insert race becomes the update arm.
    pub async fn upsert(&self, store_id: i64, user_id: i64, rating: i32) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO ratings (store_id, user_id, rating)
             VALUES ($1, $2, $3)
             ON CONFLICT (store_id, user_id) DO UPDATE SET rating = EXCLUDED.rating",
        )
        .bind(store_id)
        .bind(user_id)
        .bind(rating)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_for_user(&self, store_id: i64, user_id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM ratings WHERE store_id = $1 AND user_id = $2")
            .bind(store_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// All ratings of a store with the rater's name and email, newest first
    pub async fn list_for_store(&self, store_id: i64) -> Result<Vec<RatingWithUser>, DbError> {
        let rows = sqlx::query_as::<_, RatingWithUser>(
            "SELECT r.id, r.store_id, r.user_id, r.rating, r.created_at,
                    u.full_name AS user_name, u.email AS user_email
             FROM ratings r
             JOIN users u ON r.user_id = u.id
             WHERE r.store_id = $1
             ORDER BY r.created_at DESC",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
