use sqlx::PgPool;

use super::models::Store;
use super::{is_unique_violation, DbError};

pub struct StoreRepository {
    pool: PgPool,
}

/// Insert payload shared by the owner self-service flow and the admin flow
/// (the admin flow fills the optional columns with defaults).
pub struct NewStore<'a> {
    pub store_name: &'a str,
    pub owner_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub description: Option<&'a str>,
    pub established_year: Option<i32>,
    pub website: Option<&'a str>,
    pub owner_id: i64,
}

impl StoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Store>, DbError> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    pub async fn find_by_owner(&self, owner_id: i64) -> Result<Option<Store>, DbError> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    pub async fn create(&self, new: NewStore<'_>) -> Result<i64, DbError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO stores (store_name, owner_name, email, phone, address, description, established_year, website, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id",
        )
        .bind(new.store_name)
        .bind(new.owner_name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.address)
        .bind(new.description)
        .bind(new.established_year)
        .bind(new.website)
        .bind(new.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::UniqueViolation("A store with this email already exists".to_string())
            } else {
                DbError::Sqlx(e)
            }
        })?;
        Ok(id)
    }

    pub async fn update_by_owner(&self, owner_id: i64, new: NewStore<'_>) -> Result<u64, DbError> {
        let result = sqlx::query(
            "UPDATE stores
             SET store_name = $1, owner_name = $2, email = $3, phone = $4, address = $5,
                 description = $6, established_year = $7, website = $8, updated_at = now()
             WHERE owner_id = $9",
        )
        .bind(new.store_name)
        .bind(new.owner_name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.address)
        .bind(new.description)
        .bind(new.established_year)
        .bind(new.website)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::UniqueViolation("A store with this email already exists".to_string())
            } else {
                DbError::Sqlx(e)
            }
        })?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_owner(&self, owner_id: i64) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM ratings WHERE store_id IN (SELECT id FROM stores WHERE owner_id = $1)")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM stores WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Admin deletion: the store's ratings go with it
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM ratings WHERE store_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
