use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{Role, User};
use super::{is_unique_violation, DbError};

/// Persistence for the users table. Holds a pool clone; constructed per
/// request from `AppState`.
pub struct UserRepository {
    pool: PgPool,
}

/// Insert payload for `UserRepository::create`
pub struct NewUser<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub address: Option<&'a str>,
    pub role: Role,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email_and_role(&self, email: &str, role: Role) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND role = $2")
            .bind(email)
            .bind(role.as_db_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Email uniqueness probe, optionally excluding one row (for updates)
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> Result<bool, DbError> {
        let id: Option<i64> = match exclude_id {
            Some(exclude) => {
                sqlx::query_scalar("SELECT id FROM users WHERE email = $1 AND id != $2")
                    .bind(email)
                    .bind(exclude)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
                    .bind(email)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(id.is_some())
    }

    /// Insert a user and return the new id. A duplicate-email race between the
    /// existence check and the insert lands here as a unique violation.
    pub async fn create(&self, new: NewUser<'_>) -> Result<i64, DbError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (full_name, email, password, address, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(new.full_name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.address)
        .bind(new.role.as_db_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::UniqueViolation("Email already exists".to_string())
            } else {
                DbError::Sqlx(e)
            }
        })?;
        Ok(id)
    }

    pub async fn update_profile(&self, id: i64, full_name: &str, address: Option<&str>) -> Result<(), DbError> {
        sqlx::query("UPDATE users SET full_name = $1, address = $2 WHERE id = $3")
            .bind(full_name)
            .bind(address)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Admin edit of name/email/address/role; never touches the password
    pub async fn update_details(
        &self,
        id: i64,
        full_name: &str,
        email: &str,
        address: Option<&str>,
        role: Role,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE users SET full_name = $1, email = $2, address = $3, role = $4 WHERE id = $5")
            .bind(full_name)
            .bind(email)
            .bind(address)
            .bind(role.as_db_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::UniqueViolation("Email already exists".to_string())
                } else {
                    DbError::Sqlx(e)
                }
            })?;
        Ok(())
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_reset_token(
        &self,
        id: i64,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE users SET reset_token = $1, reset_token_expiry = $2 WHERE id = $3")
            .bind(token)
            .bind(expiry)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_valid_reset_token(&self, token: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE reset_token = $1 AND reset_token_expiry > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Set the new password hash and consume the reset token in one statement
    pub async fn reset_password(&self, id: i64, password_hash: &str) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE users SET password = $1, reset_token = NULL, reset_token_expiry = NULL WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn count_admins(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'Admin'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn owns_store(&self, user_id: i64) -> Result<bool, DbError> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM stores WHERE owner_id = $1 LIMIT 1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id.is_some())
    }

    /// Delete a user and their ratings. Invariant checks (last admin,
    /// store ownership, self-deletion) happen in the handler before this.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM ratings WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
