//! Read-side projections across users, stores and ratings.
//!
//! Owns no state: every method is a single aggregate query. When the ratings
//! relation was absent at startup (see `pool::ratings_relation_available`),
//! each projection degrades to zeroed/null aggregates instead of failing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::models::Role;
use super::sort::{store_sort_column, user_sort_column, SortOrder};
use super::DbError;

pub struct AggregateViews {
    pool: PgPool,
    ratings_available: bool,
}

/// Row of the admin users listing. `average_rating` is populated for Owner
/// rows only; everyone else reports null.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminUserRow {
    pub id: i64,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub address: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub average_rating: Option<f64>,
}

/// Single-user detail view; same projection, `name` on the wire
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserDetailRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminStoreRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// Store card for the public browse endpoints; `user_rating` is the viewer's
/// own rating and stays null for anonymous requests.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicStoreRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner_name: String,
    pub average_rating: f64,
    pub total_ratings: i64,
    pub user_rating: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

impl AggregateViews {
    pub fn new(pool: PgPool, ratings_available: bool) -> Self {
        Self { pool, ratings_available }
    }

    /// Users with owner average ratings, filtered by free-text search and/or
    /// role, sorted by an allow-listed column.
    ///
    /// The role filter is the raw database string: an unrecognized external
    /// role matches nothing rather than being dropped.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        role: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<AdminUserRow>, DbError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut n = 0;

        let pattern = search.map(|s| {
            n += 1;
            clauses.push(format!(
                "(u.full_name ILIKE ${n} OR u.email ILIKE ${n} OR u.address ILIKE ${n})"
            ));
            format!("%{}%", s)
        });
        if role.is_some() {
            n += 1;
            clauses.push(format!("u.role = ${n}"));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let order_sql = format!(
            " ORDER BY {} {}",
            user_sort_column(sort_by),
            SortOrder::parse(sort_order).to_sql()
        );

        let sql = if self.ratings_available {
            format!(
                "SELECT u.id, u.full_name, u.email, u.address, u.role, u.created_at,
                        CASE WHEN u.role = 'Owner' THEN ROUND(AVG(r.rating)::numeric, 2)::float8
                             ELSE NULL END AS average_rating
                 FROM users u
                 LEFT JOIN stores s ON s.owner_id = u.id
                 LEFT JOIN ratings r ON r.store_id = s.id
                 {where_sql}
                 GROUP BY u.id
                 {order_sql}"
            )
        } else {
            format!(
                "SELECT u.id, u.full_name, u.email, u.address, u.role, u.created_at,
                        NULL::float8 AS average_rating
                 FROM users u
                 {where_sql}
                 {order_sql}"
            )
        };

        let mut query = sqlx::query_as::<_, AdminUserRow>(&sql);
        if let Some(p) = &pattern {
            query = query.bind(p);
        }
        if let Some(r) = role {
            query = query.bind(r);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn user_detail(&self, id: i64) -> Result<Option<UserDetailRow>, DbError> {
        let sql = if self.ratings_available {
            "SELECT u.id, u.full_name AS name, u.email, u.address, u.role, u.created_at,
                    CASE WHEN u.role = 'Owner' THEN ROUND(AVG(r.rating)::numeric, 2)::float8
                         ELSE NULL END AS average_rating
             FROM users u
             LEFT JOIN stores s ON s.owner_id = u.id
             LEFT JOIN ratings r ON r.store_id = s.id
             WHERE u.id = $1
             GROUP BY u.id"
        } else {
            "SELECT u.id, u.full_name AS name, u.email, u.address, u.role, u.created_at,
                    NULL::float8 AS average_rating
             FROM users u
             WHERE u.id = $1"
        };

        let row = sqlx::query_as::<_, UserDetailRow>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Stores with average/count aggregates for the admin listing
    pub async fn list_stores(
        &self,
        search: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<AdminStoreRow>, DbError> {
        let pattern = search.map(|s| format!("%{}%", s));
        let where_sql = if pattern.is_some() {
            " WHERE (s.store_name ILIKE $1 OR s.email ILIKE $1 OR s.address ILIKE $1 OR u.full_name ILIKE $1)"
        } else {
            ""
        };
        let order_sql = format!(
            " ORDER BY {} {}",
            store_sort_column(sort_by),
            SortOrder::parse(sort_order).to_sql()
        );

        let sql = if self.ratings_available {
            format!(
                "SELECT s.id, s.store_name AS name, s.email, s.address, s.created_at,
                        u.full_name AS owner_name, u.email AS owner_email,
                        ROUND(COALESCE(AVG(r.rating), 0)::numeric, 2)::float8 AS average_rating,
                        COUNT(r.id) AS total_ratings
                 FROM stores s
                 LEFT JOIN users u ON s.owner_id = u.id
                 LEFT JOIN ratings r ON s.id = r.store_id
                 {where_sql}
                 GROUP BY s.id, u.full_name, u.email
                 {order_sql}"
            )
        } else {
            format!(
                "SELECT s.id, s.store_name AS name, s.email, s.address, s.created_at,
                        u.full_name AS owner_name, u.email AS owner_email,
                        0::float8 AS average_rating,
                        0::bigint AS total_ratings
                 FROM stores s
                 LEFT JOIN users u ON s.owner_id = u.id
                 {where_sql}
                 {order_sql}"
            )
        };

        let mut query = sqlx::query_as::<_, AdminStoreRow>(&sql);
        if let Some(p) = &pattern {
            query = query.bind(p);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Public browse listing, sorted by store name. `viewer` adds the
    /// correlated own-rating lookup.
    pub async fn public_stores(&self, viewer: Option<i64>) -> Result<Vec<PublicStoreRow>, DbError> {
        let rows = if self.ratings_available {
            sqlx::query_as::<_, PublicStoreRow>(
                "SELECT s.id, s.store_name AS name, s.email, s.address, s.description, s.created_at,
                        u.full_name AS owner_name,
                        ROUND(COALESCE(AVG(r.rating), 0)::numeric, 2)::float8 AS average_rating,
                        COUNT(r.id) AS total_ratings,
                        (SELECT rating FROM ratings WHERE store_id = s.id AND user_id = $1) AS user_rating
                 FROM stores s
                 JOIN users u ON s.owner_id = u.id
                 LEFT JOIN ratings r ON s.id = r.store_id
                 GROUP BY s.id, u.full_name
                 ORDER BY s.store_name ASC",
            )
            .bind(viewer)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, PublicStoreRow>(
                "SELECT s.id, s.store_name AS name, s.email, s.address, s.description, s.created_at,
                        u.full_name AS owner_name,
                        0::float8 AS average_rating,
                        0::bigint AS total_ratings,
                        NULL::int AS user_rating
                 FROM stores s
                 JOIN users u ON s.owner_id = u.id
                 ORDER BY s.store_name ASC",
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, DbError> {
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_stores = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores")
            .fetch_one(&self.pool)
            .await?;
        let total_ratings = if self.ratings_available {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings")
                .fetch_one(&self.pool)
                .await?
        } else {
            0
        };

        Ok(DashboardStats { total_users, total_stores, total_ratings })
    }
}
