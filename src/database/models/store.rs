use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub store_name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub description: Option<String>,
    pub established_year: Option<i32>,
    pub website: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
