use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::Role;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
}

/// Wire view of a user: everything except credentials and reset state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub address: Option<String>,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            address: user.address.clone(),
            role: user.role,
        }
    }
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}
