//! Admin user management: listing with search/sort, CRUD with the deletion
//! guards (self, last admin, store owner).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::auth::password;
use crate::database::models::Role;
use crate::database::users::{NewUser, UserRepository};
use crate::database::views::AggregateViews;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

/// GET /api/admin/users
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Value>, ApiError> {
    // Known synonyms normalize to the canonical database value; an
    // unrecognized role filter is passed through verbatim and matches nothing
    let role_filter = query.role.map(|raw| match Role::normalize(&raw) {
        Some(role) => role.as_db_str().to_string(),
        None => raw,
    });

    let views = AggregateViews::new(state.pool.clone(), state.ratings_available);
    let users = views
        .list_users(
            query.search.as_deref(),
            role_filter.as_deref(),
            query.sort_by.as_deref(),
            query.sort_order.as_deref(),
        )
        .await?;

    Ok(Json(json!({ "total": users.len(), "users": users })))
}

/// POST /api/admin/users
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (name, email, raw_password, address) = match (
        &payload.name,
        &payload.email,
        &payload.password,
        &payload.address,
    ) {
        (Some(name), Some(email), Some(password), Some(address)) => (name, email, password, address),
        _ => return Err(ApiError::bad_request("All fields are required")),
    };

    validate::validate_email(email).map_err(ApiError::bad_request)?;
    if raw_password.len() < 6 {
        return Err(ApiError::bad_request("Password must be at least 6 characters"));
    }
    let role = payload
        .role
        .as_deref()
        .and_then(Role::normalize)
        .ok_or_else(|| ApiError::bad_request("Invalid role"))?;

    let users = UserRepository::new(state.pool.clone());
    if users.email_exists(email, None).await? {
        return Err(ApiError::bad_request("Email already exists"));
    }

    let password_hash = password::hash_password(raw_password).await?;
    users
        .create(NewUser {
            full_name: name,
            email,
            password_hash: &password_hash,
            address: Some(address),
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

/// GET /api/admin/users/:id
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let views = AggregateViews::new(state.pool.clone(), state.ratings_available);
    let user = views
        .user_detail(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "user": user })))
}

/// PUT /api/admin/users/:id - name/email/address/role; passwords are rotated
/// through the auth endpoints only
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<Value>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let existing = users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let (name, email, address) = match (&payload.name, &payload.email, &payload.address) {
        (Some(name), Some(email), Some(address)) => (name, email, address),
        _ => return Err(ApiError::bad_request("Name, email, address and role are required")),
    };
    validate::validate_email(email).map_err(ApiError::bad_request)?;
    let role = payload
        .role
        .as_deref()
        .and_then(Role::normalize)
        .ok_or_else(|| ApiError::bad_request("Invalid role"))?;

    if *email != existing.email && users.email_exists(email, Some(id)).await? {
        return Err(ApiError::bad_request("Email already exists"));
    }

    users
        .update_details(id, name, email, Some(address), role)
        .await?;

    Ok(Json(json!({ "message": "User updated successfully" })))
}

/// DELETE /api/admin/users/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let target = users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if target.id == current.id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }
    if target.role == Role::Admin && users.count_admins().await? <= 1 {
        return Err(ApiError::bad_request("Cannot delete the last admin user"));
    }
    if users.owns_store(target.id).await? {
        return Err(ApiError::bad_request(
            "Cannot delete user who owns stores. Please delete their stores first.",
        ));
    }

    users.delete(target.id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
