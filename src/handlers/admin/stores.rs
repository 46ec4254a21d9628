//! Admin store management: listing with search/sort, creation on behalf of an
//! owner, deletion with rating cascade.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::database::models::Role;
use crate::database::stores::{NewStore, StoreRepository};
use crate::database::users::UserRepository;
use crate::database::views::AggregateViews;
use crate::error::ApiError;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct StoreListQuery {
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
}

/// GET /api/admin/stores
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<Value>, ApiError> {
    let views = AggregateViews::new(state.pool.clone(), state.ratings_available);
    let stores = views
        .list_stores(
            query.search.as_deref(),
            query.sort_by.as_deref(),
            query.sort_order.as_deref(),
        )
        .await?;

    Ok(Json(json!({ "total": stores.len(), "stores": stores })))
}

/// POST /api/admin/stores - create a store for an existing Owner.
///
/// One store per owner is enforced here too, so the admin flow cannot bypass
/// the assumption the owner self-service flow relies on.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (name, email, address, owner_id) = match (
        &payload.name,
        &payload.email,
        &payload.address,
        payload.owner_id,
    ) {
        (Some(name), Some(email), Some(address), Some(owner_id)) => (name, email, address, owner_id),
        _ => return Err(ApiError::bad_request("name, email, address and ownerId are required")),
    };
    validate::validate_email(email).map_err(ApiError::bad_request)?;

    let owner = UserRepository::new(state.pool.clone())
        .find_by_id(owner_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Owner not found"))?;
    if owner.role != Role::Owner {
        return Err(ApiError::bad_request("Selected user is not an Owner"));
    }

    let stores = StoreRepository::new(state.pool.clone());
    if stores.find_by_owner(owner_id).await?.is_some() {
        return Err(ApiError::conflict("This owner already has a store"));
    }

    stores
        .create(NewStore {
            store_name: name,
            owner_name: &owner.full_name,
            email,
            // phone is required by the schema; the admin form doesn't collect it
            phone: "N/A",
            address,
            description: None,
            established_year: None,
            website: None,
            owner_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Store created successfully" })),
    ))
}

/// DELETE /api/admin/stores/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let stores = StoreRepository::new(state.pool.clone());
    stores
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    stores.delete(id).await?;
    Ok(Json(json!({ "message": "Store deleted successfully" })))
}
