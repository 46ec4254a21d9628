//! Owner store-profile self-service and the public browse listings.

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::database::models::Store;
use crate::database::stores::{NewStore, StoreRepository};
use crate::database::views::{AggregateViews, PublicStoreRow};
use crate::error::ApiError;
use crate::middleware::response::success_message;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::validate::{self, StoreProfileInput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProfileRequest {
    pub store_name: Option<String>,
    pub owner_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub established_year: Option<Value>,
    pub website: Option<String>,
}

/// The year arrives as a number, a numeric string, or an empty string meaning
/// "not set"
fn parse_established_year(raw: Option<&Value>) -> Result<Option<i32>, ApiError> {
    let invalid = || {
        ApiError::validation_error(
            "Please provide a valid establishment year between 1900 and current year",
            None,
        )
    };

    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i32>().map(Some).map_err(|_| invalid()),
        Some(Value::Number(n)) => n.as_i64().map(|y| Some(y as i32)).ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

/// GET /api/stores/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Store> {
    let store = StoreRepository::new(state.pool.clone())
        .find_by_owner(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store profile not found"))?;

    Ok(ApiResponse::success(store))
}

/// POST/PUT /api/stores/profile - create on first call, update afterwards
pub async fn upsert_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<StoreProfileRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let established_year = parse_established_year(payload.established_year.as_ref())?;
    let input = StoreProfileInput {
        store_name: payload.store_name.as_deref().unwrap_or_default(),
        owner_name: payload.owner_name.as_deref().unwrap_or_default(),
        email: payload.email.as_deref().unwrap_or_default(),
        phone: payload.phone.as_deref().unwrap_or_default(),
        address: payload.address.as_deref().unwrap_or_default(),
        description: payload.description.as_deref(),
        established_year,
        website: payload.website.as_deref(),
    };
    validate::validate_store_profile(&input)
        .map_err(|errors| ApiError::validation_error("Validation failed", Some(errors)))?;

    let stores = StoreRepository::new(state.pool.clone());
    let new_store = NewStore {
        store_name: input.store_name,
        owner_name: input.owner_name,
        email: input.email,
        phone: input.phone,
        address: input.address,
        description: input.description,
        established_year,
        website: input.website.filter(|w| !w.is_empty()),
        owner_id: current.id,
    };

    if stores.find_by_owner(current.id).await?.is_some() {
        stores.update_by_owner(current.id, new_store).await?;
        Ok((
            StatusCode::OK,
            success_message("Store profile updated successfully"),
        ))
    } else {
        stores.create(new_store).await?;
        Ok((
            StatusCode::CREATED,
            success_message("Store profile created successfully"),
        ))
    }
}

/// DELETE /api/stores/profile
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let deleted = StoreRepository::new(state.pool.clone())
        .delete_by_owner(current.id)
        .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("Store profile not found"));
    }
    Ok(success_message("Store profile deleted successfully"))
}

/// GET /api/stores/all - admin view, includes the admin's own user_rating slot
pub async fn all_stores(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<PublicStoreRow>> {
    let views = AggregateViews::new(state.pool.clone(), state.ratings_available);
    Ok(ApiResponse::success(views.public_stores(Some(current.id)).await?))
}

/// GET /api/stores/public - anonymous browse; user_rating is always null
pub async fn public_stores(State(state): State<AppState>) -> ApiResult<Vec<PublicStoreRow>> {
    let views = AggregateViews::new(state.pool.clone(), state.ratings_available);
    Ok(ApiResponse::success(views.public_stores(None).await?))
}

/// GET /api/stores/public/authenticated - browse with the caller's own ratings
pub async fn public_stores_authenticated(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<PublicStoreRow>> {
    let views = AggregateViews::new(state.pool.clone(), state.ratings_available);
    Ok(ApiResponse::success(views.public_stores(Some(current.id)).await?))
}
