//! Rating submission and lookup. One rating per (store, user); a second
//! submission updates in place.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::database::models::{Rating, RatingWithUser};
use crate::database::ratings::RatingRepository;
use crate::database::stores::StoreRepository;
use crate::error::ApiError;
use crate::middleware::response::success_message;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: Option<i32>,
}

/// GET /api/ratings/:store_id - the caller's own rating for a store
pub async fn get_user_rating(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(store_id): Path<i64>,
) -> ApiResult<Rating> {
    let rating = RatingRepository::new(state.pool.clone())
        .find_for_user(store_id, current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Rating not found"))?;

    Ok(ApiResponse::success(rating))
}

/// POST /api/ratings/:store_id - create or update the caller's rating
pub async fn create_or_update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(store_id): Path<i64>,
    Json(payload): Json<RatingRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let value = match payload.rating {
        Some(value) if (1..=5).contains(&value) => value,
        _ => return Err(ApiError::bad_request("Rating must be between 1 and 5")),
    };

    StoreRepository::new(state.pool.clone())
        .find_by_id(store_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    // The pre-check only decides the status code; the upsert itself resolves
    // any concurrent first-submission race
    let ratings = RatingRepository::new(state.pool.clone());
    let existing = ratings.find_for_user(store_id, current.id).await?;
    ratings.upsert(store_id, current.id, value).await?;

    if existing.is_some() {
        Ok((StatusCode::OK, success_message("Rating updated successfully")))
    } else {
        Ok((StatusCode::CREATED, success_message("Rating created successfully")))
    }
}

/// DELETE /api/ratings/:store_id
pub async fn delete_rating(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(store_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let deleted = RatingRepository::new(state.pool.clone())
        .delete_for_user(store_id, current.id)
        .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("Rating not found"));
    }
    Ok(success_message("Rating deleted successfully"))
}

/// GET /api/ratings/store/:store_id - all ratings of a store, newest first
pub async fn store_ratings(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> ApiResult<Vec<RatingWithUser>> {
    StoreRepository::new(state.pool.clone())
        .find_by_id(store_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    let rows = RatingRepository::new(state.pool.clone())
        .list_for_store(store_id)
        .await?;

    Ok(ApiResponse::success(rows))
}
