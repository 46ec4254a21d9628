use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::database::ratings::RatingRepository;
use crate::database::stores::StoreRepository;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// GET /api/owner/my-ratings - every rating of the caller's store, with the
/// rater's name and email
pub async fn my_ratings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let store = StoreRepository::new(state.pool.clone())
        .find_by_owner(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found for this owner"))?;

    let rows = RatingRepository::new(state.pool.clone())
        .list_for_store(store.id)
        .await?;

    let ratings: Vec<Value> = rows
        .into_iter()
        .map(|r| {
            json!({
                "id": r.id,
                "rating": r.rating,
                "created_at": r.created_at,
                "user_id": r.user_id,
                "userName": r.user_name,
                "userEmail": r.user_email,
                // the frontend reads the timestamp under this key
                "date": r.created_at,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": { "ratings": ratings }
    })))
}
