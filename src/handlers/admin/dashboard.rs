use axum::{extract::State, response::Json};

use crate::app_state::AppState;
use crate::database::views::{AggregateViews, DashboardStats};
use crate::error::ApiError;

/// GET /api/admin/dashboard - total users, stores and ratings. The rating
/// count is zero when the ratings relation is unavailable.
pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    let views = AggregateViews::new(state.pool.clone(), state.ratings_available);
    Ok(Json(views.dashboard().await?))
}
