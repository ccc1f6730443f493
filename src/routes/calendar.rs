use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::calendar::{calendar_month, CalendarDay};
use crate::error::{ApiError, ApiResult};
use super::AppState;

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub user_id: Uuid,
    pub year: i32,
    pub month: u32,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/calendar", get(get_calendar))
        .with_state(state)
}

async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> ApiResult<Json<Vec<CalendarDay>>> {
    let profile = state.profile(query.user_id).await?;
    let days = calendar_month(&profile, query.year, query.month).ok_or_else(|| {
        ApiError::bad_request(format!("Invalid month {}-{}", query.year, query.month))
    })?;
    Ok(Json(days))
}
