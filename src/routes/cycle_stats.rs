use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;

use crate::error::ApiResult;
use crate::models::BLEEDING;
use crate::stats::{cycle_stats, CycleStats};
use super::{AppState, UserQuery};

pub async fn get_cycle_stats(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<CycleStats>> {
    let starts: Vec<NaiveDate> = state
        .store
        .list_cycles(query.user_id)
        .await?
        .into_iter()
        .map(|c| c.start_date)
        .collect();

    let bleeding: Vec<NaiveDate> = state
        .store
        .list_symptoms(query.user_id)
        .await?
        .into_iter()
        .filter(|s| s.symptom_type == BLEEDING)
        .map(|s| s.logged_at)
        .collect();

    Ok(Json(cycle_stats(&starts, &bleeding)))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/cycle-stats", get(get_cycle_stats))
        .with_state(state)
}
