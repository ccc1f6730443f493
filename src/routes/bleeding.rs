use axum::{extract::{State, Query}, Json, Router, routing::get};

use crate::error::ApiResult;
use crate::models::{BleedingCycle, BleedingDay, BLEEDING};
use crate::stats::group_bleeding_days;
use super::{AppState, UserQuery};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/bleeding-history", get(get_bleeding_history))
        .with_state(state)
}

pub async fn get_bleeding_history(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> ApiResult<Json<Vec<BleedingCycle>>> {
    let days: Vec<BleedingDay> = state
        .store
        .list_symptoms(params.user_id)
        .await?
        .into_iter()
        .filter(|s| s.symptom_type == BLEEDING)
        .map(|s| BleedingDay {
            date: s.logged_at,
            intensity: s.intensity.unwrap_or_default(),
        })
        .collect();

    Ok(Json(group_bleeding_days(days)))
}
