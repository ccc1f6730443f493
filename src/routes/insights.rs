use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::insights::{monthly_insights, MonthlyInsights};
use super::AppState;

#[derive(Deserialize)]
pub struct InsightsQuery {
    pub user_id: Uuid,
    pub year: i32,
    pub month: u32,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/insights", get(get_insights))
        .with_state(state)
}

async fn get_insights(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> ApiResult<Json<MonthlyInsights>> {
    let profile = state.profile(query.user_id).await?;
    let symptoms = state.store.list_symptoms(query.user_id).await?;
    let moods = state.store.list_moods(query.user_id).await?;

    let insights = monthly_insights(&profile, query.year, query.month, &symptoms, &moods)
        .ok_or_else(|| {
            ApiError::bad_request(format!("Invalid month {}-{}", query.year, query.month))
        })?;
    tracing::debug!(
        user_id = %query.user_id,
        active_days = insights.active_days,
        "built monthly insights"
    );
    Ok(Json(insights))
}
