use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycle::CycleProfile;
use crate::error::{ApiError, ApiResult};
use crate::models::ProfileChanges;
use crate::stats::AverageLengths;
use super::{AppState, UserQuery};

/// Partial settings update; absent fields keep their stored value.
#[derive(Deserialize)]
pub struct ProfileUpdate {
    pub user_id: Uuid,
    pub last_period_start: Option<NaiveDate>,
    pub cycle_length: Option<i32>,
    pub period_length: Option<i32>,
}

#[derive(Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: CycleProfile,
    /// Learned from completed cycles; `None` until one is recorded.
    pub averages: Option<AverageLengths>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .with_state(state)
}

async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<ProfileView>> {
    Ok(Json(ProfileView {
        profile: state.profile(query.user_id).await?,
        averages: state.store.get_average_lengths(query.user_id).await?,
    }))
}

async fn update_profile(
    State(state): State<AppState>,
    Json(body): Json<ProfileUpdate>,
) -> ApiResult<Json<CycleProfile>> {
    for (name, value) in [("cycle_length", body.cycle_length), ("period_length", body.period_length)] {
        if value.is_some_and(|v| v < 1) {
            return Err(ApiError::bad_request(format!("{name} must be at least 1 day")));
        }
    }

    let changes = ProfileChanges {
        last_period_start: body.last_period_start,
        cycle_length: body.cycle_length,
        period_length: body.period_length,
    };
    let profile = state.store.update_profile(body.user_id, &changes).await?;
    tracing::info!("⚙️ Profile updated for {}", body.user_id);

    Ok(Json(profile))
}
