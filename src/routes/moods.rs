use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{MoodLog, NewMoodLog};
use super::{AppState, UserQuery};

const DEFAULT_ENERGY: i16 = 3;

#[derive(Deserialize)]
pub struct NewMood {
    pub user_id: Uuid,
    pub logged_at: NaiveDate,
    pub mood: String,
    /// 1 (drained) to 5 (energised).
    pub energy: Option<i16>,
    pub notes: Option<String>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/mood", post(log_mood))
        .route("/mood/:id", delete(delete_mood))
        .route("/moods", get(get_moods))
        .with_state(state)
}

async fn log_mood(
    State(state): State<AppState>,
    Json(body): Json<NewMood>,
) -> ApiResult<(StatusCode, Json<MoodLog>)> {
    let mood = body.mood.trim().to_lowercase();
    if mood.is_empty() {
        return Err(ApiError::bad_request("mood must not be empty"));
    }
    let energy = body.energy.unwrap_or(DEFAULT_ENERGY);
    if !(1..=5).contains(&energy) {
        return Err(ApiError::bad_request("energy must be between 1 and 5"));
    }

    let cycle_day = state.cycle_day_on(body.user_id, body.logged_at).await?;
    let log = state
        .store
        .insert_mood(NewMoodLog {
            user_id: body.user_id,
            logged_at: body.logged_at,
            mood,
            energy,
            notes: body.notes,
            cycle_day,
        })
        .await?;

    tracing::info!("💭 Mood {} logged for {} on {}", log.mood, log.user_id, log.logged_at);
    Ok((StatusCode::CREATED, Json(log)))
}

async fn get_moods(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<MoodLog>>> {
    Ok(Json(state.store.list_moods(query.user_id).await?))
}

async fn delete_mood(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> ApiResult<StatusCode> {
    if !state.store.delete_mood(query.user_id, id).await? {
        return Err(ApiError::not_found("No mood found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
