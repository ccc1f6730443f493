use axum::{
    Router,
    routing::{get, post},
    extract::{State, Query},
    Json,
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use std::collections::BTreeMap;

use crate::error::{ApiError, ApiResult};
use crate::models::{NewSymptomLog, SymptomLog, SymptomsByDate};
use super::{AppState, UserQuery};

#[derive(Deserialize)]
pub struct NewSymptom {
    pub user_id: Uuid,
    pub logged_at: NaiveDate,
    pub symptom_type: String,
    pub intensity: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSymptomRequest {
    pub user_id: String,
    pub logged_at: String,
    pub symptom_type: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/symptom", post(log_symptom).delete(delete_symptom))
        .route("/symptoms", get(get_symptoms_grouped))
        .route("/symptom/all", get(get_symptoms_flat))
        .with_state(state)
}

async fn delete_symptom(
    State(state): State<AppState>,
    Json(payload): Json<DeleteSymptomRequest>,
) -> ApiResult<StatusCode> {
    let user_id = Uuid::parse_str(&payload.user_id)
        .map_err(|_| ApiError::bad_request("Invalid user_id UUID"))?;

    let logged_at = NaiveDate::parse_from_str(&payload.logged_at, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid date format (expected YYYY-MM-DD)"))?;

    let deleted = state
        .store
        .delete_symptoms(user_id, logged_at, &payload.symptom_type.trim().to_lowercase())
        .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("No symptom found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_symptoms_flat(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<SymptomLog>>> {
    Ok(Json(state.store.list_symptoms(query.user_id).await?))
}

async fn log_symptom(
    State(state): State<AppState>,
    Json(body): Json<NewSymptom>,
) -> ApiResult<(StatusCode, Json<SymptomLog>)> {
    let symptom_type = body.symptom_type.trim().to_lowercase();
    if symptom_type.is_empty() {
        return Err(ApiError::bad_request("symptom_type must not be empty"));
    }

    let cycle_day = state.cycle_day_on(body.user_id, body.logged_at).await?;
    let log = state
        .store
        .insert_symptom(NewSymptomLog {
            user_id: body.user_id,
            logged_at: body.logged_at,
            symptom_type,
            intensity: body.intensity,
            notes: body.notes,
            cycle_day,
        })
        .await?;

    tracing::info!("📝 Symptom {} logged for {} on {}", log.symptom_type, log.user_id, log.logged_at);
    Ok((StatusCode::CREATED, Json(log)))
}

/// Symptom types per date, newest date first.
async fn get_symptoms_grouped(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<SymptomsByDate>>> {
    let rows = state.store.list_symptoms(query.user_id).await?;

    let mut map = BTreeMap::<NaiveDate, Vec<String>>::new();
    for row in rows {
        map.entry(row.logged_at)
            .or_default()
            .push(row.symptom_type);
    }

    let result: Vec<SymptomsByDate> = map
        .into_iter()
        .rev()
        .map(|(logged_at, symptoms)| SymptomsByDate { logged_at, symptoms })
        .collect();

    Ok(Json(result))
}
