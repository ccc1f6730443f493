use axum::{Router, routing::get, Json, extract::{Path, State, Query}};
use uuid::Uuid;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use axum::http::StatusCode;

use crate::cycle::{self, CycleSnapshot, DEFAULT_CYCLE_LENGTH};
use crate::error::{ApiError, ApiResult};
use crate::models::{Cycle, CycleChanges};
use crate::stats::{self, CycleStatus};
use super::{today, AppState, UserQuery};

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub user_id: Uuid,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct NewCycle {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct CycleUpdate {
    pub user_id: Uuid,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CycleSummary {
    pub reference_date: NaiveDate,
    pub configured: bool,
    #[serde(flatten)]
    pub snapshot: CycleSnapshot,
    pub is_period_day: bool,
    pub is_ovulation_day: bool,
    pub in_fertile_window: bool,
}

#[derive(Debug, Serialize)]
pub struct CurrentCycle {
    #[serde(flatten)]
    pub cycle: Cycle,
    #[serde(flatten)]
    pub status: CycleStatus,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/cycle", get(get_cycle_summary).post(create_cycle))
        .route("/cycles", get(get_cycles))
        .route("/cycle/current", get(get_current_cycle))
        .route(
            "/cycle/:id",
            get(get_cycle).put(update_cycle).delete(delete_cycle),
        )
        .with_state(state)
}

/// Records a period start. The profile's `last_period_start` moves forward
/// when the new start is the most recent one.
async fn create_cycle(
    State(state): State<AppState>,
    Json(body): Json<NewCycle>,
) -> ApiResult<(StatusCode, Json<Cycle>)> {
    let created = state
        .store
        .record_period_start(body.user_id, body.start_date)
        .await?;

    tracing::info!("🩸 Period start {} recorded for {}", body.start_date, body.user_id);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_cycle_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryQuery>,
) -> ApiResult<Json<CycleSummary>> {
    let profile = state.profile(params.user_id).await?;
    let reference_date = params.date.unwrap_or_else(today);
    let snapshot = cycle::snapshot_for_profile(&profile, reference_date);
    tracing::debug!(user_id = %params.user_id, ?snapshot, "computed cycle snapshot");

    Ok(Json(CycleSummary {
        reference_date,
        configured: profile.is_configured(),
        snapshot,
        is_period_day: cycle::is_period_day(reference_date, &profile),
        is_ovulation_day: cycle::is_ovulation_day(reference_date, &profile),
        in_fertile_window: snapshot.in_fertile_window(reference_date),
    }))
}

/// Newest first.
async fn get_cycles(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<Cycle>>> {
    let mut cycles = state.store.list_cycles(query.user_id).await?;
    cycles.reverse();
    Ok(Json(cycles))
}

async fn get_cycle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Cycle>> {
    state
        .store
        .get_cycle(query.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Cycle not found"))
}

/// Marks the end of a period or attaches notes.
async fn update_cycle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CycleUpdate>,
) -> ApiResult<Json<Cycle>> {
    let existing = state
        .store
        .get_cycle(body.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cycle not found"))?;
    if body.end_date.is_some_and(|end| end < existing.start_date) {
        return Err(ApiError::bad_request("end_date must not be before start_date"));
    }

    let changes = CycleChanges {
        end_date: body.end_date,
        notes: body.notes,
    };
    let updated = state
        .store
        .update_cycle(body.user_id, id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Cycle not found"))?;

    if let Some(end) = updated.end_date {
        tracing::info!("✅ Period {} for {} ended on {}", updated.id, updated.user_id, end);
    }
    Ok(Json(updated))
}

async fn delete_cycle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> ApiResult<StatusCode> {
    if !state.store.delete_cycle(query.user_id, id).await? {
        return Err(ApiError::not_found("Cycle not found"));
    }
    tracing::info!("🗑️ Cycle {} deleted for {}", id, query.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Latest recorded cycle and whether it is still running on `date`.
async fn get_current_cycle(
    State(state): State<AppState>,
    Query(params): Query<SummaryQuery>,
) -> ApiResult<Json<CurrentCycle>> {
    let latest = state
        .store
        .list_cycles(params.user_id)
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("No cycles found"))?;

    let cycle_length = match state.store.get_average_lengths(params.user_id).await? {
        Some(averages) => averages.cycle_length,
        None => state
            .store
            .get_profile(params.user_id)
            .await?
            .map_or(DEFAULT_CYCLE_LENGTH, |p| p.cycle_length),
    };
    let status = stats::cycle_status(&latest, cycle_length, params.date.unwrap_or_else(today));

    Ok(Json(CurrentCycle {
        cycle: latest,
        status,
    }))
}
