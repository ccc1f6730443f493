use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::cycle::CycleProfile;
use crate::error::ApiResult;
use crate::store::CycleStore;

pub mod bleeding;
pub mod calendar;
pub mod cycle;
pub mod cycle_stats;
pub mod insights;
pub mod moods;
pub mod profile;
pub mod recommendations;
pub mod symptoms;

/// Shared handler state. Handlers reach persistence only through the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CycleStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CycleStore>) -> Self {
        Self { store }
    }

    /// Stored profile, or the unconfigured default for users without one.
    pub async fn profile(&self, user_id: Uuid) -> ApiResult<CycleProfile> {
        Ok(self.store.get_profile(user_id).await?.unwrap_or_default())
    }

    /// Cycle day recorded alongside a log entry.
    pub async fn cycle_day_on(&self, user_id: Uuid, date: NaiveDate) -> ApiResult<Option<i32>> {
        let profile = self.profile(user_id).await?;
        Ok(crate::cycle::cycle_day_for_date(date, &profile).and_then(|d| i32::try_from(d).ok()))
    }
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().naive_utc().date()
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(profile::routes(state.clone()))
        .merge(cycle::routes(state.clone()))
        .merge(calendar::routes(state.clone()))
        .merge(symptoms::routes(state.clone()))
        .merge(moods::routes(state.clone()))
        .merge(bleeding::routes(state.clone()))
        .merge(cycle_stats::routes(state.clone()))
        .merge(insights::routes(state.clone()))
        .merge(recommendations::routes(state))
        .route("/health", get(|| async { "✅ Backend up" }))
}
