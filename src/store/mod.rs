//! Persistence port for profiles, cycles, symptoms and moods.
//!
//! Handlers only see [`CycleStore`]; `PgStore` backs it with Postgres and
//! `MemoryStore` keeps everything in process for tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::cycle::CycleProfile;
use crate::models::{
    Cycle, CycleChanges, MoodLog, NewMoodLog, NewSymptomLog, ProfileChanges, SymptomLog,
};
use crate::stats::AverageLengths;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("constraint violated: {0}")]
    Conflict(String),
}

#[async_trait]
pub trait CycleStore: Send + Sync {
    /// `None` when the user never saved settings.
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<CycleProfile>, StoreError>;

    /// Writes only the fields set in `changes`. A user without a profile gets
    /// one with default lengths. Returns the stored result.
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<CycleProfile, StoreError>;

    /// `None` until the user has a completed cycle.
    async fn get_average_lengths(&self, user_id: Uuid) -> Result<Option<AverageLengths>, StoreError>;

    /// Inserts a cycle and, in the same transaction, moves the profile's
    /// `last_period_start` forward when `start_date` is newer and refreshes
    /// the stored averages.
    async fn record_period_start(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
    ) -> Result<Cycle, StoreError>;

    async fn get_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<Option<Cycle>, StoreError>;

    /// Oldest first.
    async fn list_cycles(&self, user_id: Uuid) -> Result<Vec<Cycle>, StoreError>;

    /// `None` when no cycle with that id belongs to the user. Refreshes the
    /// stored averages.
    async fn update_cycle(
        &self,
        user_id: Uuid,
        cycle_id: Uuid,
        changes: &CycleChanges,
    ) -> Result<Option<Cycle>, StoreError>;

    /// False when no cycle with that id belongs to the user. Refreshes the
    /// stored averages.
    async fn delete_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<bool, StoreError>;

    async fn insert_symptom(&self, symptom: NewSymptomLog) -> Result<SymptomLog, StoreError>;

    /// Newest first.
    async fn list_symptoms(&self, user_id: Uuid) -> Result<Vec<SymptomLog>, StoreError>;

    /// Returns the number of deleted rows.
    async fn delete_symptoms(
        &self,
        user_id: Uuid,
        logged_at: NaiveDate,
        symptom_type: &str,
    ) -> Result<u64, StoreError>;

    async fn insert_mood(&self, mood: NewMoodLog) -> Result<MoodLog, StoreError>;

    /// Newest first.
    async fn list_moods(&self, user_id: Uuid) -> Result<Vec<MoodLog>, StoreError>;

    /// False when no mood with that id belongs to the user.
    async fn delete_mood(&self, user_id: Uuid, mood_id: Uuid) -> Result<bool, StoreError>;
}
