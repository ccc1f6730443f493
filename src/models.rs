use serde::{ Serialize, Deserialize };
use uuid::Uuid;
use chrono::{NaiveDate, DateTime, Utc};

use crate::cycle::CycleProfile;

pub const BLEEDING: &str = "bleeding";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Cycle {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    /// Last bleeding day, once the period has been marked as over.
    pub end_date: Option<NaiveDate>,
    pub period_length: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Cycle {
    pub fn new(user_id: Uuid, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            start_date,
            end_date: None,
            period_length: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the fields present in `changes`. The period length follows the end date.
    pub fn apply(&mut self, changes: &CycleChanges) {
        if let Some(end) = changes.end_date {
            self.end_date = Some(end);
            self.period_length = i32::try_from(end.signed_duration_since(self.start_date).num_days() + 1).ok();
        }
        if let Some(notes) = &changes.notes {
            self.notes = Some(notes.clone());
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CycleChanges {
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Column-wise settings update; `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileChanges {
    pub last_period_start: Option<NaiveDate>,
    pub cycle_length: Option<i32>,
    pub period_length: Option<i32>,
}

impl ProfileChanges {
    pub fn apply(&self, profile: &mut CycleProfile) {
        if let Some(start) = self.last_period_start {
            profile.last_period_start = Some(start);
        }
        if let Some(len) = self.cycle_length {
            profile.cycle_length = len;
        }
        if let Some(len) = self.period_length {
            profile.period_length = len;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SymptomLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub logged_at: NaiveDate,
    pub symptom_type: String,
    pub intensity: Option<String>,
    pub notes: Option<String>,
    pub cycle_day: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewSymptomLog {
    pub user_id: Uuid,
    pub logged_at: NaiveDate,
    pub symptom_type: String,
    pub intensity: Option<String>,
    pub notes: Option<String>,
    pub cycle_day: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomsByDate {
    pub logged_at: NaiveDate,
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub logged_at: NaiveDate,
    pub mood: String,
    pub energy: i16,
    pub notes: Option<String>,
    pub cycle_day: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewMoodLog {
    pub user_id: Uuid,
    pub logged_at: NaiveDate,
    pub mood: String,
    pub energy: i16,
    pub notes: Option<String>,
    pub cycle_day: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BleedingCycle {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<BleedingDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BleedingDay {
    pub date: NaiveDate,
    pub intensity: String,
}
