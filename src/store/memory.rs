use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CycleStore, StoreError};
use crate::cycle::CycleProfile;
use crate::models::{
    Cycle, CycleChanges, MoodLog, NewMoodLog, NewSymptomLog, ProfileChanges, SymptomLog,
};
use crate::stats::{self, AverageLengths};

/// In-process store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    // Profiles and cycles share a lock so period starts and profile updates
    // see each other's writes.
    tables: RwLock<CycleTables>,
    symptoms: RwLock<Vec<SymptomLog>>,
    moods: RwLock<Vec<MoodLog>>,
}

#[derive(Default)]
struct CycleTables {
    profiles: HashMap<Uuid, StoredProfile>,
    cycles: Vec<Cycle>,
}

#[derive(Default, Clone, Copy)]
struct StoredProfile {
    profile: CycleProfile,
    averages: Option<AverageLengths>,
}

impl CycleTables {
    fn refresh_averages(&mut self, user_id: Uuid) {
        let cycles: Vec<Cycle> = self
            .cycles
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        let Some(averages) = stats::average_lengths(&cycles) else {
            return;
        };
        if let Some(stored) = self.profiles.get_mut(&user_id) {
            stored.averages = Some(averages);
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CycleStore for MemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<CycleProfile>, StoreError> {
        Ok(self.tables.read().await.profiles.get(&user_id).map(|p| p.profile))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<CycleProfile, StoreError> {
        let mut tables = self.tables.write().await;
        let stored = tables.profiles.entry(user_id).or_default();
        changes.apply(&mut stored.profile);
        Ok(stored.profile)
    }

    async fn get_average_lengths(&self, user_id: Uuid) -> Result<Option<AverageLengths>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .profiles
            .get(&user_id)
            .and_then(|p| p.averages))
    }

    async fn record_period_start(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
    ) -> Result<Cycle, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .cycles
            .iter()
            .any(|c| c.user_id == user_id && c.start_date == start_date)
        {
            return Err(StoreError::Conflict("cycles_user_id_start_date_key".into()));
        }

        let cycle = Cycle::new(user_id, start_date);
        tables.cycles.push(cycle.clone());

        let stored = tables.profiles.entry(user_id).or_default();
        if stored.profile.last_period_start.map_or(true, |last| last < start_date) {
            stored.profile.last_period_start = Some(start_date);
        }
        tables.refresh_averages(user_id);

        Ok(cycle)
    }

    async fn get_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<Option<Cycle>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .cycles
            .iter()
            .find(|c| c.id == cycle_id && c.user_id == user_id)
            .cloned())
    }

    async fn list_cycles(&self, user_id: Uuid) -> Result<Vec<Cycle>, StoreError> {
        let mut cycles: Vec<Cycle> = self
            .tables
            .read()
            .await
            .cycles
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        cycles.sort_by_key(|c| c.start_date);
        Ok(cycles)
    }

    async fn update_cycle(
        &self,
        user_id: Uuid,
        cycle_id: Uuid,
        changes: &CycleChanges,
    ) -> Result<Option<Cycle>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(cycle) = tables
            .cycles
            .iter_mut()
            .find(|c| c.id == cycle_id && c.user_id == user_id)
        else {
            return Ok(None);
        };
        cycle.apply(changes);
        let updated = cycle.clone();
        tables.refresh_averages(user_id);
        Ok(Some(updated))
    }

    async fn delete_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.cycles.len();
        tables
            .cycles
            .retain(|c| !(c.id == cycle_id && c.user_id == user_id));
        if tables.cycles.len() == before {
            return Ok(false);
        }
        tables.refresh_averages(user_id);
        Ok(true)
    }

    async fn insert_symptom(&self, symptom: NewSymptomLog) -> Result<SymptomLog, StoreError> {
        let log = SymptomLog {
            id: Uuid::new_v4(),
            user_id: symptom.user_id,
            logged_at: symptom.logged_at,
            symptom_type: symptom.symptom_type,
            intensity: symptom.intensity,
            notes: symptom.notes,
            cycle_day: symptom.cycle_day,
        };
        self.symptoms.write().await.push(log.clone());
        Ok(log)
    }

    async fn list_symptoms(&self, user_id: Uuid) -> Result<Vec<SymptomLog>, StoreError> {
        let mut logs: Vec<SymptomLog> = self
            .symptoms
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        Ok(logs)
    }

    async fn delete_symptoms(
        &self,
        user_id: Uuid,
        logged_at: NaiveDate,
        symptom_type: &str,
    ) -> Result<u64, StoreError> {
        let mut symptoms = self.symptoms.write().await;
        let before = symptoms.len();
        symptoms.retain(|s| {
            !(s.user_id == user_id && s.logged_at == logged_at && s.symptom_type == symptom_type)
        });
        Ok((before - symptoms.len()) as u64)
    }

    async fn insert_mood(&self, mood: NewMoodLog) -> Result<MoodLog, StoreError> {
        let log = MoodLog {
            id: Uuid::new_v4(),
            user_id: mood.user_id,
            logged_at: mood.logged_at,
            mood: mood.mood,
            energy: mood.energy,
            notes: mood.notes,
            cycle_day: mood.cycle_day,
        };
        self.moods.write().await.push(log.clone());
        Ok(log)
    }

    async fn list_moods(&self, user_id: Uuid) -> Result<Vec<MoodLog>, StoreError> {
        let mut logs: Vec<MoodLog> = self
            .moods
            .read()
            .await
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        Ok(logs)
    }

    async fn delete_mood(&self, user_id: Uuid, mood_id: Uuid) -> Result<bool, StoreError> {
        let mut moods = self.moods.write().await;
        let before = moods.len();
        moods.retain(|m| !(m.id == mood_id && m.user_id == user_id));
        Ok(moods.len() < before)
    }
}
