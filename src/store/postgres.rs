use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Executor, PgConnection, PgPool};
use uuid::Uuid;

use super::{CycleStore, StoreError};
use crate::cycle::CycleProfile;
use crate::models::{
    Cycle, CycleChanges, MoodLog, NewMoodLog, NewSymptomLog, ProfileChanges, SymptomLog,
};
use crate::stats::{self, AverageLengths};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const CYCLE_COLUMNS: &str = "id, user_id, start_date, end_date, period_length, notes, created_at";

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates missing tables and indexes. Safe to run on every start.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.pool.execute(SCHEMA).await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    last_period_start: Option<NaiveDate>,
    cycle_length: i32,
    period_length: i32,
}

impl From<ProfileRow> for CycleProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            last_period_start: row.last_period_start,
            cycle_length: row.cycle_length,
            period_length: row.period_length,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AveragesRow {
    average_cycle_length: Option<i32>,
    average_period_length: Option<i32>,
}

impl AveragesRow {
    fn into_averages(self) -> Option<AverageLengths> {
        Some(AverageLengths {
            cycle_length: self.average_cycle_length?,
            period_length: self.average_period_length?,
        })
    }
}

/// Serializes cycle writes per user on the profile row.
async fn lock_profile(conn: &mut PgConnection, user_id: Uuid) -> Result<(), StoreError> {
    sqlx::query("SELECT 1 FROM profiles WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn refresh_averages(conn: &mut PgConnection, user_id: Uuid) -> Result<(), StoreError> {
    let cycles = sqlx::query_as::<_, Cycle>(&format!(
        "SELECT {CYCLE_COLUMNS} FROM cycles WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let Some(averages) = stats::average_lengths(&cycles) else {
        return Ok(());
    };
    sqlx::query(
        r#"
        UPDATE profiles
        SET average_cycle_length = $2, average_period_length = $3, updated_at = now()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(averages.cycle_length)
    .bind(averages.period_length)
    .execute(&mut *conn)
    .await?;

    tracing::debug!(%user_id, ?averages, "refreshed average lengths");
    Ok(())
}

fn constraint_violation(e: sqlx::Error) -> StoreError {
    let constraint = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_owned);
    match constraint {
        Some(constraint) => StoreError::Conflict(constraint),
        None => StoreError::Database(e),
    }
}

#[async_trait]
impl CycleStore for PgStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<CycleProfile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT last_period_start, cycle_length, period_length FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CycleProfile::from))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<CycleProfile, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (user_id, last_period_start, cycle_length, period_length, updated_at)
            VALUES ($1, $2, COALESCE($3, 28), COALESCE($4, 5), now())
            ON CONFLICT (user_id) DO UPDATE SET
                last_period_start = COALESCE($2, profiles.last_period_start),
                cycle_length = COALESCE($3, profiles.cycle_length),
                period_length = COALESCE($4, profiles.period_length),
                updated_at = now()
            RETURNING last_period_start, cycle_length, period_length
            "#,
        )
        .bind(user_id)
        .bind(changes.last_period_start)
        .bind(changes.cycle_length)
        .bind(changes.period_length)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_average_lengths(&self, user_id: Uuid) -> Result<Option<AverageLengths>, StoreError> {
        let row = sqlx::query_as::<_, AveragesRow>(
            "SELECT average_cycle_length, average_period_length FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(AveragesRow::into_averages))
    }

    async fn record_period_start(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
    ) -> Result<Cycle, StoreError> {
        let mut tx = self.pool.begin().await?;

        // GREATEST ignores NULL, so a first start always lands.
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, last_period_start, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id) DO UPDATE SET
                last_period_start = GREATEST(profiles.last_period_start, EXCLUDED.last_period_start),
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(start_date)
        .execute(&mut *tx)
        .await?;

        let cycle = sqlx::query_as::<_, Cycle>(&format!(
            "INSERT INTO cycles (id, user_id, start_date) VALUES ($1, $2, $3) RETURNING {CYCLE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(start_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(constraint_violation)?;

        refresh_averages(&mut tx, user_id).await?;
        tx.commit().await?;

        Ok(cycle)
    }

    async fn get_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<Option<Cycle>, StoreError> {
        let cycle = sqlx::query_as::<_, Cycle>(&format!(
            "SELECT {CYCLE_COLUMNS} FROM cycles WHERE id = $1 AND user_id = $2"
        ))
        .bind(cycle_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cycle)
    }

    async fn list_cycles(&self, user_id: Uuid) -> Result<Vec<Cycle>, StoreError> {
        let cycles = sqlx::query_as::<_, Cycle>(&format!(
            "SELECT {CYCLE_COLUMNS} FROM cycles WHERE user_id = $1 ORDER BY start_date ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cycles)
    }

    async fn update_cycle(
        &self,
        user_id: Uuid,
        cycle_id: Uuid,
        changes: &CycleChanges,
    ) -> Result<Option<Cycle>, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_profile(&mut tx, user_id).await?;

        let cycle = sqlx::query_as::<_, Cycle>(&format!(
            r#"
            UPDATE cycles SET
                end_date = COALESCE($3, end_date),
                period_length = COALESCE($3::DATE - start_date + 1, period_length),
                notes = COALESCE($4, notes)
            WHERE id = $1 AND user_id = $2
            RETURNING {CYCLE_COLUMNS}
            "#
        ))
        .bind(cycle_id)
        .bind(user_id)
        .bind(changes.end_date)
        .bind(changes.notes.as_deref())
        .fetch_optional(&mut *tx)
        .await
        .map_err(constraint_violation)?;

        if cycle.is_some() {
            refresh_averages(&mut tx, user_id).await?;
        }
        tx.commit().await?;

        Ok(cycle)
    }

    async fn delete_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_profile(&mut tx, user_id).await?;

        let deleted = sqlx::query("DELETE FROM cycles WHERE id = $1 AND user_id = $2")
            .bind(cycle_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if deleted {
            refresh_averages(&mut tx, user_id).await?;
        }
        tx.commit().await?;

        Ok(deleted)
    }

    async fn insert_symptom(&self, symptom: NewSymptomLog) -> Result<SymptomLog, StoreError> {
        let log = sqlx::query_as::<_, SymptomLog>(
            r#"
            INSERT INTO symptom_logs (id, user_id, logged_at, symptom_type, intensity, notes, cycle_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, logged_at, symptom_type, intensity, notes, cycle_day
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(symptom.user_id)
        .bind(symptom.logged_at)
        .bind(symptom.symptom_type)
        .bind(symptom.intensity)
        .bind(symptom.notes)
        .bind(symptom.cycle_day)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    async fn list_symptoms(&self, user_id: Uuid) -> Result<Vec<SymptomLog>, StoreError> {
        let logs = sqlx::query_as::<_, SymptomLog>(
            r#"
            SELECT id, user_id, logged_at, symptom_type, intensity, notes, cycle_day
            FROM symptom_logs
            WHERE user_id = $1
            ORDER BY logged_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn delete_symptoms(
        &self,
        user_id: Uuid,
        logged_at: NaiveDate,
        symptom_type: &str,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM symptom_logs WHERE user_id = $1 AND logged_at = $2 AND symptom_type = $3",
        )
        .bind(user_id)
        .bind(logged_at)
        .bind(symptom_type)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_mood(&self, mood: NewMoodLog) -> Result<MoodLog, StoreError> {
        let log = sqlx::query_as::<_, MoodLog>(
            r#"
            INSERT INTO mood_logs (id, user_id, logged_at, mood, energy, notes, cycle_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, logged_at, mood, energy, notes, cycle_day
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(mood.user_id)
        .bind(mood.logged_at)
        .bind(mood.mood)
        .bind(mood.energy)
        .bind(mood.notes)
        .bind(mood.cycle_day)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_violation)?;

        Ok(log)
    }

    async fn list_moods(&self, user_id: Uuid) -> Result<Vec<MoodLog>, StoreError> {
        let logs = sqlx::query_as::<_, MoodLog>(
            r#"
            SELECT id, user_id, logged_at, mood, energy, notes, cycle_day
            FROM mood_logs
            WHERE user_id = $1
            ORDER BY logged_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn delete_mood(&self, user_id: Uuid, mood_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM mood_logs WHERE id = $1 AND user_id = $2")
            .bind(mood_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
