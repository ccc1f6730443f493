//! Monthly insights: what was logged in a calendar month, bucketed by the
//! cycle phase each log fell in.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::cycle::{self, CycleProfile, Phase};
use crate::models::{MoodLog, SymptomLog};

const TOP_PER_PHASE: usize = 3;
const TOP_SYMPTOMS: usize = 5;
const TOP_MOODS: usize = 3;

const POSITIVE_MOODS: [&str; 5] = ["happy", "good", "great", "energetic", "calm"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseInsight {
    pub phase: Phase,
    pub symptom_count: usize,
    pub mood_count: usize,
    pub common_symptoms: Vec<String>,
    pub common_moods: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoodStability {
    Stable,
    Variable,
    HighlyVariable,
}

impl MoodStability {
    fn from_distinct(distinct: usize) -> Self {
        match distinct {
            0..=3 => Self::Stable,
            4..=5 => Self::Variable,
            _ => Self::HighlyVariable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyInsights {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub total_days: usize,
    /// Days with at least one symptom or mood log.
    pub active_days: usize,
    /// One entry per phase, menstrual first.
    pub phases: Vec<PhaseInsight>,
    pub most_common_symptoms: Vec<Tally>,
    pub total_unique_symptoms: usize,
    pub dominant_moods: Vec<Tally>,
    pub mood_stability: MoodStability,
    pub total_mood_entries: usize,
    /// 0 to 10.
    pub wellness_score: i32,
}

/// Summarises the logs dated inside `year`-`month`. Logs outside the month
/// are ignored. `None` for an invalid month.
///
/// Each log is attributed to [`cycle::phase_for_date`] of its date, so an
/// unconfigured profile puts everything in the follicular bucket.
pub fn monthly_insights(
    profile: &CycleProfile,
    year: i32,
    month: u32,
    symptoms: &[SymptomLog],
    moods: &[MoodLog],
) -> Option<MonthlyInsights> {
    let month_start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days: Vec<NaiveDate> = month_start
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect();
    let month_end = *days.last()?;
    let in_month = |date: NaiveDate| month_start <= date && date <= month_end;

    let symptoms: Vec<&SymptomLog> = symptoms.iter().filter(|s| in_month(s.logged_at)).collect();
    let moods: Vec<&MoodLog> = moods.iter().filter(|m| in_month(m.logged_at)).collect();

    let phases = Phase::ALL
        .iter()
        .map(|&phase| {
            let phase_symptoms: Vec<&str> = symptoms
                .iter()
                .filter(|s| cycle::phase_for_date(s.logged_at, profile) == phase)
                .map(|s| s.symptom_type.as_str())
                .collect();
            let phase_moods: Vec<&str> = moods
                .iter()
                .filter(|m| cycle::phase_for_date(m.logged_at, profile) == phase)
                .map(|m| m.mood.as_str())
                .collect();

            PhaseInsight {
                phase,
                symptom_count: phase_symptoms.len(),
                mood_count: phase_moods.len(),
                common_symptoms: names(top(&phase_symptoms, TOP_PER_PHASE)),
                common_moods: names(top(&phase_moods, TOP_PER_PHASE)),
            }
        })
        .collect();

    let symptom_names: Vec<&str> = symptoms.iter().map(|s| s.symptom_type.as_str()).collect();
    let mood_names: Vec<&str> = moods.iter().map(|m| m.mood.as_str()).collect();

    let active_days: BTreeSet<NaiveDate> = symptoms
        .iter()
        .map(|s| s.logged_at)
        .chain(moods.iter().map(|m| m.logged_at))
        .collect();

    Some(MonthlyInsights {
        month_start,
        month_end,
        total_days: days.len(),
        active_days: active_days.len(),
        phases,
        most_common_symptoms: top(&symptom_names, TOP_SYMPTOMS),
        total_unique_symptoms: symptom_names.iter().collect::<BTreeSet<_>>().len(),
        dominant_moods: top(&mood_names, TOP_MOODS),
        mood_stability: MoodStability::from_distinct(
            mood_names.iter().collect::<BTreeSet<_>>().len(),
        ),
        total_mood_entries: mood_names.len(),
        wellness_score: wellness_score(symptom_names.len(), &mood_names),
    })
}

/// Most frequent names first; ties go alphabetically.
fn top(names: &[&str], limit: usize) -> Vec<Tally> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(*name).or_default() += 1;
    }

    let mut tallies: Vec<Tally> = counts
        .into_iter()
        .map(|(name, count)| Tally {
            name: name.to_string(),
            count,
        })
        .collect();
    tallies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tallies.truncate(limit);
    tallies
}

fn names(tallies: Vec<Tally>) -> Vec<String> {
    tallies.into_iter().map(|t| t.name).collect()
}

// Every symptom costs a tenth of a point; every upbeat mood earns half a point.
fn wellness_score(symptom_count: usize, moods: &[&str]) -> i32 {
    let symptom_score = (10.0 - symptom_count as f64 * 0.1).max(0.0);
    let positive = moods
        .iter()
        .filter(|mood| {
            let mood = mood.to_lowercase();
            POSITIVE_MOODS.iter().any(|word| mood.contains(word))
        })
        .count();
    let mood_score = (positive as f64 * 0.5).min(10.0);
    ((symptom_score + mood_score) / 2.0).round() as i32
}
