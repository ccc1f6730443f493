//! History-derived statistics: bleeding runs and per-cycle lengths.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::cycle::{DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH};
use crate::models::{BleedingCycle, BleedingDay, Cycle};

/// Cycle lengths outside `(0, MAX_PLAUSIBLE_CYCLE)` are left out of the average.
const MAX_PLAUSIBLE_CYCLE: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleStat {
    pub cycle_number: i32,
    pub start_date: NaiveDate,
    pub period_length: i32,
    /// `None` for the ongoing cycle.
    pub cycle_length: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    pub average_period_length: i32,
    pub average_cycle_length: i32,
    pub cycle_stats: Vec<CycleStat>,
}

/// Averages remembered on the profile after every cycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AverageLengths {
    pub cycle_length: i32,
    pub period_length: i32,
}

/// Whether the latest cycle is still running at a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleStatus {
    pub is_active: bool,
    /// 1-based, `None` when the cycle is not active.
    pub day_of_cycle: Option<i64>,
}

/// Groups bleeding logs into runs of consecutive days. Several logs on the
/// same date stay in the same run.
pub fn group_bleeding_days(mut days: Vec<BleedingDay>) -> Vec<BleedingCycle> {
    days.sort_by_key(|d| d.date);

    let mut grouped = Vec::new();
    let mut current: Vec<BleedingDay> = Vec::new();

    for day in days {
        let continues = current
            .last()
            .map_or(true, |prev| day.date.signed_duration_since(prev.date).num_days() <= 1);
        if !continues {
            grouped.extend(close_run(std::mem::take(&mut current)));
        }
        current.push(day);
    }
    grouped.extend(close_run(current));

    grouped
}

fn close_run(days: Vec<BleedingDay>) -> Option<BleedingCycle> {
    let start_date = days.first()?.date;
    let end_date = days.last()?.date;
    Some(BleedingCycle {
        start_date,
        end_date,
        days,
    })
}

/// Per-cycle period and cycle lengths for the recorded cycle starts.
///
/// A cycle's period length is the number of distinct bleeding dates between
/// its start and the next recorded start.
pub fn cycle_stats(starts: &[NaiveDate], bleeding_dates: &[NaiveDate]) -> CycleStats {
    let starts: BTreeSet<NaiveDate> = starts.iter().copied().collect();
    let bleeding: BTreeSet<NaiveDate> = bleeding_dates.iter().copied().collect();
    let starts: Vec<NaiveDate> = starts.into_iter().collect();

    let mut stats = Vec::with_capacity(starts.len());
    for (i, start) in starts.iter().enumerate() {
        let next = starts.get(i + 1);
        let period = match next {
            Some(next) => bleeding.range(*start..*next).count(),
            None => bleeding.range(*start..).count(),
        };
        let cycle_length = next.map(|next| next.signed_duration_since(*start).num_days() as i32);

        stats.push(CycleStat {
            cycle_number: (i + 1) as i32,
            start_date: *start,
            period_length: period as i32,
            cycle_length,
        });
    }

    let periods: Vec<i64> = stats
        .iter()
        .filter(|s| s.period_length > 0)
        .map(|s| i64::from(s.period_length))
        .collect();
    let cycles: Vec<i64> = stats
        .iter()
        .filter_map(|s| s.cycle_length.map(i64::from))
        .filter(|len| *len > 0 && *len < MAX_PLAUSIBLE_CYCLE)
        .collect();

    CycleStats {
        average_period_length: rounded_mean(&periods).unwrap_or(DEFAULT_PERIOD_LENGTH),
        average_cycle_length: rounded_mean(&cycles).unwrap_or(DEFAULT_CYCLE_LENGTH),
        cycle_stats: stats,
    }
}

/// Averages over completed cycles, i.e. those with an end date. Cycle length
/// is measured between consecutive completed starts. `None` until at least
/// one cycle is completed.
pub fn average_lengths(cycles: &[Cycle]) -> Option<AverageLengths> {
    let mut completed: Vec<(NaiveDate, NaiveDate)> = cycles
        .iter()
        .filter_map(|c| c.end_date.map(|end| (c.start_date, end)))
        .collect();
    if completed.is_empty() {
        return None;
    }
    completed.sort();

    let periods: Vec<i64> = completed
        .iter()
        .map(|(start, end)| end.signed_duration_since(*start).num_days() + 1)
        .collect();
    let lengths: Vec<i64> = completed
        .windows(2)
        .map(|pair| pair[1].0.signed_duration_since(pair[0].0).num_days())
        .filter(|len| *len > 0 && *len < MAX_PLAUSIBLE_CYCLE)
        .collect();

    Some(AverageLengths {
        cycle_length: rounded_mean(&lengths).unwrap_or(DEFAULT_CYCLE_LENGTH),
        period_length: rounded_mean(&periods).unwrap_or(DEFAULT_PERIOD_LENGTH),
    })
}

/// A cycle is active from its start through `start + cycle_length - 1`.
pub fn cycle_status(cycle: &Cycle, cycle_length: i32, today: NaiveDate) -> CycleStatus {
    let cycle_length = if cycle_length < 1 { DEFAULT_CYCLE_LENGTH } else { cycle_length };
    let expected_end = cycle
        .start_date
        .checked_add_signed(Duration::days(i64::from(cycle_length) - 1));
    let is_active =
        cycle.start_date <= today && expected_end.map_or(true, |end| today <= end);

    CycleStatus {
        is_active,
        day_of_cycle: is_active
            .then(|| today.signed_duration_since(cycle.start_date).num_days() + 1),
    }
}

fn rounded_mean(values: &[i64]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    let total: i64 = values.iter().sum();
    Some((total as f64 / values.len() as f64).round() as i32)
}
