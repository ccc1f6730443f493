//! Cycle phase calculator.
//!
//! Maps a reference date and a user's [`CycleProfile`] to a cycle day, a
//! [`Phase`] and a set of predicted dates. Everything here is pure date
//! arithmetic over `Copy` inputs. A profile without a period start (or with
//! non-positive lengths) is treated as unconfigured: lookups fall back to
//! [`Phase::Follicular`], predicates answer `false` and derived dates are
//! `None`.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CYCLE_LENGTH: i32 = 28;
pub const DEFAULT_PERIOD_LENGTH: i32 = 5;

/// Days between ovulation and the following period.
const LUTEAL_DAYS: i64 = 14;
const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;
const FERTILE_DAYS_AFTER_OVULATION: i64 = 1;

/// One of the four segments of a cycle, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Menstrual,
        Phase::Follicular,
        Phase::Ovulatory,
        Phase::Luteal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menstrual => "menstrual",
            Phase::Follicular => "follicular",
            Phase::Ovulatory => "ovulatory",
            Phase::Luteal => "luteal",
        }
    }
}

/// Phase reported when no profile is configured.
impl Default for Phase {
    fn default() -> Self {
        Phase::Follicular
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_cycle_length() -> i32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_period_length() -> i32 {
    DEFAULT_PERIOD_LENGTH
}

/// The user's cycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleProfile {
    pub last_period_start: Option<NaiveDate>,
    #[serde(default = "default_cycle_length")]
    pub cycle_length: i32,
    #[serde(default = "default_period_length")]
    pub period_length: i32,
}

impl Default for CycleProfile {
    fn default() -> Self {
        Self {
            last_period_start: None,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_length: DEFAULT_PERIOD_LENGTH,
        }
    }
}

impl CycleProfile {
    pub fn new(last_period_start: NaiveDate, cycle_length: i32, period_length: i32) -> Self {
        Self {
            last_period_start: Some(last_period_start),
            cycle_length,
            period_length,
        }
    }

    /// True when the calculator can derive dates from this profile.
    pub fn is_configured(&self) -> bool {
        self.configured().is_some()
    }

    fn configured(&self) -> Option<Configured> {
        let start = self.last_period_start?;
        if self.cycle_length < 1 || self.period_length < 1 {
            return None;
        }
        Some(Configured {
            start,
            cycle_length: i64::from(self.cycle_length),
            period_length: i64::from(self.period_length),
        })
    }
}

/// A profile that passed validation, widened for arithmetic.
#[derive(Clone, Copy)]
struct Configured {
    start: NaiveDate,
    cycle_length: i64,
    period_length: i64,
}

impl Configured {
    fn days_since_start(&self, date: NaiveDate) -> i64 {
        date.signed_duration_since(self.start).num_days()
    }

    fn cycle_day(&self, days_since_start: i64) -> i64 {
        days_since_start.rem_euclid(self.cycle_length) + 1
    }
}

/// Cycle state derived for one reference date. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleSnapshot {
    pub current_day: i64,
    pub current_phase: Phase,
    pub next_period_date: Option<NaiveDate>,
    pub ovulation_date: Option<NaiveDate>,
    pub fertile_window_start: Option<NaiveDate>,
    pub fertile_window_end: Option<NaiveDate>,
    pub days_until_next_period: Option<i64>,
}

impl CycleSnapshot {
    /// Snapshot reported for an unconfigured profile.
    pub fn unconfigured() -> Self {
        Self {
            current_day: 1,
            current_phase: Phase::default(),
            next_period_date: None,
            ovulation_date: None,
            fertile_window_start: None,
            fertile_window_end: None,
            days_until_next_period: None,
        }
    }

    pub fn in_fertile_window(&self, date: NaiveDate) -> bool {
        match (self.fertile_window_start, self.fertile_window_end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }
}

/// Classifies a 1-based cycle day.
///
/// The follicular and ovulatory boundaries are `floor(cycle_length * 0.5)` and
/// `floor(cycle_length * 0.6)` regardless of `period_length`, so a long period
/// can swallow the follicular range entirely and days fall through to the
/// ovulatory test.
pub fn phase_for_day(cycle_day: i64, cycle_length: i64, period_length: i64) -> Phase {
    if cycle_day <= period_length {
        Phase::Menstrual
    } else if cycle_day <= cycle_length / 2 {
        Phase::Follicular
    } else if i128::from(cycle_day) <= i128::from(cycle_length) * 3 / 5 {
        Phase::Ovulatory
    } else {
        Phase::Luteal
    }
}

/// Cycle day of `date`, always in `[1, cycle_length]`, also for dates before
/// the recorded period start. `None` when the profile is unconfigured.
pub fn cycle_day_for_date(date: NaiveDate, profile: &CycleProfile) -> Option<i64> {
    let cfg = profile.configured()?;
    Some(cfg.cycle_day(cfg.days_since_start(date)))
}

/// Phase of `date`, or [`Phase::Follicular`] when the profile is unconfigured.
pub fn phase_for_date(date: NaiveDate, profile: &CycleProfile) -> Phase {
    match profile.configured() {
        Some(cfg) => phase_for_day(
            cfg.cycle_day(cfg.days_since_start(date)),
            cfg.cycle_length,
            cfg.period_length,
        ),
        None => Phase::default(),
    }
}

/// Cycle state at `reference_date`. The current day and phase are always
/// derived for a configured profile; a predicted date that falls outside
/// chrono's supported range is reported as `None`.
pub fn snapshot_for_profile(profile: &CycleProfile, reference_date: NaiveDate) -> CycleSnapshot {
    match profile.configured() {
        Some(cfg) => predict(cfg, reference_date),
        None => CycleSnapshot::unconfigured(),
    }
}

fn predict(cfg: Configured, reference_date: NaiveDate) -> CycleSnapshot {
    let days_since_start = cfg.days_since_start(reference_date);
    let current_day = cfg.cycle_day(days_since_start);
    let current_phase = phase_for_day(current_day, cfg.cycle_length, cfg.period_length);

    let cycles_since = days_since_start.div_euclid(cfg.cycle_length);
    let next_period_date = cfg
        .start
        .checked_add_signed(Duration::days((cycles_since + 1) * cfg.cycle_length));
    let ovulation_date =
        next_period_date.and_then(|next| next.checked_sub_signed(Duration::days(LUTEAL_DAYS)));
    let fertile_window_start = ovulation_date.and_then(|ovulation| {
        ovulation.checked_sub_signed(Duration::days(FERTILE_DAYS_BEFORE_OVULATION))
    });
    let fertile_window_end = ovulation_date.and_then(|ovulation| {
        ovulation.checked_add_signed(Duration::days(FERTILE_DAYS_AFTER_OVULATION))
    });

    CycleSnapshot {
        current_day,
        current_phase,
        next_period_date,
        ovulation_date,
        fertile_window_start,
        fertile_window_end,
        days_until_next_period: next_period_date
            .map(|next| next.signed_duration_since(reference_date).num_days()),
    }
}

pub fn is_period_day(date: NaiveDate, profile: &CycleProfile) -> bool {
    profile.is_configured() && phase_for_date(date, profile) == Phase::Menstrual
}

pub fn is_ovulation_day(date: NaiveDate, profile: &CycleProfile) -> bool {
    snapshot_for_profile(profile, date).ovulation_date == Some(date)
}

pub fn is_fertile_day(date: NaiveDate, profile: &CycleProfile) -> bool {
    snapshot_for_profile(profile, date).in_fertile_window(date)
}
