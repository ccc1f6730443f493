use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::cycle::{self, CycleProfile, Phase};

/// One rendered calendar cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub cycle_day: Option<i64>,
    pub phase: Phase,
    pub is_period_day: bool,
    pub is_ovulation_day: bool,
    pub is_fertile_day: bool,
}

impl CalendarDay {
    pub fn for_date(date: NaiveDate, profile: &CycleProfile) -> Self {
        Self {
            date,
            cycle_day: cycle::cycle_day_for_date(date, profile),
            phase: cycle::phase_for_date(date, profile),
            is_period_day: cycle::is_period_day(date, profile),
            is_ovulation_day: cycle::is_ovulation_day(date, profile),
            is_fertile_day: cycle::is_fertile_day(date, profile),
        }
    }
}

/// Annotates every day of `year`-`month`. `None` for an invalid month.
pub fn calendar_month(profile: &CycleProfile, year: i32, month: u32) -> Option<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(
        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|d| CalendarDay::for_date(d, profile))
            .collect(),
    )
}
