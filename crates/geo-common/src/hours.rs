//! Hour-of-year bookkeeping for the 8760-step annual horizon.

use std::ops::Range;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Hours in a modelled year. Leap-day hours are dropped upstream.
pub const HOURS_PER_YEAR: usize = 8760;

/// Hours in a day.
pub const HOURS_PER_DAY: usize = 24;

/// Day of year (1-based) for an hour-of-year index.
pub fn day_of_year(hour: usize) -> usize {
    hour / HOURS_PER_DAY + 1
}

/// Mid-point of the hour in the GMT day, in hours (0.5 ..= 23.5).
pub fn hour_of_day(hour: usize) -> f64 {
    (hour % HOURS_PER_DAY) as f64 + 0.5
}

/// Number of hourly records a raw calendar year contains.
pub fn raw_hours_in_year(year: i32) -> usize {
    if is_leap_year(year) {
        HOURS_PER_YEAR + HOURS_PER_DAY
    } else {
        HOURS_PER_YEAR
    }
}

/// Whether `year` has a February 29th.
pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Raw hour indices of February 29th, if the year has one.
pub fn leap_day_hours(year: i32) -> Option<Range<usize>> {
    let feb29 = NaiveDate::from_ymd_opt(year, 2, 29)?;
    let start = feb29.ordinal0() as usize * HOURS_PER_DAY;
    Some(start..start + HOURS_PER_DAY)
}

/// A compact description of the hours a job or worker covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSpan {
    /// First hour-of-year index.
    pub first: usize,
    /// Last hour-of-year index (inclusive).
    pub last: usize,
    /// Number of hours actually contained (may be sparse after day filtering).
    pub count: usize,
}

impl HourSpan {
    pub fn new(first: usize, last: usize, count: usize) -> Self {
        Self { first, last, count }
    }

    /// Describe a list of hours. Returns None for an empty list.
    pub fn from_hours(hours: &[usize]) -> Option<Self> {
        let first = *hours.iter().min()?;
        let last = *hours.iter().max()?;
        Some(Self::new(first, last, hours.len()))
    }
}

impl std::fmt::Display for HourSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={} ({} hours)", self.first, self.last, self.count)
    }
}
