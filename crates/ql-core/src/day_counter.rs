//! Day-count conventions used to turn calendar dates into year fractions.

use crate::{Real, Time};
use chrono::NaiveDate;

/// A convention for counting the fraction of a year between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCounter {
    /// `actual_days / 365`
    #[default]
    Actual365Fixed,
    /// `actual_days / 360`
    Actual360,
}

impl DayCounter {
    /// Human-readable name of this convention.
    pub fn name(self) -> &'static str {
        match self {
            DayCounter::Actual365Fixed => "Actual/365 (Fixed)",
            DayCounter::Actual360 => "Actual/360",
        }
    }

    /// Number of calendar days between `d1` and `d2` (negative if `d2 < d1`).
    pub fn day_count(self, d1: NaiveDate, d2: NaiveDate) -> i64 {
        (d2 - d1).num_days()
    }

    /// Fraction of a year between `d1` and `d2`.
    pub fn year_fraction(self, d1: NaiveDate, d2: NaiveDate) -> Time {
        let denominator = match self {
            DayCounter::Actual365Fixed => 365.0,
            DayCounter::Actual360 => 360.0,
        };
        self.day_count(d1, d2) as Real / denominator
    }
}
