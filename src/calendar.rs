//! All-leap calendar arithmetic
//!
//! Every year is laid out on 366 day-of-year slots. In non-leap years the slot for
//! Feb-29 (DOY 60) has no real date, and every day from Mar-1 onwards sits one slot
//! later than its Gregorian day-of-year.

use crate::errors::{Result, SeaIceError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of day-of-year slots in the all-leap calendar
pub const DAYS_PER_LEAP_YEAR: usize = 366;

/// DOY of Feb-29 in the all-leap calendar
pub const FEB_29: Doy = Doy(60);

/// Day-of-year on which each month starts (index 0 unused)
const MONTH_START_DOY: [u16; 13] = [0, 1, 32, 61, 92, 122, 153, 183, 214, 245, 275, 306, 336];

/// Gregorian leap-year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Day-of-year in the all-leap calendar (1..=366)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Doy(u16);

impl Doy {
    /// # Errors
    ///
    /// Returns [`SeaIceError::InvalidDoy`] if `doy` is not in 1..=366.
    pub fn new(doy: u16) -> Result<Self> {
        if !(1..=366).contains(&doy) {
            return Err(SeaIceError::InvalidDoy { doy });
        }
        Ok(Self(doy))
    }

    /// Slot of `date` in the all-leap calendar
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month() as usize;
        Self(MONTH_START_DOY[month] + date.day() as u16 - 1)
    }

    /// Slot for a 0-based index (0..=365)
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < DAYS_PER_LEAP_YEAR);
        Self(index as u16 + 1)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// 0-based index for array access
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// `(month, day)` of this slot
    pub fn month_day(self) -> (u32, u32) {
        let month = MONTH_START_DOY[1..]
            .iter()
            .rposition(|&start| start <= self.0)
            .map_or(1, |i| i + 1);
        (month as u32, u32::from(self.0 - MONTH_START_DOY[month]) + 1)
    }

    /// The real date of this slot in `year`, `None` for Feb-29 of a non-leap year
    pub fn to_date(self, year: i32) -> Option<NaiveDate> {
        let (month, day) = self.month_day();
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Iterate all 366 slots in calendar order
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=366).map(Self)
    }
}

impl fmt::Display for Doy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive range of calendar years, e.g. the 1981-2010 reference period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// # Errors
    ///
    /// Returns [`SeaIceError::InvalidYearRange`] when `start > end`.
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(SeaIceError::InvalidYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// For literals where `start <= end` is known
    pub(crate) fn new_unchecked(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// The ten-year window starting at `start`
    pub fn decade(start: i32) -> Self {
        Self {
            start,
            end: start + 9,
        }
    }

    pub fn start(self) -> i32 {
        self.start
    }

    pub fn end(self) -> i32 {
        self.end
    }

    pub fn contains(self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Overlap with another range, if any
    pub fn intersect(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }

    /// `START_END`, used in output file names
    pub fn label(self) -> String {
        format!("{}_{}", self.start, self.end)
    }
}

impl TryFrom<(i32, i32)> for YearRange {
    type Error = SeaIceError;

    fn try_from((start, end): (i32, i32)) -> Result<Self> {
        Self::new(start, end)
    }
}

impl From<YearRange> for (i32, i32) {
    fn from(range: YearRange) -> Self {
        (range.start, range.end)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
