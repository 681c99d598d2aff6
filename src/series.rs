//! Daily time series on the real (Gregorian) calendar
//!
//! A [`TimeSeries`] holds one value per observed day. Dates strictly increase;
//! days without an observation are simply absent and count as gaps.

use crate::errors::{Result, SeaIceError};
use chrono::{Datelike, NaiveDate};

/// Read access the statistics core needs from a daily series
pub trait DailySeries {
    /// Observed `(date, value)` pairs of one calendar year, in date order
    fn values_for_year(&self, year: i32) -> Vec<(NaiveDate, f64)>;

    /// Value observed on `date`, `None` when the day is a gap or outside the series
    fn value_at(&self, date: NaiveDate) -> Option<f64>;

    /// First and last observed date, `None` for an empty series
    fn date_range(&self) -> Option<(NaiveDate, NaiveDate)>;
}

/// Ordered daily observations
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series from parallel date and value vectors.
    ///
    /// # Errors
    ///
    /// Returns [`SeaIceError::InvalidSeries`] if the lengths differ, the dates are
    /// not strictly increasing, or a value is NaN or infinite.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(SeaIceError::InvalidSeries {
                message: format!("{} dates but {} values", dates.len(), values.len()),
            });
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(SeaIceError::InvalidSeries {
                message: format!("dates not strictly increasing at {} -> {}", pair[0], pair[1]),
            });
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(SeaIceError::InvalidSeries {
                message: format!("non-finite value on {}", dates[i]),
            });
        }
        Ok(Self { dates, values })
    }

    /// Build a series from `(date, value)` pairs.
    ///
    /// # Errors
    ///
    /// Same as [`TimeSeries::new`].
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Result<Self> {
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Distinct calendar years with at least one observation, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.dates.iter().map(Datelike::year).collect();
        years.dedup();
        years
    }

    /// Number of missing days between the first and last observation
    pub fn gap_count(&self) -> usize {
        self.dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as usize - 1)
            .sum()
    }

    fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}

impl DailySeries for TimeSeries {
    fn values_for_year(&self, year: i32) -> Vec<(NaiveDate, f64)> {
        let start = self.dates.partition_point(|d| d.year() < year);
        let end = self.dates.partition_point(|d| d.year() <= year);
        self.dates[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
            .collect()
    }

    fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.position(date).map(|i| self.values[i])
    }

    fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }
}
