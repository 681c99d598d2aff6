//! Core statistical operations and traits
//!
//! Order statistics, average ranks and the per-bucket reduction trait every
//! day-of-year table is built from.

use crate::calendar::{Doy, YearRange, DAYS_PER_LEAP_YEAR};
use crate::errors::{Result, SeaIceError};
use crate::normalize::NormalizedSeries;
use ndarray::Array2;

/// Supported per-bucket statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BucketStatistic {
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Arithmetic mean
    Mean,
    /// Linearly interpolated percentile, `p` in `[0, 1]`
    Percentile(f64),
}

impl BucketStatistic {
    /// Get the string representation of the statistic
    #[must_use]
    pub fn as_str(self) -> String {
        match self {
            Self::Min => "min".to_string(),
            Self::Max => "max".to_string(),
            Self::Mean => "mean".to_string(),
            Self::Percentile(p) if (p - 0.5).abs() < f64::EPSILON => "median".to_string(),
            Self::Percentile(p) => format!("per_{}", (p * 100.0).round()),
        }
    }

    /// Evaluate on ascending `sorted` values; `NaN` when empty
    #[must_use]
    pub fn evaluate(self, sorted: &[f64]) -> f64 {
        if sorted.is_empty() {
            return f64::NAN;
        }
        match self {
            Self::Min => sorted[0],
            Self::Max => sorted[sorted.len() - 1],
            Self::Mean => sorted.iter().sum::<f64>() / sorted.len() as f64,
            Self::Percentile(p) => percentile(sorted, p).unwrap_or(f64::NAN),
        }
    }
}

/// Percentile of pre-sorted data with linear interpolation between order
/// statistics: position `p·(n−1)`.
///
/// Returns `None` for empty input.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    Some(sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo]))
}

/// 1-based ranks, lowest value first; tied values share the mean of the ranks
/// they would jointly occupy.
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let shared = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = shared;
        }
        start = end;
    }
    ranks
}

pub(crate) fn sort_values(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}

/// Trait for series that can be reduced bucket by bucket over a year range
pub trait DoyReduction {
    /// One row per day-of-year (366), one column per statistic.
    ///
    /// Slots that are gaps count towards a bucket but carry no value, so a bucket
    /// of gaps only yields `NaN`.
    ///
    /// # Errors
    ///
    /// - [`SeaIceError::MissingYearData`] if `years` does not overlap the data.
    /// - [`SeaIceError::EmptyBucket`] if no year in `years` covers some day.
    fn reduce_by_doy(&self, years: YearRange, stats: &[BucketStatistic]) -> Result<Array2<f64>>;
}

impl DoyReduction for NormalizedSeries {
    fn reduce_by_doy(&self, years: YearRange, stats: &[BucketStatistic]) -> Result<Array2<f64>> {
        let years = self.clip_years(years)?;
        let mut table = Array2::from_elem((DAYS_PER_LEAP_YEAR, stats.len()), f64::NAN);

        for doy in Doy::all() {
            let mut bucket = self.bucket(doy, years);
            if bucket.contributing == 0 {
                return Err(SeaIceError::EmptyBucket {
                    doy: doy.get(),
                    start: years.start(),
                    end: years.end(),
                });
            }
            sort_values(&mut bucket.values);
            for (col, stat) in stats.iter().enumerate() {
                table[[doy.index(), col]] = stat.evaluate(&bucket.values);
            }
        }

        Ok(table)
    }
}
