//! Extremes and quantile tables
//!
//! Per-day-of-year envelopes, decadal and climatological percentiles, and the
//! yearly minimum/maximum records, all computed on a [`NormalizedSeries`].

use super::operations::{average_ranks, BucketStatistic, DoyReduction};
use crate::calendar::{Doy, YearRange};
use crate::errors::{Result, SeaIceError};
use crate::normalize::{DayKind, NormalizedSeries};
use chrono::NaiveDate;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Percentiles reported by [`climatology_bands`]
pub const CLIMATOLOGY_PERCENTILES: [f64; 5] = [0.10, 0.25, 0.50, 0.75, 0.90];

/// Quantiles reported per decade by [`decadal_quantiles`]
pub const DECADE_QUANTILES: [f64; 3] = [0.0, 0.5, 1.0];

/// A 366-row table keyed by day-of-year
#[derive(Debug, Clone, PartialEq)]
pub struct DoyTable {
    /// Years the table was computed over
    pub years: YearRange,
    /// Column names, e.g. `min`, `median`, `per_90`
    pub columns: Vec<String>,
    /// `366 × columns` values; `NaN` where a bucket only held gaps
    pub data: Array2<f64>,
}

impl DoyTable {
    fn compute(series: &NormalizedSeries, years: YearRange, stats: &[BucketStatistic]) -> Result<Self> {
        let years = series.clip_years(years)?;
        Ok(Self {
            years,
            columns: stats.iter().map(|s| s.as_str()).collect(),
            data: series.reduce_by_doy(years, stats)?,
        })
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let col = self.columns.iter().position(|c| c == name)?;
        Some(self.data.index_axis(Axis(1), col))
    }

    pub fn row(&self, doy: Doy) -> ArrayView1<'_, f64> {
        self.data.row(doy.index())
    }
}

/// Quantile table of one decade window
#[derive(Debug, Clone, PartialEq)]
pub struct DecadeQuantiles {
    /// First year of the decade, e.g. 1980
    pub decade: i32,
    pub table: DoyTable,
}

/// Per-day-of-year minimum and maximum over every year except the last one,
/// which is usually still in progress.
///
/// # Errors
///
/// [`SeaIceError::MissingYearData`] when the series covers a single year, and
/// [`SeaIceError::EmptyBucket`] when no completed year covers some day.
pub fn doy_min_max(series: &NormalizedSeries) -> Result<DoyTable> {
    let years = series.years();
    let completed = YearRange::new(years.start(), years.end() - 1).map_err(|_| {
        SeaIceError::MissingYearData {
            start: years.start(),
            end: years.end() - 1,
            first: years.start(),
            last: years.end(),
        }
    })?;
    debug!("Computing day-of-year min/max over {completed}");
    DoyTable::compute(series, completed, &[BucketStatistic::Min, BucketStatistic::Max])
}

/// Minimum, median and maximum per day-of-year for each ten-year window
/// starting at the given years.
///
/// # Errors
///
/// [`SeaIceError::MissingYearData`] for a decade without data and
/// [`SeaIceError::EmptyBucket`] for a decade that only partly covers the year.
pub fn decadal_quantiles(series: &NormalizedSeries, decades: &[i32]) -> Result<Vec<DecadeQuantiles>> {
    let stats = DECADE_QUANTILES.map(BucketStatistic::Percentile);
    decades
        .iter()
        .map(|&decade| {
            Ok(DecadeQuantiles {
                decade,
                table: DoyTable::compute(series, YearRange::decade(decade), &stats)?,
            })
        })
        .collect()
}

/// 10th, 25th, 50th, 75th and 90th percentile per day-of-year over `period`.
///
/// # Errors
///
/// See [`DoyReduction::reduce_by_doy`].
pub fn climatology_bands(series: &NormalizedSeries, period: YearRange) -> Result<DoyTable> {
    DoyTable::compute(
        series,
        period,
        &CLIMATOLOGY_PERCENTILES.map(BucketStatistic::Percentile),
    )
}

/// Which years take part in the yearly extremes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExclusionPolicy {
    /// Years known to be unreliable
    pub years: Vec<i32>,
    /// Drop the first year when observations start after Jan-1
    pub drop_partial_first_year: bool,
    /// Drop the most recent year
    pub drop_latest_year: bool,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            years: Vec::new(),
            drop_partial_first_year: true,
            drop_latest_year: true,
        }
    }
}

impl ExclusionPolicy {
    /// Keep every year
    pub fn none() -> Self {
        Self {
            years: Vec::new(),
            drop_partial_first_year: false,
            drop_latest_year: false,
        }
    }

    /// Years of `series` that survive the exclusions, ascending
    pub fn included_years(&self, series: &NormalizedSeries) -> Vec<i32> {
        let range = series.years();
        let partial_first = series.kind(range.start(), Doy::from_index(0)) == DayKind::Outside;
        (range.start()..=range.end())
            .filter(|year| !self.years.contains(year))
            .filter(|&year| !(self.drop_partial_first_year && partial_first && year == range.start()))
            .filter(|&year| !(self.drop_latest_year && year == range.end()))
            .collect()
    }
}

/// Extreme of one year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyExtremum {
    pub year: i32,
    pub value: f64,
    pub date: NaiveDate,
    /// All-leap day-of-year of `date`
    pub day_of_year: Doy,
    /// Rank among the reported years (1 = lowest value), ties averaged
    pub rank: f64,
}

/// Yearly minima and maxima, one record per included year in year order
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyExtremes {
    pub minima: Vec<YearlyExtremum>,
    pub maxima: Vec<YearlyExtremum>,
}

/// Yearly minimum and maximum of `series`.
///
/// # Errors
///
/// See [`yearly_extremes_located_by`].
pub fn yearly_extremes(series: &NormalizedSeries, policy: &ExclusionPolicy) -> Result<YearlyExtremes> {
    yearly_extremes_located_by(series, series, policy)
}

/// Find each year's extreme dates in `locate` and report the values `report`
/// holds on those dates.
///
/// Only days observed in `locate` and valued in `report` are eligible; the
/// earliest day wins a tie within a year.
/// Years are ranked on the reported values.
///
/// # Errors
///
/// - [`SeaIceError::InvalidSeries`] if the two series cover different years.
/// - [`SeaIceError::MissingYearData`] if the exclusions leave no year.
pub fn yearly_extremes_located_by(
    locate: &NormalizedSeries,
    report: &NormalizedSeries,
    policy: &ExclusionPolicy,
) -> Result<YearlyExtremes> {
    if locate.years() != report.years() {
        return Err(SeaIceError::InvalidSeries {
            message: format!(
                "extremes located over {} but reported over {}",
                locate.years(),
                report.years()
            ),
        });
    }

    let range = locate.years();
    let years = policy.included_years(locate);
    if years.is_empty() {
        return Err(SeaIceError::MissingYearData {
            start: range.start(),
            end: range.end(),
            first: range.start(),
            last: range.end(),
        });
    }

    let mut minima = Vec::with_capacity(years.len());
    let mut maxima = Vec::with_capacity(years.len());

    for year in years {
        let observed: Vec<(Doy, f64)> = Doy::all()
            .filter(|&doy| locate.kind(year, doy) == DayKind::Real)
            .filter(|&doy| report.value(year, doy).is_some())
            .filter_map(|doy| locate.value(year, doy).map(|v| (doy, v)))
            .collect();

        let Some(&first) = observed.first() else {
            warn!("No observations in {year}, skipping yearly extremes");
            continue;
        };
        let (min, max) = observed.iter().fold((first, first), |(min, max), &entry| {
            (
                if entry.1 < min.1 { entry } else { min },
                if entry.1 > max.1 { entry } else { max },
            )
        });

        minima.push(extremum(report, year, min.0)?);
        maxima.push(extremum(report, year, max.0)?);
    }

    assign_ranks(&mut minima);
    assign_ranks(&mut maxima);
    Ok(YearlyExtremes { minima, maxima })
}

fn extremum(report: &NormalizedSeries, year: i32, doy: Doy) -> Result<YearlyExtremum> {
    let missing = || SeaIceError::InvalidSeries {
        message: format!("no value on day {doy} of {year} in reported series"),
    };
    Ok(YearlyExtremum {
        year,
        value: report.value(year, doy).ok_or_else(missing)?,
        date: doy.to_date(year).ok_or_else(missing)?,
        day_of_year: doy,
        rank: f64::NAN,
    })
}

fn assign_ranks(records: &mut [YearlyExtremum]) {
    let values: Vec<f64> = records.iter().map(|r| r.value).collect();
    for (record, rank) in records.iter_mut().zip(average_ranks(&values)) {
        record.rank = rank;
    }
}
