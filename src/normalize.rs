//! Calendar normalizer
//!
//! Lays a [`DailySeries`] out on the all-leap calendar: one row per year, 366
//! day-of-year columns. Non-leap years get a synthetic Feb-29 equal to the mean
//! of their Feb-28 and Mar-1 observations, so that every statistic grouped by
//! day-of-year compares like with like. [`NormalizedSeries::to_time_series`]
//! drops the synthetic days again.

use crate::calendar::{is_leap_year, Doy, YearRange, DAYS_PER_LEAP_YEAR, FEB_29};
use crate::errors::{Result, SeaIceError};
use crate::series::{DailySeries, TimeSeries};
use chrono::{Datelike, NaiveDate};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What a normalized slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    /// An observed value
    Real,
    /// Feb-29 of a non-leap year, interpolated from Feb-28 and Mar-1
    Synthetic,
    /// Inside the observation span but not observed
    Gap,
    /// Before the first or after the last observation
    Outside,
}

impl DayKind {
    /// Slot carries a number
    pub fn is_valued(self) -> bool {
        matches!(self, Self::Real | Self::Synthetic)
    }

    /// Slot lies within the observation span and so counts towards its bucket
    pub fn contributes(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// What to do when a synthetic Feb-29 lacks one of its neighbours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// Reject the series with [`SeaIceError::BoundaryInterpolation`]
    #[default]
    Fail,
    /// Record the slot as a [`DayKind::Gap`] and carry on
    LeaveGap,
}

/// Values of a contributing day-of-year bucket
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bucket {
    /// Years whose slot lies within the observation span
    pub contributing: usize,
    /// Valued entries among them, in year order
    pub values: Vec<f64>,
}

/// A daily series laid out as `years × 366` on the all-leap calendar
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    first_year: i32,
    years: YearRange,
    values: Array2<f64>,
    kinds: Array2<DayKind>,
}

/// Normalize with the default [`NeighborPolicy::Fail`].
///
/// # Errors
///
/// See [`normalize_with`].
pub fn normalize(series: &impl DailySeries) -> Result<NormalizedSeries> {
    normalize_with(series, NeighborPolicy::Fail)
}

/// Align `series` to the all-leap calendar.
///
/// # Errors
///
/// - [`SeaIceError::InvalidSeries`] for an empty series.
/// - [`SeaIceError::BoundaryInterpolation`] when Feb-29 of a non-leap year lies
///   inside the series span but Feb-28 or Mar-1 is not observed, under
///   [`NeighborPolicy::Fail`].
pub fn normalize_with(series: &impl DailySeries, policy: NeighborPolicy) -> Result<NormalizedSeries> {
    let (first, last) = series.date_range().ok_or_else(|| SeaIceError::InvalidSeries {
        message: "cannot normalize an empty series".to_string(),
    })?;

    let n_years = (last.year() - first.year() + 1) as usize;
    let mut values = Array2::from_elem((n_years, DAYS_PER_LEAP_YEAR), f64::NAN);
    let mut kinds = Array2::from_elem((n_years, DAYS_PER_LEAP_YEAR), DayKind::Outside);
    let mut synthetic = 0_usize;

    for (row, year) in (first.year()..=last.year()).enumerate() {
        for doy in Doy::all() {
            if let Some(date) = doy.to_date(year) {
                if date >= first && date <= last {
                    kinds[[row, doy.index()]] = DayKind::Gap;
                }
            }
        }

        for (date, value) in series.values_for_year(year) {
            let col = Doy::from_date(date).index();
            values[[row, col]] = value;
            kinds[[row, col]] = DayKind::Real;
        }

        if is_leap_year(year) {
            continue;
        }

        let (feb_28, mar_1) = leap_day_neighbours(year)?;
        if feb_28 < first || mar_1 > last {
            continue;
        }

        match (series.value_at(feb_28), series.value_at(mar_1)) {
            (Some(before), Some(after)) => {
                values[[row, FEB_29.index()]] = (before + after) / 2.0;
                kinds[[row, FEB_29.index()]] = DayKind::Synthetic;
                synthetic += 1;
            }
            (before, _) => {
                let missing = if before.is_none() { feb_28 } else { mar_1 };
                match policy {
                    NeighborPolicy::Fail => {
                        return Err(SeaIceError::BoundaryInterpolation { year, missing });
                    }
                    NeighborPolicy::LeaveGap => {
                        warn!("Feb-29 of {year} left as a gap: no observation on {missing}");
                        kinds[[row, FEB_29.index()]] = DayKind::Gap;
                    }
                }
            }
        }
    }

    debug!("Normalized {n_years} years ({first} to {last}), {synthetic} synthetic leap days");

    Ok(NormalizedSeries {
        first_year: first.year(),
        years: YearRange::new(first.year(), last.year())?,
        values,
        kinds,
    })
}

fn leap_day_neighbours(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let feb_28 = NaiveDate::from_ymd_opt(year, 2, 28);
    let mar_1 = NaiveDate::from_ymd_opt(year, 3, 1);
    feb_28.zip(mar_1).ok_or_else(|| SeaIceError::InvalidSeries {
        message: format!("year {year} is outside the supported date range"),
    })
}

impl NormalizedSeries {
    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.years.end()
    }

    pub fn n_years(&self) -> usize {
        self.values.nrows()
    }

    /// Years covered, first to last
    pub fn years(&self) -> YearRange {
        self.years
    }

    fn row(&self, year: i32) -> Option<usize> {
        let row = usize::try_from(year - self.first_year).ok()?;
        (row < self.n_years()).then_some(row)
    }

    /// Slot kind, `Outside` for years beyond the series
    pub fn kind(&self, year: i32, doy: Doy) -> DayKind {
        self.row(year)
            .map_or(DayKind::Outside, |row| self.kinds[[row, doy.index()]])
    }

    /// Value of a valued slot
    pub fn value(&self, year: i32, doy: Doy) -> Option<f64> {
        let row = self.row(year)?;
        self.kinds[[row, doy.index()]]
            .is_valued()
            .then(|| self.values[[row, doy.index()]])
    }

    /// The 366 slots of one year, `NaN` where not valued
    pub fn year_values(&self, year: i32) -> Option<ArrayView1<'_, f64>> {
        self.row(year).map(|row| self.values.row(row))
    }

    /// The full `years × 366` value matrix
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of synthetic Feb-29 entries
    pub fn synthetic_count(&self) -> usize {
        self.kinds.iter().filter(|&&k| k == DayKind::Synthetic).count()
    }

    /// Observed entries as `(date, doy, value)` in date order
    pub fn real_entries(&self) -> impl Iterator<Item = (NaiveDate, Doy, f64)> + '_ {
        self.kinds
            .indexed_iter()
            .filter(|(_, &kind)| kind == DayKind::Real)
            .filter_map(move |((row, col), _)| {
                let doy = Doy::from_index(col);
                let date = doy.to_date(self.first_year + row as i32)?;
                Some((date, doy, self.values[[row, col]]))
            })
    }

    /// Drop synthetic and empty slots, giving back the observed series.
    ///
    /// # Errors
    ///
    /// Propagates [`TimeSeries::new`] validation, which cannot fail for a series
    /// built by [`normalize`] from valid input.
    pub fn to_time_series(&self) -> Result<TimeSeries> {
        TimeSeries::from_pairs(self.real_entries().map(|(date, _, value)| (date, value)))
    }

    /// Apply `f` to every valued slot, keeping the layout. Slots where `f`
    /// yields a non-finite value become [`DayKind::Gap`].
    pub fn map_values(&self, f: impl Fn(Doy, f64) -> f64) -> Self {
        let mut values = self.values.clone();
        let mut kinds = self.kinds.clone();
        for ((row, col), value) in values.indexed_iter_mut() {
            if !kinds[[row, col]].is_valued() {
                continue;
            }
            *value = f(Doy::from_index(col), *value);
            if !value.is_finite() {
                *value = f64::NAN;
                kinds[[row, col]] = DayKind::Gap;
            }
        }
        Self {
            first_year: self.first_year,
            years: self.years,
            values,
            kinds,
        }
    }

    /// Collect one day-of-year bucket over `years`, which must lie within the series
    pub(crate) fn bucket(&self, doy: Doy, years: YearRange) -> Bucket {
        let mut contributing = 0;
        let mut values = Vec::new();
        for year in years.start()..=years.end() {
            let kind = self.kind(year, doy);
            if kind.contributes() {
                contributing += 1;
            }
            if let Some(value) = self.value(year, doy) {
                values.push(value);
            }
        }
        Bucket {
            contributing,
            values,
        }
    }

    /// Clip `requested` to the years present.
    ///
    /// # Errors
    ///
    /// Returns [`SeaIceError::MissingYearData`] when nothing overlaps.
    pub fn clip_years(&self, requested: YearRange) -> Result<YearRange> {
        self.years()
            .intersect(requested)
            .ok_or(SeaIceError::MissingYearData {
                start: requested.start(),
                end: requested.end(),
                first: self.years.start(),
                last: self.years.end(),
            })
    }
}
