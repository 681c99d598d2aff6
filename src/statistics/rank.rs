//! Day-of-year ranking
//!
//! Each observation is ranked against the other years' values for the same
//! all-leap day-of-year. Synthetic Feb-29 values take part in their bucket's
//! ranking but are left out of the returned [`RankMap`].

use super::operations::average_ranks;
use crate::calendar::Doy;
use crate::normalize::NormalizedSeries;
use chrono::{Datelike, NaiveDate};
use ndarray::Array2;
use tracing::debug;

/// Rank of every observed day, in date order
#[derive(Debug, Clone, PartialEq)]
pub struct RankMap {
    dates: Vec<NaiveDate>,
    ranks: Vec<f64>,
}

impl RankMap {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    pub fn rank_at(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|i| self.ranks[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.ranks.iter().copied())
    }
}

/// Rank each valued slot within its day-of-year bucket (1 = lowest, ties
/// averaged) and project the result back onto the observed dates.
pub fn rank_by_day_of_year(series: &NormalizedSeries) -> RankMap {
    let years = series.years();
    let mut ranks = Array2::from_elem(series.values().dim(), f64::NAN);

    for doy in Doy::all() {
        let (rows, values): (Vec<usize>, Vec<f64>) = (years.start()..=years.end())
            .enumerate()
            .filter_map(|(row, year)| series.value(year, doy).map(|v| (row, v)))
            .unzip();

        for (row, rank) in rows.into_iter().zip(average_ranks(&values)) {
            ranks[[row, doy.index()]] = rank;
        }
    }

    let (dates, ranks): (Vec<NaiveDate>, Vec<f64>) = series
        .real_entries()
        .map(|(date, doy, _)| {
            let row = (date.year() - years.start()) as usize;
            (date, ranks[[row, doy.index()]])
        })
        .unzip();

    debug!("Ranked {} observations across {} years", dates.len(), series.n_years());
    RankMap { dates, ranks }
}
