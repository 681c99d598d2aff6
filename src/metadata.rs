//! Series inspection
//!
//! A quick look at an input series before running the statistics: coverage,
//! missing days and value range.

use crate::calendar::Doy;
use crate::series::TimeSeries;
use chrono::{Datelike, NaiveDate};

/// Structured summary of a daily series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub observations: usize,
    pub years: Vec<i32>,
    /// Calendar days missing between the first and last date
    pub gap_days: usize,
    /// The series starts after 1 January of its first year
    pub partial_first_year: bool,
    pub min: Option<(NaiveDate, f64)>,
    pub max: Option<(NaiveDate, f64)>,
}

impl SeriesSummary {
    pub fn from_series(series: &TimeSeries) -> Self {
        let first_date = series.dates().first().copied();
        let last_date = series.dates().last().copied();

        let mut min: Option<(NaiveDate, f64)> = None;
        let mut max: Option<(NaiveDate, f64)> = None;
        for (date, value) in series.iter() {
            if min.map_or(true, |(_, m)| value < m) {
                min = Some((date, value));
            }
            if max.map_or(true, |(_, m)| value > m) {
                max = Some((date, value));
            }
        }

        Self {
            first_date,
            last_date,
            observations: series.len(),
            years: series.years(),
            gap_days: series.gap_count(),
            partial_first_year: first_date.is_some_and(|d| d.ordinal() != 1),
            min,
            max,
        }
    }

    /// Prints the summary to stdout.
    pub fn print(&self) {
        println!("\n Series Summary");
        println!("================================");
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => println!("   Coverage: {first} to {last}"),
            _ => {
                println!("   Coverage: empty series");
                return;
            }
        }
        println!("   Observations: {}", self.observations);
        if let (Some(first), Some(last)) = (self.years.first(), self.years.last()) {
            println!("   Years: {first}-{last} ({} years)", self.years.len());
        }
        println!("   Missing days: {}", self.gap_days);
        if self.partial_first_year {
            println!("   ⚠️  First year is partial");
        }
        if let Some((date, value)) = self.min {
            println!("   Min: {value} on {date} (doy {})", Doy::from_date(date));
        }
        if let Some((date, value)) = self.max {
            println!("   Max: {value} on {date} (doy {})", Doy::from_date(date));
        }
    }
}
