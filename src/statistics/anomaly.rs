//! Anomalies relative to a reference-period climatology

use super::operations::{BucketStatistic, DoyReduction};
use crate::calendar::{YearRange, DAYS_PER_LEAP_YEAR};
use crate::errors::Result;
use crate::normalize::NormalizedSeries;
use ndarray::{Array1, Axis};
use tracing::{info, warn};

/// Mean per day-of-year over the valued slots of `period`, synthetic Feb-29
/// values included.
///
/// # Errors
///
/// See [`DoyReduction::reduce_by_doy`].
pub fn daily_climatology(series: &NormalizedSeries, period: YearRange) -> Result<Array1<f64>> {
    let table = series.reduce_by_doy(period, &[BucketStatistic::Mean])?;
    let mean = table.index_axis_move(Axis(1), 0);
    debug_assert_eq!(mean.len(), DAYS_PER_LEAP_YEAR);
    Ok(mean)
}

/// Subtract the `period` climatology from every valued slot of `series`.
///
/// The result keeps the input's layout and markers, so projecting it back onto
/// real dates yields the input's dates. The exception is a day-of-year whose
/// reference years are all gaps: its climatology is undefined and every slot
/// of that day becomes a [`DayKind::Gap`](crate::normalize::DayKind::Gap) in
/// the anomaly.
///
/// # Errors
///
/// See [`daily_climatology`].
pub fn compute_anomaly(series: &NormalizedSeries, period: YearRange) -> Result<NormalizedSeries> {
    info!("Computing anomalies against the {period} climatology");
    let mean = daily_climatology(series, period)?;

    let undefined = mean.iter().filter(|m| m.is_nan()).count();
    if undefined > 0 {
        warn!("{undefined} days of year have no {period} reference values, left as gaps");
    }

    Ok(series.map_values(|doy, value| value - mean[doy.index()]))
}
