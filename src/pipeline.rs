//! Full statistics run for one series
//!
//! Normalize once, then derive ranks, envelopes, quantiles and yearly extremes
//! for the absolute values and for the anomalies against each reference period.

use crate::calendar::YearRange;
use crate::errors::Result;
use crate::normalize::{normalize_with, NeighborPolicy, NormalizedSeries};
use crate::series::{DailySeries, TimeSeries};
use crate::statistics::{
    climatology_bands, compute_anomaly, decadal_quantiles, doy_min_max, rank_by_day_of_year,
    yearly_extremes, yearly_extremes_located_by, DecadeQuantiles, DoyTable, ExclusionPolicy,
    RankMap, YearlyExtremes,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Knobs of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Climatology periods; one anomaly set is produced per period
    pub reference_periods: Vec<YearRange>,
    /// First years of the decade windows
    pub decades: Vec<i32>,
    /// Years left out of the yearly extremes
    pub exclusions: ExclusionPolicy,
    /// Handling of Feb-29 slots with a missing neighbour
    pub neighbor_policy: NeighborPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_periods: vec![
                YearRange::new_unchecked(1981, 2010),
                YearRange::new_unchecked(1991, 2020),
            ],
            decades: vec![1980, 1990, 2000, 2010],
            exclusions: ExclusionPolicy::default(),
            neighbor_policy: NeighborPolicy::Fail,
        }
    }
}

/// Everything derived from one series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStatistics {
    pub normalized: NormalizedSeries,
    pub ranks: RankMap,
    pub doy_min_max: DoyTable,
    pub decades: Vec<DecadeQuantiles>,
    pub yearly_extremes: YearlyExtremes,
    /// Percentile bands of the absolute values, one per reference period
    pub climatology: Vec<(YearRange, DoyTable)>,
    pub anomalies: Vec<AnomalyStatistics>,
}

/// Statistics of the anomaly against one reference period
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyStatistics {
    pub period: YearRange,
    pub normalized: NormalizedSeries,
    /// Anomaly on the observed dates
    pub series: TimeSeries,
    pub ranks: RankMap,
    pub doy_min_max: DoyTable,
    pub decades: Vec<DecadeQuantiles>,
    /// Percentile bands of the anomaly over all years
    pub climatology: DoyTable,
    /// Located on the absolute series, reported as anomalies
    pub yearly_extremes: YearlyExtremes,
}

/// Run every statistic for `series`.
///
/// # Errors
///
/// Any error of the individual stages; nothing is returned for a series that
/// fails part way.
pub fn run_pipeline(series: &impl DailySeries, config: &PipelineConfig) -> Result<SeriesStatistics> {
    let normalized = normalize_with(series, config.neighbor_policy)?;
    info!(
        "Normalized {} years with {} synthetic leap days",
        normalized.n_years(),
        normalized.synthetic_count()
    );

    let ranks = rank_by_day_of_year(&normalized);
    let doy_min_max = doy_min_max(&normalized)?;
    let decades = decadal_quantiles(&normalized, &config.decades)?;
    let yearly = yearly_extremes(&normalized, &config.exclusions)?;

    let climatology = config
        .reference_periods
        .iter()
        .map(|&period| Ok((period, climatology_bands(&normalized, period)?)))
        .collect::<Result<Vec<_>>>()?;

    let anomalies = config
        .reference_periods
        .iter()
        .map(|&period| anomaly_statistics(&normalized, period, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(SeriesStatistics {
        normalized,
        ranks,
        doy_min_max,
        decades,
        yearly_extremes: yearly,
        climatology,
        anomalies,
    })
}

fn anomaly_statistics(
    normalized: &NormalizedSeries,
    period: YearRange,
    config: &PipelineConfig,
) -> Result<AnomalyStatistics> {
    let anomaly = compute_anomaly(normalized, period)?;
    Ok(AnomalyStatistics {
        period,
        series: anomaly.to_time_series()?,
        ranks: rank_by_day_of_year(&anomaly),
        doy_min_max: doy_min_max(&anomaly)?,
        decades: decadal_quantiles(&anomaly, &config.decades)?,
        climatology: climatology_bands(&anomaly, anomaly.years())?,
        yearly_extremes: yearly_extremes_located_by(normalized, &anomaly, &config.exclusions)?,
        normalized: anomaly,
    })
}
