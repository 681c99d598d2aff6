//! Day-of-year statistics on leap-normalized series
//!
//! # Organization
//!
//! This module is organized into submodules:
//! - [`operations`]: percentiles, average ranks and the bucket reduction trait
//! - [`rank`]: day-of-year ranks projected back onto observed dates
//! - [`aggregate`]: envelopes, decadal quantiles, climatology bands, yearly extremes
//! - [`anomaly`]: reference-period climatology and anomaly series

pub mod aggregate;
pub mod anomaly;
pub mod operations;
pub mod rank;

// Re-export the main types and functions for convenience
pub use aggregate::{
    climatology_bands, decadal_quantiles, doy_min_max, yearly_extremes,
    yearly_extremes_located_by, DecadeQuantiles, DoyTable, ExclusionPolicy, YearlyExtremes,
    YearlyExtremum, CLIMATOLOGY_PERCENTILES, DECADE_QUANTILES,
};
pub use anomaly::{compute_anomaly, daily_climatology};
pub use operations::{average_ranks, percentile, BucketStatistic, DoyReduction};
pub use rank::{rank_by_day_of_year, RankMap};
