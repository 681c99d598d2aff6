//! sea_ice_clim: leap-normalized statistics for daily sea-ice index series
//!
//! Daily sea-ice extent and area records are compared day-of-year by
//! day-of-year across decades. Leap years make that comparison awkward, so every
//! year is placed on a 366-day grid first, with Feb-29 interpolated from its
//! neighbours in common years. All statistics are computed on that grid and the
//! per-date results are projected back onto the dates that were observed.
//!
//! ## Key Features
//!
//! - **Leap normalization**: a 366-slot grid per year with synthetic Feb-29 values
//! - **Day-of-year ranks**: average ranks for ties, reported on observed dates only
//! - **Climatologies**: min/max envelopes, decadal quantiles and percentile bands
//! - **Anomalies**: departures from a reference-period daily mean
//! - **Yearly extremes**: annual minima and maxima with their dates and ranks
//! - **Outputs**: CSV tables and NetCDF files, one series or a configured batch
//! - **Palettes**: a colour per year for plotting the daily curves
//!
//! ## Module Organization
//!
//! - [`calendar`]: day-of-year arithmetic on the all-leap calendar
//! - [`series`]: daily time series and the [`series::DailySeries`] trait
//! - [`normalize`]: the 366-slot leap-normalized representation
//! - [`statistics`]: ranks, aggregates and anomalies
//! - [`pipeline`]: every statistic for one series
//! - [`netcdf_io`] / [`csv_io`]: reading input and writing results
//! - [`palette`]: per-year line colours
//! - [`config`] / [`batch`]: JSON-configured runs over many areas and indices
//! - [`parallel`]: thread pool configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sea_ice_clim::prelude::*;
//! use sea_ice_clim::{csv_io, netcdf_io, pipeline};
//! use std::path::Path;
//!
//! # fn main() -> sea_ice_clim::Result<()> {
//! let data = netcdf_io::read_daily_series(Path::new("osisaf_nh_sie_daily.nc"), &["sie"])?;
//! let stats = pipeline::run_pipeline(&data.series, &PipelineConfig::default())?;
//! csv_io::write_all_csv(Path::new("output"), "nh", "sie", &stats)?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod calendar;
pub mod config;
pub mod csv_io;
pub mod errors;
pub mod logging;
pub mod metadata;
pub mod netcdf_io;
pub mod normalize;
pub mod palette;
pub mod parallel;
pub mod pipeline;
pub mod series;
pub mod statistics;

pub use errors::{Result, SeaIceError};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::calendar::{Doy, YearRange};
    pub use crate::config::BatchConfig;
    pub use crate::errors::{Result, SeaIceError};
    pub use crate::normalize::{normalize, normalize_with, DayKind, NeighborPolicy, NormalizedSeries};
    pub use crate::parallel::ParallelConfig;
    pub use crate::pipeline::{PipelineConfig, SeriesStatistics};
    pub use crate::series::{DailySeries, TimeSeries};
    pub use crate::statistics::{BucketStatistic, DoyReduction, ExclusionPolicy};
}
