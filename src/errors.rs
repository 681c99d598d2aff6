//! Centralized error handling for sea_ice_clim
//!
//! Every fallible operation in the crate returns [`Result`], so a batch driver can
//! tell a bad series apart from a bad file and keep going with the next job.

use chrono::NaiveDate;
use std::path::PathBuf;

/// Main error type for sea_ice_clim operations
#[derive(Debug, thiserror::Error)]
pub enum SeaIceError {
    /// A synthetic Feb-29 could not be interpolated because a neighbour is missing
    #[error("cannot interpolate Feb-29 of {year}: neighbouring day {missing} has no observation")]
    BoundaryInterpolation { year: i32, missing: NaiveDate },

    /// A requested year range does not overlap the data
    #[error("no data for years {start}..={end} (series covers {first}..={last})")]
    MissingYearData {
        start: i32,
        end: i32,
        first: i32,
        last: i32,
    },

    /// A day-of-year bucket has no contributing year after exclusions
    #[error("day-of-year {doy} has no contributing years in {start}..={end}")]
    EmptyBucket { doy: u16, start: i32, end: i32 },

    /// Series construction rejected the input
    #[error("invalid series: {message}")]
    InvalidSeries { message: String },

    /// A year range with start after end
    #[error("invalid year range {start}..={end}")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("invalid day of year: {doy} (must be 1..=366)")]
    InvalidDoy { doy: u16 },

    /// The time axis of an input file could not be decoded
    #[error("invalid time axis: {reason}")]
    InvalidTime { reason: String },

    /// None of the requested variable names exist in the input file
    #[error("variable '{var}' not found in {}", path.display())]
    VariableNotFound { var: String, path: PathBuf },

    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("array error: {0}")]
    Array(#[from] ndarray::ShapeError),
}

/// Result type alias for sea_ice_clim operations
pub type Result<T> = std::result::Result<T, SeaIceError>;
