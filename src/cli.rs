//! Defines command-line interface options using `clap` for the sea-ice-clim application.

use clap::{ArgAction, Parser};
use sea_ice_clim::calendar::YearRange;
use std::path::PathBuf;

/// Leap-normalized statistics for daily sea-ice index series
#[derive(Parser, Debug)]
#[command(
    version,
    name = "sea-ice-clim",
    about = "Daily ranks, climatologies and anomalies for sea-ice index series"
)]
pub struct Args {
    /// Path to a NetCDF file holding one daily index series
    #[arg(short, long, required_unless_present = "config")]
    pub file: Option<PathBuf>,

    /// JSON batch configuration; replaces the single-file options
    #[arg(short, long, conflicts_with = "file")]
    pub config: Option<PathBuf>,

    /// Comma-separated candidate names of the index variable
    #[arg(long, default_value = "sie,sia", value_delimiter = ',')]
    pub variable: Vec<String>,

    /// Area label used for the output directory
    #[arg(long, default_value = "series")]
    pub area: String,

    /// Root directory for the CSV tables
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Reference period formatted as <start>:<end>, may be repeated
    #[arg(long = "ref-period", value_parser = parse_ref_period)]
    pub ref_periods: Vec<YearRange>,

    /// First year of a decade to summarize, may be repeated
    #[arg(long = "decade")]
    pub decades: Vec<i32>,

    /// Year to leave out of the yearly extremes, may be repeated
    #[arg(long = "exclude-year")]
    pub exclude_years: Vec<i32>,

    /// Keep the latest year in the yearly extremes
    #[arg(long)]
    pub keep_latest_year: bool,

    /// Keep a partial first year in the yearly extremes
    #[arg(long)]
    pub keep_partial_first_year: bool,

    /// Leave Feb-29 as a gap when a neighbouring day is missing
    #[arg(long)]
    pub leave_gaps: bool,

    /// Also save the daily statistics as NetCDF
    #[arg(long)]
    pub netcdf: Option<PathBuf>,

    /// Print a summary of the input series
    #[arg(long)]
    pub summary: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Number of threads to use for batch processing. Defaults to all cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,
}

fn parse_ref_period(s: &str) -> Result<YearRange, String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [start, end] => {
            let start = start
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("Invalid start year '{start}'"))?;
            let end = end
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("Invalid end year '{end}'"))?;
            YearRange::new(start, end).map_err(|e| e.to_string())
        }
        _ => Err("Invalid format: Expected '<start>:<end>'.".to_string()),
    }
}
