//! Entry point for the sea-ice-clim application.
//! Handles CLI parsing and dispatches either a single-file run or a configured batch.

use clap::Parser;
use sea_ice_clim::prelude::*;
use sea_ice_clim::{
    batch::run_batch,
    csv_io::{write_all_csv, write_colours},
    metadata::SeriesSummary,
    netcdf_io::{read_daily_series, write_statistics_netcdf},
    palette::year_palette,
    pipeline::run_pipeline,
};
use std::path::Path;
use std::process::ExitCode;
use tracing::error;

mod cli;

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    sea_ice_clim::logging::init(args.verbose);

    println!(
        r#"
------------------------------------------------------------------
                     sea-ice-clim
      leap-normalized statistics for daily sea-ice indices
------------------------------------------------------------------
"#
    );

    let outcome = match &args.config {
        Some(config) => batch_mode(config, args.threads),
        None => single_file_mode(&args),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn batch_mode(path: &Path, threads: Option<usize>) -> Result<ExitCode> {
    let mut config = BatchConfig::from_path(path)?;
    if threads.is_some() {
        config.threads = threads;
    }

    let report = run_batch(&config)?;
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(output) => println!(
                "✅ {}/{}: {} files written",
                outcome.job.area,
                outcome.job.index,
                output.files.len()
            ),
            Err(e) => println!("❌ {}/{}: {e}", outcome.job.area, outcome.job.index),
        }
    }

    if report.succeeded() == report.outcomes.len() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn single_file_mode(args: &Args) -> Result<ExitCode> {
    let Some(file) = &args.file else {
        return Err(SeaIceError::InvalidSeries {
            message: "either --file or --config is required".to_string(),
        });
    };

    let aliases: Vec<&str> = args.variable.iter().map(String::as_str).collect();
    let data = read_daily_series(file, &aliases)?;
    println!(
        "Successfully read '{}' from {}",
        data.variable,
        file.display()
    );

    if args.summary {
        SeriesSummary::from_series(&data.series).print();
    }

    let config = pipeline_config(args);
    let stats = run_pipeline(&data.series, &config)?;

    let written = write_all_csv(&args.output_dir, &args.area, &data.variable, &stats)?;
    println!(
        "✅ Saved {} tables to {}",
        written.len(),
        args.output_dir.join(&args.area).display()
    );

    let colours = args.output_dir.join("colours.csv");
    write_colours(&colours, &year_palette(&data.series.years()))?;
    println!("✅ Saved year colours to {}", colours.display());

    if let Some(path) = &args.netcdf {
        write_statistics_netcdf(&stats, &data.variable, data.units.as_deref(), path)?;
        println!("✅ Saved statistics to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn pipeline_config(args: &Args) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    if !args.ref_periods.is_empty() {
        config.reference_periods.clone_from(&args.ref_periods);
    }
    if !args.decades.is_empty() {
        config.decades.clone_from(&args.decades);
    }
    config.exclusions = ExclusionPolicy {
        years: args.exclude_years.clone(),
        drop_partial_first_year: !args.keep_partial_first_year,
        drop_latest_year: !args.keep_latest_year,
    };
    if args.leave_gaps {
        config.neighbor_policy = NeighborPolicy::LeaveGap;
    }
    config
}
