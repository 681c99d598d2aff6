//! Batch driver
//!
//! Runs the pipeline for every (area, index) job of a [`BatchConfig`]. A failing
//! job is logged and recorded; the others carry on. Once all jobs are done, one
//! `colours.csv` covering every processed year is written to the output root.

use crate::config::{BatchConfig, BatchJob};
use crate::csv_io::{write_all_csv, write_colours};
use crate::errors::{Result, SeaIceError};
use crate::netcdf_io::{read_daily_series, write_statistics_netcdf};
use crate::palette::year_palette;
use crate::parallel::ParallelConfig;
use crate::pipeline::{run_pipeline, PipelineConfig};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// What a successful job produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutput {
    pub files: Vec<PathBuf>,
    /// Calendar years present in the input series
    pub years: Vec<i32>,
}

/// Result of one job
#[derive(Debug)]
pub struct JobOutcome {
    pub job: BatchJob,
    /// Output of the job, or the error that stopped it
    pub result: Result<JobOutput>,
}

/// Outcomes of a batch run, in job order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&BatchJob, &SeaIceError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.job, e)))
    }

    /// Every year seen by a successful job, ascending
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flat_map(|output| output.years.iter().copied())
            .collect();
        years.into_iter().collect()
    }
}

/// Read, compute and write one job.
///
/// # Errors
///
/// The first error of reading, computing or writing.
pub fn run_job(
    job: &BatchJob,
    pipeline: &PipelineConfig,
    output_dir: &Path,
    write_netcdf: bool,
) -> Result<JobOutput> {
    info!("{}:{}", job.area, job.index);
    let data = read_daily_series(&job.input, &[job.index.as_str()])?;
    let stats = run_pipeline(&data.series, pipeline)?;
    let mut written = write_all_csv(output_dir, &job.area, &job.index, &stats)?;

    if write_netcdf {
        let path = output_dir
            .join(&job.area)
            .join(format!("{}_statistics.nc", job.index));
        write_statistics_netcdf(&stats, &data.variable, data.units.as_deref(), &path)?;
        written.push(path);
    }
    Ok(JobOutput {
        files: written,
        years: data.series.years(),
    })
}

/// Run every job of `config`.
///
/// # Errors
///
/// Fails if the thread pool cannot be built or `colours.csv` cannot be written;
/// job errors are in the report.
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport> {
    let jobs = config.jobs();
    info!("Processing {} jobs", jobs.len());

    let parallel = config
        .threads
        .map_or_else(ParallelConfig::all_cores, ParallelConfig::with_threads);
    let outcomes = parallel.install(|| {
        jobs.into_par_iter()
            .map(|job| {
                let result = run_job(&job, &config.pipeline, &config.output_dir, config.write_netcdf);
                if let Err(e) = &result {
                    error!("{}:{} failed: {e}", job.area, job.index);
                }
                JobOutcome { job, result }
            })
            .collect::<Vec<_>>()
    })?;

    let report = BatchReport { outcomes };
    let years = report.years();
    if !years.is_empty() {
        let path = config.output_dir.join("colours.csv");
        write_colours(&path, &year_palette(&years))?;
        info!("Wrote colours for {} years to {}", years.len(), path.display());
    }
    info!(
        "Batch finished: {} succeeded, {} failed",
        report.succeeded(),
        report.outcomes.len() - report.succeeded()
    );
    Ok(report)
}
