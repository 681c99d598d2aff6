//! CSV tables for the plotting front-end
//!
//! One row per all-leap day-of-year (or per year for the extremes). Values are
//! written with the shortest round-trip formatting, keeping a trailing `.0` on
//! whole numbers (`3.0`, not `3`); `NaN` is written as an empty cell.

use crate::calendar::Doy;
use crate::errors::Result;
use crate::normalize::{DayKind, NormalizedSeries};
use crate::palette::YearColours;
use crate::pipeline::SeriesStatistics;
use crate::statistics::{DecadeQuantiles, DoyTable, RankMap, YearlyExtremes};
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DECADE_LABELS: [&str; 3] = ["min", "median", "max"];

fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:?}")
    }
}

/// Wide daily table: `doy,{Y}_vals,{Y}_date,{Y}_rank,...`
///
/// Only observed days are filled; synthetic Feb-29 and gaps stay empty.
///
/// # Errors
///
/// File system and CSV errors.
pub fn write_daily_table(path: &Path, series: &NormalizedSeries, ranks: &RankMap) -> Result<()> {
    let years = series.years();
    let mut writer = Writer::from_path(path)?;

    let mut header = vec!["doy".to_string()];
    for year in years.start()..=years.end() {
        header.extend([
            format!("{year}_vals"),
            format!("{year}_date"),
            format!("{year}_rank"),
        ]);
    }
    writer.write_record(&header)?;

    for doy in Doy::all() {
        let mut row = vec![doy.to_string()];
        for year in years.start()..=years.end() {
            let observed = (series.kind(year, doy) == DayKind::Real)
                .then(|| doy.to_date(year))
                .flatten()
                .zip(series.value(year, doy));
            match observed {
                Some((date, value)) => row.extend([
                    cell(value),
                    date.format(DATE_FORMAT).to_string(),
                    ranks.rank_at(date).map(cell).unwrap_or_default(),
                ]),
                None => row.extend([String::new(), String::new(), String::new()]),
            }
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    debug!("Wrote daily table {}", path.display());
    Ok(())
}

/// Day-of-year table with the table's own column names: `doy,min,max` or
/// `doy,per_10,per_25,median,per_75,per_90`
///
/// # Errors
///
/// File system and CSV errors.
pub fn write_doy_table(path: &Path, table: &DoyTable) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    let mut header = vec!["doy".to_string()];
    header.extend(table.columns.iter().cloned());
    writer.write_record(&header)?;

    for doy in Doy::all() {
        let mut row = vec![doy.to_string()];
        row.extend(table.row(doy).iter().map(|&v| cell(v)));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// `doy,min_{D},median_{D},max_{D},...`
///
/// # Errors
///
/// File system and CSV errors.
pub fn write_decades(path: &Path, decades: &[DecadeQuantiles]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    let mut header = vec!["doy".to_string()];
    for decade in decades {
        header.extend(DECADE_LABELS.iter().map(|label| format!("{label}_{}", decade.decade)));
    }
    writer.write_record(&header)?;

    for doy in Doy::all() {
        let mut row = vec![doy.to_string()];
        for decade in decades {
            row.extend(decade.table.row(doy).iter().map(|&v| cell(v)));
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// `year,doy_min,index_min,date_min,rank_min,doy_max,index_max,date_max,rank_max`
///
/// # Errors
///
/// File system and CSV errors.
pub fn write_yearly_extremes(path: &Path, extremes: &YearlyExtremes) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "year", "doy_min", "index_min", "date_min", "rank_min", "doy_max", "index_max", "date_max",
        "rank_max",
    ])?;

    for (min, max) in extremes.minima.iter().zip(&extremes.maxima) {
        writer.write_record([
            min.year.to_string(),
            min.day_of_year.to_string(),
            cell(min.value),
            min.date.format(DATE_FORMAT).to_string(),
            cell(min.rank),
            max.day_of_year.to_string(),
            cell(max.value),
            max.date.format(DATE_FORMAT).to_string(),
            cell(max.rank),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// `year,viridis,viridis_r,plasma,plasma_r,cyclic_8,cyclic_17,decadal`, creating
/// the parent directory if needed
///
/// # Errors
///
/// File system and CSV errors.
pub fn write_colours(path: &Path, colours: &[YearColours]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "year", "viridis", "viridis_r", "plasma", "plasma_r", "cyclic_8", "cyclic_17", "decadal",
    ])?;

    for row in colours {
        writer.write_record([
            row.year.to_string(),
            row.viridis.clone(),
            row.viridis_r.clone(),
            row.plasma.clone(),
            row.plasma_r.clone(),
            row.cyclic_8.clone(),
            row.cyclic_17.clone(),
            row.decadal.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    debug!("Wrote {} year colours to {}", colours.len(), path.display());
    Ok(())
}

/// Write every table for one series under `{output_dir}/{area}/` and its
/// `clim/` subdirectory, returning the paths written.
///
/// # Errors
///
/// File system and CSV errors.
pub fn write_all_csv(
    output_dir: &Path,
    area: &str,
    index: &str,
    stats: &SeriesStatistics,
) -> Result<Vec<PathBuf>> {
    let daily_dir = output_dir.join(area);
    let clim_dir = daily_dir.join("clim");
    fs::create_dir_all(&clim_dir)?;

    let mut written = Vec::new();
    let mut emit = |path: PathBuf, result: Result<()>| -> Result<()> {
        result?;
        written.push(path);
        Ok(())
    };

    let path = daily_dir.join(format!("{index}_abs.csv"));
    emit(path.clone(), write_daily_table(&path, &stats.normalized, &stats.ranks))?;

    let path = clim_dir.join(format!("{index}_abs_min_max.csv"));
    emit(path.clone(), write_doy_table(&path, &stats.doy_min_max))?;

    let path = clim_dir.join(format!("{index}_abs_decades.csv"));
    emit(path.clone(), write_decades(&path, &stats.decades))?;

    let path = clim_dir.join(format!("{index}_abs_yearly_min_max.csv"));
    emit(path.clone(), write_yearly_extremes(&path, &stats.yearly_extremes))?;

    for (period, table) in &stats.climatology {
        let path = clim_dir.join(format!("{index}_abs_clim_{}.csv", period.label()));
        emit(path.clone(), write_doy_table(&path, table))?;
    }

    for anomaly in &stats.anomalies {
        let label = anomaly.period.label();

        let path = daily_dir.join(format!("{index}_anom_{label}.csv"));
        emit(path.clone(), write_daily_table(&path, &anomaly.normalized, &anomaly.ranks))?;

        let path = clim_dir.join(format!("{index}_anom_clim_{label}.csv"));
        emit(path.clone(), write_doy_table(&path, &anomaly.climatology))?;

        let path = clim_dir.join(format!("{index}_anom_min_max_{label}.csv"));
        emit(path.clone(), write_doy_table(&path, &anomaly.doy_min_max))?;

        let path = clim_dir.join(format!("{index}_anom_decades_{label}.csv"));
        emit(path.clone(), write_decades(&path, &anomaly.decades))?;

        let path = clim_dir.join(format!("{index}_anom_yearly_min_max_{label}.csv"));
        emit(path.clone(), write_yearly_extremes(&path, &anomaly.yearly_extremes))?;
    }

    info!("Wrote {} CSV files for {area}/{index}", written.len());
    Ok(written)
}
