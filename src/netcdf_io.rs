//! NetCDF I/O operations
//!
//! Reads a daily sea-ice index variable and its CF time axis into a
//! [`TimeSeries`], and writes the rank, day-of-year envelope and yearly extreme
//! variables back out with descriptive attributes.

use crate::errors::{Result, SeaIceError};
use crate::pipeline::SeriesStatistics;
use crate::series::TimeSeries;
use crate::statistics::YearlyExtremum;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use netcdf::{create, AttributeValue, File, Variable};
use std::{fs, path::Path};
use tracing::{debug, info, warn};

const TIME_VARIABLE: &str = "time";
const EPOCH_UNITS: &str = "days since 1970-01-01";
const SUPPORTED_CALENDARS: [&str; 3] = ["standard", "gregorian", "proleptic_gregorian"];

const RANK_COMMENT: &str = "To deal with the issue of leap years all years in the data are converted to \
leap years with Feb. 29th values inserted for non-leap years. The values are interpolated between that \
of Feb. 28th and Mar. 1st. Rank is then calculated on a day of year basis, after which the inserted \
values are discarded. Ties are assigned the average of the ranks they would otherwise occupy.";

const YEARLY_RANK_COMMENT: &str =
    "Ties are assigned the average of the ranks they would otherwise occupy.";

/// A daily index loaded from file
#[derive(Debug, Clone, PartialEq)]
pub struct IndexData {
    /// Name of the variable that was read
    pub variable: String,
    /// `units` attribute of the variable, if any
    pub units: Option<String>,
    pub series: TimeSeries,
}

/// Read the first of `aliases` that exists in `path` as a daily series.
///
/// Fill values (`_FillValue`, `missing_value`) and non-finite values become gaps.
///
/// # Errors
///
/// - [`SeaIceError::VariableNotFound`] if no alias matches.
/// - [`SeaIceError::InvalidTime`] if the time axis cannot be decoded.
/// - [`SeaIceError::InvalidSeries`] if the decoded dates repeat or go backwards.
pub fn read_daily_series(path: &Path, aliases: &[&str]) -> Result<IndexData> {
    let file = netcdf::open(path)?;

    let var = aliases
        .iter()
        .find_map(|&name| file.variable(name))
        .ok_or_else(|| SeaIceError::VariableNotFound {
            var: aliases.join("|"),
            path: path.to_path_buf(),
        })?;
    let variable = var.name();

    let dates = read_time_axis(&file)?;
    let raw = var.get_values::<f64, _>(..)?;
    let total = raw.len();
    if total != dates.len() {
        return Err(SeaIceError::InvalidSeries {
            message: format!(
                "'{variable}' has {} values but the time axis has {}",
                total,
                dates.len()
            ),
        });
    }

    let fill_values: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| numeric_attribute(&var, name))
        .collect();

    let pairs: Vec<(NaiveDate, f64)> = dates
        .into_iter()
        .zip(raw)
        .filter(|(_, v)| v.is_finite() && !fill_values.contains(v))
        .collect();
    let dropped = total - pairs.len();
    if dropped > 0 {
        debug!("Dropped {dropped} fill values from '{variable}'");
    }

    let units = string_attribute(&var, "units");
    let series = TimeSeries::from_pairs(pairs)?;
    info!(
        "Loaded '{variable}' from {}: {} observations",
        path.display(),
        series.len()
    );

    Ok(IndexData {
        variable,
        units,
        series,
    })
}

fn read_time_axis(file: &File) -> Result<Vec<NaiveDate>> {
    let time = file
        .variable(TIME_VARIABLE)
        .ok_or_else(|| SeaIceError::InvalidTime {
            reason: format!("no '{TIME_VARIABLE}' variable"),
        })?;

    if let Some(calendar) = string_attribute(&time, "calendar") {
        if !SUPPORTED_CALENDARS.contains(&calendar.to_lowercase().as_str()) {
            return Err(SeaIceError::InvalidTime {
                reason: format!("unsupported calendar '{calendar}'"),
            });
        }
    }

    let units = string_attribute(&time, "units").ok_or_else(|| SeaIceError::InvalidTime {
        reason: "time variable has no 'units' attribute".to_string(),
    })?;
    let (step_seconds, base) = parse_time_units(&units)?;

    time.get_values::<f64, _>(..)?
        .into_iter()
        .map(|offset| {
            let seconds = (offset * step_seconds).round() as i64;
            TimeDelta::try_seconds(seconds)
                .and_then(|delta| base.checked_add_signed(delta))
                .map(|t| t.date())
                .ok_or_else(|| SeaIceError::InvalidTime {
                    reason: format!("offset {offset} overflows from {base}"),
                })
        })
        .collect()
}

/// Parse CF units such as `days since 1978-10-25` or
/// `seconds since 1970-01-01 00:00:00` into seconds per step and the base instant.
///
/// # Errors
///
/// Returns [`SeaIceError::InvalidTime`] for anything else.
pub fn parse_time_units(units: &str) -> Result<(f64, NaiveDateTime)> {
    let invalid = |why: &str| SeaIceError::InvalidTime {
        reason: format!("{why}: '{units}'"),
    };

    let mut parts = units.split_whitespace();
    let step = match parts.next() {
        Some("days" | "day" | "d") => 86_400.0,
        Some("hours" | "hour" | "h") => 3_600.0,
        Some("minutes" | "minute" | "min") => 60.0,
        Some("seconds" | "second" | "s") => 1.0,
        _ => return Err(invalid("unsupported time unit")),
    };
    if parts.next() != Some("since") {
        return Err(invalid("expected '<unit> since <date>'"));
    }

    let date_str = parts.next().ok_or_else(|| invalid("missing base date"))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| invalid(&format!("bad base date ({e})")))?;
    let time = match parts.next() {
        Some(t) => NaiveTime::parse_from_str(t.trim_end_matches('Z'), "%H:%M:%S")
            .map_err(|e| invalid(&format!("bad base time ({e})")))?,
        None => NaiveTime::default(),
    };

    Ok((step, date.and_time(time)))
}

fn string_attribute(var: &Variable, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn numeric_attribute(var: &Variable, name: &str) -> Option<f64> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        _ => None,
    }
}

fn epoch_days(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as f64
}

/// Writer for the per-series statistics dataset
pub struct StatisticsWriter<'a> {
    output_path: &'a Path,
    variable: &'a str,
    units: Option<&'a str>,
}

impl<'a> StatisticsWriter<'a> {
    /// Create a new writer; `variable` names the index variable in the output
    pub fn new(output_path: &'a Path, variable: &'a str, units: Option<&'a str>) -> Self {
        Self {
            output_path,
            variable,
            units,
        }
    }

    /// Write observations, ranks, day-of-year envelope and yearly extremes
    ///
    /// # Errors
    ///
    /// NetCDF and file system errors.
    pub fn write(&self, stats: &SeriesStatistics) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        } else if let Some(parent) = self.output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = create(self.output_path)?;

        let observed: Vec<(NaiveDate, f64)> = stats
            .normalized
            .real_entries()
            .map(|(date, _, value)| (date, value))
            .collect();
        let minima = &stats.yearly_extremes.minima;
        let maxima = &stats.yearly_extremes.maxima;

        file.add_dimension("time", observed.len())?;
        file.add_dimension("dayofyear", 366)?;
        file.add_dimension("year", minima.len())?;

        {
            let mut time = file.add_variable::<f64>("time", &["time"])?;
            time.put_attribute("units", EPOCH_UNITS)?;
            time.put_attribute("calendar", "standard")?;
            let days: Vec<f64> = observed.iter().map(|&(d, _)| epoch_days(d)).collect();
            time.put_values(&days, ..)?;
        }

        {
            let mut index = file.add_variable::<f64>(self.variable, &["time"])?;
            if let Some(units) = self.units {
                index.put_attribute("units", units)?;
            }
            let values: Vec<f64> = observed.iter().map(|&(_, v)| v).collect();
            index.put_values(&values, ..)?;
        }

        {
            let mut rank = file.add_variable::<f64>("rank", &["time"])?;
            rank.put_attribute("long_name", "Rank per day of year")?;
            rank.put_attribute("comment", RANK_COMMENT)?;
            rank.put_values(stats.ranks.ranks(), ..)?;
        }

        {
            let mut doy = file.add_variable::<i32>("dayofyear", &["dayofyear"])?;
            doy.put_attribute("long_name", "Day of year")?;
            doy.put_attribute("coverage_content_type", "auxiliaryInformation")?;
            let days: Vec<i32> = (1..=366).collect();
            doy.put_values(&days, ..)?;
        }

        for (name, long_name) in [
            ("min", "Minimum value per day of year"),
            ("max", "Maximum value per day of year"),
        ] {
            let column = stats
                .doy_min_max
                .column(name)
                .map(|c| c.to_vec())
                .unwrap_or_default();
            let mut var = file.add_variable::<f64>(&format!("{name}_per_doy"), &["dayofyear"])?;
            var.put_attribute("long_name", long_name)?;
            if let Some(units) = self.units {
                var.put_attribute("units", units)?;
            }
            var.put_values(&column, ..)?;
        }

        {
            let mut year = file.add_variable::<i32>("year", &["year"])?;
            year.put_attribute("long_name", "Year")?;
            year.put_attribute("coverage_content_type", "auxiliaryInformation")?;
            let years: Vec<i32> = minima.iter().map(|r| r.year).collect();
            year.put_values(&years, ..)?;
        }

        for (kind, records) in [("min", minima), ("max", maxima)] {
            self.write_yearly(&mut file, kind, records)?;
        }

        file.add_attribute(
            "history",
            format!("Created by sea_ice_clim on {}", Utc::now().to_rfc3339()),
        )?;

        info!("Wrote statistics to {}", self.output_path.display());
        Ok(())
    }

    fn write_yearly(
        &self,
        file: &mut netcdf::FileMut,
        kind: &str,
        records: &[YearlyExtremum],
    ) -> Result<()> {
        let label = if kind == "min" { "minimum" } else { "maximum" };

        {
            let mut date = file.add_variable::<f64>(&format!("yearly_{kind}_date"), &["year"])?;
            date.put_attribute("long_name", format!("Yearly {label} date"))?;
            date.put_attribute("units", EPOCH_UNITS)?;
            date.put_attribute("comment", format!("Date where {label} value occurs for given year."))?;
            let dates: Vec<f64> = records.iter().map(|r| epoch_days(r.date)).collect();
            date.put_values(&dates, ..)?;
        }

        {
            let mut value = file.add_variable::<f64>(&format!("yearly_{kind}_value"), &["year"])?;
            value.put_attribute("long_name", format!("Yearly {label} value"))?;
            if let Some(units) = self.units {
                value.put_attribute("units", units)?;
            }
            let values: Vec<f64> = records.iter().map(|r| r.value).collect();
            value.put_values(&values, ..)?;
        }

        {
            let mut rank = file.add_variable::<f64>(&format!("yearly_{kind}_rank"), &["year"])?;
            rank.put_attribute("long_name", format!("Yearly {label} rank"))?;
            rank.put_attribute("comment", YEARLY_RANK_COMMENT)?;
            let ranks: Vec<f64> = records.iter().map(|r| r.rank).collect();
            rank.put_values(&ranks, ..)?;
        }

        if records.is_empty() {
            warn!("No yearly {label} records to write");
        }
        Ok(())
    }
}

/// Write `stats` to a new NetCDF file at `output_path`.
///
/// # Errors
///
/// See [`StatisticsWriter::write`].
pub fn write_statistics_netcdf(
    stats: &SeriesStatistics,
    variable: &str,
    units: Option<&str>,
    output_path: &Path,
) -> Result<()> {
    StatisticsWriter::new(output_path, variable, units).write(stats)
}
