//! Unit tests for the normalizer, the day-of-year statistics and configuration
//!
//! Series are synthetic so every expected value can be worked out by hand.

use approx::assert_relative_eq;
use chrono::{Datelike, NaiveDate};
use sea_ice_clim::{
    calendar::{Doy, YearRange, FEB_29},
    config::BatchConfig,
    errors::SeaIceError,
    metadata::SeriesSummary,
    normalize::{normalize, normalize_with, DayKind, NeighborPolicy},
    palette::year_palette,
    parallel::ParallelConfig,
    pipeline::{run_pipeline, PipelineConfig},
    series::TimeSeries,
    statistics::{
        average_ranks, climatology_bands, compute_anomaly, daily_climatology, decadal_quantiles,
        doy_min_max, percentile, rank_by_day_of_year, yearly_extremes, ExclusionPolicy,
    },
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily series from `start` to `end` inclusive with values from `f`
fn daily(start: NaiveDate, end: NaiveDate, f: impl Fn(NaiveDate) -> f64) -> TimeSeries {
    TimeSeries::from_pairs(start.iter_days().take_while(|d| *d <= end).map(|d| (d, f(d)))).unwrap()
}

/// `series` with the given dates left out
fn without(series: &TimeSeries, missing: &[NaiveDate]) -> TimeSeries {
    TimeSeries::from_pairs(series.iter().filter(|(d, _)| !missing.contains(d))).unwrap()
}

fn year_range(start: i32, end: i32) -> YearRange {
    YearRange::new(start, end).unwrap()
}

#[test]
fn test_series_rejects_unordered_dates() {
    let result = TimeSeries::new(vec![date(2020, 1, 2), date(2020, 1, 1)], vec![1.0, 2.0]);
    assert!(matches!(result, Err(SeaIceError::InvalidSeries { .. })));

    let result = TimeSeries::new(vec![date(2020, 1, 1)], vec![f64::NAN]);
    assert!(matches!(result, Err(SeaIceError::InvalidSeries { .. })));
}

#[test]
fn test_normalize_round_trip_and_synthetic_leap_day() {
    let series = daily(date(2019, 1, 1), date(2021, 12, 31), |d| f64::from(d.ordinal()));
    let normalized = normalize(&series).unwrap();

    assert_eq!(normalized.n_years(), 3);
    assert_eq!(normalized.synthetic_count(), 2);
    assert_eq!(normalized.kind(2019, FEB_29), DayKind::Synthetic);
    assert_eq!(normalized.kind(2020, FEB_29), DayKind::Real);
    // Feb-28 is day 59 and Mar-1 day 60 of a common year
    assert_relative_eq!(normalized.value(2019, FEB_29).unwrap(), 59.5);

    let back = normalized.to_time_series().unwrap();
    assert_eq!(back, series);
}

#[test]
fn test_normalize_missing_neighbour() {
    let series = TimeSeries::from_pairs(
        daily(date(2019, 1, 1), date(2019, 12, 31), |_| 1.0)
            .iter()
            .filter(|(d, _)| *d != date(2019, 2, 28)),
    )
    .unwrap();

    match normalize(&series) {
        Err(SeaIceError::BoundaryInterpolation { year, missing }) => {
            assert_eq!(year, 2019);
            assert_eq!(missing, date(2019, 2, 28));
        }
        other => panic!("Expected BoundaryInterpolation, got {other:?}"),
    }

    let normalized = normalize_with(&series, NeighborPolicy::LeaveGap).unwrap();
    assert_eq!(normalized.kind(2019, FEB_29), DayKind::Gap);
    assert_eq!(normalized.kind(2019, Doy::new(59).unwrap()), DayKind::Gap);
    assert_eq!(normalized.synthetic_count(), 0);
}

#[test]
fn test_normalize_leap_day_outside_span() {
    let series = daily(date(2019, 3, 1), date(2019, 12, 31), |_| 1.0);
    let normalized = normalize(&series).unwrap();

    assert_eq!(normalized.kind(2019, FEB_29), DayKind::Outside);
    assert_eq!(normalized.kind(2019, Doy::new(1).unwrap()), DayKind::Outside);
    assert_eq!(normalized.synthetic_count(), 0);
}

#[test]
fn test_ranks_per_day_of_year() {
    let base = |year: i32| match year {
        2019 => 2.0,
        2020 => 3.0,
        _ => 1.0,
    };
    let series = daily(date(2019, 1, 1), date(2021, 12, 31), |d| base(d.year()));
    let ranks = rank_by_day_of_year(&normalize(&series).unwrap());

    assert_eq!(ranks.len(), series.len());
    assert_eq!(ranks.dates(), series.dates());
    assert_relative_eq!(ranks.rank_at(date(2019, 6, 1)).unwrap(), 2.0);
    assert_relative_eq!(ranks.rank_at(date(2020, 2, 29)).unwrap(), 3.0);
    assert_relative_eq!(ranks.rank_at(date(2021, 12, 31)).unwrap(), 1.0);
}

#[test]
fn test_ranks_with_ties() {
    let series = daily(date(2019, 1, 1), date(2021, 12, 31), |d| {
        if d.year() == 2020 {
            7.0
        } else {
            5.0
        }
    });
    let ranks = rank_by_day_of_year(&normalize(&series).unwrap());

    assert_relative_eq!(ranks.rank_at(date(2019, 3, 1)).unwrap(), 1.5);
    assert_relative_eq!(ranks.rank_at(date(2021, 3, 1)).unwrap(), 1.5);
    assert_relative_eq!(ranks.rank_at(date(2020, 3, 1)).unwrap(), 3.0);
}

#[test]
fn test_average_ranks() {
    assert_eq!(average_ranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
    assert_eq!(average_ranks(&[1.0, 1.0, 2.0]), vec![1.5, 1.5, 3.0]);
}

#[test]
fn test_percentile_interpolation() {
    let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert_relative_eq!(percentile(&sorted, 0.5).unwrap(), 3.0);
    assert_relative_eq!(percentile(&sorted, 0.25).unwrap(), 2.0);
    assert_relative_eq!(percentile(&sorted, 0.9).unwrap(), 4.6, epsilon = 1e-12);
    assert_relative_eq!(percentile(&[1.0, 2.0], 0.5).unwrap(), 1.5);
    assert!(percentile(&[], 0.5).is_none());
}

#[test]
fn test_doy_min_max_excludes_latest_year() {
    let series = daily(date(2019, 1, 1), date(2021, 12, 31), |d| match d.year() {
        2019 => 1.0,
        2020 => 2.0,
        _ => 100.0,
    });
    let table = doy_min_max(&normalize(&series).unwrap()).unwrap();

    assert_eq!(table.columns, vec!["min", "max"]);
    assert_eq!(table.years, year_range(2019, 2020));
    let min = table.column("min").unwrap();
    let max = table.column("max").unwrap();
    assert!(min.iter().all(|&v| v == 1.0));
    assert!(max.iter().all(|&v| v == 2.0));
}

#[test]
fn test_doy_min_max_single_year() {
    let series = daily(date(2020, 1, 1), date(2020, 12, 31), |_| 1.0);
    let result = doy_min_max(&normalize(&series).unwrap());
    assert!(matches!(result, Err(SeaIceError::MissingYearData { .. })));
}

#[test]
fn test_decadal_quantiles() {
    let series = daily(date(1980, 1, 1), date(1999, 12, 31), |d| f64::from(d.year()));
    let normalized = normalize(&series).unwrap();
    let decades = decadal_quantiles(&normalized, &[1980, 1990]).unwrap();

    assert_eq!(decades.len(), 2);
    let eighties = &decades[0];
    assert_eq!(eighties.decade, 1980);
    assert_eq!(eighties.table.columns, vec!["per_0", "median", "per_100"]);
    let row = eighties.table.row(Doy::new(200).unwrap());
    assert_relative_eq!(row[0], 1980.0);
    assert_relative_eq!(row[1], 1984.5);
    assert_relative_eq!(row[2], 1989.0);

    let nineties = decades[1].table.row(FEB_29);
    assert_relative_eq!(nineties[1], 1994.5);
}

#[test]
fn test_climatology_bands_clip_to_data() {
    let series = daily(date(1980, 1, 1), date(1999, 12, 31), |d| f64::from(d.year()));
    let normalized = normalize(&series).unwrap();
    let table = climatology_bands(&normalized, year_range(1981, 2010)).unwrap();

    assert_eq!(
        table.columns,
        vec!["per_10", "per_25", "median", "per_75", "per_90"]
    );
    assert_eq!(table.years, year_range(1981, 1999));
    let row = table.row(Doy::new(1).unwrap());
    assert_relative_eq!(row[0], 1982.8, epsilon = 1e-9);
    assert_relative_eq!(row[2], 1990.0);

    let result = climatology_bands(&normalized, year_range(2030, 2040));
    assert!(matches!(result, Err(SeaIceError::MissingYearData { .. })));
}

#[test]
fn test_empty_bucket() {
    let series = daily(date(2019, 3, 1), date(2019, 12, 31), |_| 1.0);
    let normalized = normalize(&series).unwrap();

    match climatology_bands(&normalized, year_range(2019, 2019)) {
        Err(SeaIceError::EmptyBucket { doy, start, end }) => {
            assert_eq!(doy, 1);
            assert_eq!((start, end), (2019, 2019));
        }
        other => panic!("Expected EmptyBucket, got {other:?}"),
    }
}

#[test]
fn test_gap_only_bucket_is_nan() {
    let series = TimeSeries::from_pairs(
        daily(date(2019, 1, 1), date(2020, 12, 31), |d| f64::from(d.year()))
            .iter()
            .filter(|(d, _)| !(d.month() == 7 && d.day() == 4)),
    )
    .unwrap();
    let normalized = normalize(&series).unwrap();
    let table = climatology_bands(&normalized, year_range(2019, 2020)).unwrap();

    let july_4 = Doy::from_date(date(2020, 7, 4));
    assert!(table.row(july_4).iter().all(|v| v.is_nan()));
    assert_relative_eq!(table.row(Doy::from_date(date(2020, 7, 5)))[2], 2019.5);
}

#[test]
fn test_yearly_extremes_ranked() {
    let base = |year: i32| match year {
        2016 => 5.0,
        2017 => 1.0,
        2018 => 9.0,
        2019 => 3.0,
        _ => 0.0,
    };
    let series = daily(date(2016, 1, 1), date(2020, 12, 31), |d| {
        base(d.year()) + f64::from(Doy::from_date(d).get()) / 1000.0
    });
    let normalized = normalize(&series).unwrap();
    let extremes = yearly_extremes(&normalized, &ExclusionPolicy::default()).unwrap();

    let years: Vec<i32> = extremes.minima.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2016, 2017, 2018, 2019]);

    let ranks: Vec<f64> = extremes.minima.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![3.0, 1.0, 4.0, 2.0]);

    let first = &extremes.minima[0];
    assert_eq!(first.date, date(2016, 1, 1));
    assert_eq!(first.day_of_year.get(), 1);
    assert_relative_eq!(first.value, 5.001, epsilon = 1e-12);

    let last_max = &extremes.maxima[3];
    assert_eq!(last_max.date, date(2019, 12, 31));
    assert_eq!(last_max.day_of_year.get(), 366);
}

#[test]
fn test_yearly_extremes_exclusions() {
    let series = daily(date(2019, 3, 1), date(2022, 12, 31), |d| f64::from(d.year()));
    let normalized = normalize(&series).unwrap();

    let policy = ExclusionPolicy::default();
    assert_eq!(policy.included_years(&normalized), vec![2020, 2021]);
    assert_eq!(
        ExclusionPolicy::none().included_years(&normalized),
        vec![2019, 2020, 2021, 2022]
    );

    let policy = ExclusionPolicy {
        years: vec![2020, 2021],
        ..ExclusionPolicy::default()
    };
    let result = yearly_extremes(&normalized, &policy);
    assert!(matches!(result, Err(SeaIceError::MissingYearData { .. })));
}

#[test]
fn test_yearly_extremes_within_year() {
    let values = [5.0, 1.0, 9.0, 3.0];
    let series = TimeSeries::from_pairs(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (date(2019, 1, 1 + i as u32), v)),
    )
    .unwrap();
    let extremes = yearly_extremes(&normalize(&series).unwrap(), &ExclusionPolicy::none()).unwrap();

    assert_relative_eq!(extremes.minima[0].value, 1.0);
    assert_eq!(extremes.minima[0].day_of_year.get(), 2);
    assert_relative_eq!(extremes.maxima[0].value, 9.0);
    assert_eq!(extremes.maxima[0].day_of_year.get(), 3);
}

#[test]
fn test_yearly_extremes_tie_takes_earliest_day() {
    let series = daily(date(2019, 1, 1), date(2019, 12, 31), |_| 4.0);
    let normalized = normalize(&series).unwrap();
    let extremes = yearly_extremes(&normalized, &ExclusionPolicy::none()).unwrap();

    assert_eq!(extremes.minima[0].date, date(2019, 1, 1));
    assert_eq!(extremes.maxima[0].date, date(2019, 1, 1));
    assert_relative_eq!(extremes.minima[0].rank, 1.0);
}

#[test]
fn test_anomaly_against_reference_period() {
    let series = daily(date(2019, 1, 1), date(2021, 12, 31), |d| {
        f64::from(d.year()) + f64::from(Doy::from_date(d).get()) / 1000.0
    });
    let normalized = normalize(&series).unwrap();
    let period = year_range(2019, 2021);
    let anomaly = compute_anomaly(&normalized, period).unwrap();

    assert_relative_eq!(anomaly.value(2019, Doy::new(10).unwrap()).unwrap(), -1.0, epsilon = 1e-9);
    assert_relative_eq!(anomaly.value(2021, FEB_29).unwrap(), 1.0, epsilon = 1e-9);

    let mean = daily_climatology(&anomaly, period).unwrap();
    assert!(mean.iter().all(|v| v.abs() < 1e-9));

    let projected = anomaly.to_time_series().unwrap();
    assert_eq!(projected.dates(), series.dates());
}

#[test]
fn test_anomaly_keeps_ranks() {
    let series = daily(date(2019, 1, 1), date(2021, 12, 31), |d| {
        f64::from(d.ordinal() % 7) + f64::from(d.year() % 3)
    });
    let normalized = normalize(&series).unwrap();
    let anomaly = compute_anomaly(&normalized, year_range(2019, 2020)).unwrap();

    assert_eq!(
        rank_by_day_of_year(&normalized),
        rank_by_day_of_year(&anomaly)
    );
}

#[test]
fn test_anomaly_with_reference_gaps() {
    let full = daily(date(2019, 1, 1), date(2021, 12, 31), |d| {
        f64::from(d.ordinal()).to_radians().sin() + f64::from(d.year() - 2019)
    });
    // Jul-4 missing in one reference year only, Aug-10 missing outside the period
    let series = without(&full, &[date(2019, 7, 4), date(2021, 8, 10)]);
    let period = year_range(2019, 2020);
    let normalized = normalize(&series).unwrap();
    let anomaly = compute_anomaly(&normalized, period).unwrap();

    assert_eq!(anomaly.to_time_series().unwrap().dates(), series.dates());

    let july_4 = Doy::from_date(date(2020, 7, 4));
    assert_relative_eq!(anomaly.value(2020, july_4).unwrap(), 0.0, epsilon = 1e-12);

    let mean = daily_climatology(&anomaly, period).unwrap();
    assert!(mean.iter().all(|m| !m.is_nan()));
    assert!(mean.iter().all(|m| m.abs() < 1e-9));

    let config = PipelineConfig {
        reference_periods: vec![period],
        decades: vec![2019],
        exclusions: ExclusionPolicy::none(),
        ..PipelineConfig::default()
    };
    let stats = run_pipeline(&series, &config).unwrap();
    assert_eq!(stats.anomalies[0].series.dates(), series.dates());
}

#[test]
fn test_anomaly_undefined_climatology_leaves_gap() {
    let full = daily(date(2019, 1, 1), date(2021, 12, 31), |d| {
        f64::from(d.ordinal()).to_radians().cos() + f64::from(d.year() - 2019)
    });
    let series = without(&full, &[date(2019, 7, 4), date(2020, 7, 4)]);
    let config = PipelineConfig {
        reference_periods: vec![year_range(2019, 2020)],
        decades: vec![2019],
        exclusions: ExclusionPolicy::none(),
        ..PipelineConfig::default()
    };

    let stats = run_pipeline(&series, &config).unwrap();
    let anomaly = &stats.anomalies[0];
    let july_4 = Doy::from_date(date(2021, 7, 4));

    assert_eq!(stats.ranks.len(), series.len());
    assert_eq!(anomaly.normalized.kind(2021, july_4), DayKind::Gap);
    assert_eq!(anomaly.series.len(), series.len() - 1);
    assert!(!anomaly.series.dates().contains(&date(2021, 7, 4)));
    assert!(anomaly.ranks.rank_at(date(2021, 7, 4)).is_none());
    assert!(anomaly
        .yearly_extremes
        .minima
        .iter()
        .chain(&anomaly.yearly_extremes.maxima)
        .all(|r| r.value.is_finite()));
}

#[test]
fn test_pipeline_is_deterministic() {
    let series = daily(date(2000, 1, 1), date(2004, 12, 31), |d| {
        f64::from(d.ordinal()).sin() + f64::from(d.year() - 2000)
    });
    let config = PipelineConfig {
        reference_periods: vec![year_range(2001, 2003)],
        decades: vec![2000],
        ..PipelineConfig::default()
    };

    let first = run_pipeline(&series, &config).unwrap();
    let second = run_pipeline(&series, &config).unwrap();

    assert_eq!(first.ranks, second.ranks);
    assert_eq!(first.doy_min_max, second.doy_min_max);
    assert_eq!(first.yearly_extremes, second.yearly_extremes);
    assert_eq!(first.climatology, second.climatology);
    assert_eq!(first.anomalies.len(), 1);
    assert_eq!(first.anomalies[0].series.dates(), series.dates());
    assert_eq!(
        first.anomalies[0].yearly_extremes,
        second.anomalies[0].yearly_extremes
    );
}

#[test]
fn test_anomaly_extremes_located_on_absolute_series() {
    let series = daily(date(2000, 1, 1), date(2003, 12, 31), |d| {
        f64::from(Doy::from_date(d).get()) + f64::from(d.year() - 2000) * 10.0
    });
    let config = PipelineConfig {
        reference_periods: vec![year_range(2000, 2003)],
        decades: vec![2000],
        exclusions: ExclusionPolicy::none(),
        ..PipelineConfig::default()
    };
    let stats = run_pipeline(&series, &config).unwrap();
    let anomaly = &stats.anomalies[0];

    for (abs, anom) in stats
        .yearly_extremes
        .maxima
        .iter()
        .zip(&anomaly.yearly_extremes.maxima)
    {
        assert_eq!(abs.date, anom.date);
    }
    // 2000 sits 15 below the four-year mean on every day
    assert_relative_eq!(anomaly.yearly_extremes.minima[0].value, -15.0, epsilon = 1e-9);
}

#[test]
fn test_batch_config_from_json() {
    let config = BatchConfig::from_json_str(
        r#"{
            "input_template": "data/{area}/osisaf_{area}_{index}_daily.nc",
            "output_dir": "out",
            "areas": ["nh", "sh"],
            "pipeline": {
                "reference_periods": [[1981, 2010]],
                "exclusions": { "years": [1978] },
                "neighbor_policy": "leave_gap"
            }
        }"#,
    )
    .unwrap();

    assert_eq!(config.indices, vec!["sie", "sia"]);
    assert_eq!(config.pipeline.reference_periods, vec![year_range(1981, 2010)]);
    assert_eq!(config.pipeline.exclusions.years, vec![1978]);
    assert!(config.pipeline.exclusions.drop_latest_year);
    assert_eq!(config.pipeline.neighbor_policy, NeighborPolicy::LeaveGap);
    assert_eq!(config.pipeline.decades, vec![1980, 1990, 2000, 2010]);

    let jobs = config.jobs();
    assert_eq!(jobs.len(), 4);
    assert_eq!(jobs[1].area, "nh");
    assert_eq!(jobs[1].index, "sia");
    assert_eq!(
        jobs[1].input.to_str().unwrap(),
        "data/nh/osisaf_nh_sia_daily.nc"
    );
}

#[test]
fn test_batch_config_rejects_bad_input() {
    let unknown = BatchConfig::from_json_str(r#"{"input_template": "a", "output_dir": "b", "colour": 1}"#);
    assert!(matches!(unknown, Err(SeaIceError::Config(_))));

    let reversed = BatchConfig::from_json_str(
        r#"{"input_template": "a", "output_dir": "b", "pipeline": {"reference_periods": [[2010, 1981]]}}"#,
    );
    assert!(reversed.is_err());

    let defaults = BatchConfig::from_json_str(r#"{"input_template": "a", "output_dir": "b"}"#).unwrap();
    assert_eq!(defaults.areas.len(), 18);
    assert_eq!(defaults.pipeline, PipelineConfig::default());
}

#[test]
fn test_series_summary() {
    let series = TimeSeries::from_pairs(
        daily(date(2019, 3, 1), date(2019, 3, 10), |d| f64::from(d.day()))
            .iter()
            .filter(|(d, _)| d.day() != 5),
    )
    .unwrap();
    let summary = SeriesSummary::from_series(&series);

    assert_eq!(summary.observations, 9);
    assert_eq!(summary.gap_days, 1);
    assert!(summary.partial_first_year);
    assert_eq!(summary.years, vec![2019]);
    assert_eq!(summary.min, Some((date(2019, 3, 1), 1.0)));
    assert_eq!(summary.max, Some((date(2019, 3, 10), 10.0)));
    summary.print();
}

#[test]
fn test_year_palette() {
    let years: Vec<i32> = (1978..=2024).collect();
    let colours = year_palette(&years);
    assert_eq!(colours.len(), years.len());
    assert_eq!(colours[0].year, 1978);

    let last = colours.len() - 1;
    assert_eq!(colours[0].viridis, "#440154");
    assert_eq!(colours[last].viridis, "#fde725");
    assert_eq!(colours[0].viridis_r, colours[last].viridis);
    assert_eq!(colours[last].plasma_r, colours[0].plasma);

    // the cycles restart after their last colour
    assert_eq!(colours[0].cyclic_8, "#ffe119");
    assert_eq!(colours[8].cyclic_8, colours[0].cyclic_8);
    assert_eq!(colours[17].cyclic_17, "#e6194B");

    // 1970s and 1980s share a map; year k of a decade takes sample k
    let decadal = |year: i32| colours[(year - 1978) as usize].decadal.clone();
    assert_eq!(decadal(1978), decadal(1988));
    assert_ne!(decadal(1988), decadal(1998));
    assert_eq!(decadal(2020).as_deref(), Some("#fc7f00"));
    assert!(colours.iter().all(|c| c.decadal.as_ref().is_some_and(|h| h.len() == 7)));

    let outside = year_palette(&[1969, 2030]);
    assert!(outside.iter().all(|c| c.decadal.is_none()));

    let single = year_palette(&[2000]);
    assert_eq!(single[0].viridis, "#440154");
}

#[test]
fn test_parallel_config() {
    assert!(ParallelConfig::default().num_threads.is_none());
    assert_eq!(ParallelConfig::with_threads(2).num_threads, Some(2));
    assert!(ParallelConfig::all_cores().num_threads.unwrap() > 0);

    let threads = ParallelConfig::with_threads(2)
        .install(rayon::current_num_threads)
        .unwrap();
    assert_eq!(threads, 2);
}

#[test]
fn test_error_messages() {
    let err = SeaIceError::EmptyBucket {
        doy: 60,
        start: 1981,
        end: 2010,
    };
    assert!(err.to_string().contains("day-of-year 60"));

    let err = SeaIceError::BoundaryInterpolation {
        year: 2019,
        missing: date(2019, 3, 1),
    };
    assert!(err.to_string().contains("2019-03-01"));
}
