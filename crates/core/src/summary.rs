//! Card and table aggregates over the per-station forecast list.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::DANGER_THRESHOLD;

/// One station's forecast for the reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    pub name: String,
    /// Forecast heat index, degrees Celsius
    pub forecasted: f64,
    /// Signed change per 24h
    pub trend: f64,
}

impl StationReading {
    pub fn new(name: impl Into<String>, forecasted: f64, trend: f64) -> Self {
        Self {
            name: name.into(),
            forecasted,
            trend,
        }
    }
}

/// Figures behind the summary cards. `Default` is the empty-day sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSummary {
    pub max: f64,
    pub max_station: String,
    pub min: f64,
    pub min_station: String,
    pub avg: f64,
    pub danger_count: u64,
    pub fastest_station: String,
    pub fastest_trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStation {
    pub rank: usize,
    pub name: String,
    pub forecasted: f64,
    pub trend: f64,
}

/// A stored forecast joined with what was later observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastActual {
    pub station_id: i64,
    pub station_name: String,
    pub t1_forecast: f64,
    pub t2_forecast: f64,
    pub actual_t1: Option<f64>,
    pub actual_t2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastAccuracy {
    pub station_id: i64,
    pub station_name: String,
    pub t1_forecast: f64,
    pub t2_forecast: f64,
    pub actual_t1: Option<f64>,
    pub actual_t2: Option<f64>,
    pub abs_error_1d: Option<f64>,
    pub abs_error_2d: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyReport {
    pub stations: Vec<ForecastAccuracy>,
    pub mean_abs_error_1d: Option<f64>,
    pub mean_abs_error_2d: Option<f64>,
}

/// Rounded to `places` decimals; a result of -0.0 comes back as 0.0.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor + 0.0
}

/// [`summarize_with_threshold`] with the standard danger cutoff.
pub fn summarize(stations: &[StationReading]) -> StationSummary {
    summarize_with_threshold(stations, DANGER_THRESHOLD)
}

/// Ties on max, min and trend go to the first station in input order.
/// Readings with a non-finite value are left out of the figure they would corrupt.
pub fn summarize_with_threshold(stations: &[StationReading], threshold: f64) -> StationSummary {
    let forecasts: Vec<&StationReading> = stations
        .iter()
        .filter(|s| s.forecasted.is_finite())
        .collect();

    let mut summary = StationSummary::default();

    if let Some((first, rest)) = forecasts.split_first() {
        let (mut max, mut min) = (*first, *first);
        for station in rest {
            if station.forecasted > max.forecasted {
                max = station;
            }
            if station.forecasted < min.forecasted {
                min = station;
            }
        }
        let total: f64 = forecasts.iter().map(|s| s.forecasted).sum();

        summary.max = round_to(max.forecasted, 2);
        summary.max_station = max.name.clone();
        summary.min = round_to(min.forecasted, 2);
        summary.min_station = min.name.clone();
        summary.avg = round_to(total / forecasts.len() as f64, 2);
        summary.danger_count = forecasts
            .iter()
            .filter(|s| s.forecasted >= threshold)
            .count() as u64;
    }

    let fastest = stations
        .iter()
        .filter(|s| s.trend.is_finite())
        .fold(None::<&StationReading>, |best, s| match best {
            Some(b) if s.trend <= b.trend => Some(b),
            _ => Some(s),
        });
    if let Some(fastest) = fastest {
        summary.fastest_station = fastest.name.clone();
        summary.fastest_trend = round_to(fastest.trend, 1);
    }

    summary
}

/// Hottest first; equal forecasts keep input order. Ranks start at 1.
pub fn rank_stations(stations: &[StationReading]) -> Vec<RankedStation> {
    stations
        .iter()
        .filter(|s| s.forecasted.is_finite())
        .sorted_by(|a, b| b.forecasted.total_cmp(&a.forecasted))
        .enumerate()
        .map(|(i, s)| RankedStation {
            rank: i + 1,
            name: s.name.clone(),
            forecasted: round_to(s.forecasted, 2),
            trend: if s.trend.is_finite() {
                round_to(s.trend, 1)
            } else {
                0.0
            },
        })
        .collect()
}

/// Absolute error of each forecast against the observed heat index, plus the
/// mean over stations that have an observation for that lead day.
pub fn forecast_accuracy(rows: &[ForecastActual]) -> AccuracyReport {
    let stations: Vec<ForecastAccuracy> = rows
        .iter()
        .map(|row| ForecastAccuracy {
            station_id: row.station_id,
            station_name: row.station_name.clone(),
            t1_forecast: row.t1_forecast,
            t2_forecast: row.t2_forecast,
            actual_t1: row.actual_t1,
            actual_t2: row.actual_t2,
            abs_error_1d: row
                .actual_t1
                .map(|actual| round_to((row.t1_forecast - actual).abs(), 2)),
            abs_error_2d: row
                .actual_t2
                .map(|actual| round_to((row.t2_forecast - actual).abs(), 2)),
        })
        .collect();

    let mean = |errors: Vec<f64>| -> Option<f64> {
        let errors: Vec<f64> = errors.into_iter().filter(|e| e.is_finite()).collect();
        if errors.is_empty() {
            None
        } else {
            Some(round_to(
                errors.iter().sum::<f64>() / errors.len() as f64,
                2,
            ))
        }
    };

    AccuracyReport {
        mean_abs_error_1d: mean(stations.iter().filter_map(|s| s.abs_error_1d).collect()),
        mean_abs_error_2d: mean(stations.iter().filter_map(|s| s.abs_error_2d).collect()),
        stations,
    }
}
