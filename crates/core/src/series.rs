//! Dense daily series for the chart endpoints.
//!
//! Storage returns one row per day that has data. Charts want one point per
//! x-axis tick, so [`normalize`] expands the rows over the whole window,
//! filling gaps with zero and zeroing anything after the reference date.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::window::{iso_date, parse_date, Window, WindowError};

/// A sparse row from storage: a calendar day and nullable metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl SeriesRow {
    pub fn new(date: Date) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: Option<f64>) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Build a row from a storage date string.
    ///
    /// Only the calendar part is kept (`2024-03-01T00:00:00` and `2024-03-01`
    /// are the same day); anything that is not a valid date is rejected.
    pub fn parse<K: Into<String>>(
        date: &str,
        values: impl IntoIterator<Item = (K, Option<f64>)>,
    ) -> Result<Self, WindowError> {
        let day = date.trim().split(['T', ' ']).next().unwrap_or_default();
        let date = parse_date(day).map_err(|_| WindowError::InvalidDate {
            input: date.to_owned(),
            reason: "not a calendar date".to_owned(),
        })?;
        Ok(Self {
            date,
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }
}

/// One point of a dense series; every requested metric is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl SeriesPoint {
    pub fn value(&self, key: &str) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    fn zeroed(date: Date, metric_keys: &[&str]) -> Self {
        Self {
            date,
            values: metric_keys.iter().map(|k| ((*k).to_owned(), 0.0)).collect(),
        }
    }
}

/// Expand `rows` into exactly one point per day of `window`.
///
/// Days after `reference` read as zero even when a row exists for them, so a
/// chart never shows forecast values past the selected date. Null, missing and
/// non-finite values become zero. When two rows share a date the later one wins.
pub fn normalize(
    window: &Window,
    reference: Date,
    rows: &[SeriesRow],
    metric_keys: &[&str],
) -> Vec<SeriesPoint> {
    let by_date: HashMap<Date, &SeriesRow> = rows.iter().map(|row| (row.date, row)).collect();

    window
        .days()
        .map(|day| match by_date.get(&day) {
            Some(row) if day <= reference => SeriesPoint {
                date: day,
                values: metric_keys
                    .iter()
                    .map(|key| {
                        let value = row
                            .values
                            .get(*key)
                            .copied()
                            .flatten()
                            .filter(|v| v.is_finite())
                            .unwrap_or(0.0);
                        ((*key).to_owned(), value)
                    })
                    .collect(),
            },
            _ => SeriesPoint::zeroed(day, metric_keys),
        })
        .collect()
}
