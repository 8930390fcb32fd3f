//! Heat index classification bands.
//!
//! The band order and colors are a fixed business rule shared by the cards,
//! the donut chart and the legend; they are not derived from the data.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Color for any classification name outside the four known bands
pub const UNKNOWN_COLOR: &str = "#999999";

/// Known bands, least to most severe, with their display colors
const BANDS: [(&str, &str); 4] = [
    ("Caution", "#FFC107"),
    ("Extreme Caution", "#FF9800"),
    ("Danger", "#FF5722"),
    ("Extreme Danger", "#B71C1C"),
];

/// Lower bound of a classification band, as stored in the thresholds table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub name: String,
    pub min_value: f64,
}

impl Threshold {
    pub fn new(name: impl Into<String>, min_value: f64) -> Self {
        Self {
            name: name.into(),
            min_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedBucket {
    pub name: String,
    pub value: u64,
    pub color: String,
}

fn severity(name: &str) -> Option<usize> {
    BANDS.iter().position(|(band, _)| *band == name)
}

pub fn color_for(name: &str) -> &'static str {
    BANDS
        .iter()
        .find(|(band, _)| *band == name)
        .map(|(_, color)| *color)
        .unwrap_or(UNKNOWN_COLOR)
}

/// The band whose lower bound is the highest one not above `value`.
pub fn classify(value: f64, thresholds: &[Threshold]) -> Option<&str> {
    if !value.is_finite() {
        return None;
    }
    thresholds
        .iter()
        .filter(|t| t.min_value <= value)
        .max_by(|a, b| a.min_value.total_cmp(&b.min_value))
        .map(|t| t.name.as_str())
}

/// Count `values` per band. Every threshold appears, including empty ones;
/// values below the lowest band are not counted.
pub fn count_by_classification(
    values: impl IntoIterator<Item = f64>,
    thresholds: &[Threshold],
) -> Vec<ClassificationCount> {
    let mut counts: Vec<ClassificationCount> = thresholds
        .iter()
        .sorted_by(|a, b| a.min_value.total_cmp(&b.min_value))
        .map(|t| ClassificationCount {
            name: t.name.clone(),
            value: 0,
        })
        .collect();

    for value in values {
        if let Some(name) = classify(value, thresholds) {
            if let Some(count) = counts.iter_mut().find(|c| c.name == name) {
                count.value += 1;
            }
        }
    }

    counts
}

/// Attach band colors and order rows Caution → Extreme Danger.
/// Unknown names keep their input order after the known bands.
pub fn classify_and_color(rows: &[ClassificationCount]) -> Vec<ClassifiedBucket> {
    rows.iter()
        .sorted_by_key(|row| severity(&row.name).unwrap_or(usize::MAX))
        .map(|row| ClassifiedBucket {
            name: row.name.clone(),
            value: row.value,
            color: color_for(&row.name).to_owned(),
        })
        .collect()
}
