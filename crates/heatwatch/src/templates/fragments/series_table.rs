use heatwatch_core::SeriesPoint;
use maud::{html, Markup};

use crate::{FORECASTED, OBSERVED};

/// Daily observed and forecasted averages for the selected window.
/// Zero means no data for that day.
pub fn series_table(points: &[SeriesPoint]) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5 mb-4" { "Daily Averages" }
            div class="table-container" {
                table class="table is-fullwidth is-narrow" {
                    thead {
                        tr {
                            th { "Date" }
                            th class="has-text-right" { "Observed (°C)" }
                            th class="has-text-right" { "Forecasted (°C)" }
                        }
                    }
                    tbody {
                        @for point in points {
                            tr {
                                td { (point.date) }
                                td class="has-text-right" { (reading(point.value(OBSERVED))) }
                                td class="has-text-right" { (reading(point.value(FORECASTED))) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn reading(value: f64) -> String {
    if value == 0.0 {
        String::from("–")
    } else {
        format!("{:.1}", value)
    }
}
