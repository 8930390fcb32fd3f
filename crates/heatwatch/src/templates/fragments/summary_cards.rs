use heatwatch_core::StationSummary;
use maud::{html, Markup};
use time::Date;

/// Summary cards for one reference date.
/// Refreshes itself every five minutes through the summary fragment route.
pub fn summary_cards(date: Date, summary: &StationSummary, danger_threshold: f64) -> Markup {
    html! {
        div id="summary-cards" class="box"
            hx-get=(format!("/fragments/summary?date={}", date))
            hx-trigger="every 300s"
            hx-swap="outerHTML" {
            h2 class="title is-5 mb-4" { "Heat Index Forecast for " (date) }

            @if summary.max_station.is_empty() {
                div class="has-text-centered has-text-grey py-4" {
                    p { "No forecasts issued for this date." }
                    p class="is-size-7" { "Run the forecast model or pick another date." }
                }
            } @else {
                div class="columns is-multiline is-mobile" {
                    div class="column is-half-mobile is-one-fifth-desktop" {
                        div class="stat-card" {
                            div class="stat-value has-text-danger" { (format!("{:.2} °C", summary.max)) }
                            div class="stat-label" { "Highest" }
                            p class="is-size-7 has-text-grey" { (summary.max_station) }
                        }
                    }

                    div class="column is-half-mobile is-one-fifth-desktop" {
                        div class="stat-card" {
                            div class="stat-value has-text-info" { (format!("{:.2} °C", summary.min)) }
                            div class="stat-label" { "Lowest" }
                            p class="is-size-7 has-text-grey" { (summary.min_station) }
                        }
                    }

                    div class="column is-half-mobile is-one-fifth-desktop" {
                        div class="stat-card" {
                            div class="stat-value" { (format!("{:.2} °C", summary.avg)) }
                            div class="stat-label" { "Average" }
                            p class="is-size-7 has-text-grey" { "All stations" }
                        }
                    }

                    div class="column is-half-mobile is-one-fifth-desktop" {
                        div class="stat-card" {
                            div class="stat-value has-text-warning-dark" { (summary.danger_count) }
                            div class="stat-label" { "Stations in Danger" }
                            p class="is-size-7 has-text-grey" { (format!("At or above {} °C", danger_threshold)) }
                        }
                    }

                    div class="column is-half-mobile is-one-fifth-desktop" {
                        div class="stat-card" {
                            div class="stat-value has-text-primary" { (format!("{:+.1} °C", summary.fastest_trend)) }
                            div class="stat-label" { "Fastest Rising" }
                            p class="is-size-7 has-text-grey" { (summary.fastest_station) }
                        }
                    }
                }
            }
        }
    }
}
