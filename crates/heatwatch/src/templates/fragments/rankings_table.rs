use heatwatch_core::{classify, color_for, RankedStation, Threshold, UNKNOWN_COLOR};
use maud::{html, Markup};

pub fn rankings_table(ranked: &[RankedStation], thresholds: &[Threshold]) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5 mb-4" { "Station Rankings" }

            @if ranked.is_empty() {
                div class="has-text-centered has-text-grey py-4" {
                    p { "No station forecasts for this date." }
                }
            } @else {
                div class="table-container" {
                    table class="table is-fullwidth is-striped is-hoverable" {
                        thead {
                            tr {
                                th { "#" }
                                th { "Station" }
                                th class="has-text-right" { "Forecast (°C)" }
                                th class="has-text-right" { "24h Trend" }
                                th { "Classification" }
                            }
                        }
                        tbody {
                            @for station in ranked {
                                @let band = classify(station.forecasted, thresholds);
                                tr {
                                    td { (station.rank) }
                                    td { (station.name) }
                                    td class="has-text-right" { (format!("{:.2}", station.forecasted)) }
                                    td class=(trend_class(station.trend)) { (format!("{:+.1}", station.trend)) }
                                    td {
                                        span class="tag"
                                            style=(format!("background-color: {}; color: #fff;", band.map(color_for).unwrap_or(UNKNOWN_COLOR))) {
                                            (band.unwrap_or("Not classified"))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn trend_class(trend: f64) -> &'static str {
    if trend > 0.0 {
        "has-text-right has-text-danger"
    } else if trend < 0.0 {
        "has-text-right has-text-info"
    } else {
        "has-text-right"
    }
}
