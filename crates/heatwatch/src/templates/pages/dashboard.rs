use heatwatch_core::{ClassifiedBucket, RankedStation, SeriesPoint, StationSummary, Threshold};
use maud::{html, Markup};
use time::Date;

use crate::templates::{
    fragments::{classification_chart, rankings_table, series_table, summary_cards},
    layouts::{base, PageConfig},
};

/// Dashboard page data
pub struct DashboardData {
    pub reference: Date,
    pub summary: StationSummary,
    pub danger_threshold: f64,
    pub buckets: Vec<ClassifiedBucket>,
    pub rankings: Vec<RankedStation>,
    pub thresholds: Vec<Threshold>,
    pub series: Vec<SeriesPoint>,
}

pub fn dashboard_page(api_base: &str, data: &DashboardData) -> Markup {
    let config = PageConfig {
        title: "Heatwatch PH - Heat Index Dashboard",
        api_base,
    };

    base(&config, dashboard_content(data))
}

/// Date picker followed by the summary, classification, ranking and series sections
fn dashboard_content(data: &DashboardData) -> Markup {
    html! {
        form method="get" action="/" class="field has-addons mb-4" {
            div class="control" {
                input class="input is-small" type="date" name="date" value=(data.reference);
            }
            div class="control" {
                button class="button is-small is-link" type="submit" { "Show" }
            }
        }

        (summary_cards(data.reference, &data.summary, data.danger_threshold))

        div class="columns mt-4" {
            div class="column is-one-third" {
                (classification_chart(&data.buckets))
                (series_table(&data.series))
            }
            div class="column" {
                (rankings_table(&data.rankings, &data.thresholds))
            }
        }
    }
}
