use heatwatch_core::ClassifiedBucket;
use maud::{html, Markup};

/// Horizontal bar per heat index band, mildest first
pub fn classification_chart(buckets: &[ClassifiedBucket]) -> Markup {
    let total: u64 = buckets.iter().map(|b| b.value).sum();

    html! {
        div class="box" {
            h2 class="title is-5 mb-4" { "Stations by Classification" }

            @if total == 0 {
                p class="has-text-grey" { "No classified stations." }
            }

            @for bucket in buckets {
                div class="classification-row mb-2" {
                    div class="is-flex is-justify-content-space-between" {
                        span {
                            span class="legend-swatch" style=(format!("background-color: {};", bucket.color)) {}
                            (bucket.name)
                        }
                        strong { (bucket.value) }
                    }
                    div class="classification-bar" {
                        div class="classification-fill"
                            style=(format!("width: {}%; background-color: {};", share(bucket.value, total), bucket.color)) {}
                    }
                }
            }
        }
    }
}

fn share(value: u64, total: u64) -> u64 {
    if total == 0 {
        0
    } else {
        value * 100 / total
    }
}
