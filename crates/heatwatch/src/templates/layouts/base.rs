use maud::{html, Markup, DOCTYPE};

pub struct PageConfig<'a> {
    pub title: &'a str,
    /// Public server URL, used for the links to the JSON feeds
    pub api_base: &'a str,
}

pub fn base(config: &PageConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.title) }
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bulma@1.0.4/css/bulma.min.css";
                link rel="stylesheet" href="/static/styles.css";
                script src="https://cdn.jsdelivr.net/npm/htmx.org@1.9.10/dist/htmx.min.js" {}
            }
            body {
                header class="hero is-warning is-small" {
                    div class="hero-body" {
                        div class="container level is-mobile" {
                            div class="level-left" {
                                a href="/" class="level-item has-text-current" {
                                    div {
                                        p class="title is-4" { "Heatwatch PH" }
                                        p class="subtitle is-6" { "Heat index at Philippine synoptic stations" }
                                    }
                                }
                            }
                            div class="level-right" {
                                a href="/docs" class="level-item button is-dark is-small" { "API Docs" }
                            }
                        }
                    }
                }

                main class="section" {
                    div id="main-content" class="container" {
                        (content)
                    }
                }

                footer class="footer py-4" {
                    div class="content has-text-centered is-size-7" {
                        "JSON feeds: "
                        a href=(format!("{}/api/series?period=Month", config.api_base)) { "series" }
                        " · "
                        a href=(format!("{}/api/forecasts", config.api_base)) { "forecasts" }
                        " · "
                        a href=(format!("{}/api/stations", config.api_base)) { "stations" }
                    }
                }
            }
        }
    }
}
