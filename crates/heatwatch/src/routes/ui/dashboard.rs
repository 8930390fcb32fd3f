use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
};
use heatwatch_core::{
    classify_and_color, count_by_classification, normalize, rank_stations, resolve_window_with,
    summarize_with_threshold, Period,
};
use log::error;
use time::Date;

use crate::{
    routes::{DateQuery, Error},
    templates::{dashboard_page, DashboardData},
    AppState, SERIES_METRICS,
};

/// Handler for the dashboard page (GET /)
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Html<String>, Error> {
    let reference = state.settings.reference_date(query.date.as_deref())?;
    let data = build_dashboard_data(&state, reference).await?;
    Ok(Html(dashboard_page(&state.remote_url, &data).into_string()))
}

/// A storage failure renders an empty section instead of failing the page.
async fn build_dashboard_data(state: &AppState, reference: Date) -> Result<DashboardData, Error> {
    let window = resolve_window_with(reference, Period::Week, state.settings.week_policy)?;

    let (readings, thresholds, rows) = tokio::join!(
        state.heat_db.station_readings(reference),
        state.heat_db.thresholds(),
        state.heat_db.daily_series(window, None)
    );

    let readings = readings.unwrap_or_else(|e| {
        error!("error loading station readings for {}: {}", reference, e);
        Vec::new()
    });
    let thresholds = thresholds.unwrap_or_else(|e| {
        error!("error loading classification thresholds: {}", e);
        Vec::new()
    });
    let rows = rows.unwrap_or_else(|e| {
        error!("error loading daily series for {}: {}", reference, e);
        Vec::new()
    });

    let counts = count_by_classification(readings.iter().map(|r| r.forecasted), &thresholds);

    Ok(DashboardData {
        reference,
        summary: summarize_with_threshold(&readings, state.settings.danger_threshold),
        danger_threshold: state.settings.danger_threshold,
        buckets: classify_and_color(&counts),
        rankings: rank_stations(&readings),
        series: normalize(&window, reference, &rows, SERIES_METRICS),
        thresholds,
    })
}
