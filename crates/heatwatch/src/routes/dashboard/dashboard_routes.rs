use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use heatwatch_core::{
    classify_and_color, count_by_classification, normalize, rank_stations, resolve_window_with,
    summarize_with_threshold, ClassifiedBucket, RankedStation, SeriesPoint, StationSummary,
};

use crate::{
    cache::get_or_load,
    routes::{DateQuery, Error, SeriesQuery},
    AppState, SERIES_METRICS,
};

#[utoipa::path(
    get,
    path = "/api/summary",
    params(DateQuery),
    responses(
        (status = OK, description = "Max, min, average, danger count and fastest rising station for the date"),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = crate::routes::ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read heat index data", body = crate::routes::ErrorBody)
    ))]
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<StationSummary>, Error> {
    let date = state.settings.reference_date(query.date.as_deref())?;

    let summary = get_or_load(
        state.cache.as_ref(),
        &format!("summary:{}", date),
        state.settings.cache_ttl,
        || async {
            let readings = state.heat_db.station_readings(date).await?;
            Ok::<_, Error>(summarize_with_threshold(
                &readings,
                state.settings.danger_threshold,
            ))
        },
    )
    .await?;

    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/series",
    params(SeriesQuery),
    responses(
        (status = OK, description = "One point per day of the window with observed and forecasted averages"),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD or period is not week/month", body = crate::routes::ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read heat index data", body = crate::routes::ErrorBody)
    ))]
pub async fn series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<Vec<SeriesPoint>>, Error> {
    let reference = state.settings.reference_date(query.date.as_deref())?;
    let period = query.period()?;
    let window = resolve_window_with(reference, period, state.settings.week_policy)?;
    let station = query
        .station
        .map(|id| id.to_string())
        .unwrap_or_else(|| String::from("all"));

    let points = get_or_load(
        state.cache.as_ref(),
        &format!("series:{}:{}:{}", reference, period, station),
        state.settings.cache_ttl,
        || async {
            let rows = state.heat_db.daily_series(window, query.station).await?;
            Ok::<_, Error>(normalize(&window, reference, &rows, SERIES_METRICS))
        },
    )
    .await?;

    Ok(Json(points))
}

#[utoipa::path(
    get,
    path = "/api/classifications",
    params(DateQuery),
    responses(
        (status = OK, description = "Station counts per heat index band, mildest first, with band colors"),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = crate::routes::ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read heat index data", body = crate::routes::ErrorBody)
    ))]
pub async fn classifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<ClassifiedBucket>>, Error> {
    let date = state.settings.reference_date(query.date.as_deref())?;

    let buckets = get_or_load(
        state.cache.as_ref(),
        &format!("classifications:{}", date),
        state.settings.cache_ttl,
        || async {
            let (readings, thresholds) = tokio::try_join!(
                state.heat_db.station_readings(date),
                state.heat_db.thresholds()
            )?;
            let counts =
                count_by_classification(readings.iter().map(|r| r.forecasted), &thresholds);
            Ok::<_, Error>(classify_and_color(&counts))
        },
    )
    .await?;

    Ok(Json(buckets))
}

#[utoipa::path(
    get,
    path = "/api/rankings",
    params(DateQuery),
    responses(
        (status = OK, description = "Stations ordered hottest first"),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = crate::routes::ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read heat index data", body = crate::routes::ErrorBody)
    ))]
pub async fn rankings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<RankedStation>>, Error> {
    let date = state.settings.reference_date(query.date.as_deref())?;

    let ranked = get_or_load(
        state.cache.as_ref(),
        &format!("rankings:{}", date),
        state.settings.cache_ttl,
        || async {
            let readings = state.heat_db.station_readings(date).await?;
            Ok::<_, Error>(rank_stations(&readings))
        },
    )
    .await?;

    Ok(Json(ranked))
}
