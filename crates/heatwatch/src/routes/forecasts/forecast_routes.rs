use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use heatwatch_core::{classify, color_for, forecast_accuracy, AccuracyReport, UNKNOWN_COLOR};
use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cache::get_or_load,
    forecast_model::{run_and_store, ForecastRun},
    routes::{DateQuery, Error},
    AppState, StationForecast,
};

/// A stored forecast with the band its next-day value falls in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedForecast {
    #[serde(flatten)]
    pub forecast: StationForecast,
    pub classification: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RunForecastRequest {
    /// Issue date as YYYY-MM-DD, defaults to today in Philippine time
    pub date: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/forecasts",
    params(DateQuery),
    responses(
        (status = OK, description = "Forecasts issued on the date, classified by next-day heat index", body = Vec<ClassifiedForecast>),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = crate::routes::ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read heat index data", body = crate::routes::ErrorBody)
    ))]
pub async fn forecasts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<ClassifiedForecast>>, Error> {
    let date = state.settings.reference_date(query.date.as_deref())?;

    let forecasts = get_or_load(
        state.cache.as_ref(),
        &format!("forecasts:{}", date),
        state.settings.cache_ttl,
        || async {
            let (forecasts, thresholds) = tokio::try_join!(
                state.heat_db.station_forecasts(date),
                state.heat_db.thresholds()
            )?;

            Ok::<_, Error>(
                forecasts
                    .into_iter()
                    .map(|forecast| {
                        let classification =
                            classify(forecast.t1_forecast, &thresholds).map(str::to_owned);
                        let color = classification
                            .as_deref()
                            .map(color_for)
                            .unwrap_or(UNKNOWN_COLOR)
                            .to_owned();
                        ClassifiedForecast {
                            forecast,
                            classification,
                            color,
                        }
                    })
                    .collect::<Vec<_>>(),
            )
        },
    )
    .await?;

    Ok(Json(forecasts))
}

#[utoipa::path(
    get,
    path = "/api/forecasts/accuracy",
    params(DateQuery),
    responses(
        (status = OK, description = "Absolute error of the forecasts issued on the date against what was observed"),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = crate::routes::ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read heat index data", body = crate::routes::ErrorBody)
    ))]
pub async fn forecast_accuracy_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<AccuracyReport>, Error> {
    let date = state.settings.reference_date(query.date.as_deref())?;

    let report = get_or_load(
        state.cache.as_ref(),
        &format!("accuracy:{}", date),
        state.settings.cache_ttl,
        || async {
            let rows = state.heat_db.forecast_actuals(date).await?;
            Ok::<_, Error>(forecast_accuracy(&rows))
        },
    )
    .await?;

    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/forecasts/run",
    request_body = RunForecastRequest,
    responses(
        (status = OK, description = "Model ran and its forecasts were stored", body = ForecastRun),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = crate::routes::ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to store forecasts", body = crate::routes::ErrorBody),
        (status = BAD_GATEWAY, description = "Forecast model failed or timed out", body = crate::routes::ErrorBody)
    ))]
pub async fn run_forecast(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunForecastRequest>,
) -> Result<Json<ForecastRun>, Error> {
    let date = state.settings.reference_date(body.date.as_deref())?;
    info!("running forecast model for {}", date);

    let run = run_and_store(
        state.forecast_model.as_ref(),
        state.heat_db.as_ref(),
        date,
    )
    .await?;

    Ok(Json(run))
}
