use std::sync::Arc;

use axum::{extract::State, Json};
use heatwatch_core::parse_date;
use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{routes::Error, AppState, Observation};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ObservationInput {
    pub station_id: i64,
    /// Calendar day of the observation, YYYY-MM-DD
    pub date: String,
    /// Observed heat index, degrees Celsius
    pub heat_index: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestResult {
    pub received: usize,
    pub stored: u64,
}

#[utoipa::path(
    post,
    path = "/api/observations",
    request_body = Vec<ObservationInput>,
    responses(
        (status = OK, description = "Observations stored; unknown stations and non-finite values are skipped", body = IngestResult),
        (status = BAD_REQUEST, description = "A date is not YYYY-MM-DD", body = crate::routes::ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to store observations", body = crate::routes::ErrorBody)
    ))]
pub async fn add_observations(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Vec<ObservationInput>>,
) -> Result<Json<IngestResult>, Error> {
    let received = body.len();
    let observations = body
        .into_iter()
        .map(|input| -> Result<Observation, Error> {
            Ok(Observation {
                station_id: input.station_id,
                date: parse_date(&input.date)?,
                heat_index: input.heat_index,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let stored = state.heat_db.upsert_observations(observations).await?;
    info!("stored {} of {} observations", stored, received);

    Ok(Json(IngestResult { received, stored }))
}
