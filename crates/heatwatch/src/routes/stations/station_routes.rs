use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{cache::get_or_load, routes::Error, AppState, Station};

#[utoipa::path(
    get,
    path = "/api/stations",
    responses(
        (status = OK, description = "Successfully retrieved weather stations", body = Vec<Station>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to retrieve weather stations", body = crate::routes::ErrorBody)
    ))]
pub async fn get_stations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Station>>, Error> {
    let stations = get_or_load(
        state.cache.as_ref(),
        "stations",
        state.settings.cache_ttl,
        || async { Ok::<_, Error>(state.heat_db.stations().await?) },
    )
    .await?;

    Ok(Json(stations))
}
