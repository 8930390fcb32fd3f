use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
};
use heatwatch_core::summarize_with_threshold;

use crate::{
    routes::{DateQuery, Error},
    templates::fragments::summary_cards,
    AppState,
};

/// Handler for the summary cards fragment (GET /fragments/summary)
pub async fn summary_fragment_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Html<String>, Error> {
    let date = state.settings.reference_date(query.date.as_deref())?;
    let readings = state.heat_db.station_readings(date).await?;
    let summary = summarize_with_threshold(&readings, state.settings.danger_threshold);

    Ok(Html(
        summary_cards(date, &summary, state.settings.danger_threshold).into_string(),
    ))
}
