use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use log::error;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Database is reachable and passes its integrity check", body = HealthStatus),
        (status = SERVICE_UNAVAILABLE, description = "Database check failed", body = HealthStatus)
    ))]
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.heat_db.health_check().await {
        Ok(()) => Json(HealthStatus {
            status: String::from("ok"),
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: String::from("unavailable"),
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}
