use axum::{
    response::{IntoResponse, Response},
    Json,
};
use heatwatch_core::WindowError;
use hyper::StatusCode;
use log::error;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{db, forecast_model};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to validate request: {0}")]
    Request(#[from] WindowError),
    #[error("Failed to get heat index data: {0}")]
    HeatIndexData(#[from] db::Error),
    #[error("Failed to run forecast model: {0}")]
    ForecastModel(#[from] forecast_model::Error),
}

/// Body of every non-2xx API response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Request(_) => StatusCode::BAD_REQUEST,
            Error::HeatIndexData(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::ForecastModel(forecast_model::Error::Store(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Error::ForecastModel(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("error handling request: {}", self);

        let status = self.status();
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => String::from("internal error"),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
