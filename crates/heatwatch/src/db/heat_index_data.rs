use async_trait::async_trait;
use heatwatch_core::{
    window::iso_date, ForecastActual, SeriesRow, StationReading, Threshold, Window, WindowError,
};
use serde::{Deserialize, Serialize};
use time::Date;
use utoipa::ToSchema;

use crate::ModelForecast;

/// Daily average of observed heat index across the selected stations
pub const OBSERVED: &str = "observed";
/// Daily average of the next-day forecast that targeted that day
pub const FORECASTED: &str = "forecasted";
/// Metric keys carried by every series row and point
pub const SERIES_METRICS: &[&str] = &[OBSERVED, FORECASTED];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Failed to run database migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored date is not a calendar date: {0}")]
    StoredDate(#[from] WindowError),
    #[error("Database writer channel closed")]
    WriterClosed,
    #[error("Database integrity check failed: {0}")]
    Integrity(String),
}

/// Read and write access to the heat index store.
///
/// The dashboard routes only talk to this trait so tests can swap in a mock.
#[async_trait]
pub trait HeatIndexData: Sync + Send {
    async fn stations(&self) -> Result<Vec<Station>, Error>;
    /// Forecasts issued on `date`, one reading per station, with the 24h trend
    async fn station_readings(&self, date: Date) -> Result<Vec<StationReading>, Error>;
    /// Sparse daily rows inside `window`, keyed by [`SERIES_METRICS`]
    async fn daily_series(
        &self,
        window: Window,
        station_id: Option<i64>,
    ) -> Result<Vec<SeriesRow>, Error>;
    async fn thresholds(&self) -> Result<Vec<Threshold>, Error>;
    async fn station_forecasts(&self, date: Date) -> Result<Vec<StationForecast>, Error>;
    /// Forecasts issued on `date` joined with the observations for their target days
    async fn forecast_actuals(&self, date: Date) -> Result<Vec<ForecastActual>, Error>;
    /// Store forecasts issued on `issued_on`, replacing earlier runs for the same day.
    /// Returns how many rows were written; unknown station ids are skipped.
    async fn upsert_forecasts(
        &self,
        issued_on: Date,
        forecasts: Vec<ModelForecast>,
    ) -> Result<u64, Error>;
    async fn upsert_observations(&self, observations: Vec<Observation>) -> Result<u64, Error>;
    async fn health_check(&self) -> Result<(), Error>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationForecast {
    pub station_id: i64,
    pub station_name: String,
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "iso_date")]
    pub issued_on: Date,
    /// Heat index forecast for the day after `issued_on`
    pub t1_forecast: f64,
    /// Heat index forecast for two days after `issued_on`
    pub t2_forecast: f64,
}

/// A daily observed heat index for one station
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub station_id: i64,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub heat_index: f64,
}
