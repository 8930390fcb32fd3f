//! Heat index dashboard server: SQLite storage, response cache, forecast
//! model runner, JSON API and the server-rendered dashboard.

pub mod cache;
pub mod db;
pub mod forecast_model;
pub mod routes;
mod startup;
pub mod templates;
mod utils;

pub use cache::{get_or_load, Cache, MemoryCache, RedisCache};
pub use db::{
    Database, HeatIndexData, Observation, Station, StationForecast, FORECASTED,
    OBSERVED, SERIES_METRICS,
};
pub use forecast_model::{
    parse_model_output, run_and_store, ForecastModel, ForecastRun, ModelForecast,
    ScriptForecastModel,
};
pub use routes::{
    add_observations, classifications, dashboard_handler, forecast_accuracy_report, forecasts,
    get_stations, health, rankings, run_forecast, series, summary, summary_fragment_handler,
};
pub use startup::*;
pub use utils::*;
