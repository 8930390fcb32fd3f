use async_trait::async_trait;
use heatwatch_core::window::iso_date;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{process::Stdio, time::Duration};
use time::Date;
use tokio::process::Command;
use utoipa::ToSchema;

use crate::db::{self, HeatIndexData};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to start forecast model `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Forecast model did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Forecast model reported an error: {0}")]
    Model(String),
    #[error("Forecast model exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("Forecast model printed no forecasts")]
    NoOutput,
    #[error("Failed to store forecasts: {0}")]
    Store(#[from] db::Error),
}

/// Next-day and day-after heat index forecast for one station
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ModelForecast {
    pub station_id: i64,
    #[serde(alias = "tomorrow")]
    pub t1_forecast: f64,
    #[serde(alias = "day_after_tomorrow")]
    pub t2_forecast: f64,
}

/// Produces forecasts for every station it knows, issued on `date`.
#[async_trait]
pub trait ForecastModel: Sync + Send {
    async fn run(&self, date: Date) -> Result<Vec<ModelForecast>, Error>;
}

/// Runs an external program as `program [args..] YYYY-MM-DD` and reads its stdout.
///
/// The program prints a JSON array of forecasts on one line, or an object with
/// an `error` field. Other lines (progress output, metrics) are ignored.
pub struct ScriptForecastModel {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ScriptForecastModel {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl ForecastModel for ScriptForecastModel {
    async fn run(&self, date: Date) -> Result<Vec<ModelForecast>, Error> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(date.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(
            "running forecast model: {} {} {}",
            self.program,
            self.args.join(" "),
            date
        );

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("forecast model stderr: {}", stderr.trim());
        }

        let parsed = parse_model_output(&String::from_utf8_lossy(&output.stdout));
        if output.status.success() {
            return parsed;
        }

        match parsed {
            Err(Error::Model(message)) => Err(Error::Model(message)),
            _ => Err(Error::Exit {
                status: output.status.to_string(),
                stderr: stderr.trim().to_owned(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct ModelFailure {
    error: String,
}

/// Pick the forecast payload out of the model's stdout, scanning from the last line.
pub fn parse_model_output(stdout: &str) -> Result<Vec<ModelForecast>, Error> {
    for line in stdout.lines().rev().map(str::trim) {
        if line.starts_with('[') {
            if let Ok(forecasts) = serde_json::from_str::<Vec<ModelForecast>>(line) {
                return Ok(forecasts);
            }
        } else if line.starts_with('{') {
            if let Ok(failure) = serde_json::from_str::<ModelFailure>(line) {
                return Err(Error::Model(failure.error));
            }
        }
    }
    Err(Error::NoOutput)
}

/// Outcome of one model run
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRun {
    #[serde(with = "iso_date")]
    pub issued_on: Date,
    /// Forecasts the model printed
    pub received: usize,
    /// Rows written to storage
    pub stored: u64,
    pub forecasts: Vec<ModelForecast>,
}

/// Run the model for `date` and store what it produced as issued on that date.
pub async fn run_and_store(
    model: &dyn ForecastModel,
    store: &dyn HeatIndexData,
    date: Date,
) -> Result<ForecastRun, Error> {
    let forecasts = model.run(date).await?;
    let received = forecasts.len();

    let (usable, rejected): (Vec<ModelForecast>, Vec<ModelForecast>) = forecasts
        .into_iter()
        .partition(|f| f.t1_forecast.is_finite() && f.t2_forecast.is_finite());
    for forecast in &rejected {
        warn!(
            "dropping non-finite forecast for station {}",
            forecast.station_id
        );
    }

    let stored = store.upsert_forecasts(date, usable.clone()).await?;
    info!(
        "stored {} of {} forecasts issued on {}",
        stored, received, date
    );

    Ok(ForecastRun {
        issued_on: date,
        received,
        stored,
        forecasts: usable,
    })
}
