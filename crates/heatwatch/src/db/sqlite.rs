use async_trait::async_trait;
use heatwatch_core::{parse_date, ForecastActual, SeriesRow, StationReading, Threshold, Window};
use log::{info, warn};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Sqlite, Transaction,
};
use std::{collections::HashSet, future::Future, path::Path, str::FromStr, time::Duration};
use time::Date;
use tokio::{
    fs::create_dir_all,
    sync::{mpsc, oneshot},
};

use super::{
    Error, HeatIndexData, Observation, Station, StationForecast, FORECASTED, OBSERVED,
};
use crate::ModelForecast;

type WriteOperation = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;

/// Single task that owns every write, so SQLite never sees two writers at once.
pub struct DatabaseWriter {
    pool: SqlitePool,
    queue: mpsc::UnboundedSender<WriteOperation>,
    _worker: tokio::task::JoinHandle<()>,
}

impl DatabaseWriter {
    pub fn new(pool: SqlitePool) -> Self {
        let (queue, mut pending) = mpsc::unbounded_channel::<WriteOperation>();

        let worker = tokio::spawn(async move {
            while let Some(write) = pending.recv().await {
                write.await;
            }
        });

        Self {
            pool,
            queue,
            _worker: worker,
        }
    }

    /// Queue `operation` behind earlier writes and wait for its result.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let (done, result) = oneshot::channel::<Result<T, Error>>();
        let pool = self.pool.clone();

        self.queue
            .send(Box::pin(async move {
                let _ = done.send(operation(pool).await);
            }))
            .map_err(|_| Error::WriterClosed)?;

        result.await.map_err(|_| Error::WriterClosed)?
    }
}

pub struct Database {
    pool: SqlitePool,
    writer: DatabaseWriter,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self, Error> {
        let db_path = format!("{}/heatwatch.sqlite", path);

        if let Some(parent) = Path::new(&db_path).parent() {
            create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("foreign_keys", "ON")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let db = Self::with_pool(pool).await?;
        info!("SQLite database initialized at: {}", db_path);
        Ok(db)
    }

    /// A private in-memory database with migrations and seed data applied.
    ///
    /// Pinned to one connection that never expires; each new connection to
    /// `sqlite::memory:` would otherwise be a different, empty database.
    pub async fn in_memory() -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, Error> {
        let db = Self {
            writer: DatabaseWriter::new(pool.clone()),
            pool,
        };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Flush the WAL into the main database file before shutdown.
    pub async fn checkpoint(&self) {
        match sqlx::query("PRAGMA wal_checkpoint(TRUNCATE);")
            .execute(&self.pool)
            .await
        {
            Ok(_) => info!("WAL checkpoint completed successfully"),
            Err(e) => log::error!("WAL checkpoint failed: {}", e),
        }
    }
}

async fn known_station_ids(tx: &mut Transaction<'_, Sqlite>) -> Result<HashSet<i64>, Error> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM stations")
        .fetch_all(&mut **tx)
        .await?;
    Ok(ids.into_iter().collect())
}

#[async_trait]
impl HeatIndexData for Database {
    async fn stations(&self) -> Result<Vec<Station>, Error> {
        let stations = sqlx::query_as::<_, Station>(
            "SELECT id, name, province, latitude, longitude, elevation_m
             FROM stations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stations)
    }

    async fn station_readings(&self, date: Date) -> Result<Vec<StationReading>, Error> {
        let rows: Vec<(String, f64, f64)> = sqlx::query_as(
            "SELECT s.name, f.t1_forecast, f.t2_forecast
             FROM forecasts f
             JOIN stations s ON s.id = f.station_id
             WHERE f.issued_on = ?1
             ORDER BY s.id",
        )
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, t1, t2)| StationReading::new(name, t1, t2 - t1))
            .collect())
    }

    async fn daily_series(
        &self,
        window: Window,
        station_id: Option<i64>,
    ) -> Result<Vec<SeriesRow>, Error> {
        let rows: Vec<(String, Option<f64>, Option<f64>)> = sqlx::query_as(
            "WITH observed AS (
                 SELECT date AS day, AVG(heat_index) AS observed, NULL AS forecasted
                 FROM observations
                 WHERE date BETWEEN ?1 AND ?2
                   AND (?3 IS NULL OR station_id = ?3)
                 GROUP BY date
             ),
             forecasted AS (
                 SELECT date(issued_on, '+1 day') AS day, NULL AS observed,
                        AVG(t1_forecast) AS forecasted
                 FROM forecasts
                 WHERE date(issued_on, '+1 day') BETWEEN ?1 AND ?2
                   AND (?3 IS NULL OR station_id = ?3)
                 GROUP BY date(issued_on, '+1 day')
             )
             SELECT day, MAX(observed), MAX(forecasted)
             FROM (SELECT * FROM observed UNION ALL SELECT * FROM forecasted)
             GROUP BY day
             ORDER BY day",
        )
        .bind(window.start().to_string())
        .bind(window.end().to_string())
        .bind(station_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(day, observed, forecasted)| {
                SeriesRow::parse(&day, [(OBSERVED, observed), (FORECASTED, forecasted)])
                    .map_err(Error::from)
            })
            .collect()
    }

    async fn thresholds(&self) -> Result<Vec<Threshold>, Error> {
        let rows: Vec<(String, f64)> =
            sqlx::query_as("SELECT name, min_value FROM classifications ORDER BY min_value")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(name, min_value)| Threshold::new(name, min_value))
            .collect())
    }

    async fn station_forecasts(&self, date: Date) -> Result<Vec<StationForecast>, Error> {
        #[allow(clippy::type_complexity)]
        let rows: Vec<(i64, String, String, f64, f64, String, f64, f64)> = sqlx::query_as(
            "SELECT s.id, s.name, s.province, s.latitude, s.longitude,
                    f.issued_on, f.t1_forecast, f.t2_forecast
             FROM forecasts f
             JOIN stations s ON s.id = f.station_id
             WHERE f.issued_on = ?1
             ORDER BY s.id",
        )
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(
                |(station_id, station_name, province, latitude, longitude, issued_on, t1, t2)|
                 -> Result<StationForecast, Error> {
                    Ok(StationForecast {
                        station_id,
                        station_name,
                        province,
                        latitude,
                        longitude,
                        issued_on: parse_date(&issued_on)?,
                        t1_forecast: t1,
                        t2_forecast: t2,
                    })
                },
            )
            .collect()
    }

    async fn forecast_actuals(&self, date: Date) -> Result<Vec<ForecastActual>, Error> {
        let rows: Vec<(i64, String, f64, f64, Option<f64>, Option<f64>)> = sqlx::query_as(
            "SELECT s.id, s.name, f.t1_forecast, f.t2_forecast,
                    o1.heat_index, o2.heat_index
             FROM forecasts f
             JOIN stations s ON s.id = f.station_id
             LEFT JOIN observations o1
                    ON o1.station_id = f.station_id AND o1.date = date(f.issued_on, '+1 day')
             LEFT JOIN observations o2
                    ON o2.station_id = f.station_id AND o2.date = date(f.issued_on, '+2 day')
             WHERE f.issued_on = ?1
             ORDER BY s.id",
        )
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(station_id, station_name, t1_forecast, t2_forecast, actual_t1, actual_t2)| {
                    ForecastActual {
                        station_id,
                        station_name,
                        t1_forecast,
                        t2_forecast,
                        actual_t1,
                        actual_t2,
                    }
                },
            )
            .collect())
    }

    async fn upsert_forecasts(
        &self,
        issued_on: Date,
        forecasts: Vec<ModelForecast>,
    ) -> Result<u64, Error> {
        let issued_on = issued_on.to_string();

        self.writer
            .execute(move |pool| async move {
                let mut tx = pool.begin().await?;
                let known = known_station_ids(&mut tx).await?;
                let mut stored = 0;

                for forecast in forecasts {
                    if !known.contains(&forecast.station_id) {
                        warn!(
                            "skipping forecast for unknown station {}",
                            forecast.station_id
                        );
                        continue;
                    }

                    stored += sqlx::query(
                        "INSERT INTO forecasts (station_id, issued_on, t1_forecast, t2_forecast)
                         VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(station_id, issued_on) DO UPDATE SET
                             t1_forecast = excluded.t1_forecast,
                             t2_forecast = excluded.t2_forecast,
                             updated_at = strftime('%s', 'now')",
                    )
                    .bind(forecast.station_id)
                    .bind(&issued_on)
                    .bind(forecast.t1_forecast)
                    .bind(forecast.t2_forecast)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                }

                tx.commit().await?;
                Ok(stored)
            })
            .await
    }

    async fn upsert_observations(&self, observations: Vec<Observation>) -> Result<u64, Error> {
        self.writer
            .execute(move |pool| async move {
                let mut tx = pool.begin().await?;
                let known = known_station_ids(&mut tx).await?;
                let mut stored = 0;

                for observation in observations {
                    if !observation.heat_index.is_finite() {
                        warn!(
                            "skipping non-finite observation for station {} on {}",
                            observation.station_id, observation.date
                        );
                        continue;
                    }
                    if !known.contains(&observation.station_id) {
                        warn!(
                            "skipping observation for unknown station {}",
                            observation.station_id
                        );
                        continue;
                    }

                    stored += sqlx::query(
                        "INSERT INTO observations (station_id, date, heat_index)
                         VALUES (?1, ?2, ?3)
                         ON CONFLICT(station_id, date) DO UPDATE SET
                             heat_index = excluded.heat_index,
                             recorded_at = strftime('%s', 'now')",
                    )
                    .bind(observation.station_id)
                    .bind(observation.date.to_string())
                    .bind(observation.heat_index)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                }

                tx.commit().await?;
                Ok(stored)
            })
            .await
    }

    /// Connectivity plus SQLite's page structure check.
    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await?;
        if result != "ok" {
            return Err(Error::Integrity(result));
        }

        Ok(())
    }
}
