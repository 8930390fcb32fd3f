use crate::{
    add_observations, classifications, dashboard_handler, forecast_accuracy_report, forecasts,
    get_stations, health, rankings, routes, run_forecast, series, summary,
    summary_fragment_handler, Cache, Cli, Database, ForecastModel, HeatIndexData, MemoryCache,
    RedisCache, ScriptForecastModel,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use heatwatch_core::{
    parse_date, WeekPolicy, WindowError, DANGER_THRESHOLD, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_UTC_OFFSET_HOURS,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::{sync::Arc, time::Duration};
use time::{Date, OffsetDateTime, UtcOffset};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub static_dir: String,
    pub remote_url: String,
    pub heat_db: Arc<dyn HeatIndexData>,
    pub cache: Arc<dyn Cache>,
    pub forecast_model: Arc<dyn ForecastModel>,
    pub settings: DashboardSettings,
}

/// Tunables shared by every dashboard handler
#[derive(Clone, Debug)]
pub struct DashboardSettings {
    pub danger_threshold: f64,
    pub cache_ttl: Duration,
    pub utc_offset: UtcOffset,
    pub week_policy: WeekPolicy,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            danger_threshold: DANGER_THRESHOLD,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            utc_offset: UtcOffset::from_hms(DEFAULT_UTC_OFFSET_HOURS, 0, 0)
                .unwrap_or(UtcOffset::UTC),
            week_policy: WeekPolicy::default(),
        }
    }
}

impl DashboardSettings {
    /// The current calendar day at the configured offset
    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.utc_offset).date()
    }

    /// The requested date, or today when none (or an empty string) was given
    pub fn reference_date(&self, raw: Option<&str>) -> Result<Date, WindowError> {
        match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_date(raw),
            _ => Ok(self.today()),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::stations::station_routes::get_stations,
        routes::dashboard::dashboard_routes::summary,
        routes::dashboard::dashboard_routes::series,
        routes::dashboard::dashboard_routes::classifications,
        routes::dashboard::dashboard_routes::rankings,
        routes::forecasts::forecast_routes::forecasts,
        routes::forecasts::forecast_routes::forecast_accuracy_report,
        routes::forecasts::forecast_routes::run_forecast,
        routes::observations::observation_routes::add_observations,
        routes::health::health,
    ),
    components(
        schemas(
                crate::Station,
                crate::StationForecast,
                crate::ModelForecast,
                crate::ForecastRun,
                routes::ErrorBody,
                routes::HealthStatus,
                routes::ClassifiedForecast,
                routes::RunForecastRequest,
                routes::ObservationInput,
                routes::IngestResult
            )
    ),
    tags(
        (name = "heatwatch api", description = "heat index summaries, series and forecasts for Philippine weather stations")
    )
)]
struct ApiDoc;

pub async fn build_app_state(cli: &Cli, db: Arc<Database>) -> Result<AppState, anyhow::Error> {
    let cache: Arc<dyn Cache> = match cli.redis_url.as_deref() {
        Some(url) => {
            info!("caching responses in redis");
            Arc::new(
                RedisCache::connect(url)
                    .await
                    .map_err(|e| anyhow!("error connecting to redis: {}", e))?,
            )
        }
        None => {
            info!("caching responses in memory");
            Arc::new(MemoryCache::new())
        }
    };

    let forecast_model = ScriptForecastModel::new(
        cli.forecast_program(),
        vec![cli.forecast_script()],
        cli.forecast_timeout(),
    );

    Ok(AppState {
        static_dir: cli.static_dir(),
        remote_url: cli.remote_url(),
        heat_db: db,
        cache,
        forecast_model: Arc::new(forecast_model),
        settings: cli.dashboard_settings()?,
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let serve_static = ServeDir::new(&app_state.static_dir);
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        // UI routes
        .route("/", get(dashboard_handler))
        // HTMX fragment routes
        .route("/fragments/summary", get(summary_fragment_handler))
        // API routes
        .route("/api/stations", get(get_stations))
        .route("/api/summary", get(summary))
        .route("/api/series", get(series))
        .route("/api/classifications", get(classifications))
        .route("/api/rankings", get(rankings))
        .route("/api/forecasts", get(forecasts))
        .route("/api/forecasts/accuracy", get(forecast_accuracy_report))
        .route("/api/forecasts/run", post(run_forecast))
        .route("/api/observations", post(add_observations))
        .route("/health", get(health))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .nest_service("/static", serve_static)
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_owned();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
