use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::Request,
    Router,
};
use heatwatch::{
    app, db::Error, forecast_model, AppState, DashboardSettings, ForecastModel, HeatIndexData,
    MemoryCache, ModelForecast, Observation, Station, StationForecast,
};
use heatwatch_core::{ForecastActual, SeriesRow, StationReading, Threshold, Window};
use hyper::{header, Method, StatusCode};
use mockall::mock;
use serde_json::Value;
use std::sync::Arc;
use time::Date;
use tower::ServiceExt;

mock! {
    pub HeatIndexAccess {}
    #[async_trait]
    impl HeatIndexData for HeatIndexAccess {
        async fn stations(&self) -> Result<Vec<Station>, Error>;
        async fn station_readings(&self, date: Date) -> Result<Vec<StationReading>, Error>;
        async fn daily_series(
            &self,
            window: Window,
            station_id: Option<i64>,
        ) -> Result<Vec<SeriesRow>, Error>;
        async fn thresholds(&self) -> Result<Vec<Threshold>, Error>;
        async fn station_forecasts(&self, date: Date) -> Result<Vec<StationForecast>, Error>;
        async fn forecast_actuals(&self, date: Date) -> Result<Vec<ForecastActual>, Error>;
        async fn upsert_forecasts(
            &self,
            issued_on: Date,
            forecasts: Vec<ModelForecast>,
        ) -> Result<u64, Error>;
        async fn upsert_observations(&self, observations: Vec<Observation>) -> Result<u64, Error>;
        async fn health_check(&self) -> Result<(), Error>;
    }
}

mock! {
    pub Model {}
    #[async_trait]
    impl ForecastModel for Model {
        async fn run(&self, date: Date) -> Result<Vec<ModelForecast>, forecast_model::Error>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub async fn spawn_app(heat_db: Arc<dyn HeatIndexData>) -> TestApp {
    spawn_app_with_model(heat_db, Arc::new(MockModel::new())).await
}

pub async fn spawn_app_with_model(
    heat_db: Arc<dyn HeatIndexData>,
    forecast_model: Arc<dyn ForecastModel>,
) -> TestApp {
    let app_state = AppState {
        static_dir: String::from("./static"),
        remote_url: String::from("http://127.0.0.1:9900"),
        heat_db,
        cache: Arc::new(MemoryCache::new()),
        forecast_model,
        settings: DashboardSettings::default(),
    };

    TestApp {
        app: app(app_state),
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        (status, serde_json::from_str(&body).expect("response is not json"))
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = self.send(request).await;
        (status, serde_json::from_str(&body).expect("response is not json"))
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request.");

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }
}

/// Three stations: a tie on the maximum and a clear fastest riser
pub fn mock_readings() -> Vec<StationReading> {
    vec![
        StationReading::new("Science Garden, Quezon City", 40.0, 1.1),
        StationReading::new("NAIA, Pasay City", 45.0, -2.1),
        StationReading::new("Dagupan City", 45.0, 0.5),
    ]
}

pub fn mock_thresholds() -> Vec<Threshold> {
    vec![
        Threshold::new("Caution", 27.0),
        Threshold::new("Extreme Caution", 33.0),
        Threshold::new("Danger", 42.0),
        Threshold::new("Extreme Danger", 52.0),
    ]
}

pub fn mock_station_forecasts(issued_on: Date) -> Vec<StationForecast> {
    vec![
        StationForecast {
            station_id: 1,
            station_name: String::from("Science Garden, Quezon City"),
            province: String::from("Metro Manila"),
            latitude: 14.645,
            longitude: 121.044,
            issued_on,
            t1_forecast: 43.4,
            t2_forecast: 44.0,
        },
        StationForecast {
            station_id: 4,
            station_name: String::from("Baguio City"),
            province: String::from("Benguet"),
            latitude: 16.404,
            longitude: 120.6,
            issued_on,
            t1_forecast: 24.1,
            t2_forecast: 25.0,
        },
    ]
}
