use crate::helpers::{mock_readings, mock_thresholds, spawn_app, MockHeatIndexAccess};
use heatwatch::db;
use heatwatch_core::SeriesRow;
use hyper::StatusCode;
use std::sync::Arc;
use time::macros::date;

/// Test that the dashboard renders every section for the requested date
#[tokio::test]
async fn dashboard_renders_forecast_sections() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .withf(|date| *date == date!(2024 - 04 - 01))
        .times(1)
        .returning(|_| Ok(mock_readings()));
    heat_data
        .expect_thresholds()
        .times(1)
        .returning(|| Ok(mock_thresholds()));

    // The chart covers the rolling week ending on the reference date
    heat_data
        .expect_daily_series()
        .withf(|window, station| {
            window.start() == date!(2024 - 03 - 26)
                && window.end() == date!(2024 - 04 - 01)
                && station.is_none()
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![SeriesRow::new(date!(2024 - 03 - 30)).with("observed", Some(39.4))])
        });

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, html) = test_app.get("/?date=2024-04-01").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Heat Index Forecast for 2024-04-01"));
    assert!(html.contains("Station Rankings"));
    assert!(html.contains("Stations by Classification"));
    assert!(html.contains("Daily Averages"));
    assert!(html.contains("NAIA, Pasay City"));
}

/// Test that a storage failure renders empty sections instead of an error page
#[tokio::test]
async fn dashboard_survives_storage_errors() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .times(1)
        .returning(|_| Err(db::Error::WriterClosed));
    heat_data
        .expect_thresholds()
        .times(1)
        .returning(|| Err(db::Error::WriterClosed));
    heat_data
        .expect_daily_series()
        .times(1)
        .returning(|_, _| Err(db::Error::WriterClosed));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, html) = test_app.get("/?date=2024-04-01").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No forecasts issued for this date."));
    assert!(html.contains("No station forecasts for this date."));
}

#[tokio::test]
async fn dashboard_rejects_malformed_date() {
    let heat_data = MockHeatIndexAccess::new();

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, _) = test_app.get("/?date=yesterday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Test that the summary fragment polls itself for the same date
#[tokio::test]
async fn summary_fragment_refreshes_same_date() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .times(1)
        .returning(|_| Ok(mock_readings()));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, html) = test_app.get("/fragments/summary?date=2024-04-01").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"hx-get="/fragments/summary?date=2024-04-01""#));
    assert!(html.contains("45.00 °C"));
    assert!(html.contains("Stations in Danger"));
    assert!(!html.contains("<html"));
}
