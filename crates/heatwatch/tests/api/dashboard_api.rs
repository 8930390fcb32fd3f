use crate::helpers::{mock_readings, mock_thresholds, spawn_app, MockHeatIndexAccess};
use heatwatch::{db, Station};
use heatwatch_core::SeriesRow;
use hyper::StatusCode;
use serde_json::json;
use std::sync::Arc;
use time::macros::date;

#[tokio::test]
async fn summary_reports_extremes_average_and_fastest_riser() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .withf(|date| *date == date!(2024 - 04 - 01))
        .times(1)
        .returning(|_| Ok(mock_readings()));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/api/summary?date=2024-04-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "max": 45.0,
            "maxStation": "NAIA, Pasay City",
            "min": 40.0,
            "minStation": "Science Garden, Quezon City",
            "avg": 43.33,
            "dangerCount": 2,
            "fastestStation": "Science Garden, Quezon City",
            "fastestTrend": 1.1
        })
    );
}

#[tokio::test]
async fn summary_for_empty_day_is_all_zero() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .times(1)
        .returning(|_| Ok(vec![]));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/api/summary?date=2024-04-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max"], 0.0);
    assert_eq!(body["maxStation"], "");
    assert_eq!(body["dangerCount"], 0);
}

#[tokio::test]
async fn repeated_summary_is_served_from_cache() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .times(1)
        .returning(|_| Ok(mock_readings()));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (first_status, first) = test_app.get_json("/api/summary?date=2024-04-01").await;
    let (second_status, second) = test_app.get_json("/api/summary?date=2024-04-01").await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn malformed_date_is_a_bad_request() {
    let heat_data = MockHeatIndexAccess::new();

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/api/summary?date=04/01/2024").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("04/01/2024"));
}

#[tokio::test]
async fn month_series_has_a_point_per_day_and_zeroes_the_future() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_daily_series()
        .withf(|window, station| {
            window.start() == date!(2024 - 03 - 01)
                && window.end() == date!(2024 - 03 - 31)
                && station.is_none()
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                SeriesRow::new(date!(2024 - 03 - 02))
                    .with("observed", Some(38.5))
                    .with("forecasted", Some(39.0)),
                SeriesRow::new(date!(2024 - 03 - 05)).with("observed", None),
                SeriesRow::new(date!(2024 - 03 - 11)).with("forecasted", Some(41.0)),
            ])
        });

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app
        .get_json("/api/series?date=2024-03-10&period=Month")
        .await;

    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 31);
    assert_eq!(points[0]["date"], "2024-03-01");
    assert_eq!(points[30]["date"], "2024-03-31");
    assert_eq!(
        points[1],
        json!({"date": "2024-03-02", "observed": 38.5, "forecasted": 39.0})
    );
    assert_eq!(
        points[4],
        json!({"date": "2024-03-05", "observed": 0.0, "forecasted": 0.0})
    );
    // 2024-03-11 is after the reference date
    assert_eq!(points[10]["forecasted"], 0.0);
}

#[tokio::test]
async fn week_series_defaults_to_last_seven_days() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_daily_series()
        .withf(|window, _| {
            window.start() == date!(2024 - 02 - 25) && window.end() == date!(2024 - 03 - 02)
        })
        .times(1)
        .returning(|_, _| Ok(vec![]));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/api/series?date=2024-03-02").await;

    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 7);
    assert_eq!(points[3]["date"], "2024-02-28");
    assert_eq!(points[4]["date"], "2024-02-29");
}

#[tokio::test]
async fn series_passes_station_filter_through() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_daily_series()
        .withf(|_, station| *station == Some(4))
        .times(1)
        .returning(|_, _| Ok(vec![]));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, _) = test_app
        .get_json("/api/series?date=2024-03-02&period=week&station=4")
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_period_is_a_bad_request() {
    let heat_data = MockHeatIndexAccess::new();

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app
        .get_json("/api/series?date=2024-03-02&period=Year")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Year"));
}

#[tokio::test]
async fn classifications_are_ordered_and_colored() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .times(1)
        .returning(|_| Ok(mock_readings()));
    heat_data
        .expect_thresholds()
        .times(1)
        .returning(|| Ok(mock_thresholds()));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app
        .get_json("/api/classifications?date=2024-04-01")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"name": "Caution", "value": 0, "color": "#FFC107"},
            {"name": "Extreme Caution", "value": 1, "color": "#FF9800"},
            {"name": "Danger", "value": 2, "color": "#FF5722"},
            {"name": "Extreme Danger", "value": 0, "color": "#B71C1C"}
        ])
    );
}

#[tokio::test]
async fn rankings_put_hottest_first_and_keep_ties_in_order() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .times(1)
        .returning(|_| Ok(mock_readings()));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/api/rankings?date=2024-04-01").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "NAIA, Pasay City",
            "Dagupan City",
            "Science Garden, Quezon City"
        ]
    );
    assert_eq!(body[0]["rank"], 1);
    assert_eq!(body[2]["rank"], 3);
}

#[tokio::test]
async fn storage_failure_hides_details() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_station_readings()
        .times(1)
        .returning(|_| Err(db::Error::Integrity(String::from("disk image is malformed"))));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/api/rankings?date=2024-04-01").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "internal error"}));
}

#[tokio::test]
async fn stations_are_listed() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data.expect_stations().times(1).returning(|| {
        Ok(vec![Station {
            id: 12,
            name: String::from("Davao City"),
            province: String::from("Davao del Sur"),
            latitude: 7.125,
            longitude: 125.645,
            elevation_m: Some(18.0),
        }])
    });

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/api/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], 12);
    assert_eq!(body[0]["name"], "Davao City");
    assert_eq!(body[0]["elevationM"], 18.0);
}

#[tokio::test]
async fn health_reports_ok() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data.expect_health_check().times(1).returning(|| Ok(()));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn health_reports_unavailable_database() {
    let mut heat_data = MockHeatIndexAccess::new();
    heat_data
        .expect_health_check()
        .times(1)
        .returning(|| Err(db::Error::Integrity(String::from("page 3 is never used"))));

    let test_app = spawn_app(Arc::new(heat_data)).await;
    let (status, body) = test_app.get_json("/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}
