use crate::helpers::MockModel;
use heatwatch::{run_and_store, Database, HeatIndexData, ModelForecast, Observation};
use heatwatch_core::{resolve_window, Period};
use time::macros::date;

fn forecast(station_id: i64, t1_forecast: f64, t2_forecast: f64) -> ModelForecast {
    ModelForecast {
        station_id,
        t1_forecast,
        t2_forecast,
    }
}

fn observation(station_id: i64, date: time::Date, heat_index: f64) -> Observation {
    Observation {
        station_id,
        date,
        heat_index,
    }
}

#[tokio::test]
async fn fresh_database_is_seeded() {
    let db = Database::in_memory().await.unwrap();

    let stations = db.stations().await.unwrap();
    assert_eq!(stations.len(), 12);
    assert_eq!(stations[0].name, "Science Garden, Quezon City");
    assert_eq!(stations[3].elevation_m, Some(1500.0));

    let names: Vec<String> = db
        .thresholds()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(
        names,
        vec!["Caution", "Extreme Caution", "Danger", "Extreme Danger"]
    );

    db.health_check().await.unwrap();
}

#[tokio::test]
async fn forecasts_for_same_issue_date_are_replaced() {
    let db = Database::in_memory().await.unwrap();
    let issued_on = date!(2024 - 04 - 01);

    let stored = db
        .upsert_forecasts(issued_on, vec![forecast(1, 40.0, 41.0), forecast(2, 38.0, 37.5)])
        .await
        .unwrap();
    assert_eq!(stored, 2);

    let stored = db
        .upsert_forecasts(issued_on, vec![forecast(1, 42.5, 43.0), forecast(404, 50.0, 50.0)])
        .await
        .unwrap();
    assert_eq!(stored, 1);

    let forecasts = db.station_forecasts(issued_on).await.unwrap();
    assert_eq!(forecasts.len(), 2);
    assert_eq!(forecasts[0].station_id, 1);
    assert_eq!(forecasts[0].t1_forecast, 42.5);
    assert_eq!(forecasts[0].issued_on, issued_on);
    assert_eq!(forecasts[1].t1_forecast, 38.0);

    let readings = db.station_readings(issued_on).await.unwrap();
    assert_eq!(readings[0].name, "Science Garden, Quezon City");
    assert_eq!(readings[0].forecasted, 42.5);
    assert_eq!(readings[0].trend, 0.5);
    assert_eq!(readings[1].trend, -0.5);

    assert!(db
        .station_readings(date!(2024 - 04 - 02))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn daily_series_averages_stations_and_targets_next_day() {
    let db = Database::in_memory().await.unwrap();

    db.upsert_observations(vec![
        observation(1, date!(2024 - 03 - 01), 40.0),
        observation(2, date!(2024 - 03 - 01), 42.0),
        observation(1, date!(2024 - 03 - 03), 39.0),
    ])
    .await
    .unwrap();
    db.upsert_forecasts(
        date!(2024 - 02 - 29),
        vec![forecast(1, 41.0, 42.0), forecast(2, 43.0, 44.0)],
    )
    .await
    .unwrap();

    let window = resolve_window(date!(2024 - 03 - 10), Period::Month).unwrap();
    let rows = db.daily_series(window, None).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, date!(2024 - 03 - 01));
    assert_eq!(rows[0].values["observed"], Some(41.0));
    assert_eq!(rows[0].values["forecasted"], Some(42.0));
    assert_eq!(rows[1].date, date!(2024 - 03 - 03));
    assert_eq!(rows[1].values["observed"], Some(39.0));
    assert_eq!(rows[1].values["forecasted"], None);

    let rows = db.daily_series(window, Some(2)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values["observed"], Some(42.0));
    assert_eq!(rows[0].values["forecasted"], Some(43.0));
}

#[tokio::test]
async fn observations_skip_unknown_stations_and_non_finite_values() {
    let db = Database::in_memory().await.unwrap();

    let stored = db
        .upsert_observations(vec![
            observation(1, date!(2024 - 04 - 02), 41.0),
            observation(1, date!(2024 - 04 - 02), 41.6),
            observation(77, date!(2024 - 04 - 02), 40.0),
            observation(2, date!(2024 - 04 - 02), f64::INFINITY),
        ])
        .await
        .unwrap();
    assert_eq!(stored, 2);

    let window = resolve_window(date!(2024 - 04 - 02), Period::Week).unwrap();
    let rows = db.daily_series(window, None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values["observed"], Some(41.6));
}

#[tokio::test]
async fn forecasts_are_joined_with_later_observations() {
    let db = Database::in_memory().await.unwrap();
    let issued_on = date!(2024 - 04 - 01);

    db.upsert_forecasts(issued_on, vec![forecast(1, 42.0, 43.0), forecast(2, 40.0, 41.0)])
        .await
        .unwrap();
    db.upsert_observations(vec![
        observation(1, date!(2024 - 04 - 02), 41.0),
        observation(1, date!(2024 - 04 - 03), 44.5),
        observation(2, date!(2024 - 04 - 02), 40.5),
    ])
    .await
    .unwrap();

    let rows = db.forecast_actuals(issued_on).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].actual_t1, Some(41.0));
    assert_eq!(rows[0].actual_t2, Some(44.5));
    assert_eq!(rows[1].actual_t1, Some(40.5));
    assert_eq!(rows[1].actual_t2, None);
}

#[tokio::test]
async fn model_run_lands_in_storage() {
    let db = Database::in_memory().await.unwrap();
    let issued_on = date!(2024 - 04 - 01);

    let mut model = MockModel::new();
    model.expect_run().times(1).returning(|_| {
        Ok(vec![
            forecast(5, 44.2, 45.0),
            forecast(6, f64::NAN, 40.0),
            forecast(500, 40.0, 40.0),
        ])
    });

    let run = run_and_store(&model, &db, issued_on).await.unwrap();
    assert_eq!(run.issued_on, issued_on);
    assert_eq!(run.received, 3);
    assert_eq!(run.stored, 1);
    assert_eq!(run.forecasts.len(), 2);

    let stored = db.station_forecasts(issued_on).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].station_name, "Dagupan City");
}
