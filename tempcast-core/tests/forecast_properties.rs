use approx::assert_abs_diff_eq;
use std::io::Write;
use std::sync::Arc;
use tempcast_core::calendar::{CalendarHour, HistoricalKey};
use tempcast_core::dataset::{HistoricalDataset, HistoricalHourRecord};
use tempcast_core::forecast::{EstimateMethod, ForecastQuery, UnavailableReason};
use tempcast_core::{ForecastEngine, ForecastResult};

const LATITUDE: f64 = -12.05;
const LONGITUDE: f64 = -77.03;

fn noon_on_june_first() -> CalendarHour {
    CalendarHour::new(6, 1, 12)
}

/// Five stations around central Lima, all reporting `value`
fn constant_record(value: f64) -> HistoricalHourRecord {
    HistoricalHourRecord::new(
        vec![
            [-77.3, -12.3],
            [-76.8, -12.3],
            [-76.8, -11.8],
            [-77.3, -11.8],
            [-77.0, -12.0],
        ],
        vec![value; 5],
    )
}

/// Stations with slightly different readings, shifted per year
fn varied_record(offset: f64) -> HistoricalHourRecord {
    HistoricalHourRecord::new(
        vec![
            [-77.3, -12.3],
            [-76.8, -12.3],
            [-76.8, -11.8],
            [-77.3, -11.8],
            [-77.0, -12.0],
            [-77.1, -12.2],
        ],
        vec![
            18.0 + offset,
            19.5 + offset,
            17.2 + offset,
            16.8 + offset,
            18.4 + offset,
            19.1 + offset,
        ],
    )
}

fn engine_with(records: Vec<(i32, HistoricalHourRecord)>) -> ForecastEngine {
    let dataset: HistoricalDataset = records
        .into_iter()
        .map(|(year, record)| (HistoricalKey::new(year, noon_on_june_first()), record))
        .collect();
    ForecastEngine::with_default_parameters(Arc::new(dataset))
}

#[test]
fn four_covered_years_give_a_finite_forecast() {
    let engine = engine_with(
        (2015..=2020)
            .map(|year| (year, varied_record(0.1 * (year - 2015) as f64)))
            .collect(),
    );

    let result = engine.forecast(LATITUDE, LONGITUDE, "2025-06-01 12:00");
    let estimate = result.estimate().expect("forecast should be available");

    assert!(estimate.value.is_finite());
    assert_eq!(estimate.years.len(), 6);
    assert!(matches!(estimate.method, EstimateMethod::Trend(_)));
}

#[test]
fn no_history_is_unavailable() {
    let engine = engine_with(vec![]);
    assert_eq!(
        engine.forecast(LATITUDE, LONGITUDE, "2025-06-01 12:00"),
        ForecastResult::Unavailable(UnavailableReason::NoCoverage)
    );
}

#[test]
fn linear_yearly_change_is_extrapolated() {
    // value = 0.5 * year - 990
    let engine = engine_with(
        (2015..=2018)
            .map(|year| (year, constant_record(0.5 * year as f64 - 990.0)))
            .collect(),
    );

    let value = engine
        .forecast(LATITUDE, LONGITUDE, "2025-06-01 12:00")
        .value()
        .expect("forecast should be available");

    assert_abs_diff_eq!(value, 22.5, epsilon = 1e-7);
}

#[test]
fn few_years_give_the_mean() {
    let engine = engine_with(vec![(2016, constant_record(10.0)), (2020, constant_record(14.0))]);

    let result = engine.forecast(LATITUDE, LONGITUDE, "2025-06-01 12:00");
    let estimate = result.estimate().expect("forecast should be available");

    assert_eq!(estimate.method, EstimateMethod::Mean);
    assert_abs_diff_eq!(estimate.value, 12.0, epsilon = 1e-9);
}

#[test]
fn years_not_covering_the_point_are_excluded() {
    let far_away = HistoricalHourRecord::new(
        vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
        vec![30.0; 4],
    );
    let mut records: Vec<_> = (2015..=2018)
        .map(|year| (year, constant_record(15.0)))
        .collect();
    records.push((2019, far_away));
    let engine = engine_with(records);

    let result = engine.forecast(LATITUDE, LONGITUDE, "2025-06-01 12:00");
    let estimate = result.estimate().expect("forecast should be available");

    let years: Vec<i32> = estimate.years.iter().map(|e| e.year).collect();
    assert_eq!(years, vec![2015, 2016, 2017, 2018]);
    assert_abs_diff_eq!(estimate.value, 15.0, epsilon = 1e-7);
}

#[test]
fn years_outside_the_history_window_are_ignored() {
    let engine = engine_with(vec![(2010, constant_record(5.0)), (2015, constant_record(15.0))]);

    let result = engine.forecast(LATITUDE, LONGITUDE, "2025-06-01 12:00");
    let estimate = result.estimate().expect("forecast should be available");

    assert_eq!(estimate.years.len(), 1);
    assert_abs_diff_eq!(estimate.value, 15.0, epsilon = 1e-9);
}

#[test]
fn malformed_requests_are_unavailable() {
    let engine = engine_with(
        (2015..=2018)
            .map(|year| (year, constant_record(15.0)))
            .collect(),
    );

    assert_eq!(
        engine.forecast(LATITUDE, LONGITUDE, "not-a-date"),
        ForecastResult::Unavailable(UnavailableReason::MalformedTimestamp)
    );
    assert_eq!(
        engine.forecast(f64::NAN, LONGITUDE, "2025-06-01 12:00"),
        ForecastResult::Unavailable(UnavailableReason::InvalidCoordinates)
    );
    assert_eq!(
        engine.forecast(LATITUDE, 200.0, "2025-06-01 12:00"),
        ForecastResult::Unavailable(UnavailableReason::InvalidCoordinates)
    );
}

#[test]
fn minutes_do_not_change_the_forecast() {
    let engine = engine_with(
        (2015..=2019)
            .map(|year| (year, varied_record(0.2 * (year - 2015) as f64)))
            .collect(),
    );

    assert_eq!(
        engine.forecast(LATITUDE, LONGITUDE, "2025-06-01 12:00"),
        engine.forecast(LATITUDE, LONGITUDE, "2025-06-01 12:45")
    );
}

#[test]
fn missing_dataset_file_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = HistoricalDataset::load_or_degraded(dir.path().join("missing.json"));
    assert!(dataset.is_empty());

    let engine = ForecastEngine::with_default_parameters(Arc::new(dataset));
    assert!(!engine
        .forecast(LATITUDE, LONGITUDE, "2025-06-01 12:00")
        .is_available());
}

#[test]
fn dataset_file_round_trip_through_the_engine() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut entries = serde_json::Map::new();
    for year in 2015..=2018 {
        entries.insert(
            format!("{}-06-01 12:00:00", year),
            serde_json::json!({
                "puntos": [[-77.3, -12.3], [-76.8, -12.3], [-76.8, -11.8], [-77.3, -11.8]],
                "valores": [16.0, 16.0, 16.0, 16.0],
            }),
        );
    }
    entries.insert("garbage".to_string(), serde_json::json!({"points": [], "values": []}));
    write!(file, "{}", serde_json::Value::Object(entries)).unwrap();

    let dataset = HistoricalDataset::from_json_file(file.path()).unwrap();
    assert_eq!(dataset.len(), 4);

    let engine = ForecastEngine::with_default_parameters(Arc::new(dataset));
    let value = engine
        .forecast(LATITUDE, LONGITUDE, "2026-06-01 12:00")
        .value()
        .unwrap();
    assert_abs_diff_eq!(value, 16.0, epsilon = 1e-7);
}

#[test]
fn batch_matches_sequential_forecasts() {
    let engine = engine_with(
        (2015..=2021)
            .map(|year| (year, varied_record(0.05 * (year - 2015) as f64)))
            .collect(),
    );
    let queries: Vec<ForecastQuery> = [
        (LATITUDE, LONGITUDE, "2025-06-01 12:00"),
        (-12.1, -77.1, "2025-06-01 12:30"),
        (-12.1, -77.1, "2025-06-01 13:00"),
        (10.0, 10.0, "2025-06-01 12:00"),
        (LATITUDE, LONGITUDE, "tomorrow"),
    ]
    .iter()
    .map(|(latitude, longitude, timestamp)| ForecastQuery {
        latitude: *latitude,
        longitude: *longitude,
        timestamp: timestamp.to_string(),
    })
    .collect();

    let batch = engine.forecast_batch(&queries);
    let sequential: Vec<ForecastResult> = queries
        .iter()
        .map(|q| engine.forecast(q.latitude, q.longitude, &q.timestamp))
        .collect();

    assert_eq!(batch, sequential);
    assert!(batch[0].is_available());
    assert!(!batch[2].is_available());
    assert!(!batch[3].is_available());
}
