//! End-to-end series evaluation from provider-style JSON
use rimecast_core::config::EngineConfig;
use rimecast_core::core_types::{Aspect, WeatherSeries};
use rimecast_core::scoring::{cumulative, AspectSeriesRunner, LatestConditions, VerglasMode};
use rimecast_core::ValidationError;

/// A cold night: thaw with rain in the evening, hard refreeze afterwards
fn thaw_refreeze_json() -> String {
    let samples: Vec<String> = (0..36)
        .map(|h| {
            let (temp, precip) = match h {
                14..=17 => (2.0, 0.8),
                _ => (-5.0, 0.0),
            };
            format!(
                r#"{{"temperature": {temp}, "humidity": 96, "wind_speed": 14.0, "wind_direction": 225, "precipitation": {precip}, "cloud_cover": null, "timestamp": "2024-01-{:02}T{:02}:00"}}"#,
                20 + h / 24,
                h % 24
            )
        })
        .collect();
    format!(
        r#"{{"name": "Test Col", "altitude": 1250, "samples": [{}]}}"#,
        samples.join(",")
    )
}

#[test]
fn test_thaw_then_refreeze_produces_verglas() {
    let series = WeatherSeries::from_json_str(&thaw_refreeze_json()).unwrap();
    let runner = AspectSeriesRunner::new(EngineConfig::default()).unwrap();
    let records = runner.run_series(&series).unwrap();

    assert_eq!(records.len(), 36);
    let before_thaw = records[12].verglas.max_rate();
    let after_thaw = records[18].verglas.max_rate();
    assert_eq!(before_thaw, 0.0);
    assert!(after_thaw > 0.0);

    // Rime keeps forming on the south-west face through the cold spells
    let latest = LatestConditions::from_record(records.last().unwrap());
    assert_eq!(latest.rime.unwrap().aspects, vec![Aspect::SW]);
    assert!(latest.verglas.is_some());
}

#[test]
fn test_resampled_series_still_runs() {
    let series = WeatherSeries::from_json_str(&thaw_refreeze_json()).unwrap();
    let resampled = series.resample(3).unwrap();
    assert_eq!(resampled.len(), 12);

    let mut config = EngineConfig::default();
    config.verglas = config.verglas.resampled(3);
    let runner = AspectSeriesRunner::new(config).unwrap();
    let records = runner.run_series(&resampled).unwrap();
    assert_eq!(records.len(), 12);
    assert!(records.iter().any(|r| r.verglas.max_rate() > 0.0));
}

#[test]
fn test_aspect_mode_emits_per_aspect_verglas() {
    let series = WeatherSeries::from_json_str(
        r#"[
            {"temperature": -0.5, "humidity": 99, "wind_speed": 2, "wind_direction": 90, "precipitation": 0.6, "timestamp": "2024-01-20T02:00"},
            {"temperature": -0.5, "humidity": 99, "wind_speed": 2, "wind_direction": 90, "precipitation": 0.6, "timestamp": "2024-01-20T13:00"}
        ]"#,
    )
    .unwrap();
    let config = EngineConfig {
        verglas_mode: VerglasMode::AspectTimeOfDay,
        ..EngineConfig::default()
    };
    let records = AspectSeriesRunner::new(config)
        .unwrap()
        .run_series(&series)
        .unwrap();

    let night = records[0].verglas.to_aspect_rates();
    let day = records[1].verglas.to_aspect_rates();
    assert!(night[Aspect::N] > night[Aspect::S]);
    assert!(night[Aspect::N] > day[Aspect::N]);

    let totals = cumulative(&records);
    assert_eq!(
        totals[1].verglas[Aspect::N],
        ((night[Aspect::N] + day[Aspect::N]) * 1000.0).round() / 1000.0
    );
}

#[test]
fn test_out_of_order_series_rejected() {
    let series = WeatherSeries::from_json_str(
        r#"[
            {"temperature": -3, "timestamp": "2024-01-20T05:00"},
            {"temperature": -3, "timestamp": "2024-01-20T04:00"}
        ]"#,
    )
    .unwrap();
    let err = AspectSeriesRunner::default().run_series(&series).unwrap_err();
    assert!(matches!(err, ValidationError::OutOfOrder { index: 1, .. }));
}

#[test]
fn test_sparse_samples_score_zero_not_error() {
    let series = WeatherSeries::from_json_str(
        r#"[
            {"temperature": null, "humidity": null, "timestamp": "2024-01-20T04:00"},
            {"timestamp": "2024-01-20T05:00"}
        ]"#,
    )
    .unwrap();
    let records = AspectSeriesRunner::default().run_series(&series).unwrap();
    assert!(records
        .iter()
        .all(|r| r.rime.max_rate() == 0.0 && r.verglas.max_rate() == 0.0));
}
