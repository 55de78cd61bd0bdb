use irrigation_toolbox::autofill::{run_auto_fill, spawn_auto_fill, AutoFillError};
use irrigation_toolbox::geolocation::{
    parse_ip_lookup, ConfiguredLocation, Coordinates, GeolocationError,
};
use irrigation_toolbox::weather::{parse_forecast, DailyWeather, WeatherError, WeatherProvider};
use std::time::Duration;

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}

fn brasilia() -> Coordinates {
    Coordinates::new(-15.79, -47.88).unwrap()
}

#[test]
fn forecast_first_day_is_used() {
    let body = r#"{
        "latitude": -15.75, "longitude": -47.875,
        "daily": {
            "time": ["2025-06-21", "2025-06-22"],
            "temperature_2m_max": [30.1, 28.0],
            "temperature_2m_min": [17.9, 16.0],
            "precipitation_sum": [1.2, 0.0]
        }
    }"#;
    let w = parse_forecast(body, brasilia()).unwrap();
    assert_close(w.latitude, -15.75, 1e-12);
    assert_close(w.longitude, -47.875, 1e-12);
    assert_close(w.max_temperature_c, 30.1, 1e-12);
    assert_close(w.min_temperature_c, 17.9, 1e-12);
    assert_close(w.precipitation_sum_mm, 1.2, 1e-12);
}

#[test]
fn null_precipitation_counts_as_dry() {
    let body = r#"{"latitude": 1.0, "longitude": 2.0, "daily": {
        "temperature_2m_max": [25.0], "temperature_2m_min": [15.0],
        "precipitation_sum": [null]}}"#;
    let w = parse_forecast(body, brasilia()).unwrap();
    assert_eq!(w.precipitation_sum_mm, 0.0);
}

#[test]
fn missing_grid_coordinates_fall_back_to_request() {
    let body = r#"{"daily": {"temperature_2m_max": [25.0], "temperature_2m_min": [15.0]}}"#;
    let w = parse_forecast(body, brasilia()).unwrap();
    assert_eq!(w.latitude, -15.79);
    assert_eq!(w.longitude, -47.88);
    assert_eq!(w.precipitation_sum_mm, 0.0);
}

#[test]
fn malformed_payloads_are_rejected() {
    let cases = [
        r#"{"latitude": 1.0}"#,
        r#"{"daily": {"temperature_2m_max": [], "temperature_2m_min": [15.0]}}"#,
        r#"{"daily": {"temperature_2m_max": [null], "temperature_2m_min": [15.0]}}"#,
        r#"{"daily": {"temperature_2m_max": [25.0], "temperature_2m_min": [15.0], "precipitation_sum": [-3.0]}}"#,
        "not json",
    ];
    for body in cases {
        assert!(
            matches!(
                parse_forecast(body, brasilia()),
                Err(WeatherError::MalformedPayload(_))
            ),
            "accepted: {body}"
        );
    }
}

#[test]
fn ip_lookup_payloads() {
    let ok = parse_ip_lookup(r#"{"status":"success","lat":-15.78,"lon":-47.93}"#).unwrap();
    assert_close(ok.latitude, -15.78, 1e-12);
    assert_eq!(
        parse_ip_lookup(r#"{"status":"fail","message":"private range"}"#),
        Err(GeolocationError::PositionUnavailable)
    );
    assert!(matches!(
        parse_ip_lookup("<html>"),
        Err(GeolocationError::Unknown(_))
    ));
}

struct FixedWeather(Result<DailyWeather, WeatherError>);

impl WeatherProvider for FixedWeather {
    fn fetch_daily(&self, _at: Coordinates) -> Result<DailyWeather, WeatherError> {
        self.0.clone()
    }
}

fn sample_weather() -> DailyWeather {
    DailyWeather {
        latitude: -15.75,
        longitude: -47.875,
        max_temperature_c: 30.0,
        min_temperature_c: 18.0,
        precipitation_sum_mm: 2.0,
    }
}

#[test]
fn auto_fill_chains_location_and_weather() {
    let location = ConfiguredLocation {
        coordinates: Some(brasilia()),
    };
    let fill = run_auto_fill(&location, &FixedWeather(Ok(sample_weather()))).unwrap();
    assert_eq!(fill.coordinates, brasilia());
    assert_eq!(fill.weather, sample_weather());
}

#[test]
fn auto_fill_reports_failing_stage() {
    let nowhere = ConfiguredLocation { coordinates: None };
    assert_eq!(
        run_auto_fill(&nowhere, &FixedWeather(Ok(sample_weather()))),
        Err(AutoFillError::Location(GeolocationError::PositionUnavailable))
    );

    let here = ConfiguredLocation {
        coordinates: Some(brasilia()),
    };
    assert_eq!(
        run_auto_fill(&here, &FixedWeather(Err(WeatherError::Timeout))),
        Err(AutoFillError::Weather {
            coordinates: brasilia(),
            error: WeatherError::Timeout
        })
    );
}

#[test]
fn spawned_auto_fill_delivers_one_result() {
    let rx = spawn_auto_fill(
        Box::new(ConfiguredLocation {
            coordinates: Some(brasilia()),
        }),
        Box::new(FixedWeather(Ok(sample_weather()))),
    );
    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("worker result");
    assert_eq!(result.unwrap().weather, sample_weather());
}
