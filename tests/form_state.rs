use irrigation_toolbox::app::{resolve_kc, run_calc, AppError, CalcRequest};
use irrigation_toolbox::autofill::{AutoFill, AutoFillError};
use irrigation_toolbox::crop_db::BuiltInCatalog;
use irrigation_toolbox::evapotranspiration::InvalidInputError;
use irrigation_toolbox::form::{FormError, FormState, InputMode, StatusMessage};
use irrigation_toolbox::geolocation::{Coordinates, GeolocationError};
use irrigation_toolbox::i18n::Translator;
use irrigation_toolbox::report;
use irrigation_toolbox::weather::{DailyWeather, WeatherError};

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}

fn filled_form() -> FormState {
    let mut form = FormState {
        tmax: "30".into(),
        tmin: "18".into(),
        latitude: "-15".into(),
        ..FormState::default()
    };
    form.select_crop("tomato");
    form.select_stage("mid");
    form
}

fn sample_fill() -> AutoFill {
    AutoFill {
        coordinates: Coordinates {
            latitude: -15.79321,
            longitude: -47.88,
        },
        weather: DailyWeather {
            latitude: -15.75,
            longitude: -47.875,
            max_temperature_c: 30.5,
            min_temperature_c: 18.0,
            precipitation_sum_mm: 0.0,
        },
    }
}

#[test]
fn empty_rain_field_means_zero() {
    let catalog = BuiltInCatalog::new();
    let mut form = filled_form();
    let r = form.calculate(&catalog, 172).unwrap();
    assert_eq!(r.rainfall_mm, 0.0);
    assert_close(r.kc, 1.15, 1e-12);
    assert_eq!(form.result, Some(r));
}

#[test]
fn comma_decimal_separator_is_accepted() {
    let catalog = BuiltInCatalog::new();
    let mut form = filled_form();
    form.rainfall = "1,5".into();
    let r = form.calculate(&catalog, 172).unwrap();
    assert_close(r.rainfall_mm, 1.5, 1e-12);
}

#[test]
fn missing_temperature_is_a_form_error() {
    let catalog = BuiltInCatalog::new();
    let mut form = filled_form();
    form.tmin.clear();
    assert_eq!(form.mean_temperature_display(), "--");
    assert_eq!(
        form.calculate(&catalog, 172),
        Err(FormError::MissingWeatherFields)
    );
    assert!(form.result.is_none());
}

#[test]
fn missing_stage_is_a_form_error() {
    let catalog = BuiltInCatalog::new();
    let mut form = filled_form();
    form.select_crop("maize");
    assert!(form.stage_key.is_none());
    assert_eq!(
        form.calculate(&catalog, 172),
        Err(FormError::MissingCropStage)
    );
}

#[test]
fn failed_calculation_clears_previous_result() {
    let catalog = BuiltInCatalog::new();
    let mut form = filled_form();
    form.calculate(&catalog, 172).unwrap();
    form.tmax = "10".into();
    assert_eq!(
        form.calculate(&catalog, 172),
        Err(FormError::Invalid(InvalidInputError::TemperatureOrder {
            max_c: 10.0,
            min_c: 18.0
        }))
    );
    assert!(form.result.is_none());
}

#[test]
fn stage_options_show_kc() {
    let catalog = BuiltInCatalog::new();
    let form = filled_form();
    let options = form.stage_options(&catalog);
    assert_eq!(options.len(), 4);
    assert!(options
        .iter()
        .any(|(key, label)| key == "mid" && label.ends_with("(Kc: 1.15)")));
}

#[test]
fn auto_fill_locks_weather_inputs() {
    let mut form = FormState::default();
    form.switch_mode(InputMode::Auto);
    assert_eq!(form.status, Some(StatusMessage::Locating));
    form.apply_auto_fill(&sample_fill());
    assert!(form.inputs_locked);
    assert_eq!(form.latitude, "-15.7932");
    assert_eq!(form.tmax, "30.5");
    assert_eq!(form.rainfall, "0");
    assert_eq!(form.mean_temperature_display(), "24.25");
    assert_eq!(
        form.status,
        Some(StatusMessage::DataLoaded {
            latitude: -15.75,
            longitude: -47.875
        })
    );

    form.switch_mode(InputMode::Manual);
    assert!(!form.inputs_locked);
    assert!(form.status.is_none());
}

#[test]
fn auto_fill_error_reverts_to_manual() {
    let mut form = FormState::default();
    form.switch_mode(InputMode::Auto);
    form.apply_auto_fill_error(AutoFillError::Location(GeolocationError::PermissionDenied));
    assert_eq!(form.mode, InputMode::Manual);
    assert!(!form.inputs_locked);

    let tr = Translator::new("en");
    let status = form.status.as_ref().unwrap();
    assert!(status.is_error());
    assert_eq!(
        report::status_text(status, &tr),
        "Auto fill failed, switching to manual input: Location permission denied by the user."
    );
}

#[test]
fn report_lists_liters_when_irrigation_needed() {
    let catalog = BuiltInCatalog::new();
    let mut form = filled_form();
    form.rainfall = "2".into();
    let r = form.calculate(&catalog, 172).unwrap();
    let tr = Translator::new("en");
    let lines = report::recommendation_lines(&r, &tr);
    assert!(lines[2].starts_with("Irrigation needed: "));
    assert_eq!(
        lines[3],
        format!("(Equivalent to {:.2} liters per square meter)", r.net_irrigation)
    );
    let text = report::render_report(&r, &tr);
    assert!(text.contains("ETo = 0.0023 * (24.00 + 17.8) * (30.00 - 18.00)^0.5"));
}

fn request() -> CalcRequest {
    CalcRequest {
        max_temp_c: 30.0,
        min_temp_c: 18.0,
        latitude_deg: -15.0,
        crop: Some("tomato".into()),
        stage: Some("initial".into()),
        kc: None,
        rainfall_mm: 2.0,
        day_of_year: 172,
    }
}

#[test]
fn explicit_kc_wins_over_catalog() {
    let catalog = BuiltInCatalog::new();
    assert_close(resolve_kc(&request(), &catalog).unwrap(), 0.60, 1e-12);
    let req = CalcRequest {
        kc: Some(0.85),
        ..request()
    };
    assert_close(resolve_kc(&req, &catalog).unwrap(), 0.85, 1e-12);
    let r = run_calc(&req, &catalog).unwrap();
    assert_close(r.net_irrigation, 1.0697, 1e-2);
}

#[test]
fn unknown_crop_and_stage_are_reported() {
    let catalog = BuiltInCatalog::new();
    let req = CalcRequest {
        crop: Some("mango".into()),
        ..request()
    };
    assert!(matches!(
        resolve_kc(&req, &catalog),
        Err(AppError::UnknownCrop(key)) if key == "mango"
    ));
    let req = CalcRequest {
        stage: Some("harvest".into()),
        ..request()
    };
    assert!(matches!(
        resolve_kc(&req, &catalog),
        Err(AppError::UnknownStage { .. })
    ));
    let req = CalcRequest {
        stage: None,
        ..request()
    };
    assert!(matches!(
        resolve_kc(&req, &catalog),
        Err(AppError::Form(FormError::MissingCropStage))
    ));
}

#[test]
fn weather_failure_keeps_located_latitude() {
    let mut form = FormState::default();
    form.switch_mode(InputMode::Auto);
    form.apply_auto_fill_error(AutoFillError::Weather {
        coordinates: Coordinates {
            latitude: -15.79321,
            longitude: -47.88,
        },
        error: WeatherError::Timeout,
    });
    assert_eq!(form.mode, InputMode::Manual);
    assert!(!form.inputs_locked);
    assert_eq!(form.latitude, "-15.7932");
    assert!(form.tmax.is_empty());

    let tr = Translator::new("en");
    assert_eq!(
        report::status_text(form.status.as_ref().unwrap(), &tr),
        "Auto fill failed, switching to manual input: Failed to fetch weather data. Please try again."
    );
}
