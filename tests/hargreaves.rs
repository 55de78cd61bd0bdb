use irrigation_toolbox::evapotranspiration::{
    compute, compute_measurement, InvalidInputError, Measurement, Recommendation,
};
use std::f64::consts::PI;

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}

#[test]
fn southern_winter_scenario() {
    // Tmax 30, Tmin 18, 15°S, Kc 0.85, rain 2 mm, J = 172
    let r = compute(30.0, 18.0, -15.0, 0.85, 2.0, 172).expect("valid input");
    assert_close(r.mean_temperature_c, 24.0, 1e-12);
    assert_close(r.inverse_distance, 0.96754, 1e-4);
    assert_close(r.declination_rad, 0.409, 1e-3);
    assert_close(r.sunset_hour_angle_rad, 1.45439, 1e-3);
    assert_close(r.solar_radiation, 26.5674, 1e-2);
    assert_close(r.solar_radiation_mm, 10.8438, 1e-2);
    assert_close(r.eto, 3.6114, 1e-2);
    assert_close(r.etc, 3.0697, 1e-2);
    assert_close(r.net_irrigation, 1.0697, 1e-2);
    assert_eq!(r.net_irrigation, r.etc - 2.0);
    match r.recommendation() {
        Recommendation::Irrigate {
            depth_mm,
            liters_per_m2,
        } => {
            assert_eq!(depth_mm, r.net_irrigation);
            assert_eq!(liters_per_m2, depth_mm);
        }
        other => panic!("expected irrigation, got {other:?}"),
    }
}

#[test]
fn same_input_gives_bit_identical_result() {
    let a = compute(31.5, 17.2, -22.9, 1.15, 0.4, 45).unwrap();
    let b = compute(31.5, 17.2, -22.9, 1.15, 0.4, 45).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.eto.to_bits(), b.eto.to_bits());
}

#[test]
fn measurement_form_matches_positional_form() {
    let m = Measurement {
        max_temperature_c: 28.0,
        min_temperature_c: 15.0,
        latitude_deg: 10.0,
        rainfall_mm: 0.0,
    };
    let a = compute_measurement(&m, 0.7, 200).unwrap();
    let b = compute(28.0, 15.0, 10.0, 0.7, 0.0, 200).unwrap();
    assert_eq!(a, b);
}

#[test]
fn equator_sunset_angle_is_right_angle() {
    let r = compute(30.0, 18.0, 0.0, 1.0, 0.0, 80).unwrap();
    assert_close(r.sunset_hour_angle_rad, PI / 2.0, 1e-12);
    assert_close(r.solar_radiation, 37.824, 1e-2);
    assert_close(r.eto, 5.1416, 1e-2);
    assert_eq!(r.etc, r.eto);
}

#[test]
fn polar_day_and_polar_night_stay_finite() {
    let day = compute(10.0, 0.0, 89.0, 1.0, 0.0, 172).unwrap();
    assert_close(day.sunset_hour_angle_rad, PI, 1e-12);
    assert!(day.eto.is_finite() && day.eto > 0.0);

    let night = compute(10.0, 0.0, -89.0, 1.0, 1.0, 172).unwrap();
    assert_eq!(night.sunset_hour_angle_rad, 0.0);
    assert_close(night.solar_radiation, 0.0, 1e-12);
    assert_close(night.eto, 0.0, 1e-12);
    assert_eq!(night.recommendation(), Recommendation::NoIrrigationNeeded);
}

#[test]
fn equal_temperatures_give_zero_eto() {
    let r = compute(20.0, 20.0, -15.0, 1.0, 0.0, 172).unwrap();
    assert_eq!(r.eto, 0.0);
    assert_eq!(r.net_irrigation, 0.0);
    assert_eq!(r.recommendation(), Recommendation::NoIrrigationNeeded);
}

#[test]
fn rain_above_crop_need_means_no_irrigation() {
    let r = compute(30.0, 18.0, -15.0, 0.85, 10.0, 172).unwrap();
    assert!(r.net_irrigation < 0.0);
    assert_eq!(r.recommendation(), Recommendation::NoIrrigationNeeded);
}

#[test]
fn reversed_temperatures_are_rejected() {
    let err = compute(18.0, 30.0, -15.0, 0.85, 0.0, 172).unwrap_err();
    assert_eq!(
        err,
        InvalidInputError::TemperatureOrder {
            max_c: 18.0,
            min_c: 30.0
        }
    );
}

#[test]
fn invalid_inputs_are_rejected() {
    assert_eq!(
        compute(f64::NAN, 18.0, 0.0, 1.0, 0.0, 1).unwrap_err(),
        InvalidInputError::NonFinite("maximum temperature")
    );
    assert_eq!(
        compute(30.0, 18.0, 91.0, 1.0, 0.0, 1).unwrap_err(),
        InvalidInputError::LatitudeOutOfRange(91.0)
    );
    assert_eq!(
        compute(30.0, 18.0, 0.0, 0.0, 0.0, 1).unwrap_err(),
        InvalidInputError::NonPositiveKc(0.0)
    );
    assert_eq!(
        compute(30.0, 18.0, 0.0, 1.0, -1.0, 1).unwrap_err(),
        InvalidInputError::NegativeRainfall(-1.0)
    );
    assert_eq!(
        compute(30.0, 18.0, 0.0, 1.0, 0.0, 0).unwrap_err(),
        InvalidInputError::DayOfYearOutOfRange(0)
    );
    assert_eq!(
        compute(30.0, 18.0, 0.0, 1.0, 0.0, 367).unwrap_err(),
        InvalidInputError::DayOfYearOutOfRange(367)
    );
}

#[test]
fn eto_is_never_negative_above_offset_temperature() {
    for lat in [-89.0, -60.0, -23.5, 0.0, 23.5, 45.0, 66.5, 89.0] {
        for day in [1, 80, 172, 266, 355, 366] {
            for (max, min) in [(5.0, -10.0), (20.0, 20.0), (42.0, 25.0)] {
                let r = compute(max, min, lat, 1.2, 0.0, day).unwrap();
                assert!(
                    r.eto >= -1e-12 && r.eto.is_finite(),
                    "lat={lat} day={day} eto={}",
                    r.eto
                );
                assert!(r.sunset_hour_angle_rad >= 0.0 && r.sunset_hour_angle_rad <= PI);
            }
        }
    }
}

#[test]
fn mean_below_offset_gives_negative_eto_without_clamping() {
    // Tmean -25 °C: (Tmean + 17.8) < 0
    let r = compute(-20.0, -30.0, 45.0, 1.0, 0.0, 172).unwrap();
    assert_close(r.mean_temperature_c, -25.0, 1e-12);
    assert_close(r.eto, -0.8958, 1e-3);
    assert_eq!(r.etc, r.eto);
    assert_eq!(r.net_irrigation, r.eto);
    assert_eq!(r.recommendation(), Recommendation::NoIrrigationNeeded);
}
