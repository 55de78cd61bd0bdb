//! FAO-56 Hargreaves 기준 증발산량 계산.
//!
//! 외기 최고/최저 온도와 위도, 연중 일수로 외계 일사량(Ra)을 구한 뒤
//! ETo = 0.0023 (Tmean + 17.8) (Tmax - Tmin)^0.5 Ra_mm 로 환산한다.
//! 작물계수(Kc)와 강우량은 호출자가 넘겨주며 이 모듈은 상태를 갖지 않는다.

use std::f64::consts::PI;

/// 태양 상수 [MJ m⁻² min⁻¹]
pub const SOLAR_CONSTANT_MJ_PER_M2_MIN: f64 = 0.0820;
/// 증발 잠열 환산 계수: MJ m⁻² day⁻¹ → mm/day
pub const LATENT_HEAT_MJ_PER_KG: f64 = 2.45;
/// Hargreaves 계수
pub const HARGREAVES_COEFF: f64 = 0.0023;
/// Hargreaves 온도 보정항 [°C]
pub const HARGREAVES_TEMP_OFFSET_C: f64 = 17.8;

/// 계산 입력값이 유효하지 않을 때의 오류.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    /// 유한한 숫자가 아님 (NaN/∞)
    NonFinite(&'static str),
    /// 위도가 [-90, 90] 범위를 벗어남
    LatitudeOutOfRange(f64),
    /// Kc가 0 이하
    NonPositiveKc(f64),
    /// 강우량이 음수
    NegativeRainfall(f64),
    /// 최고 온도가 최저 온도보다 낮음 (제곱근 정의역 밖)
    TemperatureOrder { max_c: f64, min_c: f64 },
    /// 연중 일수가 1~366 범위를 벗어남
    DayOfYearOutOfRange(u32),
}

impl std::fmt::Display for InvalidInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInputError::NonFinite(field) => write!(f, "{field} is not a finite number"),
            InvalidInputError::LatitudeOutOfRange(v) => {
                write!(f, "latitude {v} is outside [-90, 90]")
            }
            InvalidInputError::NonPositiveKc(v) => write!(f, "Kc must be positive (got {v})"),
            InvalidInputError::NegativeRainfall(v) => {
                write!(f, "rainfall must not be negative (got {v} mm)")
            }
            InvalidInputError::TemperatureOrder { max_c, min_c } => write!(
                f,
                "maximum temperature {max_c} °C is below minimum temperature {min_c} °C"
            ),
            InvalidInputError::DayOfYearOutOfRange(d) => {
                write!(f, "day of year {d} is outside 1..=366")
            }
        }
    }
}

impl std::error::Error for InvalidInputError {}

/// 하루 기상 측정값.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// 최고 기온 [°C]
    pub max_temperature_c: f64,
    /// 최저 기온 [°C]
    pub min_temperature_c: f64,
    /// 위도 [deg], 남반구는 음수
    pub latitude_deg: f64,
    /// 강우량 [mm], 미입력 시 0
    pub rainfall_mm: f64,
}

/// Hargreaves 계산 결과. 중간값은 결과 패널의 공식 표시용으로 함께 담는다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvapotranspirationResult {
    pub max_temperature_c: f64,
    pub min_temperature_c: f64,
    /// 평균 기온 [°C]
    pub mean_temperature_c: f64,
    pub kc: f64,
    pub rainfall_mm: f64,
    pub day_of_year: u32,
    /// 지구-태양 역상대거리 dr
    pub inverse_distance: f64,
    /// 태양 적위 δ [rad]
    pub declination_rad: f64,
    /// 일몰 시간각 ωs [rad]
    pub sunset_hour_angle_rad: f64,
    /// 외계 일사량 Ra [MJ m⁻² day⁻¹]
    pub solar_radiation: f64,
    /// 증발량 환산 Ra [mm/day]
    pub solar_radiation_mm: f64,
    /// 기준 증발산량 ETo [mm/day]
    pub eto: f64,
    /// 작물 증발산량 ETc [mm]
    pub etc: f64,
    /// 순 관개 요구량 [mm], 음수 가능
    pub net_irrigation: f64,
}

/// 관개 권고.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recommendation {
    /// 강우가 작물 요구량을 충족함
    NoIrrigationNeeded,
    /// 관개 필요. 1 mm = 1 L/m²
    Irrigate { depth_mm: f64, liters_per_m2: f64 },
}

impl EvapotranspirationResult {
    /// 순 관개 요구량으로 권고를 만든다. 0 이하이면 관개가 필요 없다.
    pub fn recommendation(&self) -> Recommendation {
        if self.net_irrigation <= 0.0 {
            Recommendation::NoIrrigationNeeded
        } else {
            Recommendation::Irrigate {
                depth_mm: self.net_irrigation,
                liters_per_m2: self.net_irrigation,
            }
        }
    }
}

fn require_finite(value: f64, field: &'static str) -> Result<f64, InvalidInputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidInputError::NonFinite(field))
    }
}

fn validate(
    max_temp_c: f64,
    min_temp_c: f64,
    latitude_deg: f64,
    kc: f64,
    rainfall_mm: f64,
    day_of_year: u32,
) -> Result<(), InvalidInputError> {
    require_finite(max_temp_c, "maximum temperature")?;
    require_finite(min_temp_c, "minimum temperature")?;
    require_finite(latitude_deg, "latitude")?;
    require_finite(kc, "Kc")?;
    require_finite(rainfall_mm, "rainfall")?;
    if !(-90.0..=90.0).contains(&latitude_deg) {
        return Err(InvalidInputError::LatitudeOutOfRange(latitude_deg));
    }
    if kc <= 0.0 {
        return Err(InvalidInputError::NonPositiveKc(kc));
    }
    if rainfall_mm < 0.0 {
        return Err(InvalidInputError::NegativeRainfall(rainfall_mm));
    }
    if max_temp_c < min_temp_c {
        return Err(InvalidInputError::TemperatureOrder {
            max_c: max_temp_c,
            min_c: min_temp_c,
        });
    }
    if !(1..=366).contains(&day_of_year) {
        return Err(InvalidInputError::DayOfYearOutOfRange(day_of_year));
    }
    Ok(())
}

/// 지구-태양 역상대거리 dr.
pub fn inverse_relative_distance(day_of_year: u32) -> f64 {
    1.0 + 0.033 * (2.0 * PI / 365.0 * f64::from(day_of_year)).cos()
}

/// 태양 적위 δ [rad].
pub fn solar_declination(day_of_year: u32) -> f64 {
    0.409 * (2.0 * PI / 365.0 * f64::from(day_of_year) - 1.39).sin()
}

/// 일몰 시간각 ωs [rad]. 극지방/지점(solstice) 부근에서 acos 정의역을 넘지 않도록
/// -tan(φ)·tan(δ)를 [-1, 1]로 클램프한다.
pub fn sunset_hour_angle(latitude_rad: f64, declination_rad: f64) -> f64 {
    let x = -latitude_rad.tan() * declination_rad.tan();
    x.clamp(-1.0, 1.0).acos()
}

/// 외계 일사량 Ra [MJ m⁻² day⁻¹].
pub fn extraterrestrial_radiation(
    latitude_rad: f64,
    inverse_distance: f64,
    declination_rad: f64,
    sunset_hour_angle_rad: f64,
) -> f64 {
    let ws = sunset_hour_angle_rad;
    (24.0 * 60.0 / PI)
        * SOLAR_CONSTANT_MJ_PER_M2_MIN
        * inverse_distance
        * (ws * latitude_rad.sin() * declination_rad.sin()
            + latitude_rad.cos() * declination_rad.cos() * ws.sin())
}

/// 최고/최저 기온, 위도, Kc, 강우량, 연중 일수로 ETo/ETc/순 관개량을 계산한다.
///
/// 입력 검증은 산술 연산 전에 모두 끝내며, 검증을 통과한 입력에 대해서는
/// NaN이 나오지 않는다. 평균 기온이 -17.8 °C 미만이면 ETo가 음수가 되는데
/// 이 값은 그대로 반환한다(결과적으로 관개 불필요로 판정됨).
pub fn compute(
    max_temp_c: f64,
    min_temp_c: f64,
    latitude_deg: f64,
    kc: f64,
    rainfall_mm: f64,
    day_of_year: u32,
) -> Result<EvapotranspirationResult, InvalidInputError> {
    validate(
        max_temp_c,
        min_temp_c,
        latitude_deg,
        kc,
        rainfall_mm,
        day_of_year,
    )?;

    let mean_temperature_c = (max_temp_c + min_temp_c) / 2.0;
    let latitude_rad = latitude_deg.to_radians();
    let dr = inverse_relative_distance(day_of_year);
    let delta = solar_declination(day_of_year);
    let omega_s = sunset_hour_angle(latitude_rad, delta);
    let ra = extraterrestrial_radiation(latitude_rad, dr, delta, omega_s);
    let ra_mm = ra / LATENT_HEAT_MJ_PER_KG;

    let eto = HARGREAVES_COEFF
        * (mean_temperature_c + HARGREAVES_TEMP_OFFSET_C)
        * (max_temp_c - min_temp_c).sqrt()
        * ra_mm;
    let etc = eto * kc;

    Ok(EvapotranspirationResult {
        max_temperature_c: max_temp_c,
        min_temperature_c: min_temp_c,
        mean_temperature_c,
        kc,
        rainfall_mm,
        day_of_year,
        inverse_distance: dr,
        declination_rad: delta,
        sunset_hour_angle_rad: omega_s,
        solar_radiation: ra,
        solar_radiation_mm: ra_mm,
        eto,
        etc,
        net_irrigation: etc - rainfall_mm,
    })
}

/// `Measurement` 값으로 계산한다.
pub fn compute_measurement(
    m: &Measurement,
    kc: f64,
    day_of_year: u32,
) -> Result<EvapotranspirationResult, InvalidInputError> {
    compute(
        m.max_temperature_c,
        m.min_temperature_c,
        m.latitude_deg,
        kc,
        m.rainfall_mm,
        day_of_year,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_polar_night_finite() {
        // 북위 89°, 동지 부근: tan 곱이 1을 넘어 acos 정의역 밖
        let delta = solar_declination(355);
        let ws = sunset_hour_angle(89f64.to_radians(), delta);
        assert_eq!(ws, 0.0);
    }

    #[test]
    fn validation_runs_before_arithmetic() {
        let err = compute(f64::NAN, 10.0, 0.0, 1.0, 0.0, 100).unwrap_err();
        assert_eq!(err, InvalidInputError::NonFinite("maximum temperature"));
        let err = compute(20.0, 10.0, 0.0, f64::INFINITY, 0.0, 100).unwrap_err();
        assert_eq!(err, InvalidInputError::NonFinite("Kc"));
    }
}
