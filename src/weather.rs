/// 당일 기상값(최고/최저 기온, 강수량) 조회. Open-Meteo 일 단위 예보 API를 사용한다.
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::geolocation::{is_timeout, Coordinates};

/// 하루 기상 요약.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyWeather {
    /// API가 보정한 격자 좌표
    pub latitude: f64,
    pub longitude: f64,
    pub max_temperature_c: f64,
    pub min_temperature_c: f64,
    /// 강수 합계 [mm]
    pub precipitation_sum_mm: f64,
}

/// 기상 조회 오류.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// 전송/HTTP 오류
    Http(String),
    /// 응답 시간 초과
    Timeout,
    /// 응답에 필요한 값이 없거나 형식이 잘못됨
    MalformedPayload(String),
}

impl std::fmt::Display for WeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherError::Http(msg) => write!(f, "weather request failed: {msg}"),
            WeatherError::Timeout => write!(f, "weather request timed out"),
            WeatherError::MalformedPayload(msg) => {
                write!(f, "weather data missing from response: {msg}")
            }
        }
    }
}

impl std::error::Error for WeatherError {}

/// 기상 제공자.
pub trait WeatherProvider: Send {
    fn fetch_daily(&self, at: Coordinates) -> Result<DailyWeather, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

fn first_finite(values: &[Option<f64>], field: &str) -> Result<f64, WeatherError> {
    match values.first().copied().flatten() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(WeatherError::MalformedPayload(format!("{field}[0]"))),
    }
}

/// 예보 응답 본문에서 첫째 날 값을 꺼낸다. 강수량이 null이면 0으로 본다.
/// 기온이 하나라도 없으면 오류를 반환해 호출자가 수동 입력으로 돌아가게 한다.
pub fn parse_forecast(body: &str, requested: Coordinates) -> Result<DailyWeather, WeatherError> {
    let resp: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::MalformedPayload(e.to_string()))?;
    let daily = resp
        .daily
        .ok_or_else(|| WeatherError::MalformedPayload("daily".into()))?;
    let max_temperature_c = first_finite(&daily.temperature_2m_max, "temperature_2m_max")?;
    let min_temperature_c = first_finite(&daily.temperature_2m_min, "temperature_2m_min")?;
    let precipitation_sum_mm = match daily.precipitation_sum.first().copied().flatten() {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(_) => {
            return Err(WeatherError::MalformedPayload(
                "precipitation_sum[0]".into(),
            ))
        }
        None => 0.0,
    };
    Ok(DailyWeather {
        latitude: resp.latitude.unwrap_or(requested.latitude),
        longitude: resp.longitude.unwrap_or(requested.longitude),
        max_temperature_c,
        min_temperature_c,
        precipitation_sum_mm,
    })
}

/// Open-Meteo 예보 API 클라이언트.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenMeteo {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            base_url: cfg.weather.base_url.clone(),
            timeout: Duration::from_secs(cfg.weather.timeout_secs),
        }
    }
}

impl WeatherProvider for OpenMeteo {
    fn fetch_daily(&self, at: Coordinates) -> Result<DailyWeather, WeatherError> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent
            .get(&self.base_url)
            .query("latitude", &at.latitude.to_string())
            .query("longitude", &at.longitude.to_string())
            .query(
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_sum",
            )
            .query("timezone", "auto")
            .call()
            .map_err(|e| match e {
                ureq::Error::Transport(t) if is_timeout(&t) => WeatherError::Timeout,
                ureq::Error::Transport(t) => WeatherError::Http(t.to_string()),
                ureq::Error::Status(code, _) => WeatherError::Http(format!("HTTP {code}")),
            })?;
        let body = response
            .into_string()
            .map_err(|e| WeatherError::Http(e.to_string()))?;
        parse_forecast(&body, at)
    }
}
