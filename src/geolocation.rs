/// 현재 위치(위도/경도) 조회. 자동 입력 모드에서 기상 조회 전에 사용한다.
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;

/// 위경도 좌표 [deg].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// 범위를 벗어나거나 유한하지 않은 좌표는 None.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let ok = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        ok.then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// 위치 조회 실패 원인.
#[derive(Debug, Clone, PartialEq)]
pub enum GeolocationError {
    /// 사용자가 위치 조회를 허용하지 않음
    PermissionDenied,
    /// 위치 정보를 얻을 수 없음
    PositionUnavailable,
    /// 응답 시간 초과
    Timeout,
    /// 그 밖의 오류
    Unknown(String),
}

impl std::fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeolocationError::PermissionDenied => write!(f, "location permission denied"),
            GeolocationError::PositionUnavailable => write!(f, "location information unavailable"),
            GeolocationError::Timeout => write!(f, "location request timed out"),
            GeolocationError::Unknown(msg) => write!(f, "unknown location error: {msg}"),
        }
    }
}

impl std::error::Error for GeolocationError {}

impl GeolocationError {
    /// 언어팩 키.
    pub fn message_key(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => "geo.error.permission_denied",
            GeolocationError::PositionUnavailable => "geo.error.position_unavailable",
            GeolocationError::Timeout => "geo.error.timeout",
            GeolocationError::Unknown(_) => "geo.error.unknown",
        }
    }
}

/// 위치 제공자.
pub trait LocationProvider: Send {
    fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// 설정 파일에 고정된 좌표를 돌려준다.
#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    pub coordinates: Option<Coordinates>,
}

impl LocationProvider for ConfiguredLocation {
    fn locate(&self) -> Result<Coordinates, GeolocationError> {
        self.coordinates
            .ok_or(GeolocationError::PositionUnavailable)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// 공인 IP 기반 위치 조회(ip-api.com). 정확도는 도시 단위 수준이다.
#[derive(Debug, Clone)]
pub struct IpLocation {
    pub endpoint: String,
    pub timeout: Duration,
    pub allowed: bool,
}

impl IpLocation {
    pub fn new(timeout: Duration, allowed: bool) -> Self {
        Self {
            endpoint: "http://ip-api.com/json/".to_string(),
            timeout,
            allowed,
        }
    }
}

/// ip-api 응답 본문을 좌표로 변환한다.
pub fn parse_ip_lookup(body: &str) -> Result<Coordinates, GeolocationError> {
    let resp: IpApiResponse =
        serde_json::from_str(body).map_err(|e| GeolocationError::Unknown(e.to_string()))?;
    if resp.status != "success" {
        return Err(GeolocationError::PositionUnavailable);
    }
    match (resp.lat, resp.lon) {
        (Some(lat), Some(lon)) => {
            Coordinates::new(lat, lon).ok_or(GeolocationError::PositionUnavailable)
        }
        _ => Err(GeolocationError::PositionUnavailable),
    }
}

impl LocationProvider for IpLocation {
    fn locate(&self) -> Result<Coordinates, GeolocationError> {
        if !self.allowed {
            return Err(GeolocationError::PermissionDenied);
        }
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent.get(&self.endpoint).call().map_err(|e| match e {
            ureq::Error::Transport(t) if is_timeout(&t) => GeolocationError::Timeout,
            ureq::Error::Transport(_) => GeolocationError::PositionUnavailable,
            ureq::Error::Status(code, _) => GeolocationError::Unknown(format!("HTTP {code}")),
        })?;
        let body = response
            .into_string()
            .map_err(|e| GeolocationError::Unknown(e.to_string()))?;
        parse_ip_lookup(&body)
    }
}

/// ureq 전송 오류가 타임아웃에서 비롯됐는지 판정한다.
pub(crate) fn is_timeout(t: &ureq::Transport) -> bool {
    use std::error::Error;
    t.source()
        .and_then(|e| e.downcast_ref::<std::io::Error>())
        .map(|e| {
            matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        })
        .unwrap_or(false)
}

/// 설정에 고정 좌표가 있으면 그것을, 없으면 IP 조회를 사용한다.
pub fn provider_from_config(cfg: &Config) -> Box<dyn LocationProvider> {
    match cfg.home_location {
        Some(home) => Box::new(ConfiguredLocation {
            coordinates: Coordinates::new(home.latitude, home.longitude),
        }),
        None => Box::new(IpLocation::new(
            Duration::from_secs(cfg.weather.timeout_secs),
            cfg.allow_ip_location,
        )),
    }
}
