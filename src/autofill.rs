/// 위치 조회 → 기상 조회를 묶어 입력 양식을 자동으로 채운다.
/// GUI에서는 작업 스레드로 실행하고 채널을 매 프레임 폴링한다.
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::geolocation::{Coordinates, GeolocationError, LocationProvider};
use crate::weather::{DailyWeather, WeatherError, WeatherProvider};

/// 자동 입력 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoFill {
    /// 장치(또는 설정)가 보고한 위치
    pub coordinates: Coordinates,
    pub weather: DailyWeather,
}

/// 자동 입력 실패. 어느 단계에서 실패했는지 구분한다.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoFillError {
    Location(GeolocationError),
    /// 위치는 얻었으나 기상 조회가 실패함
    Weather {
        coordinates: Coordinates,
        error: WeatherError,
    },
    /// 작업 스레드가 결과 없이 종료됨
    WorkerLost,
}

impl std::fmt::Display for AutoFillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutoFillError::Location(e) => write!(f, "{e}"),
            AutoFillError::Weather { error, .. } => write!(f, "{error}"),
            AutoFillError::WorkerLost => write!(f, "auto-fill worker stopped unexpectedly"),
        }
    }
}

impl std::error::Error for AutoFillError {}

impl From<GeolocationError> for AutoFillError {
    fn from(value: GeolocationError) -> Self {
        AutoFillError::Location(value)
    }
}

/// 현재 스레드에서 위치 → 기상 순으로 조회한다.
pub fn run_auto_fill(
    location: &dyn LocationProvider,
    weather: &dyn WeatherProvider,
) -> Result<AutoFill, AutoFillError> {
    let coordinates = location.locate()?;
    let daily = weather
        .fetch_daily(coordinates)
        .map_err(|error| AutoFillError::Weather { coordinates, error })?;
    Ok(AutoFill {
        coordinates,
        weather: daily,
    })
}

/// 작업 스레드에서 조회하고 결과 하나를 채널로 보낸다.
pub fn spawn_auto_fill(
    location: Box<dyn LocationProvider>,
    weather: Box<dyn WeatherProvider>,
) -> Receiver<Result<AutoFill, AutoFillError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = run_auto_fill(location.as_ref(), weather.as_ref());
        // 수신 측이 모드를 바꿔 채널을 버렸으면 결과도 버린다
        let _ = tx.send(result);
    });
    rx
}
