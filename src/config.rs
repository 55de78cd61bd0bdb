use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::form::InputMode;

/// 기본 설정 파일 이름.
pub const CONFIG_FILE: &str = "config.toml";

/// 고정 위치(농장 좌표). 자동 모드에서 IP 조회 대신 사용한다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// 기상 API 접속 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timeout_secs: 15,
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드 (auto/en-us/ko-kr/pt-br)
    pub language: String,
    /// 외부 언어팩 디렉터리
    pub language_pack_dir: Option<String>,
    /// 시작 시 입력 모드
    pub default_mode: InputMode,
    /// 설정된 경우 자동 모드에서 이 좌표를 사용한다
    pub home_location: Option<HomeLocation>,
    /// IP 기반 위치 조회 허용 여부 (false면 권한 거부로 처리)
    pub allow_ip_location: bool,
    pub weather: WeatherSettings,
    /// 사용자 작물 카탈로그(TOML) 경로
    pub crop_catalog_path: Option<String>,
    pub always_on_top: bool,
    pub window_alpha: f32,
    /// 사용자 지정 폰트 경로
    pub custom_font_path: Option<String>,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            language_pack_dir: None,
            default_mode: InputMode::Manual,
            home_location: None,
            allow_ip_location: true,
            weather: WeatherSettings::default(),
            crop_catalog_path: None,
            always_on_top: false,
            window_alpha: 1.0,
            custom_font_path: None,
            source: None,
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum ConfigError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// TOML 역직렬화 오류
    Serde(toml::de::Error),
    /// TOML 직렬화 오류
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config file I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "config parse error: {e}"),
            ConfigError::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Serde(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        ConfigError::Serialize(value)
    }
}

/// config.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_default_at(Path::new(CONFIG_FILE))
}

/// 지정한 경로의 설정을 로드하거나 없으면 기본 설정을 만들어 저장한다.
pub fn load_or_default_at(path: &Path) -> Result<Config, ConfigError> {
    let mut cfg = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str::<Config>(&content)?
    } else {
        let cfg = Config::default();
        save_config(&cfg, path)?;
        cfg
    };
    cfg.source = Some(path.to_path_buf());
    Ok(cfg)
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 로드했던 파일(기본 config.toml)에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .source
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        save_config(self, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_roundtrip_through_toml() {
        let cfg = Config::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.language, "auto");
        assert_eq!(back.default_mode, InputMode::Manual);
        assert_eq!(back.weather, WeatherSettings::default());
        assert!(back.allow_ip_location);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let back: Config = toml::from_str(
            "language = \"pt-br\"\n[home_location]\nlatitude = -15.8\nlongitude = -47.9\n",
        )
        .unwrap();
        assert_eq!(back.language, "pt-br");
        assert_eq!(
            back.home_location,
            Some(HomeLocation {
                latitude: -15.8,
                longitude: -47.9
            })
        );
        assert_eq!(back.weather.timeout_secs, 15);
    }
}
