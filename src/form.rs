//! 입력 양식 상태. CLI와 GUI가 공유하며 화면 그리기와는 분리되어 있다.
//!
//! 원시 문자열 입력, 수동/자동 모드, 선택된 작물/단계, 상태 메시지와 마지막
//! 계산 결과를 보관하고, 검증을 통과한 값만 계산 코어로 넘긴다.

use serde::{Deserialize, Serialize};

use crate::autofill::{AutoFill, AutoFillError};
use crate::crop_db::CropCatalog;
use crate::evapotranspiration::{self, EvapotranspirationResult, InvalidInputError, Measurement};

/// 입력 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// 사용자가 직접 입력
    Manual,
    /// 위치와 기상 API로 자동 입력
    Auto,
}

/// 자동 모드 진행 상태.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    /// 위치/기상 조회 중
    Locating,
    /// 해당 격자 좌표의 데이터를 불러옴
    DataLoaded { latitude: f64, longitude: f64 },
    /// 조회 실패, 수동 모드로 복귀함
    Failed(AutoFillError),
}

impl StatusMessage {
    pub fn is_error(&self) -> bool {
        matches!(self, StatusMessage::Failed(_))
    }
}

/// 계산 요청 시 양식 오류.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// 기온/위도가 비어 있거나 숫자가 아님
    MissingWeatherFields,
    /// 작물 또는 생육단계 미선택
    MissingCropStage,
    /// 계산 코어가 거부한 입력
    Invalid(InvalidInputError),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::MissingWeatherFields => {
                write!(f, "fill in the temperature and latitude fields")
            }
            FormError::MissingCropStage => write!(f, "select the crop and its growth stage"),
            FormError::Invalid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FormError {}

impl From<InvalidInputError> for FormError {
    fn from(value: InvalidInputError) -> Self {
        FormError::Invalid(value)
    }
}

impl FormError {
    /// 언어팩 키.
    pub fn message_key(&self) -> &'static str {
        match self {
            FormError::MissingWeatherFields => "form.error.missing_weather",
            FormError::MissingCropStage => "form.error.missing_crop_stage",
            FormError::Invalid(_) => "form.error.invalid",
        }
    }
}

/// 입력 양식 전체 상태.
#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: InputMode,
    pub tmax: String,
    pub tmin: String,
    pub latitude: String,
    pub rainfall: String,
    pub crop_key: Option<String>,
    pub stage_key: Option<String>,
    /// 작물 선택 패널 검색어
    pub crop_search: String,
    pub status: Option<StatusMessage>,
    /// 자동 입력 후 기온/위도 필드 잠금
    pub inputs_locked: bool,
    pub result: Option<EvapotranspirationResult>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            mode: InputMode::Manual,
            tmax: String::new(),
            tmin: String::new(),
            latitude: String::new(),
            rainfall: String::new(),
            crop_key: None,
            stage_key: None,
            crop_search: String::new(),
            status: None,
            inputs_locked: false,
            result: None,
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let v = s.trim().replace(',', ".").parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

impl FormState {
    /// 평균 기온 표시 문자열. 기온 둘 중 하나라도 없으면 "--".
    pub fn mean_temperature_display(&self) -> String {
        match (parse_number(&self.tmax), parse_number(&self.tmin)) {
            (Some(max), Some(min)) => format!("{:.2}", (max + min) / 2.0),
            _ => "--".to_string(),
        }
    }

    /// 모드를 전환한다. 결과 패널은 항상 숨긴다.
    /// 자동 모드의 실제 조회는 호출자가 시작한다.
    pub fn switch_mode(&mut self, mode: InputMode) {
        self.mode = mode;
        self.result = None;
        match mode {
            InputMode::Manual => {
                self.inputs_locked = false;
                self.status = None;
            }
            InputMode::Auto => {
                self.status = Some(StatusMessage::Locating);
            }
        }
    }

    /// 자동 조회 결과를 양식에 반영하고 기상 필드를 잠근다.
    pub fn apply_auto_fill(&mut self, fill: &AutoFill) {
        self.latitude = format!("{:.4}", fill.coordinates.latitude);
        self.tmax = fill.weather.max_temperature_c.to_string();
        self.tmin = fill.weather.min_temperature_c.to_string();
        self.rainfall = fill.weather.precipitation_sum_mm.to_string();
        self.inputs_locked = true;
        self.status = Some(StatusMessage::DataLoaded {
            latitude: fill.weather.latitude,
            longitude: fill.weather.longitude,
        });
    }

    /// 조회 실패 시 오류 상태를 남기고 수동 모드로 되돌린다.
    /// 위치까지는 얻은 경우 위도 필드는 채워 둔다.
    pub fn apply_auto_fill_error(&mut self, err: AutoFillError) {
        if let AutoFillError::Weather { coordinates, .. } = &err {
            self.latitude = format!("{:.4}", coordinates.latitude);
        }
        self.mode = InputMode::Manual;
        self.inputs_locked = false;
        self.status = Some(StatusMessage::Failed(err));
    }

    /// 작물을 선택하면 이전 생육단계 선택은 지운다.
    pub fn select_crop(&mut self, crop_key: &str) {
        if self.crop_key.as_deref() != Some(crop_key) {
            self.stage_key = None;
        }
        self.crop_key = Some(crop_key.to_string());
    }

    pub fn select_stage(&mut self, stage_key: &str) {
        self.stage_key = Some(stage_key.to_string());
    }

    /// 선택된 작물의 단계 목록: (단계 키, "라벨 (Kc: 값)").
    pub fn stage_options(&self, catalog: &dyn CropCatalog) -> Vec<(String, String)> {
        let Some(crop) = self.crop_key.as_deref().and_then(|k| catalog.find(k)) else {
            return Vec::new();
        };
        crop.stages
            .iter()
            .map(|(key, s)| (key.clone(), format!("{} (Kc: {})", s.label, s.kc)))
            .collect()
    }

    /// 선택된 단계의 Kc.
    pub fn selected_kc(&self, catalog: &dyn CropCatalog) -> Option<f64> {
        let crop = self.crop_key.as_deref()?;
        let stage = self.stage_key.as_deref()?;
        catalog.stage(crop, stage).map(|s| s.kc)
    }

    /// 양식 값을 측정값과 Kc로 변환한다. 강우량이 비었거나 숫자가 아니면 0.
    pub fn measurement(&self, catalog: &dyn CropCatalog) -> Result<(Measurement, f64), FormError> {
        let (Some(max), Some(min), Some(lat)) = (
            parse_number(&self.tmax),
            parse_number(&self.tmin),
            parse_number(&self.latitude),
        ) else {
            return Err(FormError::MissingWeatherFields);
        };
        let kc = self
            .selected_kc(catalog)
            .ok_or(FormError::MissingCropStage)?;
        let rainfall_mm = parse_number(&self.rainfall).unwrap_or(0.0);
        Ok((
            Measurement {
                max_temperature_c: max,
                min_temperature_c: min,
                latitude_deg: lat,
                rainfall_mm,
            },
            kc,
        ))
    }

    /// 계산을 수행하고 결과를 보관한다. 실패하면 이전 결과는 지운다.
    pub fn calculate(
        &mut self,
        catalog: &dyn CropCatalog,
        day_of_year: u32,
    ) -> Result<EvapotranspirationResult, FormError> {
        self.result = None;
        let (m, kc) = self.measurement(catalog)?;
        let result = evapotranspiration::compute_measurement(&m, kc, day_of_year)?;
        self.result = Some(result);
        Ok(result)
    }
}
