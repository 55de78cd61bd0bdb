use crate::autofill::AutoFillError;
use crate::config::Config;
use crate::crop_db::{CatalogError, CropCatalog};
use crate::evapotranspiration::{self, EvapotranspirationResult, InvalidInputError};
use crate::form::FormError;
use crate::i18n::{self, Translator};
use crate::ui_cli;
use crate::ui_cli::MenuChoice;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum AppError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// 설정 저장/로드 오류
    Config(crate::config::ConfigError),
    /// 작물 카탈로그 오류
    Catalog(CatalogError),
    /// 양식 입력 오류
    Form(FormError),
    /// 계산 입력 오류
    Input(InvalidInputError),
    /// 자동 입력(위치/기상) 오류
    AutoFill(AutoFillError),
    /// 카탈로그에 없는 작물
    UnknownCrop(String),
    /// 작물에 없는 생육단계
    UnknownStage { crop: String, stage: String },
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Io(e) => write!(f, "I/O error: {e}"),
            AppError::Config(e) => write!(f, "{e}"),
            AppError::Catalog(e) => write!(f, "{e}"),
            AppError::Form(e) => write!(f, "{e}"),
            AppError::Input(e) => write!(f, "invalid input: {e}"),
            AppError::AutoFill(e) => write!(f, "auto fill failed: {e}"),
            AppError::UnknownCrop(key) => write!(f, "unknown crop: {key}"),
            AppError::UnknownStage { crop, stage } => {
                write!(f, "unknown growth stage '{stage}' for crop '{crop}'")
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(value: crate::config::ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        AppError::Catalog(value)
    }
}

impl From<FormError> for AppError {
    fn from(value: FormError) -> Self {
        AppError::Form(value)
    }
}

impl From<InvalidInputError> for AppError {
    fn from(value: InvalidInputError) -> Self {
        AppError::Input(value)
    }
}

impl From<AutoFillError> for AppError {
    fn from(value: AutoFillError) -> Self {
        AppError::AutoFill(value)
    }
}

/// 비대화식 계산 요청(`calc` 서브커맨드).
#[derive(Debug, Clone)]
pub struct CalcRequest {
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub latitude_deg: f64,
    pub crop: Option<String>,
    pub stage: Option<String>,
    /// 지정하면 카탈로그 대신 이 Kc를 쓴다
    pub kc: Option<f64>,
    pub rainfall_mm: f64,
    pub day_of_year: u32,
}

/// 요청의 Kc를 결정한다. 직접 지정한 값이 카탈로그보다 우선한다.
pub fn resolve_kc(req: &CalcRequest, catalog: &dyn CropCatalog) -> Result<f64, AppError> {
    if let Some(kc) = req.kc {
        return Ok(kc);
    }
    let (Some(crop_key), Some(stage_key)) = (req.crop.as_deref(), req.stage.as_deref()) else {
        return Err(AppError::Form(FormError::MissingCropStage));
    };
    let crop = catalog
        .find(crop_key)
        .ok_or_else(|| AppError::UnknownCrop(crop_key.to_string()))?;
    crop.stage(stage_key)
        .map(|s| s.kc)
        .ok_or_else(|| AppError::UnknownStage {
            crop: crop_key.to_string(),
            stage: stage_key.to_string(),
        })
}

/// 한 번 계산하고 결과를 돌려준다.
pub fn run_calc(
    req: &CalcRequest,
    catalog: &dyn CropCatalog,
) -> Result<EvapotranspirationResult, AppError> {
    let kc = resolve_kc(req, catalog)?;
    let result = evapotranspiration::compute(
        req.max_temp_c,
        req.min_temp_c,
        req.latitude_deg,
        kc,
        req.rainfall_mm,
        req.day_of_year,
    )?;
    Ok(result)
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run(config: &mut Config, tr: &Translator, catalog: &dyn CropCatalog) -> Result<(), AppError> {
    loop {
        let choice = match ui_cli::main_menu(tr) {
            Ok(choice) => choice,
            // 입력이 끝나면(파이프/EOF) 종료 메뉴와 같이 처리한다
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                MenuChoice::Exit
            }
            Err(e) => return Err(e),
        };
        match choice {
            MenuChoice::Calculate => ui_cli::handle_calculate(tr, catalog)?,
            MenuChoice::AutoFill => ui_cli::handle_auto_fill(tr, config, catalog)?,
            MenuChoice::Crops => ui_cli::handle_crops(tr, catalog)?,
            MenuChoice::Settings => {
                ui_cli::handle_settings(tr, config)?;
                config.save()?;
            }
            MenuChoice::Exit => {
                config.save()?;
                println!("{}", tr.t(i18n::keys::APP_EXIT));
                break;
            }
        }
    }
    Ok(())
}
