use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_CALCULATE: &str = "main_menu.calculate";
    pub const MAIN_MENU_AUTO_FILL: &str = "main_menu.auto_fill";
    pub const MAIN_MENU_CROPS: &str = "main_menu.crops";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const PROMPT_SELECT: &str = "prompt.select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";
    pub const ERROR_INVALID_NUMBER: &str = "error.invalid_number";

    pub const CALC_HEADING: &str = "calc.heading";
    pub const PROMPT_TMAX: &str = "prompt.tmax";
    pub const PROMPT_TMIN: &str = "prompt.tmin";
    pub const PROMPT_LATITUDE: &str = "prompt.latitude";
    pub const PROMPT_RAINFALL: &str = "prompt.rainfall";
    pub const PROMPT_CROP_SEARCH: &str = "prompt.crop_search";
    pub const PROMPT_CROP_NUMBER: &str = "prompt.crop_number";
    pub const PROMPT_STAGE_NUMBER: &str = "prompt.stage_number";
    pub const CALC_MEAN_TEMPERATURE: &str = "calc.mean_temperature";
    pub const CALC_DAY_OF_YEAR: &str = "calc.day_of_year";
    pub const CALC_USE_AUTO_VALUES: &str = "calc.use_auto_values";

    pub const AUTO_HEADING: &str = "auto.heading";
    pub const AUTO_LOCATING: &str = "auto.locating";
    pub const AUTO_LOADED: &str = "auto.loaded";
    pub const AUTO_FAILED: &str = "auto.failed";
    pub const GEO_PERMISSION_DENIED: &str = "geo.error.permission_denied";
    pub const GEO_POSITION_UNAVAILABLE: &str = "geo.error.position_unavailable";
    pub const GEO_TIMEOUT: &str = "geo.error.timeout";
    pub const GEO_UNKNOWN: &str = "geo.error.unknown";
    pub const WEATHER_FAILED: &str = "weather.error.failed";

    pub const FORM_MISSING_WEATHER: &str = "form.error.missing_weather";
    pub const FORM_MISSING_CROP_STAGE: &str = "form.error.missing_crop_stage";
    pub const FORM_INVALID: &str = "form.error.invalid";

    pub const CROPS_HEADING: &str = "crops.heading";
    pub const CROPS_NONE_FOUND: &str = "crops.none_found";

    pub const REPORT_FORMULA_HEADING: &str = "report.formula_heading";
    pub const REPORT_RA: &str = "report.ra";
    pub const REPORT_RA_MM: &str = "report.ra_mm";
    pub const REPORT_ETO: &str = "report.eto";
    pub const REPORT_ETC: &str = "report.etc";
    pub const REPORT_CROP_NEED: &str = "report.crop_need";
    pub const REPORT_RAINFALL: &str = "report.rainfall";
    pub const REPORT_NO_IRRIGATION: &str = "report.no_irrigation";
    pub const REPORT_IRRIGATION_NEEDED: &str = "report.irrigation_needed";
    pub const REPORT_LITERS_EQUIVALENT: &str = "report.liters_equivalent";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_CURRENT_LANGUAGE: &str = "settings.current_language";
    pub const SETTINGS_OPTIONS: &str = "settings.options";
    pub const SETTINGS_PROMPT_LANGUAGE: &str = "settings.prompt_language";
    pub const SETTINGS_PROMPT_LAT: &str = "settings.prompt_lat";
    pub const SETTINGS_PROMPT_LON: &str = "settings.prompt_lon";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
    pub const SETTINGS_SAVED: &str = "settings.saved";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
    Pt,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("ko") {
            Language::Ko
        } else if c.starts_with("pt") {
            Language::Pt
        } else {
            Language::En
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
            Language::Pt => "pt",
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드에 따라 내장 문자열만 쓰는 번역기를 생성한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 언어팩을 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code))
            .or_else(|| built_in_pack(lang_code));
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn language_code(&self) -> &'static str {
        self.lang.as_code()
    }

    /// 키를 조회해 문자열을 반환한다. 언어팩에 없으면 None.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.overrides.as_ref().and_then(|m| m.get(key).cloned())
    }

    /// 번역을 가져온다. 언어팩 → 내장 문자열 → 영어 → 한국어 순으로 찾는다.
    pub fn t(&self, key: &str) -> String {
        if let Some(v) = self.lookup(key) {
            return v;
        }
        let built_in = match self.lang {
            Language::Ko => ko(key),
            Language::En | Language::Pt => en(key),
        };
        built_in
            .or_else(|| en(key))
            .or_else(|| ko(key))
            .unwrap_or("[missing translation]")
            .to_string()
    }

    /// `{name}` 자리표시자를 채운 번역 문자열.
    pub fn tf(&self, key: &str, vars: &[(&str, String)]) -> String {
        fill_template(&self.t(key), vars)
    }
}

/// `{key}` 자리표시자를 값으로 치환한다.
pub fn fill_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        "ko" | "ko-kr" => Some("ko-kr".into()),
        "en" | "en-us" | "en-uk" => Some("en-us".into()),
        "pt" | "pt-br" | "pt-pt" => Some("pt-br".into()),
        other if other.starts_with("ko") => Some("ko-kr".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        other if other.starts_with("pt") => Some("pt-br".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko-kr".into()),
        "en" => Some("en-us".into()),
        "pt" => Some("pt-br".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(loc) = get_locale() {
        if let Some(lang) = normalize_locale_string(&loc) {
            return Some(lang);
        }
    }
    for var in ["LANG", "LC_ALL"] {
        if let Ok(lang) = std::env::var(var) {
            if let Some(code) = normalize_locale_string(&lang) {
                return Some(code);
            }
        }
    }
    None
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 또는 중첩 테이블.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Table = toml::from_str(src).ok()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in &value {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// 내장 언어팩(파일이 없어도 동작하도록 빌드 시 포함).
fn built_in_pack(lang: &str) -> Option<HashMap<String, String>> {
    match lang.to_lowercase().as_str() {
        "en-us" | "en" => parse_toml_to_map(include_str!("../locales/en-us.toml")),
        "ko-kr" | "ko" => parse_toml_to_map(include_str!("../locales/ko-kr.toml")),
        "pt-br" | "pt" => parse_toml_to_map(include_str!("../locales/pt-br.toml")),
        _ => None,
    }
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        MAIN_MENU_TITLE => "\n=== Irrigation Need Toolbox ===",
        MAIN_MENU_CALCULATE => "1) 관개량 계산 (수동 입력)",
        MAIN_MENU_AUTO_FILL => "2) 현재 위치 기상으로 계산 (자동)",
        MAIN_MENU_CROPS => "3) 작물 Kc 목록",
        MAIN_MENU_SETTINGS => "4) 설정",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        PROMPT_SELECT => "선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        ERROR_INVALID_NUMBER => "숫자를 입력하세요.",
        CALC_HEADING => "\n-- 관개량 계산 (FAO-56 Hargreaves) --",
        PROMPT_TMAX => "최고 기온 [°C]: ",
        PROMPT_TMIN => "최저 기온 [°C]: ",
        PROMPT_LATITUDE => "위도 [deg] (남반구 음수): ",
        PROMPT_RAINFALL => "강우량 [mm] (없으면 엔터): ",
        PROMPT_CROP_SEARCH => "작물 검색어 (전체는 엔터): ",
        PROMPT_CROP_NUMBER => "작물 번호: ",
        PROMPT_STAGE_NUMBER => "생육단계 번호: ",
        CALC_MEAN_TEMPERATURE => "평균 기온:",
        CALC_DAY_OF_YEAR => "연중 일수(J):",
        CALC_USE_AUTO_VALUES => "불러온 값으로 계산합니다.",
        AUTO_HEADING => "\n-- 자동 입력 --",
        AUTO_LOCATING => "위치를 확인하는 중...",
        AUTO_LOADED => "{lat}, {lon} 기상 데이터를 불러왔습니다.",
        AUTO_FAILED => "자동 입력 실패, 수동 입력으로 전환합니다:",
        GEO_PERMISSION_DENIED => "위치 조회 권한이 거부되었습니다.",
        GEO_POSITION_UNAVAILABLE => "위치 정보를 사용할 수 없습니다. 네트워크 또는 설정 좌표를 확인하세요.",
        GEO_TIMEOUT => "위치 조회 시간이 초과되었습니다. 연결을 확인하고 다시 시도하세요.",
        GEO_UNKNOWN => "위치 조회 중 알 수 없는 오류가 발생했습니다.",
        WEATHER_FAILED => "기상 데이터를 가져오지 못했습니다. 다시 시도하세요.",
        FORM_MISSING_WEATHER => "기온과 위도를 모두 입력하세요.",
        FORM_MISSING_CROP_STAGE => "작물과 생육단계를 선택하세요.",
        FORM_INVALID => "입력값이 올바르지 않습니다:",
        CROPS_HEADING => "\n-- 작물 Kc 목록 --",
        CROPS_NONE_FOUND => "검색어와 일치하는 작물이 없습니다.",
        REPORT_FORMULA_HEADING => "사용한 공식 (Hargreaves - FAO-56):",
        REPORT_RA => "Ra (외계 일사량)",
        REPORT_RA_MM => "Ra 환산 (Ra_mm)",
        REPORT_ETO => "ETo (기준 증발산량)",
        REPORT_ETC => "ETc (작물 증발산량)",
        REPORT_CROP_NEED => "작물 요구량 (ETc):",
        REPORT_RAINFALL => "기록된 강우량:",
        REPORT_NO_IRRIGATION => "관개가 필요하지 않습니다. 오늘 강우가 작물 요구량을 충족했습니다.",
        REPORT_IRRIGATION_NEEDED => "필요 관개량:",
        REPORT_LITERS_EQUIVALENT => "(제곱미터당 {liters} 리터에 해당)",
        SETTINGS_HEADING => "\n-- 설정 --",
        SETTINGS_CURRENT_LANGUAGE => "현재 언어:",
        SETTINGS_OPTIONS => "1) 언어  2) 농장 좌표  3) 좌표 지우기 (IP 조회 사용)",
        SETTINGS_PROMPT_LANGUAGE => "언어 코드 (auto/ko/en/pt): ",
        SETTINGS_PROMPT_LAT => "농장 위도: ",
        SETTINGS_PROMPT_LON => "농장 경도: ",
        SETTINGS_INVALID => "잘못된 입력이므로 변경하지 않습니다.",
        SETTINGS_SAVED => "설정이 저장되었습니다.",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting application.",
        MAIN_MENU_TITLE => "\n=== Irrigation Need Toolbox ===",
        MAIN_MENU_CALCULATE => "1) Irrigation need (manual input)",
        MAIN_MENU_AUTO_FILL => "2) Irrigation need from local weather (auto)",
        MAIN_MENU_CROPS => "3) Crop Kc list",
        MAIN_MENU_SETTINGS => "4) Settings",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        PROMPT_SELECT => "Select: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please choose again.",
        ERROR_INVALID_NUMBER => "Please enter a number.",
        CALC_HEADING => "\n-- Irrigation need (FAO-56 Hargreaves) --",
        PROMPT_TMAX => "Maximum temperature [°C]: ",
        PROMPT_TMIN => "Minimum temperature [°C]: ",
        PROMPT_LATITUDE => "Latitude [deg] (south negative): ",
        PROMPT_RAINFALL => "Rainfall [mm] (enter for none): ",
        PROMPT_CROP_SEARCH => "Search crop (enter for all): ",
        PROMPT_CROP_NUMBER => "Crop number: ",
        PROMPT_STAGE_NUMBER => "Growth stage number: ",
        CALC_MEAN_TEMPERATURE => "Mean temperature:",
        CALC_DAY_OF_YEAR => "Day of year (J):",
        CALC_USE_AUTO_VALUES => "Calculating with the loaded values.",
        AUTO_HEADING => "\n-- Auto fill --",
        AUTO_LOCATING => "Getting your location...",
        AUTO_LOADED => "Data for {lat}, {lon} loaded.",
        AUTO_FAILED => "Auto fill failed, switching to manual input:",
        GEO_PERMISSION_DENIED => "Location permission denied by the user.",
        GEO_POSITION_UNAVAILABLE => "Location information unavailable. Check the network or the configured coordinates.",
        GEO_TIMEOUT => "The location request timed out. Check your connection and try again.",
        GEO_UNKNOWN => "An unknown error occurred while getting the location.",
        WEATHER_FAILED => "Failed to fetch weather data. Please try again.",
        FORM_MISSING_WEATHER => "Please fill in all temperature and latitude fields.",
        FORM_MISSING_CROP_STAGE => "Please select the crop and its growth stage.",
        FORM_INVALID => "Invalid input:",
        CROPS_HEADING => "\n-- Crop Kc list --",
        CROPS_NONE_FOUND => "No crop matches the search.",
        REPORT_FORMULA_HEADING => "Formula used (Hargreaves - FAO-56):",
        REPORT_RA => "Ra (extraterrestrial radiation)",
        REPORT_RA_MM => "Converted Ra (Ra_mm)",
        REPORT_ETO => "ETo (reference evapotranspiration)",
        REPORT_ETC => "ETc (crop evapotranspiration)",
        REPORT_CROP_NEED => "Crop need (ETc):",
        REPORT_RAINFALL => "Recorded rainfall:",
        REPORT_NO_IRRIGATION => "No irrigation needed. Today's rain covered the crop's need.",
        REPORT_IRRIGATION_NEEDED => "Irrigation needed:",
        REPORT_LITERS_EQUIVALENT => "(Equivalent to {liters} liters per square meter)",
        SETTINGS_HEADING => "\n-- Settings --",
        SETTINGS_CURRENT_LANGUAGE => "Current language:",
        SETTINGS_OPTIONS => "1) Language  2) Farm coordinates  3) Clear coordinates (use IP lookup)",
        SETTINGS_PROMPT_LANGUAGE => "Language code (auto/ko/en/pt): ",
        SETTINGS_PROMPT_LAT => "Farm latitude: ",
        SETTINGS_PROMPT_LON => "Farm longitude: ",
        SETTINGS_INVALID => "Invalid input, nothing changed.",
        SETTINGS_SAVED => "Settings saved.",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_config() {
        assert_eq!(resolve_language("pt", Some("ko")), "pt-br");
        assert_eq!(resolve_language("auto", Some("ko-KR")), "ko-kr");
    }

    #[test]
    fn nested_pack_keys_are_flattened() {
        let map = parse_toml_to_map("[report]\nno_irrigation = \"x\"\n").unwrap();
        assert_eq!(map.get("report.no_irrigation").map(String::as_str), Some("x"));
    }

    #[test]
    fn portuguese_pack_overrides_built_in_english() {
        let tr = Translator::new_with_pack("pt-br", Some("does-not-exist"));
        assert_eq!(tr.language(), Language::Pt);
        assert_eq!(tr.t(keys::REPORT_IRRIGATION_NEEDED), "Irrigação necessária:");
    }

    #[test]
    fn every_shipped_pack_carries_gui_labels() {
        for code in ["en-us", "ko-kr", "pt-br"] {
            let pack = built_in_pack(code).unwrap();
            for key in ["gui.about.title", "gui.about.body", "gui.calc.button"] {
                assert!(pack.contains_key(key), "{code} is missing {key}");
            }
        }
    }

    #[test]
    fn template_placeholders_are_filled() {
        let tr = Translator::new("en");
        let s = tr.tf(
            keys::AUTO_LOADED,
            &[("lat", "-15.00".into()), ("lon", "-47.00".into())],
        );
        assert_eq!(s, "Data for -15.00, -47.00 loaded.");
    }
}
