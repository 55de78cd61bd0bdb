//! 계산 결과를 공식 풀이와 권고 문구로 출력한다. CLI 출력, GUI 결과 패널,
//! 보고서 파일 저장에 같은 문자열을 쓴다.

use crate::autofill::AutoFillError;
use crate::evapotranspiration::{EvapotranspirationResult, Recommendation};
use crate::form::{FormError, StatusMessage};
use crate::i18n::{keys, Translator};

/// 공식 풀이 줄 목록. 수치는 소수 둘째 자리까지 표시한다.
pub fn formula_trace(r: &EvapotranspirationResult, tr: &Translator) -> Vec<String> {
    vec![
        tr.t(keys::REPORT_FORMULA_HEADING),
        format!(
            "{}: {:.2} MJ m⁻² d⁻¹",
            tr.t(keys::REPORT_RA),
            r.solar_radiation
        ),
        format!(
            "{}: {:.2} / 2.45 = {:.2} mm/day",
            tr.t(keys::REPORT_RA_MM),
            r.solar_radiation,
            r.solar_radiation_mm
        ),
        String::new(),
        tr.t(keys::REPORT_ETO),
        "ETo = 0.0023 * (Tmed + 17.8) * (Tmax - Tmin)^0.5 * Ra_mm".to_string(),
        format!(
            "ETo = 0.0023 * ({:.2} + 17.8) * ({:.2} - {:.2})^0.5 * {:.2}",
            r.mean_temperature_c, r.max_temperature_c, r.min_temperature_c, r.solar_radiation_mm
        ),
        format!("ETo = {:.2} mm", r.eto),
        String::new(),
        tr.t(keys::REPORT_ETC),
        "ETc = ETo * Kc".to_string(),
        format!("ETc = {:.2} * {:.2}", r.eto, r.kc),
        format!("ETc = {:.2} mm", r.etc),
    ]
}

/// 작물 요구량, 강우량, 최종 권고 줄 목록.
pub fn recommendation_lines(r: &EvapotranspirationResult, tr: &Translator) -> Vec<String> {
    let mut lines = vec![
        format!("{} {:.2} mm", tr.t(keys::REPORT_CROP_NEED), r.etc),
        format!("{} {:.2} mm", tr.t(keys::REPORT_RAINFALL), r.rainfall_mm),
    ];
    match r.recommendation() {
        Recommendation::NoIrrigationNeeded => lines.push(tr.t(keys::REPORT_NO_IRRIGATION)),
        Recommendation::Irrigate {
            depth_mm,
            liters_per_m2,
        } => {
            lines.push(format!(
                "{} {:.2} mm",
                tr.t(keys::REPORT_IRRIGATION_NEEDED),
                depth_mm
            ));
            lines.push(tr.tf(
                keys::REPORT_LITERS_EQUIVALENT,
                &[("liters", format!("{liters_per_m2:.2}"))],
            ));
        }
    }
    lines
}

/// 보고서 전체 텍스트.
pub fn render_report(r: &EvapotranspirationResult, tr: &Translator) -> String {
    let mut out = formula_trace(r, tr);
    out.push("-".repeat(40));
    out.extend(recommendation_lines(r, tr));
    out.join("\n")
}

/// 자동 모드 상태 메시지.
pub fn status_text(status: &StatusMessage, tr: &Translator) -> String {
    match status {
        StatusMessage::Locating => tr.t(keys::AUTO_LOCATING),
        StatusMessage::DataLoaded {
            latitude,
            longitude,
        } => tr.tf(
            keys::AUTO_LOADED,
            &[
                ("lat", format!("{latitude:.2}")),
                ("lon", format!("{longitude:.2}")),
            ],
        ),
        StatusMessage::Failed(err) => {
            format!("{} {}", tr.t(keys::AUTO_FAILED), auto_fill_error_text(err, tr))
        }
    }
}

/// 자동 입력 오류를 사용자 문구로 바꾼다. 기상 조회 실패는 원인과 무관하게 한 문구로 안내한다.
pub fn auto_fill_error_text(err: &AutoFillError, tr: &Translator) -> String {
    match err {
        AutoFillError::Location(e) => tr.t(e.message_key()),
        AutoFillError::Weather { .. } | AutoFillError::WorkerLost => tr.t(keys::WEATHER_FAILED),
    }
}

/// 양식 오류 문구. 코어 검증 오류는 상세 내용을 덧붙인다.
pub fn form_error_text(err: &FormError, tr: &Translator) -> String {
    match err {
        FormError::Invalid(e) => format!("{} {e}", tr.t(err.message_key())),
        _ => tr.t(err.message_key()),
    }
}
