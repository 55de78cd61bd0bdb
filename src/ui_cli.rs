use std::io::{self, BufRead, Write};

use crate::app::AppError;
use crate::autofill;
use crate::config::{Config, HomeLocation};
use crate::crop_db::CropCatalog;
use crate::evapotranspiration::day_of_year_today;
use crate::form::{FormState, InputMode};
use crate::geolocation;
use crate::i18n::{keys, resolve_language, Translator};
use crate::report;
use crate::weather::OpenMeteo;

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Calculate,
    AutoFill,
    Crops,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu(tr: &Translator) -> Result<MenuChoice, AppError> {
    println!("{}", tr.t(keys::MAIN_MENU_TITLE));
    println!("{}", tr.t(keys::MAIN_MENU_CALCULATE));
    println!("{}", tr.t(keys::MAIN_MENU_AUTO_FILL));
    println!("{}", tr.t(keys::MAIN_MENU_CROPS));
    println!("{}", tr.t(keys::MAIN_MENU_SETTINGS));
    println!("{}", tr.t(keys::MAIN_MENU_EXIT));
    loop {
        let sel = read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::Calculate),
            "2" => return Ok(MenuChoice::AutoFill),
            "3" => return Ok(MenuChoice::Crops),
            "4" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

/// 수동 입력 계산 메뉴를 처리한다.
pub fn handle_calculate(tr: &Translator, catalog: &dyn CropCatalog) -> Result<(), AppError> {
    println!("{}", tr.t(keys::CALC_HEADING));
    let mut form = FormState::default();
    read_weather_fields(tr, &mut form)?;
    finish_calculation(tr, catalog, &mut form)
}

/// 위치/기상 자동 입력 후 계산한다. 실패하면 수동 입력으로 이어간다.
pub fn handle_auto_fill(
    tr: &Translator,
    cfg: &Config,
    catalog: &dyn CropCatalog,
) -> Result<(), AppError> {
    println!("{}", tr.t(keys::AUTO_HEADING));
    let mut form = FormState::default();
    form.switch_mode(InputMode::Auto);
    print_status(tr, &form);

    let location = geolocation::provider_from_config(cfg);
    let weather = OpenMeteo::from_config(cfg);
    match autofill::run_auto_fill(location.as_ref(), &weather) {
        Ok(fill) => {
            form.apply_auto_fill(&fill);
            print_status(tr, &form);
            println!(
                "Tmax = {} °C, Tmin = {} °C, lat = {}, rain = {} mm",
                form.tmax, form.tmin, form.latitude, form.rainfall
            );
            println!("{}", tr.t(keys::CALC_USE_AUTO_VALUES));
        }
        Err(err) => {
            form.apply_auto_fill_error(err);
            print_status(tr, &form);
            read_weather_fields(tr, &mut form)?;
        }
    }
    finish_calculation(tr, catalog, &mut form)
}

fn read_weather_fields(tr: &Translator, form: &mut FormState) -> Result<(), AppError> {
    form.tmax = read_f64(tr, &tr.t(keys::PROMPT_TMAX))?.to_string();
    form.tmin = read_f64(tr, &tr.t(keys::PROMPT_TMIN))?.to_string();
    form.latitude = read_f64(tr, &tr.t(keys::PROMPT_LATITUDE))?.to_string();
    form.rainfall = read_line(&tr.t(keys::PROMPT_RAINFALL))?.trim().to_string();
    Ok(())
}

fn finish_calculation(
    tr: &Translator,
    catalog: &dyn CropCatalog,
    form: &mut FormState,
) -> Result<(), AppError> {
    println!(
        "{} {} °C",
        tr.t(keys::CALC_MEAN_TEMPERATURE),
        form.mean_temperature_display()
    );
    pick_crop_stage(tr, catalog, form)?;
    let day = day_of_year_today();
    println!("{} {day}", tr.t(keys::CALC_DAY_OF_YEAR));
    match form.calculate(catalog, day) {
        Ok(result) => println!("\n{}", report::render_report(&result, tr)),
        Err(err) => println!(
            "{}: {}",
            tr.t(keys::ERROR_PREFIX),
            report::form_error_text(&err, tr)
        ),
    }
    Ok(())
}

/// 검색어로 작물을 거른 뒤 작물과 생육단계를 번호로 고른다.
fn pick_crop_stage(
    tr: &Translator,
    catalog: &dyn CropCatalog,
    form: &mut FormState,
) -> Result<(), AppError> {
    let crop_key = loop {
        form.crop_search = read_line(&tr.t(keys::PROMPT_CROP_SEARCH))?.trim().to_string();
        let found = catalog.filter(&form.crop_search);
        if found.is_empty() {
            println!("{}", tr.t(keys::CROPS_NONE_FOUND));
            continue;
        }
        for (i, crop) in found.iter().enumerate() {
            println!("{:>2}) {}", i + 1, crop.label);
        }
        if let Some(idx) = read_index(tr, &tr.t(keys::PROMPT_CROP_NUMBER), found.len())? {
            break found[idx].key.clone();
        }
    };
    form.select_crop(&crop_key);

    let options = form.stage_options(catalog);
    for (i, (_, label)) in options.iter().enumerate() {
        println!("{:>2}) {label}", i + 1);
    }
    if let Some(idx) = read_index(tr, &tr.t(keys::PROMPT_STAGE_NUMBER), options.len())? {
        form.select_stage(&options[idx].0);
    }
    Ok(())
}

/// 작물 Kc 목록 메뉴를 처리한다.
pub fn handle_crops(tr: &Translator, catalog: &dyn CropCatalog) -> Result<(), AppError> {
    println!("{}", tr.t(keys::CROPS_HEADING));
    let search = read_line(&tr.t(keys::PROMPT_CROP_SEARCH))?;
    print_crops(tr, catalog, search.trim());
    Ok(())
}

/// 작물과 단계별 Kc를 출력한다.
pub fn print_crops(tr: &Translator, catalog: &dyn CropCatalog, search: &str) {
    let found = catalog.filter(search);
    if found.is_empty() {
        println!("{}", tr.t(keys::CROPS_NONE_FOUND));
        return;
    }
    for crop in found {
        println!("{} [{}]", crop.label, crop.key);
        for (key, stage) in &crop.stages {
            println!("    {key:<12} {:<14} Kc = {:.2}", stage.label, stage.kc);
        }
    }
}

/// 설정 메뉴를 처리한다.
pub fn handle_settings(tr: &Translator, cfg: &mut Config) -> Result<(), AppError> {
    println!("{}", tr.t(keys::SETTINGS_HEADING));
    println!("{} {}", tr.t(keys::SETTINGS_CURRENT_LANGUAGE), cfg.language);
    println!("{}", tr.t(keys::SETTINGS_OPTIONS));
    let sel = read_line(&tr.t(keys::PROMPT_SELECT))?;
    match sel.trim() {
        "" => return Ok(()),
        "1" => {
            let code = read_line(&tr.t(keys::SETTINGS_PROMPT_LANGUAGE))?;
            let code = code.trim();
            if code.eq_ignore_ascii_case("auto") {
                cfg.language = "auto".to_string();
            } else {
                cfg.language = resolve_language(code, None);
            }
        }
        "2" => {
            let latitude = read_f64(tr, &tr.t(keys::SETTINGS_PROMPT_LAT))?;
            let longitude = read_f64(tr, &tr.t(keys::SETTINGS_PROMPT_LON))?;
            if geolocation::Coordinates::new(latitude, longitude).is_none() {
                println!("{}", tr.t(keys::SETTINGS_INVALID));
                return Ok(());
            }
            cfg.home_location = Some(HomeLocation {
                latitude,
                longitude,
            });
        }
        "3" => cfg.home_location = None,
        _ => {
            println!("{}", tr.t(keys::SETTINGS_INVALID));
            return Ok(());
        }
    }
    println!("{}", tr.t(keys::SETTINGS_SAVED));
    Ok(())
}

fn print_status(tr: &Translator, form: &FormState) {
    if let Some(status) = &form.status {
        let text = report::status_text(status, tr);
        if status.is_error() {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush().map_err(AppError::Io)?;
    read_line_from(&mut io::stdin().lock())
}

/// 한 줄을 읽는다. 입력 끝(EOF)은 빈 줄과 구분해 `UnexpectedEof` 오류로 돌려준다.
pub(crate) fn read_line_from<R: BufRead>(input: &mut R) -> Result<String, AppError> {
    let mut buf = String::new();
    if input.read_line(&mut buf).map_err(AppError::Io)? == 0 {
        return Err(AppError::Io(io::ErrorKind::UnexpectedEof.into()));
    }
    Ok(buf)
}

fn read_f64(tr: &Translator, prompt: &str) -> Result<f64, AppError> {
    loop {
        let s = read_line(prompt)?;
        match s.trim().replace(',', ".").parse::<f64>() {
            Ok(v) if v.is_finite() => return Ok(v),
            _ => println!("{}", tr.t(keys::ERROR_INVALID_NUMBER)),
        }
    }
}

/// 1부터 시작하는 번호를 읽어 인덱스로 돌려준다. 빈 입력은 None.
fn read_index(tr: &Translator, prompt: &str, len: usize) -> Result<Option<usize>, AppError> {
    loop {
        let s = read_line(prompt)?;
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        match s.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn end_of_input_is_an_error_not_an_empty_answer() {
        let mut input = Cursor::new("\n");
        assert_eq!(read_line_from(&mut input).unwrap(), "\n");
        match read_line_from(&mut input) {
            Err(AppError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn piped_answers_are_read_in_order() {
        let mut input = Cursor::new("30\n18\n");
        assert_eq!(read_line_from(&mut input).unwrap().trim(), "30");
        assert_eq!(read_line_from(&mut input).unwrap().trim(), "18");
        assert!(read_line_from(&mut input).is_err());
    }
}
