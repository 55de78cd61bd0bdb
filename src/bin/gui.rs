#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use eframe::{egui, App, Frame};
use image::GenericImageView;
use irrigation_toolbox::{
    autofill::{self, AutoFill, AutoFillError},
    config,
    crop_db::{self, CropCatalog},
    evapotranspiration::day_of_year_today,
    form::{FormState, InputMode},
    geolocation, i18n, report,
    weather::OpenMeteo,
};
use rfd::FileDialog;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;
use std::{env, fs, path::Path};

fn main() -> Result<(), eframe::Error> {
    // CLI 언어 옵션 처리: --lang xx 또는 --lang=xx (xx: auto/en/ko/pt)
    let mut cli_lang: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if let Some(val) = a.strip_prefix("--lang=") {
            cli_lang = Some(val.to_string());
        } else if (a == "--lang" || a == "-L") && i + 1 < args.len() {
            cli_lang = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    let mut app_cfg = match config::load_or_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config error: {e}");
            config::Config::default()
        }
    };
    if let Some(lang_cli) = cli_lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(egui::vec2(720.0, 820.0))
        .with_transparent(true);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let native = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "Irrigation Need Toolbox",
        native,
        Box::new(move |cc| {
            if let Err(e) = setup_fonts(&cc.egui_ctx, app_cfg.custom_font_path.as_deref()) {
                eprintln!("Font error: {e}");
            }
            Box::new(GuiApp::new(app_cfg.clone()))
        }),
    )
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["icon.png", "assets/icon.png", "../assets/icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: rgba.into_raw(),
        width: w,
        height: h,
    })
}

fn txt(tr: &i18n::Translator, key: &str, default: &str) -> String {
    tr.lookup(key).unwrap_or_else(|| default.to_string())
}

fn label_with_tip(ui: &mut egui::Ui, text: &str, tip: &str) -> egui::Response {
    ui.label(text).on_hover_text(tip)
}

/// 공통: 바이너리 폰트 바이트를 egui에 등록.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    let font_name = name.to_string();
    fonts
        .font_data
        .insert(font_name.clone(), egui::FontData::from_owned(bytes));
    // 기본 라틴 폰트 뒤에 두어 한글 등 누락 글리프만 대체한다
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .push(font_name.clone());
    fonts
        .families
        .entry(egui::FontFamily::Monospace)
        .or_default()
        .push(font_name);
    ctx.set_fonts(fonts);
}

/// 한글 표시용 대체 폰트를 적용한다.
/// 1) 설정의 사용자 지정 폰트
/// 2) assets/fonts/ 아래 폰트
/// 3) 운영체제 기본 CJK 폰트
/// 모두 실패하면 Err를 반환한다(라틴 문자는 기본 폰트로 계속 표시됨).
fn setup_fonts(ctx: &egui::Context, custom: Option<&str>) -> Result<(), String> {
    if let Some(path) = custom.filter(|p| !p.trim().is_empty()) {
        return load_custom_font(ctx, path);
    }

    let mut candidates: Vec<std::path::PathBuf> = vec![
        "assets/fonts/NotoSansKR-Regular.ttf".into(),
        "assets/fonts/malgun.ttf".into(),
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc".into(),
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc".into(),
        "/System/Library/Fonts/AppleSDGothicNeo.ttc".into(),
    ];
    if let Some(windir) = env::var_os("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        candidates.push(fonts.join("malgun.ttf"));
        candidates.push(fonts.join("gulim.ttc"));
    }
    for p in candidates {
        if p.exists() {
            let bytes = fs::read(&p)
                .map_err(|e| format!("Failed to read font ({}): {e}", p.display()))?;
            apply_font_bytes(ctx, bytes, "cjk_fallback");
            return Ok(());
        }
    }
    Err("CJK font not found. Please set a user font (.ttf/.ttc) in settings.".into())
}

/// 사용자가 선택한 경로의 폰트를 egui에 등록한다.
fn load_custom_font(ctx: &egui::Context, path: &str) -> Result<(), String> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("Font file not found: {path}"));
    }
    let bytes = fs::read(p).map_err(|e| format!("Failed to read font file: {e}"))?;
    apply_font_bytes(ctx, bytes, "user_font");
    Ok(())
}

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    catalog: Box<dyn CropCatalog>,
    form: FormState,
    /// 진행 중인 자동 입력 작업
    pending: Option<Receiver<Result<AutoFill, AutoFillError>>>,
    show_crop_panel: bool,
    show_settings_modal: bool,
    show_about_modal: bool,
    calc_error: Option<String>,
    report_status: Option<String>,
    // 설정 입력
    lang_input: String,
    lang_pack_dir_input: String,
    catalog_path_input: String,
    home_lat_input: String,
    home_lon_input: String,
    settings_status: Option<String>,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let lang_code = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = i18n::Translator::new_with_pack(&lang_code, config.language_pack_dir.as_deref());
        let mut settings_status = None;
        let catalog = match crop_db::load_catalog(&config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Crop catalog error: {e}");
                settings_status = Some(e.to_string());
                Box::new(crop_db::BuiltInCatalog::new())
            }
        };
        let (home_lat_input, home_lon_input) = match config.home_location {
            Some(h) => (h.latitude.to_string(), h.longitude.to_string()),
            None => (String::new(), String::new()),
        };
        let mut app = Self {
            lang_input: config.language.clone(),
            lang_pack_dir_input: config.language_pack_dir.clone().unwrap_or_default(),
            catalog_path_input: config.crop_catalog_path.clone().unwrap_or_default(),
            home_lat_input,
            home_lon_input,
            settings_status,
            tr,
            catalog,
            form: FormState::default(),
            pending: None,
            show_crop_panel: false,
            show_settings_modal: false,
            show_about_modal: false,
            calc_error: None,
            report_status: None,
            config,
        };
        if app.config.default_mode == InputMode::Auto {
            app.set_mode(InputMode::Auto);
        }
        app
    }

    /// 모드를 바꾼다. 자동 모드는 작업 스레드로 위치/기상 조회를 시작하고,
    /// 수동 모드는 진행 중인 작업 결과를 버린다.
    fn set_mode(&mut self, mode: InputMode) {
        self.form.switch_mode(mode);
        self.calc_error = None;
        self.report_status = None;
        match mode {
            InputMode::Manual => self.pending = None,
            InputMode::Auto => {
                let location = geolocation::provider_from_config(&self.config);
                let weather = Box::new(OpenMeteo::from_config(&self.config));
                self.pending = Some(autofill::spawn_auto_fill(location, weather));
            }
        }
    }

    /// 자동 입력 채널을 확인해 결과가 오면 양식에 반영한다.
    fn poll_auto_fill(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        let msg = rx.try_recv();
        match msg {
            Ok(Ok(fill)) => {
                self.form.apply_auto_fill(&fill);
                self.pending = None;
            }
            Ok(Err(err)) => {
                eprintln!("Auto fill failed: {err}");
                self.form.apply_auto_fill_error(err);
                self.pending = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.form.apply_auto_fill_error(AutoFillError::WorkerLost);
                self.pending = None;
            }
        }
    }

    fn calculate(&mut self) {
        self.report_status = None;
        match self.form.calculate(self.catalog.as_ref(), day_of_year_today()) {
            Ok(_) => self.calc_error = None,
            Err(e) => self.calc_error = Some(report::form_error_text(&e, &self.tr)),
        }
    }

    fn reload_translator(&mut self) {
        let lang_code = i18n::resolve_language("auto", Some(self.config.language.as_str()));
        self.tr =
            i18n::Translator::new_with_pack(&lang_code, self.config.language_pack_dir.as_deref());
    }

    fn ui_mode(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        ui.heading(txt(&tr, "gui.mode.heading", "Input mode"));
        let mut mode = self.form.mode;
        ui.horizontal(|ui| {
            ui.radio_value(&mut mode, InputMode::Manual, txt(&tr, "gui.mode.manual", "Manual"));
            ui.radio_value(
                &mut mode,
                InputMode::Auto,
                txt(&tr, "gui.mode.auto", "Automatic (location + weather)"),
            );
        });
        if mode != self.form.mode {
            self.set_mode(mode);
        }
        if let Some(status) = &self.form.status {
            let text = report::status_text(status, &tr);
            let color = if status.is_error() {
                egui::Color32::from_rgb(0xb0, 0x2a, 0x37)
            } else {
                egui::Color32::from_rgb(0x2e, 0x7d, 0x32)
            };
            ui.horizontal(|ui| {
                if self.pending.is_some() {
                    ui.spinner();
                }
                ui.colored_label(color, text);
            });
        }
    }

    fn ui_weather(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let enabled = !self.form.inputs_locked;
        ui.heading(txt(&tr, "gui.weather.heading", "Weather data"));
        egui::Grid::new("weather_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                label_with_tip(
                    ui,
                    &txt(&tr, "gui.weather.tmax", "Max temperature (°C)"),
                    &txt(&tr, "gui.weather.tmax_tip", "Highest air temperature of the day"),
                );
                ui.add_enabled(enabled, egui::TextEdit::singleline(&mut self.form.tmax));
                ui.end_row();

                label_with_tip(
                    ui,
                    &txt(&tr, "gui.weather.tmin", "Min temperature (°C)"),
                    &txt(&tr, "gui.weather.tmin_tip", "Lowest air temperature of the day"),
                );
                ui.add_enabled(enabled, egui::TextEdit::singleline(&mut self.form.tmin));
                ui.end_row();

                ui.label(txt(&tr, "gui.weather.tmean", "Mean temperature (°C)"));
                ui.strong(self.form.mean_temperature_display());
                ui.end_row();

                label_with_tip(
                    ui,
                    &txt(&tr, "gui.weather.latitude", "Latitude (°)"),
                    &txt(&tr, "gui.weather.latitude_tip", "Negative in the southern hemisphere"),
                );
                ui.add_enabled(enabled, egui::TextEdit::singleline(&mut self.form.latitude));
                ui.end_row();

                label_with_tip(
                    ui,
                    &txt(&tr, "gui.weather.rainfall", "Rainfall (mm)"),
                    &txt(&tr, "gui.weather.rainfall_tip", "Leave empty for no rain"),
                );
                ui.add(egui::TextEdit::singleline(&mut self.form.rainfall));
                ui.end_row();
            });
    }

    fn ui_crop(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        ui.heading(txt(&tr, "gui.crop.heading", "Crop"));
        let selected_label = self
            .form
            .crop_key
            .as_deref()
            .and_then(|k| self.catalog.find(k))
            .map(|c| c.label.clone())
            .unwrap_or_else(|| txt(&tr, "gui.crop.trigger", "Select a crop..."));
        if ui.button(selected_label).clicked() {
            self.show_crop_panel = !self.show_crop_panel;
        }

        if self.show_crop_panel {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.form.crop_search)
                        .hint_text(txt(&tr, "gui.crop.search", "Search crop...")),
                );
                let mut clicked: Option<String> = None;
                ui.horizontal_wrapped(|ui| {
                    for crop in self.catalog.filter(&self.form.crop_search) {
                        let selected = self.form.crop_key.as_deref() == Some(crop.key.as_str());
                        if ui.selectable_label(selected, crop.label.as_str()).clicked() {
                            clicked = Some(crop.key.clone());
                        }
                    }
                });
                if let Some(key) = clicked {
                    self.form.select_crop(&key);
                    self.show_crop_panel = false;
                }
            });
        }

        let options = self.form.stage_options(self.catalog.as_ref());
        let placeholder = txt(&tr, "gui.crop.stage_placeholder", "-- Select the stage --");
        let selected_text = self
            .form
            .stage_key
            .as_deref()
            .and_then(|k| options.iter().find(|(key, _)| key == k))
            .map(|(_, label)| label.clone())
            .unwrap_or(placeholder);
        ui.horizontal(|ui| {
            ui.label(txt(&tr, "gui.crop.stage", "Growth stage"));
            ui.add_enabled_ui(!options.is_empty(), |ui| {
                let mut stage = self.form.stage_key.clone();
                egui::ComboBox::from_id_source("crop_stage")
                    .selected_text(selected_text)
                    .width(260.0)
                    .show_ui(ui, |ui| {
                        for (key, label) in &options {
                            ui.selectable_value(&mut stage, Some(key.clone()), label.as_str());
                        }
                    });
                if stage != self.form.stage_key {
                    if let Some(key) = stage {
                        self.form.select_stage(&key);
                    }
                }
            });
        });
    }

    fn ui_result(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        if let Some(err) = &self.calc_error {
            ui.colored_label(egui::Color32::from_rgb(0xb0, 0x2a, 0x37), err.as_str());
        }
        let Some(result) = self.form.result else {
            return;
        };
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.heading(txt(&tr, "gui.result.heading", "Result"));
            ui.small(format!(
                "{} {}",
                txt(&tr, "gui.result.day_of_year", "Day of year (J):"),
                result.day_of_year
            ));
            for line in report::formula_trace(&result, &tr) {
                if line.is_empty() {
                    ui.add_space(4.0);
                } else {
                    ui.monospace(line);
                }
            }
            ui.separator();
            for line in report::recommendation_lines(&result, &tr) {
                ui.strong(line);
            }
            ui.add_space(6.0);
            if ui
                .button(txt(&tr, "gui.result.save", "Save report..."))
                .clicked()
            {
                if let Some(path) = FileDialog::new()
                    .add_filter("Text", &["txt"])
                    .set_file_name("irrigation_report.txt")
                    .save_file()
                {
                    self.report_status = Some(
                        match fs::write(&path, report::render_report(&result, &tr)) {
                            Ok(()) => format!(
                                "{} {}",
                                txt(&tr, "gui.result.saved", "Saved:"),
                                path.display()
                            ),
                            Err(e) => format!("{}: {e}", tr.t(i18n::keys::ERROR_PREFIX)),
                        },
                    );
                }
            }
            if let Some(s) = &self.report_status {
                ui.small(s.as_str());
            }
        });
    }

    fn ui_settings(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        ui.heading(txt(&tr, "gui.settings.general", "General"));
        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label(txt(&tr, "gui.settings.language", "Language (auto/en/ko/pt)"));
                ui.text_edit_singleline(&mut self.lang_input);
                ui.end_row();
                ui.label(txt(&tr, "gui.settings.pack_dir", "Language pack folder"));
                ui.text_edit_singleline(&mut self.lang_pack_dir_input);
                ui.end_row();
                ui.label(txt(&tr, "gui.settings.catalog", "Crop catalog file (TOML)"));
                ui.text_edit_singleline(&mut self.catalog_path_input);
                ui.end_row();
                ui.label(txt(&tr, "gui.settings.home_lat", "Farm latitude"));
                ui.text_edit_singleline(&mut self.home_lat_input);
                ui.end_row();
                ui.label(txt(&tr, "gui.settings.home_lon", "Farm longitude"));
                ui.text_edit_singleline(&mut self.home_lon_input);
                ui.end_row();
            });
        ui.checkbox(
            &mut self.config.allow_ip_location,
            txt(&tr, "gui.settings.allow_ip", "Allow IP-based location lookup"),
        );
        ui.checkbox(
            &mut self.config.always_on_top,
            txt(&tr, "gui.settings.always_on_top", "Always on top"),
        );
        ui.add(
            egui::Slider::new(&mut self.config.window_alpha, 0.3..=1.0)
                .text(txt(&tr, "gui.settings.alpha", "Window opacity")),
        );
        ui.horizontal(|ui| {
            if ui
                .button(txt(&tr, "gui.settings.font_pick", "Choose font..."))
                .clicked()
            {
                if let Some(path) = FileDialog::new()
                    .add_filter("Font", &["ttf", "ttc", "otf"])
                    .pick_file()
                {
                    let path = path.display().to_string();
                    match load_custom_font(ui.ctx(), &path) {
                        Ok(()) => self.config.custom_font_path = Some(path),
                        Err(e) => self.settings_status = Some(e),
                    }
                }
            }
            if let Some(p) = &self.config.custom_font_path {
                ui.small(p.as_str());
            }
        });
        ui.separator();
        if ui
            .button(txt(&tr, "gui.settings.save", "Apply and save"))
            .clicked()
        {
            self.apply_settings();
        }
        if let Some(s) = &self.settings_status {
            ui.small(s.as_str());
        }
    }

    fn apply_settings(&mut self) {
        let lang = self.lang_input.trim();
        self.config.language = if lang.is_empty() || lang.eq_ignore_ascii_case("auto") {
            "auto".to_string()
        } else {
            i18n::resolve_language(lang, None)
        };
        let pack = self.lang_pack_dir_input.trim();
        self.config.language_pack_dir = (!pack.is_empty()).then(|| pack.to_string());
        let catalog_path = self.catalog_path_input.trim();
        self.config.crop_catalog_path = (!catalog_path.is_empty()).then(|| catalog_path.to_string());

        let lat = self.home_lat_input.trim().parse::<f64>().ok();
        let lon = self.home_lon_input.trim().parse::<f64>().ok();
        self.config.home_location = match (lat, lon) {
            (Some(latitude), Some(longitude))
                if geolocation::Coordinates::new(latitude, longitude).is_some() =>
            {
                Some(config::HomeLocation {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        };
        self.reload_translator();

        let mut messages = Vec::new();
        match crop_db::load_catalog(&self.config) {
            Ok(c) => {
                self.catalog = c;
                if let Some(key) = self.form.crop_key.clone() {
                    if self.catalog.find(&key).is_none() {
                        self.form.crop_key = None;
                        self.form.stage_key = None;
                    }
                }
            }
            Err(e) => messages.push(e.to_string()),
        }
        match self.config.save() {
            Ok(()) => messages.push(txt(&self.tr, "gui.settings.saved", "Settings saved.")),
            Err(e) => {
                eprintln!("Config save failed: {e}");
                messages.push(e.to_string());
            }
        }
        self.settings_status = Some(messages.join(" / "));
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_auto_fill();
        if self.pending.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(if self.config.always_on_top {
            egui::WindowLevel::AlwaysOnTop
        } else {
            egui::WindowLevel::Normal
        }));

        // 투명도 적용
        let mut style = (*ctx.style()).clone();
        style.visuals.window_fill = style
            .visuals
            .window_fill
            .linear_multiply(self.config.window_alpha);
        style.visuals.panel_fill = style
            .visuals
            .panel_fill
            .linear_multiply(self.config.window_alpha);
        ctx.set_style(style);

        let tr = self.tr.clone();

        // 상단 바
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(txt(&tr, "gui.nav.app_title", "Irrigation Need Toolbox"));
                ui.separator();
                if ui.button(txt(&tr, "gui.settings.title", "Settings")).clicked() {
                    self.show_settings_modal = true;
                }
                if ui.button(txt(&tr, "gui.about.title", "Help / About")).clicked() {
                    self.show_about_modal = true;
                }
            });
        });

        if self.show_settings_modal {
            let mut open = true;
            egui::Window::new(txt(&tr, "gui.settings.title", "Settings"))
                .collapsible(false)
                .resizable(true)
                .open(&mut open)
                .show(ctx, |ui| self.ui_settings(ui));
            self.show_settings_modal = open;
        }

        if self.show_about_modal {
            let mut open = true;
            egui::Window::new(txt(&tr, "gui.about.title", "Help / About"))
                .collapsible(false)
                .open(&mut open)
                .show(ctx, |ui| {
                    ui.label(txt(
                        &tr,
                        "gui.about.body",
                        "Daily irrigation need from the FAO-56 Hargreaves method. \
                         ETo is estimated from max/min temperature and extraterrestrial \
                         radiation, scaled by the crop coefficient (Kc) and reduced by \
                         the day's rainfall. 1 mm equals 1 liter per square meter.",
                    ));
                });
            self.show_about_modal = open;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.ui_mode(ui);
                ui.add_space(8.0);
                self.ui_weather(ui);
                ui.add_space(8.0);
                self.ui_crop(ui);
                ui.add_space(12.0);
                let calc_label = txt(&tr, "gui.calc.button", "Calculate irrigation need");
                if ui
                    .add(egui::Button::new(calc_label).min_size(egui::vec2(220.0, 32.0)))
                    .clicked()
                {
                    self.calculate();
                }
                ui.add_space(8.0);
                self.ui_result(ui);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irrigation_toolbox::geolocation::{Coordinates, GeolocationError};
    use irrigation_toolbox::weather::DailyWeather;
    use std::sync::mpsc;

    fn app() -> GuiApp {
        GuiApp::new(config::Config::default())
    }

    fn sample_fill() -> AutoFill {
        AutoFill {
            coordinates: Coordinates {
                latitude: -15.79,
                longitude: -47.88,
            },
            weather: DailyWeather {
                latitude: -15.75,
                longitude: -47.875,
                max_temperature_c: 30.0,
                min_temperature_c: 18.0,
                precipitation_sum_mm: 2.0,
            },
        }
    }

    #[test]
    fn finished_auto_fill_locks_weather_fields() {
        let mut app = app();
        let (tx, rx) = mpsc::channel();
        app.form.switch_mode(InputMode::Auto);
        app.pending = Some(rx);
        tx.send(Ok(sample_fill())).unwrap();
        app.poll_auto_fill();
        assert!(app.pending.is_none());
        assert!(app.form.inputs_locked);
        assert_eq!(app.form.latitude, "-15.7900");
        assert_eq!(app.form.mean_temperature_display(), "24.00");
    }

    #[test]
    fn failed_auto_fill_reverts_to_manual() {
        let mut app = app();
        let (tx, rx) = mpsc::channel();
        app.form.switch_mode(InputMode::Auto);
        app.pending = Some(rx);
        tx.send(Err(AutoFillError::Location(GeolocationError::Timeout)))
            .unwrap();
        app.poll_auto_fill();
        assert_eq!(app.form.mode, InputMode::Manual);
        assert!(app.form.status.as_ref().is_some_and(|s| s.is_error()));
    }

    #[test]
    fn lost_worker_is_reported_as_failure() {
        let mut app = app();
        let (tx, rx) = mpsc::channel::<Result<AutoFill, AutoFillError>>();
        drop(tx);
        app.form.switch_mode(InputMode::Auto);
        app.pending = Some(rx);
        app.poll_auto_fill();
        assert_eq!(
            app.form.status,
            Some(irrigation_toolbox::form::StatusMessage::Failed(
                AutoFillError::WorkerLost
            ))
        );
    }

    #[test]
    fn manual_mode_drops_pending_request() {
        let mut app = app();
        let (_tx, rx) = mpsc::channel();
        app.pending = Some(rx);
        app.set_mode(InputMode::Manual);
        assert!(app.pending.is_none());
        assert!(app.form.status.is_none());
    }

    #[test]
    fn calculate_without_stage_shows_error() {
        let mut app = app();
        app.form.tmax = "30".into();
        app.form.tmin = "18".into();
        app.form.latitude = "-15".into();
        app.form.select_crop("tomato");
        app.calculate();
        assert!(app.calc_error.is_some());
        assert!(app.form.result.is_none());

        app.form.select_stage("mid");
        app.calculate();
        assert!(app.calc_error.is_none());
        assert!(app.form.result.is_some());
    }
}
