use clap::{Args, Parser, Subcommand};
use irrigation_toolbox::{
    app::{self, AppError, CalcRequest},
    config, crop_db,
    evapotranspiration::day_of_year_today,
    i18n::{self, Translator},
    report, ui_cli,
};
use std::path::PathBuf;

/// 작물 관개 요구량 계산기 (FAO-56 Hargreaves).
#[derive(Debug, Parser)]
#[command(name = "irrigation_toolbox_cli", version, about)]
struct Cli {
    /// 언어 코드 (auto/en/ko/pt)
    #[arg(long, short = 'L', default_value = "auto", global = true)]
    lang: String,
    /// 설정 파일 경로 (기본: ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 한 번 계산하고 보고서를 출력한다
    Calc(CalcArgs),
    /// 작물/생육단계별 Kc 목록
    Crops {
        /// 라벨 검색어
        #[arg(default_value = "")]
        search: String,
    },
}

#[derive(Debug, Args)]
struct CalcArgs {
    /// 최고 기온 [°C]
    #[arg(long, allow_negative_numbers = true)]
    tmax: f64,
    /// 최저 기온 [°C]
    #[arg(long, allow_negative_numbers = true)]
    tmin: f64,
    /// 위도 [deg], 남반구 음수
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// 작물 키 (crops 명령 참고)
    #[arg(long)]
    crop: Option<String>,
    /// 생육단계 키 (initial/development/mid/late)
    #[arg(long)]
    stage: Option<String>,
    /// 작물계수 직접 지정
    #[arg(long)]
    kc: Option<f64>,
    /// 강우량 [mm]
    #[arg(long, default_value_t = 0.0)]
    rain: f64,
    /// 연중 일수 (기본: 오늘)
    #[arg(long)]
    day: Option<u32>,
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() {
    let cli = Cli::parse();
    let prefix_tr = Translator::new(&i18n::resolve_language(&cli.lang, None));
    if let Err(err) = try_run(cli) {
        eprintln!("{}: {err}", prefix_tr.t(i18n::keys::ERROR_PREFIX));
        std::process::exit(1);
    }
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_or_default_at(path)?,
        None => config::load_or_default()?,
    };
    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let tr = Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());
    let catalog = crop_db::load_catalog(&cfg)?;

    match cli.command {
        Some(Command::Calc(args)) => {
            let req = CalcRequest {
                max_temp_c: args.tmax,
                min_temp_c: args.tmin,
                latitude_deg: args.lat,
                crop: args.crop,
                stage: args.stage,
                kc: args.kc,
                rainfall_mm: args.rain,
                day_of_year: args.day.unwrap_or_else(day_of_year_today),
            };
            let result = app::run_calc(&req, catalog.as_ref())?;
            println!("{}", report::render_report(&result, &tr));
        }
        Some(Command::Crops { search }) => ui_cli::print_crops(&tr, catalog.as_ref(), &search),
        None => app::run(&mut cfg, &tr, catalog.as_ref())?,
    }
    Ok(())
}
