//! 핵심 계산 로직을 라이브러리로 분리하여 CLI와 GUI가 함께 사용한다.

pub mod app;
pub mod autofill;
pub mod config;
pub mod crop_db;
pub mod evapotranspiration;
pub mod form;
pub mod geolocation;
pub mod i18n;
pub mod report;
pub mod ui_cli;
pub mod weather;
