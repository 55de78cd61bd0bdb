//! 증발산량(ETo/ETc) 및 순 관개 요구량 계산 모듈을 모아둔다.
//! FAO-56 Hargreaves 식과 연중 일수(day-of-year) 산정으로 구성한다.

pub mod day_of_year;
pub mod hargreaves;

pub use day_of_year::{day_of_year_from_datetime, day_of_year_today};
pub use hargreaves::{
    compute, compute_measurement, EvapotranspirationResult, InvalidInputError, Measurement,
    Recommendation,
};
