//! 날짜로부터 연중 일수(J)를 구한다.
//!
//! 전년도 12월 31일 00:00(해당 시간대 기준)부터 경과한 시간을 24시간 고정
//! 길이로 나눈 몫이다. 일광절약시간 전환일에는 하루 길이가 23/25시간이 되지만
//! 보정하지 않는다(알려진 한계).

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 주어진 시각의 연중 일수를 계산한다. 1월 1일 = 1.
pub fn day_of_year_from_datetime<Tz: TimeZone>(now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let start_naive = NaiveDate::from_ymd_opt(now.year() - 1, 12, 31)
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    let Some(start_naive) = start_naive else {
        return now.ordinal();
    };
    let elapsed_ms = match tz.from_local_datetime(&start_naive).earliest() {
        Some(start) => now.clone().signed_duration_since(start).num_milliseconds(),
        // 자정이 존재하지 않는 시간대 전환: 벽시계 차이로 대체
        None => (now.naive_local() - start_naive).num_milliseconds(),
    };
    u32::try_from(elapsed_ms.div_euclid(MS_PER_DAY))
        .ok()
        .filter(|d| (1..=366).contains(d))
        .unwrap_or_else(|| now.ordinal())
}

/// 로컬 시계 기준 오늘의 연중 일수. 프런트엔드에서만 호출한다.
pub fn day_of_year_today() -> u32 {
    day_of_year_from_datetime(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn new_year_midnight_is_day_one() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(day_of_year_from_datetime(&t), 1);
    }

    #[test]
    fn leap_year_last_day() {
        let t = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(day_of_year_from_datetime(&t), 366);
    }

    #[test]
    fn every_day_of_a_leap_year_stays_in_range() {
        let tz = FixedOffset::east_opt(14 * 3600).unwrap();
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while date.year() == 2024 {
            for (h, m, s) in [(0, 0, 0), (23, 59, 59)] {
                let t = tz
                    .from_local_datetime(&date.and_hms_opt(h, m, s).unwrap())
                    .unwrap();
                assert_eq!(day_of_year_from_datetime(&t), date.ordinal());
            }
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn offset_is_taken_from_the_local_zone() {
        // 브라질리아(UTC-3) 6월 21일 정오
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let t = tz.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap();
        assert_eq!(day_of_year_from_datetime(&t), 172);
    }
}
