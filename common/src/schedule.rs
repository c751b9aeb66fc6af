// Civil calendar helpers
//
// All reminder decisions are made on calendar days in a single fixed civil
// timezone. The wall clock is only read at the process boundary and converted
// here; everything below works on `NaiveDate`.

use crate::errors::ScheduleError;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Wire format of expected dates and override dates
pub const CIVIL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Get the default civil timezone (KST, UTC+9)
pub fn default_timezone() -> Tz {
    chrono_tz::Asia::Seoul
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    Tz::from_str(name.trim()).map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// Convert an instant into the calendar date it falls on in `timezone`
pub fn civil_today(now: DateTime<Utc>, timezone: Tz) -> NaiveDate {
    now.with_timezone(&timezone).date_naive()
}

/// Parse a `YYYY-MM-DD` civil date
pub fn parse_civil_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value.trim(), CIVIL_DATE_FORMAT).map_err(|_| {
        ScheduleError::InvalidDate {
            value: value.to_string(),
        }
    })
}

/// Whole calendar days from `today` until `expected`.
///
/// Positive when `expected` is in the future, zero on the day itself and
/// negative once it has passed. Calendar subtraction is exact, so there is no
/// sub-day drift to round away.
pub fn day_offset(today: NaiveDate, expected: NaiveDate) -> i64 {
    expected.signed_duration_since(today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_timezone() {
        assert_eq!(default_timezone().to_string(), "Asia/Seoul");
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Asia/Seoul").unwrap(), chrono_tz::Asia::Seoul);
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(ScheduleError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_civil_today_rolls_over_at_kst_midnight() {
        // 2026-01-28 15:00 UTC is 2026-01-29 00:00 KST
        let now = Utc.with_ymd_and_hms(2026, 1, 28, 15, 0, 0).unwrap();
        assert_eq!(civil_today(now, default_timezone()), date(2026, 1, 29));

        let just_before = Utc.with_ymd_and_hms(2026, 1, 28, 14, 59, 59).unwrap();
        assert_eq!(civil_today(just_before, default_timezone()), date(2026, 1, 28));
    }

    #[test]
    fn test_civil_today_at_cron_time() {
        // The daily job fires at 00:00 UTC, which is 09:00 KST the same day
        let now = Utc.with_ymd_and_hms(2026, 1, 29, 0, 0, 0).unwrap();
        assert_eq!(civil_today(now, default_timezone()), date(2026, 1, 29));
    }

    #[test]
    fn test_parse_civil_date() {
        assert_eq!(parse_civil_date("2026-01-30").unwrap(), date(2026, 1, 30));
        assert_eq!(parse_civil_date(" 2026-01-30 ").unwrap(), date(2026, 1, 30));
        assert!(parse_civil_date("2026-02-30").is_err());
        assert!(parse_civil_date("30/01/2026").is_err());
        assert!(parse_civil_date("").is_err());
    }

    #[test]
    fn test_day_offset_signs() {
        let today = date(2026, 1, 29);
        assert_eq!(day_offset(today, date(2026, 1, 30)), 1);
        assert_eq!(day_offset(today, today), 0);
        assert_eq!(day_offset(today, date(2026, 1, 28)), -1);
        assert_eq!(day_offset(today, date(2026, 2, 10)), 12);
    }

    #[test]
    fn test_day_offset_across_month_and_year_boundaries() {
        assert_eq!(day_offset(date(2026, 3, 1), date(2026, 2, 28)), -1);
        assert_eq!(day_offset(date(2024, 3, 1), date(2024, 2, 28)), -2);
        assert_eq!(day_offset(date(2027, 1, 1), date(2026, 12, 31)), -1);
    }
}
