use chrono::{Local, NaiveDate};
use thiserror::Error;

/// All date math in the crate funnels through this module so every
/// component compares calendar days, never timestamps.

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid date '{0}', expected YYYY-MM-DD")]
pub struct DateParseError(pub String);

/// Parse a `YYYY-MM-DD` calendar-date string.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DateParseError(value.to_string()))
}

/// Current calendar day on the evaluator's local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// True iff `end` comes before `start`.
pub fn is_invalid_range(start: NaiveDate, end: NaiveDate) -> bool {
    end < start
}

/// Inclusive day count of `[start, end]`. Requires `end >= start`;
/// callers must check `is_invalid_range` first.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// True iff `date` falls strictly before the given reference day.
pub fn is_past(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn parses_calendar_dates() {
        assert_eq!(d("2026-03-01"), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(d(" 2026-03-01 "), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("2026-13-01").is_err());
        assert!(parse_date("01/03/2026").is_err());
        assert!(parse_date("not a date").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn range_validity() {
        assert!(is_invalid_range(d("2026-03-02"), d("2026-03-01")));
        assert!(!is_invalid_range(d("2026-03-01"), d("2026-03-01")));
        assert!(!is_invalid_range(d("2026-03-01"), d("2026-03-02")));
    }

    #[test]
    fn day_count_is_inclusive_on_both_ends() {
        assert_eq!(inclusive_day_count(d("2026-03-01"), d("2026-03-01")), 1);
        assert_eq!(inclusive_day_count(d("2026-03-01"), d("2026-03-03")), 3);
        assert_eq!(inclusive_day_count(d("2026-02-27"), d("2026-03-02")), 4);
    }

    #[test]
    fn past_is_strictly_before_reference_day() {
        let today = d("2026-03-10");
        assert!(is_past(d("2026-03-09"), today));
        assert!(!is_past(d("2026-03-10"), today));
        assert!(!is_past(d("2026-03-11"), today));
    }
}
