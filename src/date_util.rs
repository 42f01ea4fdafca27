use chrono::{Datelike, Duration, NaiveDate};

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap() - Duration::days(1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap() - Duration::days(1)
    }
}

/// Get the Sunday on or before the given date (weeks start on Sunday).
pub fn week_start_sunday(d: NaiveDate) -> NaiveDate {
    d - Duration::days(d.weekday().num_days_from_sunday() as i64)
}

/// Shift a date back exactly one calendar year, month and day preserved.
/// A Feb 29 bound with no counterpart in the target year rolls over to
/// Mar 1, matching how date arithmetic in the commerce dashboards this
/// feeds behaves.
pub fn shift_back_one_year(d: NaiveDate) -> NaiveDate {
    d.with_year(d.year() - 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(d.year() - 1, 3, 1).unwrap())
}
