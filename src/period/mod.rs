use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::date_util::{last_day_of_month, shift_back_one_year};

/// A named reporting period selectable on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    MonthToDate,
    YearToDate,
    LastMonth,
    Last30,
    Last7,
}

/// How the comparison window relates to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// The immediately preceding equivalent window.
    LastPeriod,
    /// The same window one calendar year earlier.
    LastYear,
}

impl ComparisonMode {
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "last-period" => Some(ComparisonMode::LastPeriod),
            "last-year" => Some(ComparisonMode::LastYear),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ComparisonMode::LastPeriod => "last-period",
            ComparisonMode::LastYear => "last-year",
        }
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed so the
    /// `start <= end` invariant always holds.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Timestamp bounds for API queries: the start day at midnight through
    /// the last millisecond of the end day.
    pub fn query_bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.start.and_hms_opt(0, 0, 0).unwrap(),
            self.end.and_hms_milli_opt(23, 59, 59, 999).unwrap(),
        )
    }

    /// Number of calendar days covered, inclusive.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        d >= self.start && d <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl Period {
    /// Map a period token to a variant. Unknown tokens fall back to `Today`;
    /// the dashboard treats a bad selector as "show me now", not an error.
    pub fn from_token(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "today" => Period::Today,
            "yesterday" => Period::Yesterday,
            "mtd" => Period::MonthToDate,
            "ytd" => Period::YearToDate,
            "last-month" => Period::LastMonth,
            "last-30" => Period::Last30,
            "last-7" => Period::Last7,
            other => {
                log::debug!("unrecognized period token '{other}', defaulting to today");
                Period::Today
            }
        }
    }

    /// The canonical token for this period.
    pub fn token(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Yesterday => "yesterday",
            Period::MonthToDate => "mtd",
            Period::YearToDate => "ytd",
            Period::LastMonth => "last-month",
            Period::Last30 => "last-30",
            Period::Last7 => "last-7",
        }
    }

    /// Resolve against the local calendar date.
    pub fn resolve(&self) -> DateRange {
        self.date_range(chrono::Local::now().date_naive())
    }

    /// The date range this period covers as of `today`.
    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        match self {
            Period::Today => DateRange::new(today, today),
            Period::Yesterday => {
                let d = today - Duration::days(1);
                DateRange::new(d, d)
            }
            Period::MonthToDate => DateRange::new(today.with_day(1).unwrap(), today),
            Period::YearToDate => DateRange::new(
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap(),
                today,
            ),
            Period::LastMonth => {
                let (y, m) = previous_month(today);
                DateRange::new(
                    NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
                    last_day_of_month(y, m),
                )
            }
            Period::Last30 => DateRange::new(today - Duration::days(29), today),
            Period::Last7 => DateRange::new(today - Duration::days(6), today),
        }
    }

    /// Resolve the comparison window against the local calendar date.
    pub fn resolve_comparison(&self, mode: ComparisonMode) -> DateRange {
        self.comparison_range(chrono::Local::now().date_naive(), mode)
    }

    /// The comparison window for this period as of `today`.
    ///
    /// `LastYear` shifts the resolved bounds back one calendar year with
    /// month and day preserved (a Feb 29 bound rolls to Mar 1). `LastPeriod`
    /// selects the preceding window of matching shape: length-matched for
    /// fixed windows, elapsed-time-matched for mtd/ytd.
    pub fn comparison_range(&self, today: NaiveDate, mode: ComparisonMode) -> DateRange {
        if mode == ComparisonMode::LastYear {
            let current = self.date_range(today);
            return DateRange::new(
                shift_back_one_year(current.start),
                shift_back_one_year(current.end),
            );
        }

        match self {
            Period::Today => {
                let d = today - Duration::days(1);
                DateRange::new(d, d)
            }
            Period::Yesterday => {
                let d = today - Duration::days(2);
                DateRange::new(d, d)
            }
            Period::MonthToDate => {
                // Same elapsed day count, starting day 1 of the previous
                // month. May run past a short month's end; accepted.
                let (y, m) = previous_month(today);
                let start = NaiveDate::from_ymd_opt(y, m, 1).unwrap();
                DateRange::new(start, start + Duration::days(today.day() as i64 - 1))
            }
            Period::YearToDate => DateRange::new(
                NaiveDate::from_ymd_opt(today.year() - 1, 1, 1).unwrap(),
                shift_back_one_year(today),
            ),
            Period::LastMonth => {
                let (y, m) = if today.month() <= 2 {
                    (today.year() - 1, today.month() + 10)
                } else {
                    (today.year(), today.month() - 2)
                };
                DateRange::new(
                    NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
                    last_day_of_month(y, m),
                )
            }
            Period::Last30 => DateRange::new(
                today - Duration::days(60),
                today - Duration::days(31),
            ),
            Period::Last7 => DateRange::new(
                today - Duration::days(14),
                today - Duration::days(8),
            ),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

fn previous_month(today: NaiveDate) -> (i32, u32) {
    if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    }
}
