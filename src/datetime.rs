//! Timestamp normalization.
//!
//! Export dialects disagree on date ordering and clock format, so the
//! normalizer tries a fixed priority list of date layouts against the date
//! token and time layouts against the time token. When nothing fits, the
//! result degrades to the current wall-clock time with an explicit flag
//! instead of failing: one malformed line must never abort a file.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// US month-first layouts, then EU day-first, then ISO. `day_first`
/// swaps the first two groups.
const DATE_LAYOUTS_MONTH_FIRST: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%d/%m/%y", "%d/%m/%Y", "%Y/%m/%d"];
const DATE_LAYOUTS_DAY_FIRST: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"];

const TIME_LAYOUTS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// A normalized timestamp, possibly degraded to the now-sentinel.
///
/// The flag keeps the degraded path assertable in tests without freezing
/// the wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedTimestamp {
    pub at: NaiveDateTime,
    pub degraded: bool,
}

/// Normalizes `am` / `a.m.` / `p. m.` and friends to `AM` / `PM`.
pub fn normalize_ampm(ampm: &str) -> String {
    ampm.replace(|c: char| !c.is_alphabetic(), "").to_uppercase()
}

/// Canonicalizes a date token: `-` and `.` separators become `/` and any
/// spacing around components is dropped, so one set of layouts covers
/// `1/5/24`, `15.01.24` and `2024-01-05` alike.
fn canonicalize_date(token: &str) -> String {
    token
        .replace(['-', '.'], "/")
        .split('/')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonicalizes a time token: dot-separated clocks become colon-separated.
fn canonicalize_time(token: &str) -> String {
    token.replace('.', ":")
}

fn try_parse_date(token: &str, day_first: Option<bool>) -> Option<NaiveDate> {
    let layouts = if day_first == Some(true) {
        DATE_LAYOUTS_DAY_FIRST
    } else {
        DATE_LAYOUTS_MONTH_FIRST
    };
    layouts
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(token, layout).ok())
}

fn try_parse_time(token: &str) -> Option<NaiveTime> {
    TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveTime::parse_from_str(token, layout).ok())
}

/// Interprets a date token and a time token (with an optional meridiem
/// marker) as an absolute naive timestamp.
///
/// On total failure returns the current wall-clock time with
/// `degraded: true`; the caller is expected to log a warning. Timestamps
/// carry no timezone; only relative comparisons are meaningful.
pub fn normalize_timestamp(
    date_token: &str,
    time_token: &str,
    meridiem: Option<&str>,
    day_first: Option<bool>,
) -> NormalizedTimestamp {
    let date_token = canonicalize_date(date_token);
    let mut time_token = canonicalize_time(time_token);
    if let Some(m) = meridiem {
        time_token.push(' ');
        time_token.push_str(&normalize_ampm(m));
    }

    match (try_parse_date(&date_token, day_first), try_parse_time(&time_token)) {
        (Some(date), Some(time)) => NormalizedTimestamp {
            at: date.and_time(time),
            degraded: false,
        },
        _ => NormalizedTimestamp {
            at: Local::now().naive_local(),
            degraded: true,
        },
    }
}
