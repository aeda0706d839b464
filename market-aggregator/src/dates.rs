//! Date normalization and filtering.
//!
//! Providers report dates in many shapes. `parse_date` turns whatever it can
//! into a calendar date; anything it cannot read is left alone and never
//! filtered out.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::debug;

pub const UNKNOWN_DATE: &str = "Unknown";

const DAY_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Best-effort parse of a free-form provider date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(UNKNOWN_DATE) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    // "2024-01-15T10:00:00" without an offset
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    for format in DAY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(raw, "%Y%m%d").ok();
    }

    // Year-month forms are pinned to the first of the month
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", raw), "%d %B %Y") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", raw), "%d %b %Y") {
        return Some(date);
    }

    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        let year = raw.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}

/// Map a provider date to `YYYY-MM-DD` when derivable, else pass it through.
pub fn normalize_date(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => UNKNOWN_DATE.to_string(),
        Some(value) => match parse_date(value) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => value.to_string(),
        },
    }
}

/// Year of a free-form date, when it can be read.
pub fn year_of(raw: Option<&str>) -> Option<i32> {
    use chrono::Datelike;
    raw.and_then(parse_date).map(|date| date.year())
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(end).and_utc()
}

/// Date-range check for one result.
///
/// Unparseable or missing dates always pass. Parsed dates after `now` never
/// pass. `from` and `to` are inclusive, `to` covering the whole day.
pub fn passes_date_filter(
    raw: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> bool {
    let Some(date) = raw.and_then(parse_date) else {
        return true;
    };

    let moment = start_of_day(date);
    if moment > now {
        debug!("Rejecting future-dated result ({})", date);
        return false;
    }

    if let Some(from) = from {
        if moment < start_of_day(from) {
            return false;
        }
    }
    if let Some(to) = to {
        if moment > end_of_day(to) {
            return false;
        }
    }

    true
}
