//! Publication date parsing.
//!
//! Only the calendar date is kept. Timestamps carrying an offset resolve to the
//! date in that offset, not in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
];

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

lazy_static! {
    static ref ISO_PREFIX: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("valid regex");
    static ref ISO_IN_TEXT: Regex =
        Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid regex");
    static ref MONTH_DAY_YEAR: Regex = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b"
    )
    .expect("valid regex");
    static ref DAY_MONTH_YEAR: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{4})\b"
    )
    .expect("valid regex");
}

/// Parses a date as found in metadata: RFC 3339 / RFC 2822 timestamps, ISO
/// dates and datetimes, and spelled-out English month names.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    let caps = ISO_PREFIX.captures(raw)?;
    ymd(&caps[1], &caps[2], &caps[3])
}

/// The earliest valid date mentioned in free text.
pub fn find_date_in_text(text: &str) -> Option<NaiveDate> {
    let mut found: Vec<(usize, NaiveDate)> = Vec::new();

    for caps in ISO_IN_TEXT.captures_iter(text) {
        if let (Some(m), Some(date)) = (caps.get(0), ymd(&caps[1], &caps[2], &caps[3])) {
            found.push((m.start(), date));
        }
    }
    for caps in MONTH_DAY_YEAR.captures_iter(text) {
        let date = month_index(&caps[1]).and_then(|month| ymd(&caps[3], &month, &caps[2]));
        if let (Some(m), Some(date)) = (caps.get(0), date) {
            found.push((m.start(), date));
        }
    }
    for caps in DAY_MONTH_YEAR.captures_iter(text) {
        let date = month_index(&caps[2]).and_then(|month| ymd(&caps[3], &month, &caps[1]));
        if let (Some(m), Some(date)) = (caps.get(0), date) {
            found.push((m.start(), date));
        }
    }

    found.into_iter().min_by_key(|(start, _)| *start).map(|(_, date)| date)
}

fn month_index(name: &str) -> Option<String> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| (i + 1).to_string())
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}
