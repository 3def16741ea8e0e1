//! Cell-level coercion helpers.
//!
//! Every parser here is lenient: a value that cannot be interpreted becomes
//! `None` instead of an error, since garbled report cells are expected.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Literal cell contents that stand for "no value" once upper-cased.
const NULL_TOKENS: &[&str] = &["NAN", "NONE", ""];

/// Formats are tried in order; day-before-month wins for ambiguous inputs.
///
/// Two-digit-year variants come first: `%y` consumes exactly two digits, so
/// they reject four-digit years, while `%Y` would read `24` as year 24.
const DATETIME_FORMATS: &[&str] = &[
    "%d-%m-%y %H:%M:%S",
    "%d/%m/%y %H:%M:%S",
    "%d.%m.%y %H:%M:%S",
    "%d-%m-%y %H:%M",
    "%d/%m/%y %H:%M",
    "%d.%m.%y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &[
    "%d-%m-%y", "%d/%m/%y", "%d.%m.%y", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y-%m-%d",
    "%Y/%m/%d", "%d-%b-%Y", "%d %b %Y",
];

/// Zone suffixes stripped before parsing; report timestamps are UTC.
const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", "Z"];

fn rate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([0-9]*\.?[0-9]+)\s*%?").expect("valid rate pattern"))
}

/// Returns the trimmed cell, or `None` when it is blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Upper-cases and trims a code-like cell, mapping null tokens to `None`.
pub fn normalize_code(value: Option<&str>) -> Option<String> {
    let upper = value?.trim().to_uppercase();
    if NULL_TOKENS.contains(&upper.as_str()) {
        None
    } else {
        Some(upper)
    }
}

pub fn normalize_column_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

/// Parses a currency amount; unparseable or non-finite input yields `None`.
pub fn parse_amount(value: Option<&str>) -> Option<f64> {
    let trimmed = non_blank(value)?;
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerces a rate to percentage encoding.
///
/// The first numeric token is extracted (a trailing `%` is tolerated). Values in
/// `[0, 1]` are read as fractions and multiplied by 100, so `"0.19"` and
/// `"19%"` both yield `19.0`. A genuine sub-one percentage such as `"0.19%"`
/// is also rescaled to `19.0`; callers rely on this, so it is left as is.
pub fn parse_rate(value: Option<&str>) -> Option<f64> {
    let trimmed = non_blank(value)?;
    let token = rate_pattern().captures(trimmed)?.get(1)?.as_str();
    let parsed = token.parse::<f64>().ok()?;
    if (0.0..=1.0).contains(&parsed) {
        Some(parsed * 100.0)
    } else {
        Some(parsed)
    }
}

/// Parses a report timestamp with day-first disambiguation.
pub fn parse_report_datetime(value: Option<&str>) -> Option<NaiveDateTime> {
    let trimmed = non_blank(value)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    let trimmed = UTC_SUFFIXES
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
        .map(str::trim_end)
        .unwrap_or(trimmed);
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => String::new(),
    }
}
