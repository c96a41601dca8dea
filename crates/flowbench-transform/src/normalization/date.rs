//! Date normalization to ISO 8601 (`YYYY-MM-DD`).
//!
//! The date-fix step only rewrites values shaped like US dates
//! (`MM/DD/YYYY`, `MM-DD-YYYY`, `MM.DD.YYYY`, optionally with a two-digit
//! year). ISO input never matches that pattern, so running the step twice
//! leaves the first result unchanged.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// US-style month/day/year with a repeated separator.
static US_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})([/.\-])(\d{1,2})([/.\-])(\d{4}|\d{2})$").expect("Invalid US date regex")
});

/// Already-normalized ISO 8601 calendar date.
static ISO_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("Invalid ISO date regex"));

/// Year-first date with slashes or dots.
static YMD_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[/.](\d{1,2})[/.](\d{1,2})$").expect("Invalid year-first date regex")
});

/// Two-digit years below this value are placed in the 2000s.
const TWO_DIGIT_YEAR_PIVOT: i32 = 70;

/// Month-name layouts, tried after commas and dots are removed.
const LONG_DATE_FORMATS: [&str; 2] = ["%B %d %Y", "%d %B %Y"];

/// Returns true if `value` is shaped like a US date.
///
/// The check is purely syntactic and does not trim: `" 03/15/2024"` does not
/// match until whitespace has been removed.
pub fn is_us_date(value: &str) -> bool {
    us_date_parts(value).is_some()
}

/// Normalizes a date string to `YYYY-MM-DD`.
///
/// Returns `None` for anything that is not a valid calendar date in one of
/// the accepted layouts; never panics.
pub fn normalize_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DATE_REGEX.captures(trimmed) {
        let date = build_date(&caps[1], &caps[2], &caps[3])?;
        return Some(format_iso(date));
    }

    if let Some((month, day, year)) = us_date_parts(trimmed) {
        let date = build_date(year, month, day)?;
        return Some(format_iso(date));
    }

    if let Some(caps) = YMD_DATE_REGEX.captures(trimmed) {
        let date = build_date(&caps[1], &caps[2], &caps[3])?;
        return Some(format_iso(date));
    }

    None
}

/// Like [`normalize_date`], but also accepts month-name dates such as
/// `March 15, 2024`, `Mar. 15 2024` or `15 March 2024`.
///
/// Used for free-text documents; the date-fix step on tabular data keeps
/// to the numeric layouts.
pub fn normalize_document_date(value: &str) -> Option<String> {
    if let Some(date) = normalize_date(value) {
        return Some(date);
    }
    let cleaned = value
        .replace([',', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    LONG_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .map(format_iso)
}

/// Splits a US date into `(month, day, year)` when both separators agree.
fn us_date_parts(value: &str) -> Option<(&str, &str, &str)> {
    let caps = US_DATE_REGEX.captures(value)?;
    if caps.get(2)?.as_str() != caps.get(4)?.as_str() {
        return None;
    }
    Some((caps.get(1)?.as_str(), caps.get(3)?.as_str(), caps.get(5)?.as_str()))
}

fn build_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let two_digit = year.len() == 2;
    let mut year: i32 = year.parse().ok()?;
    if two_digit {
        year += if year < TWO_DIGIT_YEAR_PIVOT { 2000 } else { 1900 };
    }
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
