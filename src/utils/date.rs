// src/utils/date.rs

//! Informal date parsing for intake windows.
//!
//! Directory data carries dates typed by hand ("15 January", "Jan 15th, 2027",
//! "15/01", "1 - 15 gennaio"). The accepted grammar, after lowercasing and
//! dropping ordinal suffixes, commas, a leading weekday and a trailing
//! `HH:MM` time:
//!
//! - `YYYY-MM-DD` (a trailing `T...` time part is ignored)
//! - `DD/MM[/YYYY]`, `DD.MM[.YYYY]`, `DD-MM[-YYYY]`
//! - `D Month [YYYY]` and `Month D [YYYY]`, English or Italian month names,
//!   full or abbreviated
//! - a range `A - B` (also `–`, `—`, `to`, `al`, `until`), which resolves to
//!   `B`; a bare day in `B` borrows the month of `A`
//!
//! Anything else is unparseable. Yearless dates are placed in the academic
//! year that starts in `reference_year`: months before the pivot month belong
//! to the following calendar year.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};
use regex::Regex;

use crate::models::DateConfig;

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());
static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)(?:st|nd|rd|th)\b").unwrap());
static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun|lunedì|martedì|mercoledì|giovedì|venerdì|sabato|domenica)\b\.?\s*",
    )
    .unwrap()
});
static TRAILING_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:at\s+|ore\s+|h\s*)?\d{1,2}:\d{2}(?:\s*(?:cet|cest|utc|gmt))?$").unwrap()
});
static ABBREV_DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\p{L})\.").unwrap());
static ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:t.*)?$").unwrap());
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})([/.\-])(\d{1,2})(?:([/.\-])(\d{4}))?$").unwrap()
});
static DAY_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}) (\p{L}+)(?: (\d{4}))?$").unwrap());
static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\p{L}+) (\d{1,2})(?: (\d{4}))?$").unwrap());
static BARE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?: (\d{4}))?$").unwrap());
static RANGE_SEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:[–—\-]|\b(?:to|al|until)\b)\s*").unwrap());

/// Day/month/year as written, before year resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateParts {
    day: u32,
    month: u32,
    year: Option<i32>,
}

/// Parser for informal intake dates.
#[derive(Debug, Clone)]
pub struct DateParser {
    pivot_month: u32,
}

impl DateParser {
    /// Create a parser with the given settings.
    pub fn new(config: &DateConfig) -> Self {
        Self {
            pivot_month: config.academic_year_pivot_month,
        }
    }

    /// Parse `text` into a calendar date.
    pub fn parse_date(&self, text: &str, reference_year: i32) -> Option<NaiveDate> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }

        let parts = parse_single(&normalized).or_else(|| parse_range_end(&normalized))?;
        self.resolve(parts, reference_year)
    }

    /// Parse a closing date: 23:59:59 UTC on the parsed day.
    pub fn parse_deadline(&self, text: &str, reference_year: i32) -> Option<DateTime<Utc>> {
        self.parse_date(text, reference_year).map(end_of_day)
    }

    /// Parse an opening date: midnight UTC on the parsed day.
    pub fn parse_opening(&self, text: &str, reference_year: i32) -> Option<DateTime<Utc>> {
        self.parse_date(text, reference_year).map(start_of_day)
    }

    fn resolve(&self, parts: DateParts, reference_year: i32) -> Option<NaiveDate> {
        let year = match parts.year {
            Some(year) => year,
            None if parts.month < self.pivot_month => reference_year.checked_add(1)?,
            None => reference_year,
        };
        NaiveDate::from_ymd_opt(year, parts.month, parts.day)
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(&DateConfig::default())
    }
}

/// Parse a closing date with the default academic-year pivot.
///
/// Returns `None` for empty or unrecognized text.
pub fn parse_deadline_date_string(text: &str, reference_year: i32) -> Option<DateTime<Utc>> {
    DateParser::default().parse_deadline(text, reference_year)
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last second of `date`, UTC.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + TimeDelta::seconds(86_399)
}

/// First four-digit group of an academic year label, else `today`'s year.
pub fn reference_year(label: Option<&str>, today: NaiveDate) -> i32 {
    label
        .and_then(|l| YEAR.find(l))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_else(|| today.year())
}

/// Month number for an English or Italian month name or abbreviation.
pub fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.trim_end_matches('.') {
        "january" | "jan" | "gennaio" | "gen" => 1,
        "february" | "feb" | "febbraio" => 2,
        "march" | "mar" | "marzo" => 3,
        "april" | "apr" | "aprile" => 4,
        "may" | "maggio" | "mag" => 5,
        "june" | "jun" | "giugno" | "giu" => 6,
        "july" | "jul" | "luglio" | "lug" => 7,
        "august" | "aug" | "agosto" | "ago" => 8,
        "september" | "sep" | "sept" | "settembre" | "set" => 9,
        "october" | "oct" | "ottobre" | "ott" => 10,
        "november" | "nov" | "novembre" => 11,
        "december" | "dec" | "dicembre" | "dic" => 12,
        _ => return None,
    };
    Some(month)
}

fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let lowered = ORDINAL.replace_all(&lowered, "$1");
    let lowered = lowered.replace(',', " ");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = WEEKDAY.replace(&collapsed, "");
    let collapsed = collapsed.trim_end_matches(['.', ';', ':']);
    let collapsed = TRAILING_TIME.replace(collapsed, "");
    let collapsed = ABBREV_DOT.replace_all(&collapsed, "$1");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ';' | ':'))
        .to_string()
}

fn parse_single(text: &str) -> Option<DateParts> {
    if let Some(caps) = ISO.captures(text) {
        return Some(DateParts {
            year: Some(caps[1].parse().ok()?),
            month: caps[2].parse().ok()?,
            day: caps[3].parse().ok()?,
        });
    }

    if let Some(caps) = NUMERIC.captures(text) {
        // Mixed separators ("15/01.2027") are not a date.
        if let Some(second) = caps.get(4) {
            if second.as_str() != &caps[2] {
                return None;
            }
        }
        return Some(DateParts {
            day: caps[1].parse().ok()?,
            month: caps[3].parse().ok()?,
            year: caps.get(5).and_then(|y| y.as_str().parse().ok()),
        });
    }

    if let Some(caps) = DAY_MONTH.captures(text) {
        return Some(DateParts {
            day: caps[1].parse().ok()?,
            month: month_from_name(&caps[2])?,
            year: caps.get(3).and_then(|y| y.as_str().parse().ok()),
        });
    }

    if let Some(caps) = MONTH_DAY.captures(text) {
        return Some(DateParts {
            month: month_from_name(&caps[1])?,
            day: caps[2].parse().ok()?,
            year: caps.get(3).and_then(|y| y.as_str().parse().ok()),
        });
    }

    None
}

fn parse_range_end(text: &str) -> Option<DateParts> {
    RANGE_SEP.find_iter(text).find_map(|sep| {
        let (start, end) = (&text[..sep.start()], &text[sep.end()..]);
        if end.is_empty() {
            return None;
        }
        if let Some(mut parts) = parse_single(end) {
            // "10 December 2026 - 15 January": the end follows the start's year.
            if parts.year.is_none() {
                parts.year = parse_single(start).and_then(|s| year_after(s, parts.month));
            }
            return Some(parts);
        }

        // "January 10 - 25 2027": the end is a bare day.
        let caps = BARE_DAY.captures(end)?;
        let start_parts = parse_single(start)?;
        Some(DateParts {
            day: caps[1].parse().ok()?,
            month: start_parts.month,
            year: caps
                .get(2)
                .and_then(|y| y.as_str().parse().ok())
                .or(start_parts.year),
        })
    })
}

/// Year of a yearless range end that closes `start`.
fn year_after(start: DateParts, end_month: u32) -> Option<i32> {
    let year = start.year?;
    if end_month < start.month {
        year.checked_add(1)
    } else {
        Some(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn parse(text: &str, year: i32) -> Option<NaiveDate> {
        DateParser::default().parse_date(text, year)
    }

    #[test]
    fn test_day_month_names() {
        assert_eq!(parse("15 January", 2026), ymd(2027, 1, 15));
        assert_eq!(parse("15 January 2026", 2026), ymd(2026, 1, 15));
        assert_eq!(parse("1 Sept", 2026), ymd(2026, 9, 1));
        assert_eq!(parse("3 marzo", 2026), ymd(2027, 3, 3));
        assert_eq!(parse("30 dic. 2026", 2025), ymd(2026, 12, 30));
    }

    #[test]
    fn test_month_day_names() {
        assert_eq!(parse("January 15th, 2027", 2020), ymd(2027, 1, 15));
        assert_eq!(parse("Oct 1", 2026), ymd(2026, 10, 1));
        assert_eq!(parse("Friday, March 3rd", 2026), ymd(2027, 3, 3));
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(parse("2027-01-15", 2000), ymd(2027, 1, 15));
        assert_eq!(parse("2027-01-15T10:00:00Z", 2000), ymd(2027, 1, 15));
        assert_eq!(parse("15/01/2027", 2000), ymd(2027, 1, 15));
        assert_eq!(parse("15.01.2027", 2000), ymd(2027, 1, 15));
        assert_eq!(parse("15-01-2027", 2000), ymd(2027, 1, 15));
        assert_eq!(parse("15/09", 2026), ymd(2026, 9, 15));
        assert_eq!(parse("15/01", 2026), ymd(2027, 1, 15));
        assert_eq!(parse("15/01.2027", 2026), None);
    }

    #[test]
    fn test_ranges_resolve_to_end() {
        assert_eq!(parse("1 - 15 January", 2026), ymd(2027, 1, 15));
        assert_eq!(parse("10 December – 15 February 2027", 2026), ymd(2027, 2, 15));
        assert_eq!(parse("January 10 - 25", 2026), ymd(2027, 1, 25));
        assert_eq!(parse("dal 1 al 20 settembre", 2026), ymd(2026, 9, 20));
        assert_eq!(parse("1 October to 30 November", 2026), ymd(2026, 11, 30));
        assert_eq!(parse("2027-01-15 - 2027-02-15", 2026), ymd(2027, 2, 15));
    }

    #[test]
    fn test_trailing_time_ignored() {
        assert_eq!(parse("15 January 2027 12:00 CET", 2026), ymd(2027, 1, 15));
        assert_eq!(parse("15/01/2027 ore 13:00", 2026), ymd(2027, 1, 15));
        assert_eq!(parse("15 January 2027, 12:00.", 2026), ymd(2027, 1, 15));
        assert_eq!(parse("15 January 2027 at 12:00;", 2026), ymd(2027, 1, 15));
    }

    #[test]
    fn test_range_end_follows_start_year() {
        assert_eq!(parse("10 December 2026 - 15 January", 2025), ymd(2027, 1, 15));
        assert_eq!(parse("1 March 2027 - 30 April", 2025), ymd(2027, 4, 30));
        assert_eq!(parse("1 October 2026 to 30 November", 2030), ymd(2026, 11, 30));
    }

    #[test]
    fn test_extreme_reference_year() {
        assert_eq!(parse_deadline_date_string("15 January", i32::MAX), None);
        assert_eq!(parse_deadline_date_string("1 October", i32::MAX), None);
        assert_eq!(parse_deadline_date_string("15 January", i32::MIN), None);
    }

    #[test]
    fn test_unparseable() {
        for text in ["", "   ", "TBA", "tbd", "N/A", "Rolling", "soon", "31 February", "15 Smarch", "13/13"] {
            assert_eq!(parse(text, 2026), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn test_deterministic() {
        let first = parse_deadline_date_string("15 January", 2026);
        for _ in 0..10 {
            assert_eq!(parse_deadline_date_string("15 January", 2026), first);
        }
    }

    #[test]
    fn test_instant_conventions() {
        let parser = DateParser::default();
        let end = parser.parse_deadline("15 January", 2026).unwrap();
        assert_eq!(end.to_rfc3339(), "2027-01-15T23:59:59+00:00");
        let start = parser.parse_opening("1 October", 2026).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-10-01T00:00:00+00:00");
    }

    #[test]
    fn test_custom_pivot() {
        let parser = DateParser::new(&DateConfig {
            academic_year_pivot_month: 1,
        });
        assert_eq!(parser.parse_date("15 January", 2026), ymd(2026, 1, 15));
    }

    #[test]
    fn test_reference_year() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(reference_year(Some("2026/2027"), today), 2026);
        assert_eq!(reference_year(Some("A.A. 2025-26"), today), 2025);
        assert_eq!(reference_year(Some("next year"), today), 2026);
        assert_eq!(reference_year(None, today), 2026);
    }
}
