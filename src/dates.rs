//! Loose timestamp normalization to canonical UTC.
//!
//! Article pages expose publication times in every shape imaginable: RFC 3339
//! meta values, RFC 2822 feed dates, `2024-03-01 10:00` in a byline, compact
//! `20240315093000` stamps, `01/05/2024` numeric dates, or
//! `March 1, 2024 10:00 AM EST` embedded in prose. [`normalize`] tries a fixed
//! sequence of parsers and returns the first instant it can build.
//!
//! Rules:
//! - An explicit offset or a known zone abbreviation is converted to UTC.
//! - Ambiguous short codes (`EST`, `PT`, ...) resolve through [`zone_for_abbreviation`]
//!   to an IANA zone, so daylight saving is applied for the actual date.
//! - No zone information at all means the value is taken as UTC.
//! - Numeric `a/b/yyyy` dates read month first; day first only when `a` cannot
//!   be a month (`25/12/2024`).
//! - Anything unparseable (including relative text like "3 hours ago") is `None`.

use crate::utils::collapse_whitespace;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Storage and tabular export format for timestamps, always UTC.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static ISO_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        (\d{4})[-/.](\d{1,2})[-/.](\d{1,2})
        (?: [T\s]+ (\d{1,2}):(\d{2}) (?::(\d{2}))? (?:[.,]\d+)? )?
        \s*
        (Z\b | [+-]\d{2}:?\d{2}\b | [A-Za-z]{1,5}\b)?",
    )
    .expect("valid ISO-like regex")
});

static COMPACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:(\d{2})(\d{2})(\d{2})?)?$").expect("valid compact regex")
});

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})([/.-])(\d{1,2})([/.-])(\d{4})\b").expect("valid numeric date regex")
});

const MONTH: &str = r"(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";

static MONTH_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH}\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})"
    ))
    .expect("valid month-first regex")
});

static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+{MONTH},?\s+(\d{{4}})"
    ))
    .expect("valid day-first regex")
});

static CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})[:.](\d{2})(?::(\d{2}))?(?:\s*([ap])\.?m\b\.?)?")
        .expect("valid clock regex")
});

static TRAILING_ZONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\(?\s*(Z\b|[+-]\d{2}:?\d{2}\b|[A-Za-z]{2,5}\b)")
        .expect("valid zone regex")
});

/// A resolved zone designator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Fixed(FixedOffset),
    Named(Tz),
}

/// Map a zone abbreviation or offset token to a zone.
///
/// North American short codes go to the IANA zone of the region so the
/// standard/daylight offset follows the date being parsed.
pub fn zone_for_abbreviation(token: &str) -> Option<Zone> {
    let token = token.trim();
    if token.starts_with('+') || token.starts_with('-') {
        return parse_offset(token).map(Zone::Fixed);
    }
    let zone = match token.to_ascii_uppercase().as_str() {
        "Z" | "UTC" | "GMT" | "UT" => Zone::Fixed(FixedOffset::east_opt(0)?),
        "EST" | "EDT" | "ET" => Zone::Named(chrono_tz::America::New_York),
        "CST" | "CDT" | "CT" => Zone::Named(chrono_tz::America::Chicago),
        "MST" | "MDT" | "MT" => Zone::Named(chrono_tz::America::Denver),
        "PST" | "PDT" | "PT" => Zone::Named(chrono_tz::America::Los_Angeles),
        "BST" => Zone::Named(chrono_tz::Europe::London),
        "CET" | "CEST" => Zone::Named(chrono_tz::Europe::Paris),
        "IST" => Zone::Named(chrono_tz::Asia::Kolkata),
        "JST" => Zone::Named(chrono_tz::Asia::Tokyo),
        "HKT" => Zone::Named(chrono_tz::Asia::Hong_Kong),
        "AEST" | "AEDT" => Zone::Named(chrono_tz::Australia::Sydney),
        _ => return None,
    };
    Some(zone)
}

fn parse_offset(token: &str) -> Option<FixedOffset> {
    let sign = if token.starts_with('-') { -1 } else { 1 };
    let digits: String = token[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse loosely formatted date/time text into a UTC instant.
///
/// Never panics and never errors; unparseable input yields `None`.
pub fn normalize(raw: &str) -> Option<DateTime<Utc>> {
    let text = collapse_whitespace(raw);
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&text) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_compact(&text)
        .or_else(|| parse_iso_like(&text))
        .or_else(|| parse_numeric(&text))
        .or_else(|| parse_textual(&text))
}

/// Format an instant in [`CANONICAL_FORMAT`].
pub fn canonical(dt: &DateTime<Utc>) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

fn parse_iso_like(text: &str) -> Option<DateTime<Utc>> {
    let caps = ISO_LIKE.captures(text)?;
    let date = NaiveDate::from_ymd_opt(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?)?;
    let time = match caps.get(4) {
        Some(_) => NaiveTime::from_hms_opt(
            num(&caps, 4)?,
            num(&caps, 5)?,
            num(&caps, 6).unwrap_or(0),
        )?,
        None => NaiveTime::MIN,
    };
    let zone = caps.get(7).and_then(|m| zone_for_abbreviation(m.as_str()));
    resolve(date.and_time(time), zone)
}

/// `YYYYMMDD`, `YYYYMMDDHHMM` or `YYYYMMDDHHMMSS` as the whole value.
fn parse_compact(text: &str) -> Option<DateTime<Utc>> {
    let caps = COMPACT.captures(text)?;
    let date = NaiveDate::from_ymd_opt(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?)?;
    let time = match caps.get(4) {
        Some(_) => NaiveTime::from_hms_opt(
            num(&caps, 4)?,
            num(&caps, 5)?,
            num(&caps, 6).unwrap_or(0),
        )?,
        None => NaiveTime::MIN,
    };
    resolve(date.and_time(time), None)
}

fn parse_numeric(text: &str) -> Option<DateTime<Utc>> {
    let caps = NUMERIC.captures(text)?;
    // Mixed separators ("1/5.2024") are not a date.
    if caps[2] != caps[4] {
        return None;
    }
    let (first, second): (u32, u32) = (num(&caps, 1)?, num(&caps, 3)?);
    let (month, day) = if first > 12 { (second, first) } else { (first, second) };
    let date = NaiveDate::from_ymd_opt(num(&caps, 5)?, month, day)?;
    let whole = caps.get(0)?;
    with_clock(text, date, whole.start(), whole.end())
}

fn parse_textual(text: &str) -> Option<DateTime<Utc>> {
    let (date, whole) = if let Some(caps) = MONTH_FIRST.captures(text) {
        let date =
            NaiveDate::from_ymd_opt(num(&caps, 3)?, month_index(&caps[1])?, num(&caps, 2)?)?;
        (date, caps.get(0)?)
    } else {
        let caps = DAY_FIRST.captures(text)?;
        let date =
            NaiveDate::from_ymd_opt(num(&caps, 3)?, month_index(&caps[2])?, num(&caps, 1)?)?;
        (date, caps.get(0)?)
    };
    with_clock(text, date, whole.start(), whole.end())
}

/// Attach the clock reading and zone found around the date at `start..end`.
fn with_clock(text: &str, date: NaiveDate, start: usize, end: usize) -> Option<DateTime<Utc>> {
    // After the date first, then before it ("10:00 AM, March 1, 2024").
    let clock = CLOCK
        .captures(&text[end..])
        .map(|c| (c, end))
        .or_else(|| CLOCK.captures(&text[..start]).map(|c| (c, 0)));

    let (time, zone) = match clock {
        Some((caps, offset)) => {
            let time = clock_time(&caps)?;
            let after = offset + caps.get(0)?.end();
            let zone = TRAILING_ZONE
                .captures(&text[after..])
                .and_then(|z| zone_for_abbreviation(&z[1]));
            (time, zone)
        }
        None => (NaiveTime::MIN, None),
    };
    resolve(date.and_time(time), zone)
}

fn clock_time(caps: &Captures<'_>) -> Option<NaiveTime> {
    let mut hour: u32 = num(caps, 1)?;
    let minute: u32 = num(caps, 2)?;
    let second: u32 = num(caps, 3).unwrap_or(0);
    if let Some(meridiem) = caps.get(4) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("p");
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn resolve(naive: NaiveDateTime, zone: Option<Zone>) -> Option<DateTime<Utc>> {
    match zone {
        None => Some(Utc.from_utc_datetime(&naive)),
        Some(Zone::Fixed(offset)) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(Zone::Named(tz)) => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn month_index(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let idx = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ]
    .iter()
    .position(|m| *m == prefix)?;
    Some(idx as u32 + 1)
}

fn num<T: std::str::FromStr>(caps: &Captures<'_>, idx: usize) -> Option<T> {
    caps.get(idx)?.as_str().parse().ok()
}
