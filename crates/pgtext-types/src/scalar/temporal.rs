//! Shared date/time grammar and the `date` type
//!
//! Dates, timestamps and times share one set of regular expressions. The
//! special values `infinity` and `-infinity` are modelled by [`Temporal`].

use crate::PgType;
use crate::timezone::{TimezoneOffset, timezone_offset_at, timezone_offset_minutes};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub(crate) const MICROS_PER_SECOND: i64 = 1_000_000;
pub(crate) const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
pub(crate) const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
pub(crate) const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4,})-(\d{1,2})-(\d{1,2})$").expect("valid regex"));

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d+))?)?$").expect("valid regex")
});

/// Date, optional time, optional zone suffix
pub(crate) static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<date>\d{4,}-\d{1,2}-\d{1,2})",
        r"(?:(?:[Tt]|\s+)(?P<time>\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?))?",
        r"(?:\s*(?P<offset>[Zz]|[+-]\d{1,2}(?::?\d{2})?)|\s+(?P<zone>[A-Za-z][A-Za-z0-9_/+\-]*))?$",
    ))
    .expect("valid regex")
});

/// Time, optional zone suffix
pub(crate) static TIME_WITH_ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<time>\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)",
        r"(?:\s*(?P<offset>[Zz]|[+-]\d{1,2}(?::?\d{2})?)|\s+(?P<zone>[A-Za-z][A-Za-z0-9_/+\-]*))?$",
    ))
    .expect("valid regex")
});

/// A point in time that may also be one of PostgreSQL's infinities
///
/// Variant order gives the ordering: `-infinity` sorts before every finite
/// value and `infinity` after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Temporal<T> {
    NegativeInfinity,
    Finite(T),
    Infinity,
}

impl<T> Temporal<T> {
    pub fn finite(&self) -> Option<&T> {
        match self {
            Self::Finite(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Finite(_))
    }

    /// Recognize `infinity` / `-infinity`, returning `None` for anything else
    pub(crate) fn special(text: &str) -> Option<Self> {
        let body = text.strip_prefix('+').unwrap_or(text);
        if body.eq_ignore_ascii_case("infinity") {
            Some(Self::Infinity)
        } else if text.eq_ignore_ascii_case("-infinity") {
            Some(Self::NegativeInfinity)
        } else {
            None
        }
    }

    pub(crate) fn fmt_with(
        &self,
        f: &mut fmt::Formatter<'_>,
        finite: impl FnOnce(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        match self {
            Self::NegativeInfinity => f.write_str("-infinity"),
            Self::Infinity => f.write_str("infinity"),
            Self::Finite(value) => finite(value, f),
        }
    }
}

/// Why date text was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateError {
    /// Not `YYYY-MM-DD`
    Syntax,
    /// Well formed but not on the calendar
    Calendar,
}

pub(crate) fn parse_date(text: &str) -> Result<NaiveDate, DateError> {
    let caps = DATE.captures(text).ok_or(DateError::Syntax)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (Some(year), Some(month), Some(day)) = (field(1), field(2), field(3)) else {
        return Err(DateError::Syntax);
    };
    let year = i32::try_from(year).map_err(|_| DateError::Calendar)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateError::Calendar)
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Round a fractional-second digit string to microseconds
fn fraction_to_micros(fraction: &str) -> i64 {
    let mut micros = 0i64;
    for (i, c) in fraction.chars().take(7).enumerate() {
        let digit = c.to_digit(10).unwrap_or(0) as i64;
        if i < 6 {
            micros = micros * 10 + digit;
        } else if digit >= 5 {
            micros += 1;
        }
    }
    let written = fraction.len().min(6) as u32;
    if written < 6 {
        micros *= 10i64.pow(6 - written);
    }
    micros
}

/// Parse `HH:MM[:SS[.ffffff]]` into microseconds since midnight
///
/// `24:00:00` is accepted and yields a full day.
pub(crate) fn parse_time_of_day(text: &str) -> Option<i64> {
    let caps = TIME_OF_DAY.captures(text)?;
    let hour: i64 = caps.get(1)?.as_str().parse().ok()?;
    let minute: i64 = caps.get(2)?.as_str().parse().ok()?;
    let second: i64 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let fraction = caps.get(4).map_or(0, |m| fraction_to_micros(m.as_str()));
    if hour > 24 || minute > 59 || second > 60 {
        return None;
    }
    let micros = hour * MICROS_PER_HOUR + minute * MICROS_PER_MINUTE + second * MICROS_PER_SECOND + fraction;
    (micros <= MICROS_PER_DAY).then_some(micros)
}

/// Render microseconds since midnight as `HH:MM:SS[.ffffff]`
///
/// Hours are not wrapped, so spans longer than a day print as `25:00:00`.
pub(crate) fn format_time_of_day(micros: i64) -> String {
    let seconds = micros / MICROS_PER_SECOND;
    let fraction = micros % MICROS_PER_SECOND;
    let mut out = format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    );
    if fraction != 0 {
        let digits = format!("{:06}", fraction);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

/// Resolve a matched zone suffix into an offset
///
/// A missing suffix means UTC. Zone names resolve at `local` when given,
/// otherwise at the current instant.
pub(crate) fn resolve_offset(
    offset: Option<&str>,
    zone: Option<&str>,
    local: Option<&NaiveDateTime>,
    ctx: &mut ParseContext,
) -> ParseOutcome<TimezoneOffset> {
    if let Some(text) = offset {
        return match TimezoneOffset::parse(text) {
            Some(parsed) => ParseOutcome::Valid(parsed),
            None => ctx.report(Issue::InvalidTimezone {
                received: text.to_string(),
            }),
        };
    }
    let Some(name) = zone else {
        return ParseOutcome::Valid(TimezoneOffset::UTC);
    };
    let minutes = match local {
        Some(local) => timezone_offset_at(name, local),
        None => timezone_offset_minutes(name),
    };
    match minutes.and_then(TimezoneOffset::from_minutes) {
        Some(parsed) => ParseOutcome::Valid(parsed),
        None => ctx.report(Issue::InvalidTimezone {
            received: name.to_string(),
        }),
    }
}

// ============================================================================
// Date
// ============================================================================

/// `date`, a calendar day or one of the infinities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(Temporal<NaiveDate>);

impl Date {
    pub fn value(&self) -> Temporal<NaiveDate> {
        self.0
    }

    /// The calendar day, when finite
    pub fn date(&self) -> Option<NaiveDate> {
        self.0.finite().copied()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_with(f, |d, f| f.write_str(&format_date(d)))
    }
}

impl PgType for Date {
    type Config = ();

    fn type_name() -> &'static str {
        "date"
    }

    fn type_oid() -> Option<u32> {
        Some(1082)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        if let Some(special) = Temporal::special(trimmed) {
            return ParseOutcome::Valid(Self(special));
        }
        if trimmed.eq_ignore_ascii_case("epoch") {
            return ParseOutcome::Valid(Self(Temporal::Finite(NaiveDate::default())));
        }
        match parse_date(trimmed) {
            Ok(date) => ParseOutcome::Valid(Self(Temporal::Finite(date))),
            Err(DateError::Calendar) => ctx.report(Issue::InvalidDate {
                received: text.to_string(),
            }),
            Err(DateError::Syntax) => ctx.report(Issue::invalid_string("date", text)),
        }
    }

    fn config(&self) {}

    crate::value_glue!(Date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtext_diagnostics::IssueCode;
    use rstest::rstest;

    #[rstest]
    #[case("2023-01-05", "2023-01-05")]
    #[case("2024-2-29", "2024-02-29")]
    #[case("infinity", "infinity")]
    #[case("-Infinity", "-infinity")]
    #[case("epoch", "1970-01-01")]
    fn test_date_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Date::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("2023-02-30", IssueCode::InvalidDate)]
    #[case("2023-13-01", IssueCode::InvalidDate)]
    #[case("01/02/2023", IssueCode::InvalidString)]
    #[case("2023-01-01T00:00", IssueCode::InvalidString)]
    fn test_date_rejects(#[case] input: &str, #[case] code: IssueCode) {
        assert_eq!(Date::safe_parse(input).unwrap_err().code, code);
    }

    #[test]
    fn test_infinities_bracket_finite_dates() {
        let low = Date::parse("-infinity").unwrap();
        let mid = Date::parse("2000-01-01").unwrap();
        let high = Date::parse("infinity").unwrap();
        assert!(low < mid && mid < high);
    }

    #[rstest]
    #[case("12:34", 12 * MICROS_PER_HOUR + 34 * MICROS_PER_MINUTE)]
    #[case("00:00:01.5", MICROS_PER_SECOND + 500_000)]
    #[case("00:00:00.0000015", 2)]
    #[case("24:00:00", MICROS_PER_DAY)]
    fn test_time_of_day(#[case] input: &str, #[case] micros: i64) {
        assert_eq!(parse_time_of_day(input), Some(micros));
    }

    #[test]
    fn test_time_of_day_rejects() {
        assert_eq!(parse_time_of_day("24:00:01"), None);
        assert_eq!(parse_time_of_day("12:60"), None);
        assert_eq!(parse_time_of_day("noon"), None);
    }

    #[test]
    fn test_format_time_of_day() {
        assert_eq!(format_time_of_day(MICROS_PER_SECOND + 500_000), "00:00:01.5");
        assert_eq!(format_time_of_day(25 * MICROS_PER_HOUR), "25:00:00");
    }
}
