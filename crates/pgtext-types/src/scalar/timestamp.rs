//! `timestamp` and `timestamp with time zone`

use super::temporal::{
    DATE_TIME, DateError, MICROS_PER_SECOND, Temporal, format_date, format_time_of_day,
    parse_date, parse_time_of_day, resolve_offset,
};
use crate::PgType;
use crate::timezone::TimezoneOffset;
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome, try_valid};
use regex::Captures;
use std::cmp::Ordering;
use std::fmt;

/// Parse the date and time groups of a [`DATE_TIME`] match
fn local_date_time(caps: &Captures<'_>) -> Result<NaiveDateTime, DateError> {
    let date = parse_date(caps.name("date").map_or("", |m| m.as_str()))?;
    let micros = match caps.name("time") {
        Some(m) => parse_time_of_day(m.as_str()).ok_or(DateError::Syntax)?,
        None => 0,
    };
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(TimeDelta::microseconds(micros)))
        .ok_or(DateError::Calendar)
}

fn report_date_error<T>(error: DateError, type_name: &str, text: &str, ctx: &mut ParseContext) -> ParseOutcome<T> {
    match error {
        DateError::Calendar => ctx.report(Issue::InvalidDate {
            received: text.to_string(),
        }),
        DateError::Syntax => ctx.report(Issue::invalid_string(type_name, text)),
    }
}

fn format_local(local: &NaiveDateTime) -> String {
    let time = local.time();
    let micros = time.num_seconds_from_midnight() as i64 * MICROS_PER_SECOND
        + (time.nanosecond() / 1_000) as i64;
    format!("{}T{}", format_date(&local.date()), format_time_of_day(micros))
}

// ============================================================================
// Timestamp
// ============================================================================

/// `timestamp`, a wall-clock date and time without zone
///
/// A zone suffix in the input is accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Temporal<NaiveDateTime>);

impl Timestamp {
    pub fn value(&self) -> Temporal<NaiveDateTime> {
        self.0
    }

    pub fn date_time(&self) -> Option<NaiveDateTime> {
        self.0.finite().copied()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_with(f, |local, f| f.write_str(&format_local(local)))
    }
}

impl PgType for Timestamp {
    type Config = ();

    fn type_name() -> &'static str {
        "timestamp"
    }

    fn type_oid() -> Option<u32> {
        Some(1114)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        if let Some(special) = Temporal::special(trimmed) {
            return ParseOutcome::Valid(Self(special));
        }
        let Some(caps) = DATE_TIME.captures(trimmed) else {
            return ctx.report(Issue::invalid_string("timestamp", text));
        };
        match local_date_time(&caps) {
            Ok(local) => ParseOutcome::Valid(Self(Temporal::Finite(local))),
            Err(error) => report_date_error(error, "timestamp", text, ctx),
        }
    }

    fn config(&self) {}

    crate::value_glue!(Timestamp);
}

// ============================================================================
// TimestampTZ
// ============================================================================

/// Wall-clock reading plus the offset it was written with
///
/// The UTC reading is computed once on construction, so every value has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZonedDateTime {
    local: NaiveDateTime,
    offset: TimezoneOffset,
    utc: NaiveDateTime,
}

impl ZonedDateTime {
    /// `None` when the UTC reading falls outside the representable range
    pub fn new(local: NaiveDateTime, offset: TimezoneOffset) -> Option<Self> {
        let utc = local.checked_sub_signed(TimeDelta::minutes(offset.total_minutes() as i64))?;
        Some(Self { local, offset, utc })
    }

    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    pub fn offset(&self) -> TimezoneOffset {
        self.offset
    }

    /// The same instant as a UTC wall-clock reading
    pub fn utc_naive(&self) -> NaiveDateTime {
        self.utc
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.utc_naive())
    }
}

/// `timestamptz`, an absolute instant that remembers its written offset
///
/// Two values are equal when they denote the same instant, whatever their
/// offsets. A zone name resolves to the offset in effect at that wall-clock
/// time; a missing suffix means UTC.
#[derive(Debug, Clone, Copy)]
pub struct TimestampTZ(Temporal<ZonedDateTime>);

impl TimestampTZ {
    pub fn value(&self) -> Temporal<ZonedDateTime> {
        self.0
    }

    pub fn offset(&self) -> Option<TimezoneOffset> {
        self.0.finite().map(ZonedDateTime::offset)
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.0.finite().map(ZonedDateTime::to_utc)
    }

    fn instant(&self) -> Temporal<NaiveDateTime> {
        match self.0 {
            Temporal::NegativeInfinity => Temporal::NegativeInfinity,
            Temporal::Finite(zoned) => Temporal::Finite(zoned.utc_naive()),
            Temporal::Infinity => Temporal::Infinity,
        }
    }
}

impl PartialEq for TimestampTZ {
    fn eq(&self, other: &Self) -> bool {
        self.instant() == other.instant()
    }
}

impl Eq for TimestampTZ {}

impl Ord for TimestampTZ {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant().cmp(&other.instant())
    }
}

impl PartialOrd for TimestampTZ {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimestampTZ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_with(f, |zoned, f| {
            write!(f, "{}{}", format_local(&zoned.local()), zoned.offset())
        })
    }
}

impl PgType for TimestampTZ {
    type Config = ();

    fn type_name() -> &'static str {
        "timestamptz"
    }

    fn type_oid() -> Option<u32> {
        Some(1184)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        if let Some(special) = Temporal::special(trimmed) {
            return ParseOutcome::Valid(Self(special));
        }
        let Some(caps) = DATE_TIME.captures(trimmed) else {
            return ctx.report(Issue::invalid_string("timestamptz", text));
        };
        let local = match local_date_time(&caps) {
            Ok(local) => local,
            Err(error) => return report_date_error(error, "timestamptz", text, ctx),
        };
        let offset = try_valid!(resolve_offset(
            caps.name("offset").map(|m| m.as_str()),
            caps.name("zone").map(|m| m.as_str()),
            Some(&local),
            ctx,
        ));
        match ZonedDateTime::new(local, offset) {
            Some(zoned) => ParseOutcome::Valid(Self(Temporal::Finite(zoned))),
            None => ctx.report(Issue::InvalidDate {
                received: text.to_string(),
            }),
        }
    }

    fn config(&self) {}

    crate::value_glue!(TimestampTZ);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtext_diagnostics::IssueCode;
    use rstest::rstest;

    #[rstest]
    #[case("2023-01-01 00:00:00", "2023-01-01T00:00:00")]
    #[case("2023-01-01T12:30", "2023-01-01T12:30:00")]
    #[case("2023-01-01", "2023-01-01T00:00:00")]
    #[case("2023-01-01 10:00:00.123+02", "2023-01-01T10:00:00.123")]
    #[case("2023-01-01 24:00:00", "2023-01-02T00:00:00")]
    #[case("infinity", "infinity")]
    fn test_timestamp_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Timestamp::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("2023-02-29 00:00", IssueCode::InvalidDate)]
    #[case("2023-01-01 25:00", IssueCode::InvalidString)]
    #[case("yesterday", IssueCode::InvalidString)]
    fn test_timestamp_rejects(#[case] input: &str, #[case] code: IssueCode) {
        assert_eq!(Timestamp::safe_parse(input).unwrap_err().code, code);
    }

    #[rstest]
    #[case("2023-01-01T00:00:00+09:00", "2023-01-01T00:00:00+09:00")]
    #[case("2023-01-01 00:00:00-05", "2023-01-01T00:00:00-05:00")]
    #[case("2023-01-01 00:00:00Z", "2023-01-01T00:00:00+00:00")]
    #[case("2023-01-01 00:00:00", "2023-01-01T00:00:00+00:00")]
    #[case("2023-07-01 12:00:00 Europe/Berlin", "2023-07-01T12:00:00+02:00")]
    #[case("2023-01-01 12:00:00 Europe/Berlin", "2023-01-01T12:00:00+01:00")]
    fn test_timestamptz_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(TimestampTZ::parse(input).unwrap().to_string(), expected);
    }

    #[test]
    fn test_timestamptz_same_instant_equal() {
        let utc = TimestampTZ::parse("2023-01-01T00:00:00+00:00").unwrap();
        let tokyo = TimestampTZ::parse("2023-01-01T09:00:00+09:00").unwrap();
        assert_eq!(utc, tokyo);
        assert!(utc.equals("2022-12-31T19:00:00-05:00").unwrap());
        assert_eq!(tokyo.offset().map(|o| o.total_minutes()), Some(540));
        assert_ne!(utc.to_string(), tokyo.to_string());
    }

    #[test]
    fn test_timestamptz_ordering_uses_instant() {
        let earlier = TimestampTZ::parse("2023-01-01T08:00:00+00:00").unwrap();
        let later = TimestampTZ::parse("2023-01-01T10:00:00+09:00").unwrap();
        assert!(later < earlier);
        assert!(TimestampTZ::parse("-infinity").unwrap() < later);
    }

    #[rstest]
    #[case("262142-12-31 23:00:00-05")]
    fn test_timestamptz_instant_past_calendar_end(#[case] input: &str) {
        assert_eq!(TimestampTZ::safe_parse(input).unwrap_err().code, IssueCode::InvalidDate);
    }

    #[test]
    fn test_timestamptz_at_calendar_edge() {
        let last = TimestampTZ::parse("262142-12-31 23:00:00+05").unwrap();
        let same = TimestampTZ::parse("262142-12-31 18:00:00Z").unwrap();
        assert_eq!(last, same);
        assert!(TimestampTZ::parse("262142-12-31 20:00:00Z").unwrap() > last);
    }

    #[test]
    fn test_timestamptz_unknown_zone() {
        let err = TimestampTZ::safe_parse("2023-01-01 00:00 Atlantis/Capital").unwrap_err();
        assert_eq!(err.code, IssueCode::InvalidTimezone);
    }
}
