//! `time` and `time with time zone`

use super::temporal::{
    MICROS_PER_HOUR, MICROS_PER_MINUTE, MICROS_PER_SECOND, TIME_WITH_ZONE, format_time_of_day,
    parse_time_of_day, resolve_offset,
};
use crate::PgType;
use crate::timezone::TimezoneOffset;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome, try_valid};
use std::cmp::Ordering;
use std::fmt;

/// `time`, a wall-clock time of day from `00:00:00` to `24:00:00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    micros: i64,
}

impl Time {
    pub fn hour(&self) -> u8 {
        (self.micros / MICROS_PER_HOUR) as u8
    }

    pub fn minute(&self) -> u8 {
        ((self.micros / MICROS_PER_MINUTE) % 60) as u8
    }

    pub fn second(&self) -> u8 {
        ((self.micros / MICROS_PER_SECOND) % 60) as u8
    }

    pub fn microsecond(&self) -> u32 {
        (self.micros % MICROS_PER_SECOND) as u32
    }

    /// Microseconds since midnight
    pub fn micros_since_midnight(&self) -> i64 {
        self.micros
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_time_of_day(self.micros))
    }
}

impl PgType for Time {
    type Config = ();

    fn type_name() -> &'static str {
        "time"
    }

    fn type_oid() -> Option<u32> {
        Some(1083)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        match parse_time_of_day(text.trim()) {
            Some(micros) => ParseOutcome::Valid(Self { micros }),
            None => ctx.report(Issue::invalid_string("time", text)),
        }
    }

    fn config(&self) {}

    crate::value_glue!(Time);
}

/// `timetz`, a time of day with a UTC offset
///
/// Equality and ordering compare the UTC reading, so `12:00:00+02:00`
/// equals `10:00:00+00:00`. A zone name resolves to its current offset.
#[derive(Debug, Clone, Copy)]
pub struct TimeTZ {
    time: Time,
    offset: TimezoneOffset,
}

impl TimeTZ {
    pub fn time(&self) -> Time {
        self.time
    }

    pub fn offset(&self) -> TimezoneOffset {
        self.offset
    }

    /// Microseconds since midnight UTC, not wrapped into a single day
    pub fn utc_micros(&self) -> i64 {
        self.time.micros - self.offset.total_minutes() as i64 * MICROS_PER_MINUTE
    }
}

impl PartialEq for TimeTZ {
    fn eq(&self, other: &Self) -> bool {
        self.utc_micros() == other.utc_micros()
    }
}

impl Eq for TimeTZ {}

impl Ord for TimeTZ {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc_micros().cmp(&other.utc_micros())
    }
}

impl PartialOrd for TimeTZ {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeTZ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time, self.offset)
    }
}

impl PgType for TimeTZ {
    type Config = ();

    fn type_name() -> &'static str {
        "timetz"
    }

    fn type_oid() -> Option<u32> {
        Some(1266)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let Some(caps) = TIME_WITH_ZONE.captures(text.trim()) else {
            return ctx.report(Issue::invalid_string("timetz", text));
        };
        let micros = match caps.name("time").and_then(|m| parse_time_of_day(m.as_str())) {
            Some(micros) => micros,
            None => return ctx.report(Issue::invalid_string("timetz", text)),
        };
        let offset = try_valid!(resolve_offset(
            caps.name("offset").map(|m| m.as_str()),
            caps.name("zone").map(|m| m.as_str()),
            None,
            ctx,
        ));
        ParseOutcome::Valid(Self {
            time: Time { micros },
            offset,
        })
    }

    fn config(&self) {}

    crate::value_glue!(TimeTZ);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtext_diagnostics::IssueCode;
    use rstest::rstest;

    #[test]
    fn test_time_fields() {
        let t = Time::parse("13:45:10.25").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (13, 45, 10));
        assert_eq!(t.microsecond(), 250_000);
        assert_eq!(t.to_string(), "13:45:10.25");
        assert_eq!(Time::parse("24:00").unwrap().to_string(), "24:00:00");
        assert_eq!(Time::safe_parse("25:00").unwrap_err().code, IssueCode::InvalidString);
    }

    #[rstest]
    #[case("12:00:00+09", "12:00:00+09:00")]
    #[case("12:00-03:30", "12:00:00-03:30")]
    #[case("08:15:00Z", "08:15:00+00:00")]
    #[case("08:15:00", "08:15:00+00:00")]
    #[case("08:15:00 UTC", "08:15:00+00:00")]
    fn test_timetz_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(TimeTZ::parse(input).unwrap().to_string(), expected);
    }

    #[test]
    fn test_timetz_compares_utc_reading() {
        let a = TimeTZ::parse("12:00:00+02:00").unwrap();
        assert!(a.equals("10:00:00+00:00").unwrap());
        assert!(a < TimeTZ::parse("11:00:00+00:00").unwrap());
    }

    #[test]
    fn test_timetz_rejects_unknown_zone() {
        assert_eq!(
            TimeTZ::safe_parse("12:00 Nowhere/Special").unwrap_err().code,
            IssueCode::InvalidTimezone
        );
        assert_eq!(
            TimeTZ::safe_parse("12:00+17").unwrap_err().code,
            IssueCode::InvalidTimezone
        );
    }
}
