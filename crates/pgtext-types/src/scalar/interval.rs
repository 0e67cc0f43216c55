//! The `interval` type
//!
//! Accepts PostgreSQL's verbose style (`1 year 2 mons 3 days 04:05:06`,
//! `@ 3 days ago`) and ISO 8601 durations (`P1Y2M3DT4H5M6S`). Output is
//! always the verbose style.

use super::temporal::{MICROS_PER_DAY, MICROS_PER_HOUR, MICROS_PER_MINUTE, MICROS_PER_SECOND, format_time_of_day};
use crate::PgType;
use crate::structure::expect_keys;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome, try_valid};
use regex::Regex;
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

const DAYS_PER_MONTH: i64 = 30;

static NUMBER_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?\d+(?:\.\d*)?|[+-]?\.\d+)([A-Za-z]+)?$").expect("valid regex")
});

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(\d+):(\d{1,2})(?::(\d{1,2})(?:\.(\d+))?)?$").expect("valid regex")
});

static ISO_8601: LazyLock<Regex> = LazyLock::new(|| {
    let n = r"([+-]?\d+(?:\.\d+)?)";
    Regex::new(&format!(
        r"^(-)?[Pp](?:{n}[Yy])?(?:{n}[Mm])?(?:{n}[Ww])?(?:{n}[Dd])?(?:[Tt](?:{n}[Hh])?(?:{n}[Mm])?(?:{n}[Ss])?)?$"
    ))
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    Decade,
    Century,
    Millennium,
}

impl Unit {
    fn lookup(word: &str) -> Option<Self> {
        let unit = match word.to_ascii_lowercase().as_str() {
            "microsecond" | "microseconds" | "us" | "usec" | "usecs" => Self::Microsecond,
            "millisecond" | "milliseconds" | "ms" | "msec" | "msecs" => Self::Millisecond,
            "second" | "seconds" | "s" | "sec" | "secs" => Self::Second,
            "minute" | "minutes" | "m" | "min" | "mins" => Self::Minute,
            "hour" | "hours" | "h" | "hr" | "hrs" => Self::Hour,
            "day" | "days" | "d" => Self::Day,
            "week" | "weeks" | "w" => Self::Week,
            "month" | "months" | "mon" | "mons" => Self::Month,
            "year" | "years" | "y" | "yr" | "yrs" => Self::Year,
            "decade" | "decades" => Self::Decade,
            "century" | "centuries" => Self::Century,
            "millennium" | "millennia" | "millenniums" => Self::Millennium,
            _ => return None,
        };
        Some(unit)
    }
}

/// Running totals while reading an interval literal
#[derive(Debug, Default)]
struct Accumulator {
    months: i64,
    days: i64,
    micros: i64,
}

impl Accumulator {
    fn add(&mut self, amount: f64, unit: Unit) -> Option<()> {
        if !amount.is_finite() {
            return None;
        }
        match unit {
            Unit::Year => self.add_months(amount * 12.0),
            Unit::Decade => self.add_months(amount * 120.0),
            Unit::Century => self.add_months(amount * 1_200.0),
            Unit::Millennium => self.add_months(amount * 12_000.0),
            Unit::Month => {
                let whole = amount.trunc();
                self.months = self.months.checked_add(whole as i64)?;
                self.add_days((amount - whole) * DAYS_PER_MONTH as f64)
            }
            Unit::Week => self.add_days(amount * 7.0),
            Unit::Day => self.add_days(amount),
            Unit::Hour => self.add_micros(amount * MICROS_PER_HOUR as f64),
            Unit::Minute => self.add_micros(amount * MICROS_PER_MINUTE as f64),
            Unit::Second => self.add_micros(amount * MICROS_PER_SECOND as f64),
            Unit::Millisecond => self.add_micros(amount * 1_000.0),
            Unit::Microsecond => self.add_micros(amount),
        }
    }

    fn add_months(&mut self, months: f64) -> Option<()> {
        self.months = self.months.checked_add(months.round() as i64)?;
        Some(())
    }

    fn add_days(&mut self, days: f64) -> Option<()> {
        let whole = days.trunc();
        self.days = self.days.checked_add(whole as i64)?;
        self.add_micros((days - whole) * MICROS_PER_DAY as f64)
    }

    fn add_micros(&mut self, micros: f64) -> Option<()> {
        if micros.abs() >= i64::MAX as f64 {
            return None;
        }
        self.micros = self.micros.checked_add(micros.round() as i64)?;
        Some(())
    }

    fn negate(&mut self) -> Option<()> {
        self.months = self.months.checked_neg()?;
        self.days = self.days.checked_neg()?;
        self.micros = self.micros.checked_neg()?;
        Some(())
    }

    fn finish(self) -> Option<Interval> {
        Some(Interval {
            months: i32::try_from(self.months).ok()?,
            days: i32::try_from(self.days).ok()?,
            microseconds: self.micros,
        })
    }
}

fn parse_clock(token: &str) -> Option<i64> {
    let caps = CLOCK.captures(token)?;
    let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
    let field = |i: usize| caps.get(i).map_or(Some(0), |m| m.as_str().parse::<i64>().ok());
    let (hours, minutes, seconds) = (field(2)?, field(3)?, field(4)?);
    if minutes > 59 || seconds > 59 {
        return None;
    }
    let fraction = match caps.get(5) {
        Some(m) => {
            let digits: String = m.as_str().chars().chain(std::iter::repeat('0')).take(6).collect();
            digits.parse::<i64>().ok()?
        }
        None => 0,
    };
    let micros = hours
        .checked_mul(MICROS_PER_HOUR)?
        .checked_add(minutes * MICROS_PER_MINUTE + seconds * MICROS_PER_SECOND + fraction)?;
    Some(if negative { -micros } else { micros })
}

fn parse_verbose(text: &str) -> Option<Interval> {
    let body = text.strip_prefix('@').unwrap_or(text);
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    let mut acc = Accumulator::default();
    let mut ago = false;
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        i += 1;
        if token.eq_ignore_ascii_case("ago") {
            if i != tokens.len() || ago {
                return None;
            }
            ago = true;
            continue;
        }
        if token.contains(':') {
            acc.micros = acc.micros.checked_add(parse_clock(token)?)?;
            continue;
        }
        let caps = NUMBER_WITH_UNIT.captures(token)?;
        let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
        let unit = match caps.get(2) {
            Some(word) => Unit::lookup(word.as_str())?,
            None => match tokens.get(i).and_then(|next| Unit::lookup(next)) {
                Some(unit) => {
                    i += 1;
                    unit
                }
                None => Unit::Second,
            },
        };
        acc.add(amount, unit)?;
    }
    if ago {
        acc.negate()?;
    }
    acc.finish()
}

fn parse_iso_8601(text: &str) -> Option<Interval> {
    let caps = ISO_8601.captures(text)?;
    let units = [
        Unit::Year,
        Unit::Month,
        Unit::Week,
        Unit::Day,
        Unit::Hour,
        Unit::Minute,
        Unit::Second,
    ];
    let mut acc = Accumulator::default();
    let mut any = false;
    for (index, unit) in units.into_iter().enumerate() {
        if let Some(m) = caps.get(index + 2) {
            acc.add(m.as_str().parse().ok()?, unit)?;
            any = true;
        }
    }
    if !any {
        return None;
    }
    if caps.get(1).is_some() {
        acc.negate()?;
    }
    acc.finish()
}

/// `interval`, a span of months, days and microseconds
///
/// The three fields are kept apart because months and days vary in length.
/// Comparison uses the total span with 30-day months and 24-hour days, so
/// `1 mon` equals `30 days`.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    months: i32,
    days: i32,
    microseconds: i64,
}

impl Interval {
    pub fn months(&self) -> i32 {
        self.months
    }

    pub fn days(&self) -> i32 {
        self.days
    }

    pub fn microseconds(&self) -> i64 {
        self.microseconds
    }

    /// Total span in microseconds
    pub fn span(&self) -> i128 {
        (self.months as i128 * DAYS_PER_MONTH as i128 + self.days as i128) * MICROS_PER_DAY as i128
            + self.microseconds as i128
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.span() == other.span()
    }
}

impl Eq for Interval {}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.span().cmp(&other.span())
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: i32| if n == 1 { "" } else { "s" };
        let years = self.months / 12;
        let months = self.months % 12;
        let mut parts = Vec::new();
        if years != 0 {
            parts.push(format!("{} year{}", years, plural(years)));
        }
        if months != 0 {
            parts.push(format!("{} mon{}", months, plural(months)));
        }
        if self.days != 0 {
            parts.push(format!("{} day{}", self.days, plural(self.days)));
        }
        if self.microseconds != 0 || parts.is_empty() {
            let sign = if self.microseconds < 0 {
                "-"
            } else if years < 0 || months < 0 || self.days < 0 {
                "+"
            } else {
                ""
            };
            let clock = format_time_of_day(self.microseconds.unsigned_abs().min(i64::MAX as u64) as i64);
            parts.push(format!("{}{}", sign, clock));
        }
        f.write_str(&parts.join(" "))
    }
}

impl PgType for Interval {
    type Config = ();

    fn type_name() -> &'static str {
        "interval"
    }

    fn type_oid() -> Option<u32> {
        Some(1186)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let parsed = if trimmed.starts_with(['P', 'p']) || trimmed.starts_with("-P") {
            parse_iso_8601(trimmed)
        } else {
            parse_verbose(trimmed)
        };
        match parsed {
            Some(interval) => ParseOutcome::Valid(interval),
            None => ctx.report(Issue::invalid_string("interval", text)),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["months", "days", "microseconds"], &[], ctx));
        let months = try_valid!(fields.integer("months", ctx));
        let days = try_valid!(fields.integer("days", ctx));
        let microseconds = try_valid!(fields.integer("microseconds", ctx));
        let acc = Accumulator {
            months,
            days,
            micros: microseconds,
        };
        match acc.finish() {
            Some(interval) => ParseOutcome::Valid(interval),
            None => ctx.report(Issue::number_too_big(i32::MAX.to_string(), true)),
        }
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        json!({
            "months": self.months,
            "days": self.days,
            "microseconds": self.microseconds,
        })
    }

    crate::value_glue!(Interval);
}
