//! Exact decimal parsing and domain checks for numeric types
//!
//! Type limits are given as exact decimal text and compared without going
//! through floating point, so `9223372036854775808` is rejected for `int8`
//! and `1.7976931348623157e308` is accepted for `float8`.

use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static DECIMAL_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?([0-9]+)(?:\.([0-9]+))?(?:[eE]([+-]?[0-9]+))?$").expect("valid regex")
});

// Exponents are clamped well past anything a domain check can accept.
const EXPONENT_LIMIT: i64 = 1 << 40;

/// Error returned when text is not a decimal literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal literal: {0:?}")]
pub struct ParseDecimalError(pub String);

/// An arbitrary-precision decimal: `digits * 10^exponent`
///
/// Normalized so that `digits` has no leading or trailing zeros; zero is the
/// empty digit string and is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactDecimal {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl ExactDecimal {
    pub fn zero() -> Self {
        Self {
            negative: false,
            digits: String::new(),
            exponent: 0,
        }
    }

    fn from_parts(negative: bool, integer: &str, fraction: &str, exponent: i64) -> Self {
        let mut digits = String::with_capacity(integer.len() + fraction.len());
        digits.push_str(integer);
        digits.push_str(fraction);
        let mut exponent = exponent.saturating_sub(fraction.len() as i64);

        let trimmed = digits.trim_start_matches('0');
        let without_trailing = trimmed.trim_end_matches('0');
        exponent = exponent.saturating_add((trimmed.len() - without_trailing.len()) as i64);
        let digits = without_trailing.to_string();

        if digits.is_empty() {
            return Self::zero();
        }
        Self {
            negative,
            digits,
            exponent: exponent.clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if the value has no fractional part
    pub fn is_whole(&self) -> bool {
        self.is_zero() || self.exponent >= 0
    }

    /// Number of significant fractional digits
    pub fn fraction_digits(&self) -> u64 {
        if self.exponent < 0 {
            self.exponent.unsigned_abs()
        } else {
            0
        }
    }

    /// Number of digits before the decimal point
    pub fn integer_digits(&self) -> u64 {
        self.magnitude().max(0) as u64
    }

    /// Position of the most significant digit relative to the decimal point
    fn magnitude(&self) -> i64 {
        self.digits.len() as i64 + self.exponent
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        self.magnitude().cmp(&other.magnitude()).then_with(|| {
            let width = self.digits.len().max(other.digits.len());
            let a = format!("{:0<width$}", self.digits, width = width);
            let b = format!("{:0<width$}", other.digits, width = width);
            a.cmp(&b)
        })
    }

    /// Render as plain decimal text with at least `min_scale` fractional digits
    pub fn to_plain_string(&self, min_scale: u64) -> String {
        let mut out = String::new();
        if self.negative {
            out.push('-');
        }
        let (integer, fraction) = if self.is_zero() {
            ("0".to_string(), String::new())
        } else if self.exponent >= 0 {
            let mut integer = self.digits.clone();
            integer.extend(std::iter::repeat_n('0', self.exponent as usize));
            (integer, String::new())
        } else {
            let k = self.exponent.unsigned_abs() as usize;
            let n = self.digits.len();
            if n > k {
                (self.digits[..n - k].to_string(), self.digits[n - k..].to_string())
            } else {
                let mut fraction = "0".repeat(k - n);
                fraction.push_str(&self.digits);
                ("0".to_string(), fraction)
            }
        };
        out.push_str(&integer);
        let scale = (fraction.len() as u64).max(min_scale) as usize;
        if scale > 0 {
            out.push('.');
            out.push_str(&format!("{:0<scale$}", fraction, scale = scale));
        }
        out
    }

    /// Scientific rendering, safe for any exponent
    pub fn to_scientific_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        format!(
            "{}{}e{}",
            if self.negative { "-" } else { "" },
            self.digits,
            self.exponent
        )
    }

    pub fn to_f64(&self) -> f64 {
        self.to_scientific_string().parse().unwrap_or(f64::NAN)
    }

    /// Convert to `i64` when whole and in range
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_whole() || self.magnitude() > 19 {
            return None;
        }
        self.to_plain_string(0).parse().ok()
    }
}

impl FromStr for ExactDecimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = DECIMAL_LITERAL
            .captures(s)
            .ok_or_else(|| ParseDecimalError(s.to_string()))?;
        let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
        let integer = caps.get(2).map_or("", |m| m.as_str());
        let fraction = caps.get(3).map_or("", |m| m.as_str());
        let exponent = match caps.get(4) {
            Some(m) => m.as_str().parse::<i64>().unwrap_or_else(|_| {
                if m.as_str().starts_with('-') {
                    -EXPONENT_LIMIT
                } else {
                    EXPONENT_LIMIT
                }
            }),
            None => 0,
        };
        Ok(Self::from_parts(negative, integer, fraction, exponent))
    }
}

impl Ord for ExactDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl PartialOrd for ExactDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ExactDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string(0))
    }
}

/// A parsed number before it is narrowed to a concrete type
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedNumber {
    Finite {
        value: ExactDecimal,
        /// Fractional digits as written, e.g. 2 for `1.50`
        scale: u64,
    },
    Infinity,
    NegativeInfinity,
    NaN,
}

/// The exact numeric domain of a type
#[derive(Debug, Clone, Copy)]
pub struct NumberDomain {
    /// Type name used in `InvalidString` issues
    pub name: &'static str,
    /// Inclusive minimum as exact decimal text
    pub minimum: Option<&'static str>,
    /// Inclusive maximum as exact decimal text
    pub maximum: Option<&'static str>,
    pub allow_infinity: bool,
    pub allow_nan: bool,
    /// Reject values with a fractional part
    pub whole: bool,
}

impl NumberDomain {
    /// Parse `text` and check it against the domain
    pub fn parse(&self, text: &str, ctx: &mut ParseContext) -> ParseOutcome<ParsedNumber> {
        let trimmed = text.trim();
        if let Some(special) = special_literal(trimmed) {
            return match special {
                ParsedNumber::NaN if !self.allow_nan => ctx.report(Issue::NotFinite),
                ParsedNumber::Infinity | ParsedNumber::NegativeInfinity if !self.allow_infinity => {
                    ctx.report(Issue::NotFinite)
                }
                other => ParseOutcome::Valid(other),
            };
        }

        let normalized;
        let literal = if DECIMAL_LITERAL.is_match(trimmed) {
            trimmed
        } else {
            match normalize_locale_punctuation(trimmed) {
                Some(n) => {
                    normalized = n;
                    normalized.as_str()
                }
                None => return ctx.report(Issue::invalid_string(self.name, text)),
            }
        };

        let value = match literal.parse::<ExactDecimal>() {
            Ok(v) => v,
            Err(_) => return ctx.report(Issue::invalid_string(self.name, text)),
        };
        let scale = written_scale(literal);

        if self.whole && !value.is_whole() {
            return ctx.report(Issue::NotWhole {
                received: text.trim().to_string(),
            });
        }
        if let Some(min) = self.minimum {
            if let Ok(bound) = min.parse::<ExactDecimal>() {
                if value < bound {
                    return ctx.report(Issue::number_too_small(min, true));
                }
            }
        }
        if let Some(max) = self.maximum {
            if let Ok(bound) = max.parse::<ExactDecimal>() {
                if value > bound {
                    return ctx.report(Issue::number_too_big(max, true));
                }
            }
        }
        ParseOutcome::Valid(ParsedNumber::Finite { value, scale })
    }
}

fn special_literal(text: &str) -> Option<ParsedNumber> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if body.eq_ignore_ascii_case("infinity") || body.eq_ignore_ascii_case("inf") {
        return Some(if negative {
            ParsedNumber::NegativeInfinity
        } else {
            ParsedNumber::Infinity
        });
    }
    if body.eq_ignore_ascii_case("nan") && !text.starts_with(['+', '-']) {
        return Some(ParsedNumber::NaN);
    }
    None
}

fn written_scale(literal: &str) -> u64 {
    let mantissa = literal.split(['e', 'E']).next().unwrap_or("");
    let fraction = mantissa.split('.').nth(1).map_or(0, |f| f.len() as i64);
    let exponent = literal
        .split(['e', 'E'])
        .nth(1)
        .and_then(|e| e.parse::<i64>().ok())
        .unwrap_or(0);
    (fraction - exponent).max(0) as u64
}

/// Rewrite `1.234,56` or `1,234.56` into `1234.56`
///
/// The last separator is the decimal mark; every earlier separator must be
/// the other character and delimit groups of three digits.
pub fn normalize_locale_punctuation(text: &str) -> Option<String> {
    let (sign, body) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };
    if !body.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }
    let last = body.rfind([',', '.'])?;
    let decimal_mark = body.as_bytes()[last] as char;
    let thousands = if decimal_mark == ',' { '.' } else { ',' };

    let integer = &body[..last];
    let fraction = &body[last + 1..];
    if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if integer.contains(decimal_mark) {
        return None;
    }

    let groups: Vec<&str> = integer.split(thousands).collect();
    let (first, rest) = groups.split_first()?;
    if first.is_empty() || !first.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !rest.is_empty() {
        if first.len() > 3 {
            return None;
        }
        if !rest.iter().all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit())) {
            return None;
        }
    }

    Some(format!("{}{}.{}", sign, groups.concat(), fraction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtext_diagnostics::{DefaultFormatter, IssueCode};
    use rstest::rstest;
    use std::sync::Arc;

    fn ctx() -> ParseContext {
        ParseContext::new(Arc::new(DefaultFormatter))
    }

    const SMALLINT: NumberDomain = NumberDomain {
        name: "int2",
        minimum: Some("-32768"),
        maximum: Some("32767"),
        allow_infinity: false,
        allow_nan: false,
        whole: true,
    };

    fn dec(s: &str) -> ExactDecimal {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("1", "1.0")]
    #[case("0.5", "5e-1")]
    #[case("-0", "0")]
    #[case("1200", "12e2")]
    fn test_equal_values(#[case] a: &str, #[case] b: &str) {
        assert_eq!(dec(a), dec(b));
    }

    #[rstest]
    #[case("1", "2")]
    #[case("-2", "-1")]
    #[case("0.099", "0.1")]
    #[case("9223372036854775807", "9223372036854775808")]
    #[case("-1e308", "1e-308")]
    fn test_ordering(#[case] smaller: &str, #[case] larger: &str) {
        assert!(dec(smaller) < dec(larger));
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(dec("1.50").to_plain_string(0), "1.5");
        assert_eq!(dec("1.50").to_plain_string(2), "1.50");
        assert_eq!(dec("0.001").to_plain_string(0), "0.001");
        assert_eq!(dec("-12e3").to_plain_string(0), "-12000");
        assert_eq!(dec("0").to_plain_string(1), "0.0");
    }

    #[test]
    fn test_to_i64() {
        assert_eq!(dec("9223372036854775807").to_i64(), Some(i64::MAX));
        assert_eq!(dec("1e3").to_i64(), Some(1000));
        assert_eq!(dec("1.5").to_i64(), None);
    }

    #[rstest]
    #[case("1.234,56", Some("1234.56"))]
    #[case("1,234.56", Some("1234.56"))]
    #[case("12,5", Some("12.5"))]
    #[case("-1.234.567,8", Some("-1234567.8"))]
    #[case("1,23.4", None)]
    #[case("1.234.56", None)]
    #[case("1,,2", None)]
    #[case("abc", None)]
    fn test_locale_punctuation(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_locale_punctuation(input).as_deref(), expected);
    }

    #[test]
    fn test_domain_bounds() {
        let mut c = ctx();
        assert!(SMALLINT.parse("-32768", &mut c).is_valid());
        assert!(SMALLINT.parse("32767", &mut c).is_valid());

        let mut c = ctx();
        assert!(!SMALLINT.parse("32768", &mut c).is_valid());
        assert_eq!(c.diagnostic().unwrap().code, IssueCode::TooBig);

        let mut c = ctx();
        assert!(!SMALLINT.parse("-32769", &mut c).is_valid());
        assert_eq!(c.diagnostic().unwrap().code, IssueCode::TooSmall);
    }

    #[test]
    fn test_domain_rejects_specials() {
        let mut c = ctx();
        assert!(!SMALLINT.parse("Infinity", &mut c).is_valid());
        assert_eq!(c.diagnostic().unwrap().code, IssueCode::NotFinite);

        let mut c = ctx();
        assert!(!SMALLINT.parse("1.5", &mut c).is_valid());
        assert_eq!(c.diagnostic().unwrap().code, IssueCode::NotWhole);

        let mut c = ctx();
        assert!(!SMALLINT.parse("1;5", &mut c).is_valid());
        assert_eq!(c.diagnostic().unwrap().code, IssueCode::InvalidString);
    }

    #[test]
    fn test_written_scale() {
        assert_eq!(written_scale("1.50"), 2);
        assert_eq!(written_scale("15e-1"), 1);
        assert_eq!(written_scale("1.5e3"), 0);
    }
}
