//! Generic range type
//!
//! [`Range<T>`] works for any ordered scalar implementing [`RangeSubtype`].
//! Concrete PostgreSQL range types are aliases (`Int4Range = Range<Int4>`).
//!
//! Brackets are kept exactly as written: `[1,10)` and `[1,9]` are different
//! values here even though PostgreSQL canonicalizes discrete ranges.

use crate::structure::expect_keys;
use crate::{Factory, PgType, PgValue};
use crate::multirange::MultiRange;
use pgtext_diagnostics::{
    CodecError, Issue, ParseContext, ParseOutcome, SafeResult, try_valid,
};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::fmt;

/// Keyword for the empty range
pub const EMPTY_RANGE: &str = "empty";

/// An ordered scalar that can bound a range
///
/// Implementations bind the range and multirange names and OIDs and provide
/// the glue into [`PgValue`].
pub trait RangeSubtype: PgType<Config = ()> + PartialOrd {
    const RANGE_NAME: &'static str;
    const RANGE_OID: u32;
    const MULTIRANGE_NAME: &'static str;
    const MULTIRANGE_OID: u32;

    fn wrap_range(range: Range<Self>) -> PgValue;
    fn guard_range(value: &PgValue) -> Option<&Range<Self>>;
    fn wrap_multirange(multirange: MultiRange<Self>) -> PgValue;
    fn guard_multirange(value: &PgValue) -> Option<&MultiRange<Self>>;
}

/// A range over `T`
///
/// An unbounded side is `None`. Inclusivity flags are kept for unbounded
/// sides too so the text form survives a round trip.
#[derive(Debug, Clone)]
pub struct Range<T> {
    lower: Option<T>,
    upper: Option<T>,
    lower_inclusive: bool,
    upper_inclusive: bool,
    empty: bool,
}

impl<T> Range<T> {
    /// The empty range
    pub fn empty() -> Self {
        Self {
            lower: None,
            upper: None,
            lower_inclusive: false,
            upper_inclusive: false,
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn lower(&self) -> Option<&T> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&T> {
        self.upper.as_ref()
    }

    pub fn lower_inclusive(&self) -> bool {
        self.lower_inclusive
    }

    pub fn upper_inclusive(&self) -> bool {
        self.upper_inclusive
    }
}

impl<T: PartialEq> PartialEq for Range<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.empty || other.empty {
            return self.empty == other.empty;
        }
        self.lower == other.lower
            && self.upper == other.upper
            && self.lower_inclusive == other.lower_inclusive
            && self.upper_inclusive == other.upper_inclusive
    }
}

impl<T: RangeSubtype> Range<T> {
    /// Build a range from parts, checking bound order
    pub fn new(
        lower: Option<T>,
        upper: Option<T>,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> SafeResult<Self> {
        let mut ctx = ParseContext::with_active_formatter();
        let outcome = Self::checked(lower, upper, lower_inclusive, upper_inclusive, &mut ctx);
        ctx.finish(outcome, T::RANGE_NAME)
    }

    fn checked(
        lower: Option<T>,
        upper: Option<T>,
        lower_inclusive: bool,
        upper_inclusive: bool,
        ctx: &mut ParseContext,
    ) -> ParseOutcome<Self> {
        if let (Some(l), Some(u)) = (&lower, &upper) {
            if l.partial_cmp(u) == Some(Ordering::Greater) {
                return ctx.report(Issue::InvalidRangeBound {
                    lower: l.to_string(),
                    upper: u.to_string(),
                });
            }
        }
        ParseOutcome::Valid(Self {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
            empty: false,
        })
    }

    /// Check whether a value lies inside the range
    pub fn contains(&self, candidate: &T) -> bool {
        if self.empty {
            return false;
        }
        let above_lower = match &self.lower {
            None => true,
            Some(lower) => match lower.partial_cmp(candidate) {
                Some(Ordering::Less) => true,
                Some(Ordering::Equal) => self.lower_inclusive,
                _ => false,
            },
        };
        let below_upper = match &self.upper {
            None => true,
            Some(upper) => match candidate.partial_cmp(upper) {
                Some(Ordering::Less) => true,
                Some(Ordering::Equal) => self.upper_inclusive,
                _ => false,
            },
        };
        above_lower && below_upper
    }

    /// Parse `raw` as the bound type and check containment
    pub fn safe_is_within_range(&self, raw: impl Into<Value>) -> SafeResult<bool> {
        Factory::<T>::default()
            .safe_parse(raw)
            .map(|candidate| self.contains(&candidate))
    }

    pub fn is_within_range(&self, raw: impl Into<Value>) -> Result<bool, CodecError> {
        self.safe_is_within_range(raw).map_err(CodecError::from)
    }

    fn decode_bound(text: &str, ctx: &mut ParseContext) -> ParseOutcome<T> {
        T::decode(&Value::String(text.to_string()), &(), ctx)
    }
}

/// Split range text at the first comma outside quotes
fn split_bounds(body: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some((&body[..i], &body[i + 1..])),
            _ => {}
        }
    }
    None
}

/// A bound as written: `None` when the side is unbounded
///
/// Quoted text has its quotes removed; backslash escapes and doubled quotes
/// are resolved in both quoted and unquoted text.
fn unescape_bound(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.trim().chars().peekable();
    let mut in_quotes = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                out.push('"');
            }
            '"' => in_quotes = !in_quotes,
            _ => out.push(c),
        }
    }
    Some(out)
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text
            .chars()
            .any(|c| matches!(c, '"' | '\\' | ',' | '(' | ')' | '[' | ']') || c.is_whitespace())
}

pub(crate) fn quote_bound(text: &str) -> String {
    if !needs_quotes(text) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl<T: fmt::Display> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            return f.write_str(EMPTY_RANGE);
        }
        f.write_str(if self.lower_inclusive { "[" } else { "(" })?;
        if let Some(lower) = &self.lower {
            f.write_str(&quote_bound(&lower.to_string()))?;
        }
        f.write_str(",")?;
        if let Some(upper) = &self.upper {
            f.write_str(&quote_bound(&upper.to_string()))?;
        }
        f.write_str(if self.upper_inclusive { "]" } else { ")" })
    }
}

impl<T: RangeSubtype> PgType for Range<T> {
    type Config = ();

    fn type_name() -> &'static str {
        T::RANGE_NAME
    }

    fn type_oid() -> Option<u32> {
        Some(T::RANGE_OID)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        if trimmed == EMPTY_RANGE {
            return ParseOutcome::Valid(Self::empty());
        }
        let mut chars = trimmed.chars();
        let (Some(open), Some(close)) = (chars.next(), chars.next_back()) else {
            return ctx.report(Issue::invalid_string(T::RANGE_NAME, text));
        };
        let lower_inclusive = match open {
            '[' => true,
            '(' => false,
            _ => return ctx.report(Issue::invalid_string(T::RANGE_NAME, text)),
        };
        let upper_inclusive = match close {
            ']' => true,
            ')' => false,
            _ => return ctx.report(Issue::invalid_string(T::RANGE_NAME, text)),
        };
        let body = chars.as_str();
        if body.trim() == EMPTY_RANGE {
            return ParseOutcome::Valid(Self::empty());
        }
        let Some((lower_text, upper_text)) = split_bounds(body) else {
            return ctx.report(Issue::invalid_string(T::RANGE_NAME, text));
        };

        let lower = match unescape_bound(lower_text) {
            Some(bound) => Some(try_valid!(Self::decode_bound(&bound, ctx))),
            None => None,
        };
        let upper = match unescape_bound(upper_text) {
            Some(bound) => Some(try_valid!(Self::decode_bound(&bound, ctx))),
            None => None,
        };
        Self::checked(lower, upper, lower_inclusive, upper_inclusive, ctx)
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(
            object,
            &["empty"],
            &["lower", "upper", "lower_inclusive", "upper_inclusive"],
            ctx
        ));
        if try_valid!(fields.boolean("empty", ctx)) {
            return ParseOutcome::Valid(Self::empty());
        }
        let bound = |key: &str, ctx: &mut ParseContext| match fields.get(key) {
            None | Some(Value::Null) => ParseOutcome::Valid(None),
            Some(raw) => T::decode(raw, &(), ctx).map(Some),
        };
        let lower = try_valid!(bound("lower", ctx));
        let upper = try_valid!(bound("upper", ctx));
        let flag = |key: &str, ctx: &mut ParseContext| match fields.get(key) {
            None => ParseOutcome::Valid(false),
            Some(_) => fields.boolean(key, ctx),
        };
        let lower_inclusive = try_valid!(flag("lower_inclusive", ctx));
        let upper_inclusive = try_valid!(flag("upper_inclusive", ctx));
        Self::checked(lower, upper, lower_inclusive, upper_inclusive, ctx)
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        if self.empty {
            return json!({ "empty": true });
        }
        json!({
            "empty": false,
            "lower": self.lower.as_ref().map(PgType::to_json),
            "upper": self.upper.as_ref().map(PgType::to_json),
            "lower_inclusive": self.lower_inclusive,
            "upper_inclusive": self.upper_inclusive,
        })
    }

    fn guard(value: &PgValue) -> Option<&Self> {
        T::guard_range(value)
    }

    fn into_pg_value(self) -> PgValue {
        T::wrap_range(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateRange, Int4, Int4Range, NumRange, TsTzRange};
    use pgtext_diagnostics::IssueCode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("[1,10)", "[1,10)")]
    #[case("(1,10]", "(1,10]")]
    #[case("[ 1 , 10 ]", "[1,10]")]
    #[case("(,5)", "(,5)")]
    #[case("[,5)", "[,5)")]
    #[case("(5,)", "(5,)")]
    #[case("(,)", "(,)")]
    #[case("empty", "empty")]
    #[case("[empty]", "empty")]
    #[case("[\"1\",\"2\"]", "[1,2]")]
    fn test_int4range_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Int4Range::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("EMPTY", IssueCode::InvalidString)]
    #[case("1,10", IssueCode::InvalidString)]
    #[case("[1;10]", IssueCode::InvalidString)]
    #[case("[a,10]", IssueCode::InvalidString)]
    #[case("[1,99999999999]", IssueCode::TooBig)]
    #[case("[10,1]", IssueCode::InvalidRangeBound)]
    fn test_int4range_rejects(#[case] input: &str, #[case] code: IssueCode) {
        assert_eq!(Int4Range::safe_parse(input).unwrap_err().code, code);
    }

    #[test]
    fn test_containment() {
        let range = Int4Range::parse("[1,10)").unwrap();
        assert!(range.is_within_range(1).unwrap());
        assert!(range.is_within_range("5").unwrap());
        assert!(!range.is_within_range(10).unwrap());
        assert!(!range.is_within_range(0).unwrap());

        let empty = Int4Range::parse("empty").unwrap();
        assert!(!empty.is_within_range(1).unwrap());

        let unbounded = Int4Range::parse("(,)").unwrap();
        assert!(unbounded.is_within_range(i32::MIN).unwrap());

        assert_eq!(
            range.safe_is_within_range("x").unwrap_err().code,
            IssueCode::InvalidString
        );
    }

    #[test]
    fn test_inverted_bounds_message() {
        let err = Int4Range::safe_parse("[10,1]").unwrap_err();
        assert_eq!(
            err.issue,
            Issue::InvalidRangeBound {
                lower: "10".into(),
                upper: "1".into()
            }
        );
    }

    #[test]
    fn test_numrange_compares_exactly() {
        assert!(NumRange::parse("[1.5,1.50]").is_ok());
        let r = NumRange::parse("(0.1,0.2]").unwrap();
        assert!(r.is_within_range("0.2").unwrap());
        assert!(!r.is_within_range("0.1").unwrap());
    }

    #[test]
    fn test_quoted_timestamp_bounds() {
        let r = TsTzRange::parse(r#"["2023-01-01 00:00:00+00","2023-01-02 00:00:00+00")"#).unwrap();
        assert_eq!(
            r.to_string(),
            "[2023-01-01T00:00:00+00:00,2023-01-02T00:00:00+00:00)"
        );
        assert!(r.is_within_range("2023-01-01T12:00:00+09:00").unwrap());
        assert!(!r.is_within_range("2023-01-02T09:00:00+09:00").unwrap());
    }

    #[test]
    fn test_infinite_date_bounds() {
        let r = DateRange::parse("[-infinity,2020-01-01)").unwrap();
        assert!(r.is_within_range("1900-01-01").unwrap());
        assert!(!r.is_within_range("infinity").unwrap());
    }

    #[test]
    fn test_structural_round_trip() {
        let r = Int4Range::parse("(,5]").unwrap();
        let json = r.to_json();
        assert_eq!(
            json,
            json!({
                "empty": false,
                "lower": null,
                "upper": { "value": "5" },
                "lower_inclusive": false,
                "upper_inclusive": true,
            })
        );
        assert_eq!(Int4Range::parse(json).unwrap(), r);
        assert_eq!(
            Int4Range::parse(json!({ "empty": true })).unwrap(),
            Int4Range::empty()
        );
    }

    #[test]
    fn test_new_checks_order() {
        let one = Int4::parse(1).unwrap();
        let two = Int4::parse(2).unwrap();
        assert!(Range::new(Some(one), Some(two), true, false).is_ok());
        assert_eq!(
            Range::new(Some(two), Some(one), true, false).unwrap_err().code,
            IssueCode::InvalidRangeBound
        );
    }

    #[test]
    fn test_quote_bound() {
        assert_eq!(quote_bound("plain"), "plain");
        assert_eq!(quote_bound("a b"), "\"a b\"");
        assert_eq!(quote_bound("x\"y"), "\"x\\\"y\"");
        assert_eq!(quote_bound(""), "\"\"");
    }
}
