//! Generic multirange type
//!
//! A multirange is an ordered list of ranges over one subtype, written
//! `{[1,3),[5,8)}`. Member ranges are kept as written; they are not merged
//! or sorted.

use crate::range::{Range, RangeSubtype};
use crate::structure::expect_keys;
use crate::{Factory, PgType, PgValue};
use pgtext_diagnostics::{
    CodecError, Issue, ParseContext, ParseOutcome, SafeResult, received_kind, try_valid,
};
use serde_json::{Map, Value, json};
use std::fmt;

#[derive(Debug, Clone)]
pub struct MultiRange<T>(Vec<Range<T>>);

impl<T> MultiRange<T> {
    pub fn ranges(&self) -> &[Range<T>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> From<Vec<Range<T>>> for MultiRange<T> {
    fn from(ranges: Vec<Range<T>>) -> Self {
        Self(ranges)
    }
}

impl<T: PartialEq> PartialEq for MultiRange<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: RangeSubtype> MultiRange<T> {
    /// Check whether any member range contains the value
    pub fn contains(&self, candidate: &T) -> bool {
        self.0.iter().any(|range| range.contains(candidate))
    }

    pub fn safe_is_within_range(&self, raw: impl Into<Value>) -> SafeResult<bool> {
        Factory::<T>::default()
            .safe_parse(raw)
            .map(|candidate| self.contains(&candidate))
    }

    pub fn is_within_range(&self, raw: impl Into<Value>) -> Result<bool, CodecError> {
        self.safe_is_within_range(raw).map_err(CodecError::from)
    }
}

/// Split the body of `{...}` into member range texts
///
/// Commas separate members only outside brackets and quotes. Returns `None`
/// when brackets or quotes do not balance.
fn split_members(body: &str) -> Option<Vec<&str>> {
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' | '(' if !in_quotes => depth += 1,
            ']' | ')' if !in_quotes => depth = depth.checked_sub(1)?,
            ',' if !in_quotes && depth == 0 => {
                members.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || in_quotes {
        return None;
    }
    members.push(&body[start..]);
    Some(members)
}

impl<T: fmt::Display> fmt::Display for MultiRange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, range) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", range)?;
        }
        f.write_str("}")
    }
}

impl<T: RangeSubtype> PgType for MultiRange<T> {
    type Config = ();

    fn type_name() -> &'static str {
        T::MULTIRANGE_NAME
    }

    fn type_oid() -> Option<u32> {
        Some(T::MULTIRANGE_OID)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let Some(body) = text
            .trim()
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        else {
            return ctx.report(Issue::invalid_string(T::MULTIRANGE_NAME, text));
        };
        if body.trim().is_empty() {
            return ParseOutcome::Valid(Self(Vec::new()));
        }
        let Some(members) = split_members(body) else {
            return ctx.report(Issue::invalid_string(T::MULTIRANGE_NAME, text));
        };
        let mut ranges = Vec::with_capacity(members.len());
        for member in members {
            if member.trim().is_empty() {
                return ctx.report(Issue::invalid_string(T::MULTIRANGE_NAME, text));
            }
            ranges.push(try_valid!(Range::<T>::decode_text(member, &(), ctx)));
        }
        ParseOutcome::Valid(Self(ranges))
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let fields = try_valid!(expect_keys(object, &["ranges"], &[], ctx));
        let items = try_valid!(fields.array("ranges", ctx));
        let mut ranges = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(_) | Value::Object(_) => {
                    ranges.push(try_valid!(Range::<T>::decode(item, &(), ctx)));
                }
                other => {
                    return ctx.report(Issue::invalid_type(T::RANGE_NAME, received_kind(other)));
                }
            }
        }
        ParseOutcome::Valid(Self(ranges))
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        let ranges: Vec<Value> = self.0.iter().map(PgType::to_json).collect();
        json!({ "ranges": ranges })
    }

    fn guard(value: &PgValue) -> Option<&Self> {
        T::guard_multirange(value)
    }

    fn into_pg_value(self) -> PgValue {
        T::wrap_multirange(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateMultiRange, Int4MultiRange, TsMultiRange};
    use pgtext_diagnostics::IssueCode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("{}", "{}")]
    #[case(" { } ", "{}")]
    #[case("{[1,3),[5,8)}", "{[1,3),[5,8)}")]
    #[case("{ [1,3) , (,0] }", "{[1,3),(,0]}")]
    #[case("{empty,[1,2]}", "{empty,[1,2]}")]
    fn test_int4multirange_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Int4MultiRange::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("[1,3)")]
    #[case("{[1,3)")]
    #[case("{[1,3),}")]
    #[case("{[1,3)(5,6)}")]
    #[case("{[1,3),[5,6}")]
    fn test_int4multirange_rejects(#[case] input: &str) {
        assert_eq!(
            Int4MultiRange::safe_parse(input).unwrap_err().code,
            IssueCode::InvalidString
        );
    }

    #[test]
    fn test_member_error_propagates() {
        let err = Int4MultiRange::safe_parse("{[1,3),[9,4)}").unwrap_err();
        assert_eq!(err.code, IssueCode::InvalidRangeBound);
    }

    #[test]
    fn test_containment_is_any_member() {
        let m = Int4MultiRange::parse("{[1,3),[5,8)}").unwrap();
        assert!(m.is_within_range(2).unwrap());
        assert!(m.is_within_range(5).unwrap());
        assert!(!m.is_within_range(3).unwrap());
        assert!(!m.is_within_range(8).unwrap());
        assert!(!Int4MultiRange::parse("{}").unwrap().is_within_range(0).unwrap());
    }

    #[test]
    fn test_quoted_members() {
        let m = TsMultiRange::parse(r#"{["2020-01-01 00:00","2020-01-02 00:00"),("2021-01-01 00:00",)}"#)
            .unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.is_within_range("2022-06-01T00:00:00").unwrap());
        assert!(!m.is_within_range("2020-01-02T00:00:00").unwrap());
    }

    #[test]
    fn test_structural_round_trip() {
        let m = DateMultiRange::parse("{[2020-01-01,2020-02-01),empty}").unwrap();
        let json = m.to_json();
        assert_eq!(json["ranges"].as_array().map(Vec::len), Some(2));
        assert_eq!(DateMultiRange::parse(json).unwrap(), m);
        assert_eq!(
            Int4MultiRange::parse(json!({ "ranges": ["[1,2)"] })).unwrap().to_string(),
            "{[1,2)}"
        );
        assert_eq!(
            Int4MultiRange::safe_parse(json!({ "ranges": [1] })).unwrap_err().code,
            IssueCode::InvalidType
        );
    }
}
