//! Codec-level behaviour tests
//!
//! Tests the observable contract a driver relies on:
//! - Array nesting, NULL handling and malformed literals
//! - Range containment and bound ordering
//! - Offset-aware temporal equality
//! - Parser adapter nullability
//! - Safe and throwing surfaces agreeing

use pgtext::{
    ArrayCodec, ArrayElement, Codec, CodecError, Int4, Int4Range, Interval, IssueCode, Parsed,
    Parser, PgType, RawElement, Text, TimestampTZ, TypeRegistry, parse_array_literal,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

// === Arrays ===

#[test]
fn test_nested_array_literal() {
    let text = |s: &str| RawElement::Text(s.to_string());
    assert_eq!(
        parse_array_literal("{{1,2},{3,4}}", ','),
        Some(vec![
            RawElement::Array(vec![text("1"), text("2")]),
            RawElement::Array(vec![text("3"), text("4")]),
        ])
    );
    let array = ArrayCodec::<Int4>::default().parse("{{1,2},{3,4}}").unwrap();
    assert_eq!(array.dimensions(), vec![2, 2]);
}

#[test]
fn test_unbalanced_array_fails_quietly() {
    assert_eq!(parse_array_literal("{1,2", ','), None);
    let err = ArrayCodec::<Int4>::default().safe_parse("{1,2").unwrap_err();
    assert_eq!(err.code, IssueCode::InvalidString);
}

#[test]
fn test_null_token_versus_quoted_text() {
    let bare = ArrayCodec::<Text>::default().parse("{1,NULL,3}").unwrap();
    let quoted = ArrayCodec::<Text>::default().parse("{1,\"NULL\",3}").unwrap();
    assert_eq!(bare.elements()[1], ArrayElement::Null);
    assert_eq!(quoted.elements()[1], ArrayElement::Value(Text::parse("NULL").unwrap()));
    assert_ne!(bare, quoted);
    assert_eq!(bare.to_json(), json!([{"value": "1"}, null, {"value": "3"}]));
}

#[rstest]
#[case::open_braces("{".repeat(200_000))]
#[case::balanced(format!("{}{}", "{".repeat(50_000), "}".repeat(50_000)))]
#[case::seven_levels(format!("{}1{}", "{".repeat(7), "}".repeat(7)))]
fn test_deep_nesting_fails_quietly(#[case] literal: String) {
    let err = ArrayCodec::<Int4>::default().safe_parse(literal.as_str()).unwrap_err();
    assert_eq!(err.code, IssueCode::InvalidString);
    let registry = TypeRegistry::builtin();
    let parser = registry.by_name("int4[]").unwrap();
    assert!(parser.is_valid(Some(&Value::String(literal))).is_err());
}

#[test]
fn test_quoted_braces_do_not_nest() {
    let literal = format!("{{{}}}", vec!["\"{{\""; 10_000].join(","));
    let array = ArrayCodec::<Text>::default().parse(literal.as_str()).unwrap();
    assert_eq!(array.dimensions(), vec![10_000]);
}

// === Ranges ===

#[rstest]
#[case(json!(1), true)]
#[case(json!(5), true)]
#[case(json!("9"), true)]
#[case(json!(10), false)]
#[case(json!(0), false)]
fn test_half_open_containment(#[case] candidate: Value, #[case] expected: bool) {
    let range = Int4Range::parse("[1,10)").unwrap();
    assert_eq!(range.is_within_range(candidate).unwrap(), expected);
}

#[test]
fn test_empty_range_contains_nothing() {
    let empty = Int4Range::parse("empty").unwrap();
    for candidate in [i32::MIN, -1, 0, 1, i32::MAX] {
        assert!(!empty.is_within_range(candidate).unwrap());
    }
}

#[test]
fn test_inverted_range_is_never_built() {
    let err = Int4Range::safe_parse("[10,1]").unwrap_err();
    assert_eq!(err.code, IssueCode::InvalidRangeBound);
    assert!(matches!(
        Int4Range::parse("[10,1]"),
        Err(CodecError::Validation(d)) if d.code == IssueCode::InvalidRangeBound
    ));
}

// === Temporal ===

#[test]
fn test_same_instant_different_offsets() {
    let utc = TimestampTZ::parse("2023-01-01T00:00:00+00:00").unwrap();
    let tokyo = TimestampTZ::parse("2023-01-01T09:00:00+09:00").unwrap();
    assert_eq!(utc, tokyo);
    assert!(utc.equals("2023-01-01T09:00:00+09:00").unwrap());
    assert_ne!(utc.to_string(), tokyo.to_string());

    let eq = utc.safe_equals("2022-12-31T19:00:00-05:00").unwrap();
    assert!(eq.equals);
    assert_eq!(eq.data.to_string(), "2022-12-31T19:00:00-05:00");
}

// === Parser adapter ===

#[test]
fn test_adapter_nullability() {
    let strict = Parser::of::<Int4>();
    assert_eq!(strict.is_valid(Some(&Value::Null)).unwrap_err().code, IssueCode::InvalidType);

    let nullable = Parser::of::<Int4>().nullable();
    assert_eq!(nullable.is_valid(Some(&Value::Null)), Ok(Parsed::Null));

    for parser in [
        Parser::of::<Int4>().array(),
        Parser::of::<Int4>().array().nullable(),
        Parser::of::<Int4>().array().optional(),
    ] {
        assert!(parser.is_valid(Some(&json!([1, null]))).is_err());
        assert!(parser.is_valid(Some(&json!([1, 2]))).is_ok());
    }
}

#[rstest]
#[case(json!(["x", null]), IssueCode::InvalidString)]
#[case(json!(["1", "99999999999", null]), IssueCode::TooBig)]
#[case(json!(["1", null, "x"]), IssueCode::InvalidType)]
#[case(json!(["x", [1]]), IssueCode::InvalidString)]
#[case(json!("{1,x,NULL}"), IssueCode::InvalidString)]
fn test_array_adapter_reports_first_element_in_order(#[case] raw: Value, #[case] expected: IssueCode) {
    for parser in [
        Parser::of::<Int4>().array(),
        Parser::of::<Int4>().array().nullable().optional(),
    ] {
        assert_eq!(parser.is_valid(Some(&raw)).unwrap_err().code, expected);
    }
}

#[test]
fn test_registry_round_trip_by_oid() {
    let registry = TypeRegistry::builtin();
    let codec = Codec::new();
    let parser = registry.by_oid(3904).unwrap();
    let Ok(Parsed::Value(value)) = codec.is_valid(parser, Some(&json!("[1,5)"))) else {
        panic!("int4range should validate");
    };
    assert_eq!(value.to_string(), "[1,5)");
    assert_eq!(value.type_oid(), Some(3904));
}

// === Interval overflow ===

#[rstest]
#[case("-9223372036854775808 months ago")]
#[case("-9223372036854775808 days ago")]
#[case("9223372036854775807 months 1 month")]
fn test_interval_overflow_is_rejected(#[case] input: &str) {
    assert_eq!(Interval::safe_parse(input).unwrap_err().code, IssueCode::InvalidString);
    assert!(Interval::parse(input).is_err());
}

// === Safe and throwing surfaces ===

#[rstest]
#[case(json!("12"))]
#[case(json!("x"))]
#[case(json!(3_000_000_000_i64))]
#[case(json!(null))]
#[case(json!({"value": "7"}))]
#[case(json!({"value": "7", "extra": 1}))]
fn test_parse_matches_safe_parse(#[case] raw: Value) {
    let safe = Int4::safe_parse(raw.clone());
    let throwing = Int4::parse(raw);
    match (safe, throwing) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(d), Err(e)) => assert_eq!(Some(d.code), e.code()),
        (safe, throwing) => panic!("surfaces disagree: {:?} vs {:?}", safe, throwing),
    }
}

#[test]
fn test_structural_key_checks() {
    assert_eq!(
        Int4::safe_parse(json!({})).unwrap_err().code,
        IssueCode::MissingKeys
    );
    assert_eq!(
        Int4::safe_parse(json!({"value": "7", "extra": 1})).unwrap_err().code,
        IssueCode::UnrecognizedKeys
    );
}
