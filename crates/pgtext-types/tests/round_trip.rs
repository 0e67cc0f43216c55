//! Round-trip tests for every value type
//!
//! Tests that:
//! - Parsing a value's own text form yields an equal value with the same text
//! - Rebuilding a value from its structural form yields an equal value
//! - Numeric domains accept their limits and reject one step past them

use pgtext_diagnostics::IssueCode;
use pgtext_types::{
    Bit, BitVarying, Boolean, Character, CharacterVarying, Circle, Date, DateMultiRange, DateRange,
    Float4, Float8, Int2, Int4, Int4MultiRange, Int4Range, Int8, Int8Range, Interval, Json, Jsonb,
    Line, LineSegment, Money, Name, NumMultiRange, NumRange, Numeric, Oid, Path, PgBox, PgType,
    Point, Polygon, Text, Time, TimeTZ, Timestamp, TimestampTZ, TsMultiRange, TsRange, TsTzRange,
    Uuid,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn assert_round_trip<T: PgType>(input: &str) {
    let first = T::parse(input).unwrap();
    let text = first.to_string();
    let second = T::parse(text.as_str()).unwrap();
    assert_eq!(second, first, "text round trip of {:?} via {:?}", input, text);
    assert_eq!(second.to_string(), text);

    let structure = first.to_json();
    let rebuilt = T::parse(structure.clone()).unwrap();
    assert_eq!(rebuilt, first, "structural round trip of {:?} via {}", input, structure);
}

// === Numeric ===

#[rstest]
#[case("0")]
#[case("-32768")]
#[case("32767")]
fn test_int2_round_trip(#[case] input: &str) {
    assert_round_trip::<Int2>(input);
}

#[rstest]
#[case("2147483647")]
#[case("-2147483648")]
#[case("1e3")]
fn test_int4_round_trip(#[case] input: &str) {
    assert_round_trip::<Int4>(input);
}

#[rstest]
#[case("9223372036854775807")]
#[case("-9223372036854775808")]
fn test_int8_round_trip(#[case] input: &str) {
    assert_round_trip::<Int8>(input);
}

#[rstest]
#[case("0")]
#[case("4294967295")]
fn test_oid_round_trip(#[case] input: &str) {
    assert_round_trip::<Oid>(input);
}

#[rstest]
#[case("1.5")]
#[case("1e20")]
#[case("0.00001")]
#[case("-Infinity")]
#[case("NaN")]
fn test_float_round_trip(#[case] input: &str) {
    assert_round_trip::<Float4>(input);
    assert_round_trip::<Float8>(input);
}

#[rstest]
#[case("0")]
#[case("1.50")]
#[case("-123456789012345678901234567890.000001")]
#[case("NaN")]
#[case("Infinity")]
fn test_numeric_round_trip(#[case] input: &str) {
    assert_round_trip::<Numeric>(input);
}

#[rstest]
#[case("$1,234.56")]
#[case("-$0.01")]
#[case("92233720368547758.07")]
fn test_money_round_trip(#[case] input: &str) {
    assert_round_trip::<Money>(input);
}

// === Character and bit strings ===

#[rstest]
#[case("hello world")]
#[case("")]
#[case("ünïcödé")]
fn test_character_round_trip(#[case] input: &str) {
    assert_round_trip::<Text>(input);
    assert_round_trip::<CharacterVarying>(input);
    assert_round_trip::<Character>(input);
    assert_round_trip::<Name>(input);
}

#[rstest]
#[case("1010")]
#[case("")]
#[case("X1F")]
fn test_bit_round_trip(#[case] input: &str) {
    assert_round_trip::<Bit>(input);
    assert_round_trip::<BitVarying>(input);
}

#[rstest]
#[case("t")]
#[case("off")]
fn test_boolean_round_trip(#[case] input: &str) {
    assert_round_trip::<Boolean>(input);
}

// === Temporal ===

#[rstest]
#[case("2023-01-31")]
#[case("0001-01-01")]
#[case("infinity")]
#[case("-infinity")]
fn test_date_round_trip(#[case] input: &str) {
    assert_round_trip::<Date>(input);
}

#[rstest]
#[case("00:00:00")]
#[case("23:59:59.999999")]
#[case("24:00:00")]
fn test_time_round_trip(#[case] input: &str) {
    assert_round_trip::<Time>(input);
}

#[rstest]
#[case("12:00:00+09")]
#[case("08:15:30.5-03:30")]
fn test_timetz_round_trip(#[case] input: &str) {
    assert_round_trip::<TimeTZ>(input);
}

#[rstest]
#[case("2023-01-01 10:00:00.123")]
#[case("infinity")]
fn test_timestamp_round_trip(#[case] input: &str) {
    assert_round_trip::<Timestamp>(input);
}

#[rstest]
#[case("2023-01-01T00:00:00+09:00")]
#[case("2023-07-01 12:00:00 Europe/Berlin")]
#[case("-infinity")]
fn test_timestamptz_round_trip(#[case] input: &str) {
    assert_round_trip::<TimestampTZ>(input);
}

#[rstest]
#[case("1 year 2 mons 3 days 04:05:06")]
#[case("P1Y2M3DT4H5M6S")]
#[case("@ 3 days ago")]
#[case("90 minutes")]
#[case("0")]
fn test_interval_round_trip(#[case] input: &str) {
    assert_round_trip::<Interval>(input);
}

// === Geometric ===

#[rstest]
#[case::point("(1.5,-2)")]
fn test_point_round_trip(#[case] input: &str) {
    assert_round_trip::<Point>(input);
}

#[test]
fn test_geometry_round_trip() {
    assert_round_trip::<Line>("{1,-1,0}");
    assert_round_trip::<LineSegment>("[(0,0),(1,1)]");
    assert_round_trip::<PgBox>("(0,0),(2,3)");
    assert_round_trip::<Circle>("<(1,1),5>");
    assert_round_trip::<Path>("[(0,0),(1,1),(2,0)]");
    assert_round_trip::<Path>("((0,0),(1,1),(2,0))");
    assert_round_trip::<Polygon>("((0,0),(1,1),(1,0))");
}

#[rstest]
#[case::point_infinity("(Infinity,1)")]
#[case::point_negative("(-Infinity,-Infinity)")]
fn test_non_finite_point_round_trip(#[case] input: &str) {
    assert_round_trip::<Point>(input);
}

#[test]
fn test_non_finite_geometry_round_trip() {
    assert_round_trip::<Circle>("<(Infinity,0),Infinity>");
    assert_round_trip::<Line>("{1,0,-Infinity}");
    assert_round_trip::<LineSegment>("[(0,0),(Infinity,1)]");
    assert_round_trip::<PgBox>("(Infinity,1),(0,0)");
    assert_round_trip::<Path>("[(0,0),(-Infinity,1)]");
    assert_round_trip::<Polygon>("((0,0),(Infinity,1),(1,0))");

    // NaN never equals itself, so compare the text forms
    let point = Point::parse("(NaN,1)").unwrap();
    let rebuilt = Point::parse(point.to_json()).unwrap();
    assert_eq!(rebuilt.to_string(), "(NaN,1)");
}

// === Other scalars ===

#[test]
fn test_uuid_and_json_round_trip() {
    assert_round_trip::<Uuid>("A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11");
    assert_round_trip::<Json>(r#"{"b": [1, 2], "a": null}"#);
    assert_round_trip::<Jsonb>(r#"{"bb":1,"a":{"z":[true]}}"#);
}

// === Ranges and multiranges ===

#[test]
fn test_range_round_trip() {
    assert_round_trip::<Int4Range>("[1,10)");
    assert_round_trip::<Int4Range>("empty");
    assert_round_trip::<Int8Range>("(,0]");
    assert_round_trip::<NumRange>("(0.5,1.25)");
    assert_round_trip::<DateRange>("[2020-01-01,infinity)");
    assert_round_trip::<TsRange>(r#"["2020-01-01 00:00","2020-01-02 00:00")"#);
    assert_round_trip::<TsTzRange>("[2020-01-01T00:00:00+09:00,)");
}

#[test]
fn test_multirange_round_trip() {
    assert_round_trip::<Int4MultiRange>("{[1,3),[5,8)}");
    assert_round_trip::<Int4MultiRange>("{}");
    assert_round_trip::<NumMultiRange>("{(,0),[1.5,2.5]}");
    assert_round_trip::<DateMultiRange>("{[2020-01-01,2020-02-01)}");
    assert_round_trip::<TsMultiRange>("{[2020-01-01T00:00:00,2020-01-02T00:00:00)}");
}

// === Bound enforcement ===

#[rstest]
#[case::int2("-32768", "32767", "-32769", "32768")]
#[case::int4("-2147483648", "2147483647", "-2147483649", "2147483648")]
#[case::int8(
    "-9223372036854775808",
    "9223372036854775807",
    "-9223372036854775809",
    "9223372036854775808"
)]
#[case::oid("0", "4294967295", "-1", "4294967296")]
#[case::money(
    "-92233720368547758.08",
    "92233720368547758.07",
    "-92233720368547758.09",
    "92233720368547758.08"
)]
fn test_domain_limits(#[case] min: &str, #[case] max: &str, #[case] below: &str, #[case] above: &str) {
    fn check<T: PgType>(min: &str, max: &str, below: &str, above: &str) {
        assert!(T::safe_parse(min).is_ok(), "{} accepts {}", T::type_name(), min);
        assert!(T::safe_parse(max).is_ok(), "{} accepts {}", T::type_name(), max);
        assert_eq!(T::safe_parse(below).unwrap_err().code, IssueCode::TooSmall);
        assert_eq!(T::safe_parse(above).unwrap_err().code, IssueCode::TooBig);
    }

    match min {
        "-32768" => check::<Int2>(min, max, below, above),
        "-2147483648" => check::<Int4>(min, max, below, above),
        "-9223372036854775808" => check::<Int8>(min, max, below, above),
        "0" => check::<Oid>(min, max, below, above),
        _ => check::<Money>(min, max, below, above),
    }
}
