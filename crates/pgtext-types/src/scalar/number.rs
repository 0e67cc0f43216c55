//! Integer, floating point, numeric and oid types

use crate::numeric::{ExactDecimal, NumberDomain, ParsedNumber};
use crate::PgType;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome, try_valid};
use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Integers
// ============================================================================

macro_rules! integer_type {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty), $pg:literal, $oid:expr, $min:literal, $max:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($inner);

        impl $name {
            pub const MIN: &'static str = $min;
            pub const MAX: &'static str = $max;

            const DOMAIN: NumberDomain = NumberDomain {
                name: $pg,
                minimum: Some($min),
                maximum: Some($max),
                allow_infinity: false,
                allow_nan: false,
                whole: true,
            };

            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PgType for $name {
            type Config = ();
            const ACCEPTS_NUMBERS: bool = true;

            fn type_name() -> &'static str {
                $pg
            }

            fn type_oid() -> Option<u32> {
                Some($oid)
            }

            fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
                let parsed = try_valid!(Self::DOMAIN.parse(text, ctx));
                let narrowed = match &parsed {
                    ParsedNumber::Finite { value, .. } => {
                        value.to_i64().and_then(|n| <$inner>::try_from(n).ok())
                    }
                    _ => None,
                };
                match narrowed {
                    Some(n) => ParseOutcome::Valid(Self(n)),
                    None => ctx.report(Issue::invalid_string($pg, text)),
                }
            }

            fn config(&self) {}

            crate::value_glue!($name);
        }
    };
}

integer_type!(
    /// `int2` / `smallint`
    Int2(i16), "int2", 21, "-32768", "32767"
);
integer_type!(
    /// `int4` / `integer`
    Int4(i32), "int4", 23, "-2147483648", "2147483647"
);
integer_type!(
    /// `int8` / `bigint`
    Int8(i64), "int8", 20, "-9223372036854775808", "9223372036854775807"
);
integer_type!(
    /// `oid`, an unsigned 32-bit object identifier
    Oid(u32), "oid", 26, "0", "4294967295"
);

// ============================================================================
// Floating point
// ============================================================================

/// Render a float the way PostgreSQL does with shortest-exact output
///
/// Scientific notation is used when the decimal exponent is below -4 or at
/// least `precision` (15 for `float8`, 6 for `float4`).
fn pg_float_text(scientific: String, plain: String, precision: i32) -> String {
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return plain;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= precision {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        plain
    }
}

pub(crate) fn format_float8(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        pg_float_text(format!("{:e}", value), format!("{}", value), 15)
    }
}

fn format_float4(value: f32) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        pg_float_text(format!("{:e}", value), format!("{}", value), 6)
    }
}

/// PostgreSQL float ordering: NaN equals itself and sorts above everything
fn pg_float_cmp(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn parsed_to_f64(parsed: &ParsedNumber) -> f64 {
    match parsed {
        ParsedNumber::Finite { value, .. } => value.to_f64(),
        ParsedNumber::Infinity => f64::INFINITY,
        ParsedNumber::NegativeInfinity => f64::NEG_INFINITY,
        ParsedNumber::NaN => f64::NAN,
    }
}

macro_rules! float_type {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty), $pg:literal, $oid:expr, $limit:literal, $tiny:literal, $format:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name($inner);

        impl $name {
            const DOMAIN: NumberDomain = NumberDomain {
                name: $pg,
                minimum: Some(concat!("-", $limit)),
                maximum: Some($limit),
                allow_infinity: true,
                allow_nan: true,
                whole: false,
            };

            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                pg_float_cmp(self.0 as f64, other.0 as f64) == Ordering::Equal
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(pg_float_cmp(self.0 as f64, other.0 as f64))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&$format(self.0))
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PgType for $name {
            type Config = ();
            const ACCEPTS_NUMBERS: bool = true;

            fn type_name() -> &'static str {
                $pg
            }

            fn type_oid() -> Option<u32> {
                Some($oid)
            }

            fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
                let parsed = try_valid!(Self::DOMAIN.parse(text, ctx));
                let value = parsed_to_f64(&parsed) as $inner;
                // Underflow to zero is out of range; the bound is a magnitude
                if value == 0.0 && matches!(&parsed, ParsedNumber::Finite { value: exact, .. } if !exact.is_zero()) {
                    return ctx.report(Issue::number_too_small($tiny, true));
                }
                ParseOutcome::Valid(Self(value))
            }

            fn config(&self) {}

            crate::value_glue!($name);
        }
    };
}

float_type!(
    /// `float4` / `real`
    Float4(f32), "float4", 700, "3.4028234663852886e38", "1.401298464324817e-45", format_float4
);
float_type!(
    /// `float8` / `double precision`
    Float8(f64), "float8", 701, "1.7976931348623157e308", "4.9406564584124654e-324", format_float8
);

// ============================================================================
// Numeric
// ============================================================================

/// Largest number of digits before the decimal point
pub const NUMERIC_MAX_INTEGER_DIGITS: u64 = 131_072;
/// Largest number of digits after the decimal point
pub const NUMERIC_MAX_SCALE: u64 = 16_383;

const NUMERIC_DOMAIN: NumberDomain = NumberDomain {
    name: "numeric",
    minimum: None,
    maximum: None,
    allow_infinity: true,
    allow_nan: true,
    whole: false,
};

/// `numeric` / `decimal`, an exact decimal that keeps its written scale
///
/// `1.50` prints back as `1.50` but compares equal to `1.5`.
#[derive(Debug, Clone)]
pub struct Numeric(ParsedNumber);

impl Numeric {
    pub fn is_nan(&self) -> bool {
        matches!(self.0, ParsedNumber::NaN)
    }

    pub fn is_finite(&self) -> bool {
        matches!(self.0, ParsedNumber::Finite { .. })
    }

    /// The exact value, when finite
    pub fn decimal(&self) -> Option<&ExactDecimal> {
        match &self.0 {
            ParsedNumber::Finite { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Display scale (digits after the decimal point)
    pub fn scale(&self) -> u64 {
        match &self.0 {
            ParsedNumber::Finite { scale, .. } => *scale,
            _ => 0,
        }
    }

    fn rank(&self) -> u8 {
        match self.0 {
            ParsedNumber::NegativeInfinity => 0,
            ParsedNumber::Finite { .. } => 1,
            ParsedNumber::Infinity => 2,
            ParsedNumber::NaN => 3,
        }
    }
}

impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.decimal(), other.decimal()) {
            (Some(a), Some(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Numeric {}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            ParsedNumber::Finite { value, scale } => f.write_str(&value.to_plain_string(*scale)),
            ParsedNumber::Infinity => f.write_str("Infinity"),
            ParsedNumber::NegativeInfinity => f.write_str("-Infinity"),
            ParsedNumber::NaN => f.write_str("NaN"),
        }
    }
}

impl PgType for Numeric {
    type Config = ();
    const ACCEPTS_NUMBERS: bool = true;

    fn type_name() -> &'static str {
        "numeric"
    }

    fn type_oid() -> Option<u32> {
        Some(1700)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let parsed = try_valid!(NUMERIC_DOMAIN.parse(text, ctx));
        if let ParsedNumber::Finite { value, scale } = &parsed {
            if value.integer_digits() > NUMERIC_MAX_INTEGER_DIGITS || *scale > NUMERIC_MAX_SCALE {
                return ctx.report(Issue::invalid_string("numeric", text));
            }
        }
        ParseOutcome::Valid(Self(parsed))
    }

    fn config(&self) {}

    crate::value_glue!(Numeric);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtext_diagnostics::IssueCode;
    use rstest::rstest;

    #[rstest]
    #[case("-32768", -32768)]
    #[case(" 42 ", 42)]
    #[case("1e3", 1000)]
    #[case("32767", 32767)]
    fn test_int2_accepts(#[case] text: &str, #[case] expected: i16) {
        assert_eq!(Int2::parse(text).unwrap().value(), expected);
    }

    #[rstest]
    #[case("32768", IssueCode::TooBig)]
    #[case("-32769", IssueCode::TooSmall)]
    #[case("1.5", IssueCode::NotWhole)]
    #[case("NaN", IssueCode::NotFinite)]
    #[case("12abc", IssueCode::InvalidString)]
    fn test_int2_rejects(#[case] text: &str, #[case] code: IssueCode) {
        assert_eq!(Int2::safe_parse(text).unwrap_err().code, code);
    }

    #[test]
    fn test_int8_bounds_are_exact() {
        assert_eq!(Int8::parse("9223372036854775807").unwrap().value(), i64::MAX);
        let err = Int8::safe_parse("9223372036854775808").unwrap_err();
        assert_eq!(
            err.issue,
            Issue::number_too_big("9223372036854775807", true)
        );
    }

    #[test]
    fn test_integers_accept_json_numbers() {
        assert_eq!(Int4::parse(7).unwrap().value(), 7);
        assert_eq!(Oid::parse(4294967295u32).unwrap().value(), u32::MAX);
        assert_eq!(Oid::safe_parse(-1).unwrap_err().code, IssueCode::TooSmall);
        assert_eq!(Int4::safe_parse(true).unwrap_err().code, IssueCode::InvalidType);
    }

    #[rstest]
    #[case("1.5", "1.5")]
    #[case("1e20", "1e+20")]
    #[case("0.00001", "1e-05")]
    #[case("123456789012345", "123456789012345")]
    #[case("1234567890123456", "1.234567890123456e+15")]
    #[case("-inf", "-Infinity")]
    #[case("nan", "NaN")]
    fn test_float8_output(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(Float8::parse(text).unwrap().to_string(), expected);
    }

    #[test]
    fn test_float4_output() {
        assert_eq!(Float4::parse("123456").unwrap().to_string(), "123456");
        assert_eq!(Float4::parse("1234567").unwrap().to_string(), "1.234567e+06");
        assert_eq!(
            Float4::safe_parse("1e39").unwrap_err().code,
            IssueCode::TooBig
        );
    }

    #[rstest]
    #[case("1e-400")]
    #[case("-1e-400")]
    #[case("1e-324")]
    fn test_float8_rejects_underflow(#[case] text: &str) {
        assert_eq!(Float8::safe_parse(text).unwrap_err().code, IssueCode::TooSmall);
    }

    #[test]
    fn test_float_underflow_limits() {
        assert!(Float8::parse("5e-324").unwrap().value() > 0.0);
        assert_eq!(Float8::parse("0e-400").unwrap().value(), 0.0);
        assert_eq!(Float8::parse("-0").unwrap().value(), 0.0);
        assert_eq!(Float4::safe_parse("1e-50").unwrap_err().code, IssueCode::TooSmall);
        assert!(Float4::parse("1e-45").unwrap().value() > 0.0);
    }

    #[test]
    fn test_float_nan_equals_itself() {
        let nan = Float8::parse("NaN").unwrap();
        assert!(nan.equals("nan").unwrap());
        assert!(nan > Float8::parse("Infinity").unwrap());
    }

    #[test]
    fn test_numeric_keeps_scale() {
        let n = Numeric::parse("1.50").unwrap();
        assert_eq!(n.to_string(), "1.50");
        assert_eq!(n.scale(), 2);
        assert!(n.equals("1.5").unwrap());
        assert_eq!(Numeric::parse("-12e2").unwrap().to_string(), "-1200");
        assert_eq!(Numeric::parse("1,234.5").unwrap().to_string(), "1234.5");
    }

    #[test]
    fn test_numeric_special_values_order() {
        let values: Vec<Numeric> = ["NaN", "Infinity", "1", "-Infinity"]
            .iter()
            .map(|t| Numeric::parse(*t).unwrap())
            .collect();
        let mut sorted = values.clone();
        sorted.sort();
        let texts: Vec<String> = sorted.iter().map(|n| n.to_string()).collect();
        assert_eq!(texts, ["-Infinity", "1", "Infinity", "NaN"]);
    }

    #[test]
    fn test_numeric_limits() {
        let too_long = format!("0.{}", "1".repeat(16_384));
        assert_eq!(
            Numeric::safe_parse(too_long).unwrap_err().code,
            IssueCode::InvalidString
        );
        assert_eq!(
            Numeric::safe_parse("1e200000").unwrap_err().code,
            IssueCode::InvalidString
        );
    }
}
