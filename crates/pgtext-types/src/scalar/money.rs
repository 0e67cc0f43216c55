//! The `money` type
//!
//! Stored as a signed count of cents. Input may carry a currency symbol,
//! thousands separators in either locale style, and accounting-style
//! parentheses for negatives.

use crate::numeric::{NumberDomain, ParsedNumber};
use crate::PgType;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome, try_valid};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

const MONEY_DOMAIN: NumberDomain = NumberDomain {
    name: "money",
    minimum: Some("-92233720368547758.08"),
    maximum: Some("92233720368547758.07"),
    allow_infinity: false,
    allow_nan: false,
    whole: false,
};

// Fraction digits kept before rounding to cents.
const ROUNDING_DIGITS: usize = 10;

/// `money`, a fixed two-decimal currency amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn amount(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }
}

/// Strip the sign, currency symbol and accounting parentheses
fn strip_currency(text: &str) -> Option<(bool, String)> {
    let mut body = text.trim();
    let mut negative = false;
    if let Some(inner) = body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        negative = true;
        body = inner.trim();
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = !negative;
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_prefix('$') {
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = !negative;
        body = rest.trim_start();
    }
    if body.is_empty() || body.starts_with(['+', '-', '$']) {
        return None;
    }
    Some((negative, body.to_string()))
}

fn round_to_cents(plain: &str) -> Option<i64> {
    let truncated = match plain.split_once('.') {
        Some((integer, fraction)) if fraction.len() > ROUNDING_DIGITS => {
            format!("{}.{}", integer, &fraction[..ROUNDING_DIGITS])
        }
        _ => plain.to_string(),
    };
    let amount = Decimal::from_str(&truncated)
        .ok()?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    (amount * Decimal::ONE_HUNDRED).to_i64()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.cents.unsigned_abs();
        if self.cents < 0 {
            f.write_str("-")?;
        }
        write!(
            f,
            "${}.{:02}",
            group_thousands(&(abs / 100).to_string()),
            abs % 100
        )
    }
}

impl PgType for Money {
    type Config = ();
    const ACCEPTS_NUMBERS: bool = true;

    fn type_name() -> &'static str {
        "money"
    }

    fn type_oid() -> Option<u32> {
        Some(790)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let Some((negative, body)) = strip_currency(text) else {
            return ctx.report(Issue::invalid_string("money", text));
        };
        let signed = if negative { format!("-{}", body) } else { body };
        let parsed = try_valid!(MONEY_DOMAIN.parse(&signed, ctx));
        let cents = match &parsed {
            ParsedNumber::Finite { value, .. } => round_to_cents(&value.to_plain_string(0)),
            _ => None,
        };
        match cents {
            Some(cents) => ParseOutcome::Valid(Self { cents }),
            None => ctx.report(Issue::invalid_string("money", text)),
        }
    }

    fn config(&self) {}

    crate::value_glue!(Money);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtext_diagnostics::IssueCode;
    use rstest::rstest;

    #[rstest]
    #[case("1234.56", "$1,234.56")]
    #[case("$1,234.56", "$1,234.56")]
    #[case("-$1,234.5", "-$1,234.50")]
    #[case("$-3", "-$3.00")]
    #[case("($12.00)", "-$12.00")]
    #[case("1.234,56", "$1,234.56")]
    #[case("0.005", "$0.01")]
    #[case("999", "$999.00")]
    fn test_money_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Money::parse(input).unwrap().to_string(), expected);
    }

    #[test]
    fn test_money_bounds() {
        let max = Money::parse("92233720368547758.07").unwrap();
        assert_eq!(max.cents(), i64::MAX);
        assert_eq!(max.to_string(), "$92,233,720,368,547,758.07");
        assert_eq!(
            Money::parse("-92233720368547758.08").unwrap().cents(),
            i64::MIN
        );
        assert_eq!(
            Money::safe_parse("92233720368547758.08").unwrap_err().code,
            IssueCode::TooBig
        );
    }

    #[test]
    fn test_money_rejects_garbage() {
        assert_eq!(Money::safe_parse("$$1").unwrap_err().code, IssueCode::InvalidString);
        assert_eq!(Money::safe_parse("").unwrap_err().code, IssueCode::InvalidString);
        assert_eq!(Money::safe_parse("abc").unwrap_err().code, IssueCode::InvalidString);
    }

    #[test]
    fn test_money_amount() {
        let m = Money::parse(12.5).unwrap();
        assert_eq!(m.amount(), Decimal::new(1250, 2));
    }
}
