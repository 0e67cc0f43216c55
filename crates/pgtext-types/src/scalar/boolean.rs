use crate::PgType;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome};
use std::fmt;

const TRUE_LITERALS: &[&str] = &["t", "true", "y", "yes", "on", "1"];
const FALSE_LITERALS: &[&str] = &["f", "false", "n", "no", "off", "0"];

/// `bool`, printed as `t` / `f`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Boolean(bool);

impl Boolean {
    pub fn value(&self) -> bool {
        self.0
    }
}

impl From<Boolean> for bool {
    fn from(value: Boolean) -> Self {
        value.0
    }
}

impl fmt::Display for Boolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "t" } else { "f" })
    }
}

impl PgType for Boolean {
    type Config = ();
    const ACCEPTS_NUMBERS: bool = true;
    const ACCEPTS_BOOLEANS: bool = true;

    fn type_name() -> &'static str {
        "bool"
    }

    fn type_oid() -> Option<u32> {
        Some(16)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let trimmed = text.trim();
        let matches = |literals: &[&str]| literals.iter().any(|l| l.eq_ignore_ascii_case(trimmed));
        if matches(TRUE_LITERALS) {
            ParseOutcome::Valid(Self(true))
        } else if matches(FALSE_LITERALS) {
            ParseOutcome::Valid(Self(false))
        } else {
            ctx.report(Issue::invalid_string("bool", text))
        }
    }

    fn config(&self) {}

    crate::value_glue!(Boolean);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("t", true)]
    #[case("TRUE", true)]
    #[case(" yes ", true)]
    #[case("On", true)]
    #[case("1", true)]
    #[case("f", false)]
    #[case("No", false)]
    #[case("off", false)]
    #[case("0", false)]
    fn test_boolean_literals(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(Boolean::parse(input).unwrap().value(), expected);
    }

    #[test]
    fn test_boolean_raw_inputs() {
        assert_eq!(Boolean::parse(true).unwrap().to_string(), "t");
        assert_eq!(Boolean::parse(0).unwrap().to_string(), "f");
        assert!(Boolean::safe_parse(2).is_err());
        assert!(Boolean::safe_parse("maybe").is_err());
    }
}
