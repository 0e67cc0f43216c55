use crate::PgType;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome};
use std::fmt;

/// `uuid`, printed lowercase and hyphenated
///
/// Input may be hyphenated, braced, plain hex or a `urn:uuid:` URN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uuid(::uuid::Uuid);

impl Uuid {
    pub fn value(&self) -> ::uuid::Uuid {
        self.0
    }
}

impl From<Uuid> for ::uuid::Uuid {
    fn from(value: Uuid) -> Self {
        value.0
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl PgType for Uuid {
    type Config = ();

    fn type_name() -> &'static str {
        "uuid"
    }

    fn type_oid() -> Option<u32> {
        Some(2950)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        match ::uuid::Uuid::parse_str(text.trim()) {
            Ok(parsed) => ParseOutcome::Valid(Self(parsed)),
            Err(_) => ctx.report(Issue::invalid_string("uuid", text)),
        }
    }

    fn config(&self) {}

    crate::value_glue!(Uuid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtext_diagnostics::IssueCode;
    use rstest::rstest;

    #[rstest]
    #[case("A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11")]
    #[case("{a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11}")]
    #[case("a0eebc999c0b4ef8bb6d6bb9bd380a11")]
    fn test_uuid_forms(#[case] input: &str) {
        assert_eq!(
            Uuid::parse(input).unwrap().to_string(),
            "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"
        );
    }

    #[test]
    fn test_uuid_rejects() {
        assert_eq!(Uuid::safe_parse("not-a-uuid").unwrap_err().code, IssueCode::InvalidString);
    }
}
