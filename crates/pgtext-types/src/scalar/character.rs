//! Character string types

use crate::PgType;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome};
use std::fmt;

/// Width parameter of `char(n)`, `varchar(n)`, `bit(n)` and `varbit(n)`
///
/// `None` means no width was fixed; any length is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Length(pub Option<usize>);

impl Length {
    pub const UNBOUNDED: Self = Self(None);

    pub fn new(n: usize) -> Self {
        Self(Some(n))
    }
}

/// Longest identifier PostgreSQL stores in a `name`, in bytes
pub const NAME_MAX_BYTES: usize = 63;

/// `character(n)` / `bpchar`, text of exactly `n` characters
#[derive(Debug, Clone)]
pub struct Character {
    value: String,
    length: Length,
}

/// `character varying(n)` / `varchar`, text of at most `n` characters
#[derive(Debug, Clone)]
pub struct CharacterVarying {
    value: String,
    length: Length,
}

macro_rules! string_common {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.value
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.value == other.value
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                self.value.partial_cmp(&other.value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.value)
            }
        }
    };
}

string_common!(Character);
string_common!(CharacterVarying);

impl PgType for Character {
    type Config = Length;

    fn type_name() -> &'static str {
        "bpchar"
    }

    fn type_oid() -> Option<u32> {
        Some(1042)
    }

    fn decode_text(text: &str, config: &Length, ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let received = text.chars().count();
        if let Length(Some(expected)) = *config {
            if received != expected {
                return ctx.report(Issue::InvalidFixedLength { expected, received });
            }
        }
        ParseOutcome::Valid(Self {
            value: text.to_string(),
            length: *config,
        })
    }

    fn config(&self) -> Length {
        self.length
    }

    crate::value_glue!(Character);
}

impl PgType for CharacterVarying {
    type Config = Length;

    fn type_name() -> &'static str {
        "varchar"
    }

    fn type_oid() -> Option<u32> {
        Some(1043)
    }

    fn decode_text(text: &str, config: &Length, ctx: &mut ParseContext) -> ParseOutcome<Self> {
        if let Length(Some(maximum)) = *config {
            if text.chars().count() > maximum {
                return ctx.report(Issue::string_too_long(maximum));
            }
        }
        ParseOutcome::Valid(Self {
            value: text.to_string(),
            length: *config,
        })
    }

    fn config(&self) -> Length {
        self.length
    }

    crate::value_glue!(CharacterVarying);
}

/// `text`, unbounded character data
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Text(String);

impl Text {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PgType for Text {
    type Config = ();

    fn type_name() -> &'static str {
        "text"
    }

    fn type_oid() -> Option<u32> {
        Some(25)
    }

    fn decode_text(text: &str, _: &(), _: &mut ParseContext) -> ParseOutcome<Self> {
        ParseOutcome::Valid(Self(text.to_string()))
    }

    fn config(&self) {}

    crate::value_glue!(Text);
}

/// `name`, an identifier of at most 63 bytes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PgType for Name {
    type Config = ();

    fn type_name() -> &'static str {
        "name"
    }

    fn type_oid() -> Option<u32> {
        Some(19)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        if text.len() > NAME_MAX_BYTES {
            return ctx.report(Issue::string_too_long(NAME_MAX_BYTES));
        }
        ParseOutcome::Valid(Self(text.to_string()))
    }

    fn config(&self) {}

    crate::value_glue!(Name);
}
