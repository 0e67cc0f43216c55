//! Bit string types
//!
//! Input is a string of `0`/`1` digits, optionally prefixed with `B`, or a
//! hexadecimal string prefixed with `X` (four bits per digit).

use super::character::Length;
use crate::PgType;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome};
use std::fmt;

/// Parse the digits of a bit string literal
fn parse_bits(text: &str) -> Option<String> {
    if let Some(hex) = text.strip_prefix(['x', 'X']) {
        let mut bits = String::with_capacity(hex.len() * 4);
        for c in hex.chars() {
            let nibble = c.to_digit(16)?;
            bits.push_str(&format!("{:04b}", nibble));
        }
        return Some(bits);
    }
    let digits = text.strip_prefix(['b', 'B']).unwrap_or(text);
    digits
        .chars()
        .all(|c| c == '0' || c == '1')
        .then(|| digits.to_string())
}

/// `bit(n)`, a bit string of exactly `n` bits
#[derive(Debug, Clone)]
pub struct Bit {
    bits: String,
    length: Length,
}

/// `bit varying(n)` / `varbit`, a bit string of at most `n` bits
#[derive(Debug, Clone)]
pub struct BitVarying {
    bits: String,
    length: Length,
}

macro_rules! bit_common {
    ($name:ident) => {
        impl $name {
            /// The bits as a `0`/`1` string
            pub fn as_str(&self) -> &str {
                &self.bits
            }

            pub fn len(&self) -> usize {
                self.bits.len()
            }

            pub fn is_empty(&self) -> bool {
                self.bits.is_empty()
            }

            /// Bit at `index`, most significant first
            pub fn get(&self, index: usize) -> Option<bool> {
                self.bits.as_bytes().get(index).map(|b| *b == b'1')
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.bits == other.bits
            }
        }

        impl Eq for $name {}

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.bits)
            }
        }
    };
}

bit_common!(Bit);
bit_common!(BitVarying);

impl PgType for Bit {
    type Config = Length;

    fn type_name() -> &'static str {
        "bit"
    }

    fn type_oid() -> Option<u32> {
        Some(1560)
    }

    fn decode_text(text: &str, config: &Length, ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let Some(bits) = parse_bits(text) else {
            return ctx.report(Issue::invalid_string("bit", text));
        };
        if let Length(Some(expected)) = *config {
            if bits.len() != expected {
                return ctx.report(Issue::InvalidFixedLength {
                    expected,
                    received: bits.len(),
                });
            }
        }
        ParseOutcome::Valid(Self {
            bits,
            length: *config,
        })
    }

    fn config(&self) -> Length {
        self.length
    }

    crate::value_glue!(Bit);
}

impl PgType for BitVarying {
    type Config = Length;

    fn type_name() -> &'static str {
        "varbit"
    }

    fn type_oid() -> Option<u32> {
        Some(1562)
    }

    fn decode_text(text: &str, config: &Length, ctx: &mut ParseContext) -> ParseOutcome<Self> {
        let Some(bits) = parse_bits(text) else {
            return ctx.report(Issue::invalid_string("varbit", text));
        };
        if let Length(Some(maximum)) = *config {
            if bits.len() > maximum {
                return ctx.report(Issue::string_too_long(maximum));
            }
        }
        ParseOutcome::Valid(Self {
            bits,
            length: *config,
        })
    }

    fn config(&self) -> Length {
        self.length
    }

    crate::value_glue!(BitVarying);
}
