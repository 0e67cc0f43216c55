//! The closed set of reasons a value can fail to parse
//!
//! An [`Issue`] carries only the data needed to render a message. Rendering
//! is the job of an [`ErrorFormatter`](crate::ErrorFormatter).

use crate::IssueCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a size-style bound is measured on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeKind {
    /// A numeric value
    Number,
    /// A character or bit count
    String,
    /// An element count
    Array,
}

impl fmt::Display for SizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Array => write!(f, "array"),
        }
    }
}

/// The bound echoed back by [`Issue::TooSmall`] and [`Issue::TooBig`]
///
/// Numeric bounds are kept as exact decimal text so type limits such as
/// `9223372036854775807` survive without floating point rounding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    /// A count (characters, bits, elements)
    Count(u64),
    /// An exact decimal literal
    Number(String),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Number(s) => write!(f, "{}", s),
        }
    }
}

/// A failure reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Issue {
    /// The raw input had the wrong shape (e.g. an object where text was expected)
    InvalidType { expected: String, received: String },
    /// Text did not match the grammar named by `validation`
    InvalidString { validation: String, received: String },
    /// Unknown zone name, abbreviation or malformed offset
    InvalidTimezone { received: String },
    /// A calendar date that does not exist
    InvalidDate { received: String },
    /// Both range bounds are finite and `lower > upper`
    InvalidRangeBound { lower: String, upper: String },
    /// Value below the domain minimum
    TooSmall {
        kind: SizeKind,
        minimum: Bound,
        inclusive: bool,
        exact: bool,
    },
    /// Value above the domain maximum
    TooBig {
        kind: SizeKind,
        maximum: Bound,
        inclusive: bool,
        exact: bool,
    },
    /// A structural object lacks required keys
    MissingKeys { keys: Vec<String> },
    /// A structural object carries keys the type does not know
    UnrecognizedKeys { keys: Vec<String> },
    /// Infinity or NaN where the type only allows finite numbers
    NotFinite,
    /// A fractional number where the type only allows integers
    NotWhole { received: String },
    /// A fixed-width value of the wrong width
    InvalidFixedLength { expected: usize, received: usize },
    /// Text that is not a JSON document
    InvalidJson { reason: String },
    /// A label outside the enum's label set
    InvalidEnumValue {
        options: Vec<String>,
        received: String,
    },
}

impl Issue {
    /// The machine-readable tag of this issue
    pub fn code(&self) -> IssueCode {
        match self {
            Self::InvalidType { .. } => IssueCode::InvalidType,
            Self::InvalidString { .. } => IssueCode::InvalidString,
            Self::InvalidTimezone { .. } => IssueCode::InvalidTimezone,
            Self::InvalidDate { .. } => IssueCode::InvalidDate,
            Self::InvalidRangeBound { .. } => IssueCode::InvalidRangeBound,
            Self::TooSmall { .. } => IssueCode::TooSmall,
            Self::TooBig { .. } => IssueCode::TooBig,
            Self::MissingKeys { .. } => IssueCode::MissingKeys,
            Self::UnrecognizedKeys { .. } => IssueCode::UnrecognizedKeys,
            Self::NotFinite => IssueCode::NotFinite,
            Self::NotWhole { .. } => IssueCode::NotWhole,
            Self::InvalidFixedLength { .. } => IssueCode::InvalidFixedLength,
            Self::InvalidJson { .. } => IssueCode::InvalidJson,
            Self::InvalidEnumValue { .. } => IssueCode::InvalidEnumValue,
        }
    }

    /// Shorthand for [`Issue::InvalidType`]
    pub fn invalid_type(expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self::InvalidType {
            expected: expected.into(),
            received: received.into(),
        }
    }

    /// Shorthand for [`Issue::InvalidString`]
    pub fn invalid_string(validation: impl Into<String>, received: impl Into<String>) -> Self {
        Self::InvalidString {
            validation: validation.into(),
            received: received.into(),
        }
    }

    /// Numeric lower-bound violation
    pub fn number_too_small(minimum: impl Into<String>, inclusive: bool) -> Self {
        Self::TooSmall {
            kind: SizeKind::Number,
            minimum: Bound::Number(minimum.into()),
            inclusive,
            exact: false,
        }
    }

    /// Numeric upper-bound violation
    pub fn number_too_big(maximum: impl Into<String>, inclusive: bool) -> Self {
        Self::TooBig {
            kind: SizeKind::Number,
            maximum: Bound::Number(maximum.into()),
            inclusive,
            exact: false,
        }
    }

    /// Length upper-bound violation for text or bit strings
    pub fn string_too_long(maximum: usize) -> Self {
        Self::TooBig {
            kind: SizeKind::String,
            maximum: Bound::Count(maximum as u64),
            inclusive: true,
            exact: false,
        }
    }
}

/// Describe the JSON kind of a raw input for [`Issue::InvalidType`]
pub fn received_kind(raw: &serde_json::Value) -> &'static str {
    match raw {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
