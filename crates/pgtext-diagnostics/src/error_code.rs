//! Issue codes
//!
//! Every [`Issue`](crate::Issue) variant has exactly one code. Callers that need
//! programmatic behavior branch on the code, never on the rendered message.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Machine-readable tag of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    InvalidString,
    InvalidTimezone,
    InvalidDate,
    InvalidRangeBound,
    TooSmall,
    TooBig,
    MissingKeys,
    UnrecognizedKeys,
    NotFinite,
    NotWhole,
    InvalidFixedLength,
    InvalidJson,
    InvalidEnumValue,
}

impl IssueCode {
    /// All codes, in declaration order
    pub const ALL: [IssueCode; 14] = [
        Self::InvalidType,
        Self::InvalidString,
        Self::InvalidTimezone,
        Self::InvalidDate,
        Self::InvalidRangeBound,
        Self::TooSmall,
        Self::TooBig,
        Self::MissingKeys,
        Self::UnrecognizedKeys,
        Self::NotFinite,
        Self::NotWhole,
        Self::InvalidFixedLength,
        Self::InvalidJson,
        Self::InvalidEnumValue,
    ];

    /// The wire tag, as used in serialized diagnostics
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::InvalidString => "invalid_string",
            Self::InvalidTimezone => "invalid_timezone",
            Self::InvalidDate => "invalid_date",
            Self::InvalidRangeBound => "invalid_range_bound",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
            Self::MissingKeys => "missing_keys",
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::NotFinite => "not_finite",
            Self::NotWhole => "not_whole",
            Self::InvalidFixedLength => "invalid_fixed_length",
            Self::InvalidJson => "invalid_json",
            Self::InvalidEnumValue => "invalid_enum_value",
        }
    }

    /// Get descriptive information for this code
    pub fn info(&self) -> &'static IssueInfo {
        ISSUE_INFO.get(self).unwrap_or(&UNKNOWN_ISSUE)
    }

    /// Check if this code describes a domain-bound violation
    pub const fn is_bound_violation(&self) -> bool {
        matches!(
            self,
            Self::TooSmall | Self::TooBig | Self::InvalidRangeBound | Self::InvalidFixedLength
        )
    }

    /// Check if this code describes the shape of a structural object
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::MissingKeys | Self::UnrecognizedKeys | Self::InvalidType)
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about an issue code
#[derive(Debug, Clone)]
pub struct IssueInfo {
    /// Short description of the issue
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl IssueInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ISSUE: IssueInfo = IssueInfo::new("Unknown issue");

static ISSUE_INFO: LazyLock<HashMap<IssueCode, IssueInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    map.insert(IssueCode::InvalidType, IssueInfo::new("Input has the wrong type"));
    map.insert(
        IssueCode::InvalidString,
        IssueInfo::new("Text does not match the type's literal grammar"),
    );
    map.insert(
        IssueCode::InvalidTimezone,
        IssueInfo::new("Unknown timezone")
            .with_help("Use an IANA zone name, a known abbreviation or a +HH:MM offset"),
    );
    map.insert(IssueCode::InvalidDate, IssueInfo::new("Date does not exist"));
    map.insert(
        IssueCode::InvalidRangeBound,
        IssueInfo::new("Range lower bound exceeds upper bound"),
    );
    map.insert(IssueCode::TooSmall, IssueInfo::new("Value is below the type's minimum"));
    map.insert(IssueCode::TooBig, IssueInfo::new("Value is above the type's maximum"));
    map.insert(IssueCode::MissingKeys, IssueInfo::new("Structural object is missing keys"));
    map.insert(
        IssueCode::UnrecognizedKeys,
        IssueInfo::new("Structural object has unknown keys"),
    );
    map.insert(IssueCode::NotFinite, IssueInfo::new("Number must be finite"));
    map.insert(IssueCode::NotWhole, IssueInfo::new("Number must be whole"));
    map.insert(
        IssueCode::InvalidFixedLength,
        IssueInfo::new("Fixed-width value has the wrong width"),
    );
    map.insert(IssueCode::InvalidJson, IssueInfo::new("Text is not valid JSON"));
    map.insert(
        IssueCode::InvalidEnumValue,
        IssueInfo::new("Label is not part of the enum"),
    );

    map
});
