//! Pluggable rendering of issues into messages
//!
//! A [`ParseContext`](crate::ParseContext) carries the formatter it renders with,
//! so sessions with different formatters never observe each other. The
//! process-wide formatter only seeds contexts that are created without an
//! explicit one; swapping it is a startup-time action and is last-writer-wins.

use crate::{Bound, Issue, SizeKind};
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

/// Renders an [`Issue`] into a human-readable message
pub trait ErrorFormatter: Send + Sync {
    fn format(&self, issue: &Issue) -> String;
}

impl<F> ErrorFormatter for F
where
    F: Fn(&Issue) -> String + Send + Sync,
{
    fn format(&self, issue: &Issue) -> String {
        self(issue)
    }
}

/// Shared handle to a formatter
pub type SharedFormatter = Arc<dyn ErrorFormatter>;

/// The built-in English formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl ErrorFormatter for DefaultFormatter {
    fn format(&self, issue: &Issue) -> String {
        match issue {
            Issue::InvalidType { expected, received } => {
                format!("Expected {}, received {}", expected, received)
            }
            Issue::InvalidString { validation, received } => {
                format!("Invalid {}: {:?}", validation, received)
            }
            Issue::InvalidTimezone { received } => format!("Invalid timezone {:?}", received),
            Issue::InvalidDate { received } => format!("Invalid date {:?}", received),
            Issue::InvalidRangeBound { lower, upper } => format!(
                "Range lower bound {} must be less than or equal to upper bound {}",
                lower, upper
            ),
            Issue::TooSmall {
                kind,
                minimum,
                inclusive,
                exact,
            } => size_message(*kind, minimum, *inclusive, *exact, "at least", "greater than"),
            Issue::TooBig {
                kind,
                maximum,
                inclusive,
                exact,
            } => size_message(*kind, maximum, *inclusive, *exact, "at most", "less than"),
            Issue::MissingKeys { keys } => {
                format!("Missing key(s) in object: {}", quote_list(keys))
            }
            Issue::UnrecognizedKeys { keys } => {
                format!("Unrecognized key(s) in object: {}", quote_list(keys))
            }
            Issue::NotFinite => "Number must be finite".to_string(),
            Issue::NotWhole { received } => {
                format!("Expected a whole number, received {}", received)
            }
            Issue::InvalidFixedLength { expected, received } => format!(
                "Expected a length of exactly {}, received {}",
                expected, received
            ),
            Issue::InvalidJson { reason } => format!("Invalid JSON: {}", reason),
            Issue::InvalidEnumValue { options, received } => format!(
                "Invalid enum value. Expected {}, received '{}'",
                options
                    .iter()
                    .map(|o| format!("'{}'", o))
                    .collect::<Vec<_>>()
                    .join(" | "),
                received
            ),
        }
    }
}

fn size_message(
    kind: SizeKind,
    bound: &Bound,
    inclusive: bool,
    exact: bool,
    inclusive_word: &str,
    exclusive_word: &str,
) -> String {
    match kind {
        SizeKind::Number => {
            if exact {
                format!("Number must be exactly {}", bound)
            } else if inclusive {
                let relation = if inclusive_word == "at least" {
                    "greater than or equal to"
                } else {
                    "less than or equal to"
                };
                format!("Number must be {} {}", relation, bound)
            } else {
                format!("Number must be {} {}", exclusive_word, bound)
            }
        }
        SizeKind::String | SizeKind::Array => {
            let unit = if kind == SizeKind::String {
                "character(s)"
            } else {
                "element(s)"
            };
            let noun = if kind == SizeKind::String { "String" } else { "Array" };
            if exact {
                format!("{} must contain exactly {} {}", noun, bound, unit)
            } else {
                format!("{} must contain {} {} {}", noun, inclusive_word, bound, unit)
            }
        }
    }
}

fn quote_list(keys: &[String]) -> String {
    keys.iter()
        .map(|k| format!("'{}'", k))
        .collect::<Vec<_>>()
        .join(", ")
}

static ACTIVE_FORMATTER: LazyLock<RwLock<SharedFormatter>> =
    LazyLock::new(|| RwLock::new(Arc::new(DefaultFormatter)));

/// The currently active process-wide formatter
pub fn error_formatter() -> SharedFormatter {
    ACTIVE_FORMATTER.read().clone()
}

/// Replace the process-wide formatter
///
/// Diagnostics produced afterwards use the new formatter; diagnostics already
/// produced keep their message.
pub fn set_error_formatter(formatter: impl ErrorFormatter + 'static) {
    *ACTIVE_FORMATTER.write() = Arc::new(formatter);
}

/// Restore the built-in formatter
pub fn reset_error_formatter() {
    *ACTIVE_FORMATTER.write() = Arc::new(DefaultFormatter);
}
