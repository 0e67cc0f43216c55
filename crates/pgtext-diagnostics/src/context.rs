//! Parse outcomes and the context that collects the diagnostic

use crate::{CodecError, Diagnostic, ErrorFormatter, Issue, SafeResult, SharedFormatter};
use std::sync::Arc;

/// Result of a single parse step
///
/// `Invalid` is a bare sentinel. The diagnostic explaining it lives in the
/// [`ParseContext`]; some recursive steps fail without recording one and leave
/// that to their caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Valid(T),
    Invalid,
}

impl<T> ParseOutcome<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Valid(v) => Some(v),
            Self::Invalid => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            Self::Valid(v) => ParseOutcome::Valid(f(v)),
            Self::Invalid => ParseOutcome::Invalid,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> ParseOutcome<U>) -> ParseOutcome<U> {
        match self {
            Self::Valid(v) => f(v),
            Self::Invalid => ParseOutcome::Invalid,
        }
    }
}

impl<T> From<Option<T>> for ParseOutcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Valid(v),
            None => Self::Invalid,
        }
    }
}

/// Unwrap a [`ParseOutcome`], returning `ParseOutcome::Invalid` from the
/// enclosing function when it is invalid.
#[macro_export]
macro_rules! try_valid {
    ($outcome:expr) => {
        match $outcome {
            $crate::ParseOutcome::Valid(value) => value,
            $crate::ParseOutcome::Invalid => return $crate::ParseOutcome::Invalid,
        }
    };
}

/// Collects the first diagnostic of a parse
///
/// Later issues are ignored: nested parses propagate the first failure
/// outward unchanged.
pub struct ParseContext {
    formatter: SharedFormatter,
    diagnostic: Option<Diagnostic>,
}

impl ParseContext {
    /// Create a context rendering with the given formatter
    pub fn new(formatter: SharedFormatter) -> Self {
        Self {
            formatter,
            diagnostic: None,
        }
    }

    /// Create a context rendering with the process-wide formatter
    pub fn with_active_formatter() -> Self {
        Self::new(crate::error_formatter())
    }

    /// A fresh context sharing this context's formatter
    ///
    /// Used for speculative parses whose diagnostic is discarded.
    pub fn fork(&self) -> Self {
        Self::new(Arc::clone(&self.formatter))
    }

    pub fn formatter(&self) -> &dyn ErrorFormatter {
        self.formatter.as_ref()
    }

    pub fn shared_formatter(&self) -> SharedFormatter {
        Arc::clone(&self.formatter)
    }

    /// Record an issue (if none is recorded yet) and fail
    pub fn report<T>(&mut self, issue: Issue) -> ParseOutcome<T> {
        if self.diagnostic.is_none() {
            self.diagnostic = Some(Diagnostic::new(issue, self.formatter.as_ref()));
        }
        ParseOutcome::Invalid
    }

    /// Adopt a diagnostic produced elsewhere (if none is recorded yet) and fail
    pub fn adopt<T>(&mut self, diagnostic: Diagnostic) -> ParseOutcome<T> {
        if self.diagnostic.is_none() {
            self.diagnostic = Some(diagnostic);
        }
        ParseOutcome::Invalid
    }

    pub fn has_diagnostic(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    pub fn take_diagnostic(&mut self) -> Option<Diagnostic> {
        self.diagnostic.take()
    }

    /// Turn an outcome into the public result shape
    ///
    /// # Panics
    ///
    /// Panics with a [`CodecError::MissingDiagnostic`] payload when the outcome
    /// is invalid and no diagnostic was recorded. That state is a codec defect.
    pub fn finish<T>(self, outcome: ParseOutcome<T>, type_name: &str) -> SafeResult<T> {
        match (outcome, self.diagnostic) {
            (ParseOutcome::Valid(value), _) => Ok(value),
            (ParseOutcome::Invalid, Some(diagnostic)) => Err(diagnostic),
            (ParseOutcome::Invalid, None) => std::panic::panic_any(CodecError::MissingDiagnostic {
                type_name: type_name.to_string(),
            }),
        }
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::with_active_formatter()
    }
}

impl std::fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("diagnostic", &self.diagnostic)
            .finish_non_exhaustive()
    }
}
