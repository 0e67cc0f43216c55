//! Diagnostics and the codec error type

use crate::{ErrorFormatter, Issue, IssueCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An issue together with its rendered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Machine-readable tag, always equal to `issue.code()`
    pub code: IssueCode,
    /// The failure reason
    pub issue: Issue,
    /// Human-readable message, rendered once at creation
    pub message: String,
}

impl Diagnostic {
    /// Render an issue with the given formatter
    pub fn new(issue: Issue, formatter: &dyn ErrorFormatter) -> Self {
        let message = formatter.format(&issue);
        Self {
            code: issue.code(),
            issue,
            message,
        }
    }

    /// Render an issue with the process-wide formatter
    pub fn with_active_formatter(issue: Issue) -> Self {
        let formatter = crate::error_formatter();
        Self::new(issue, formatter.as_ref())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Error returned by the throwing API surface (`parse`, `equals`, ...)
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The input failed validation
    #[error("{0}")]
    Validation(Diagnostic),

    /// A parse reported failure without recording a diagnostic
    ///
    /// This is a defect in the codec, not a property of the input. It is
    /// raised as a panic payload and never returned as an ordinary error.
    #[error("internal consistency fault: {type_name} parse failed without a diagnostic")]
    MissingDiagnostic { type_name: String },
}

impl CodecError {
    /// Get the issue code, if this is a validation failure
    pub fn code(&self) -> Option<IssueCode> {
        match self {
            Self::Validation(diag) => Some(diag.code),
            Self::MissingDiagnostic { .. } => None,
        }
    }

    /// Get the diagnostic, if this is a validation failure
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Validation(diag) => Some(diag),
            Self::MissingDiagnostic { .. } => None,
        }
    }
}

impl From<Diagnostic> for CodecError {
    fn from(diag: Diagnostic) -> Self {
        Self::Validation(diag)
    }
}
