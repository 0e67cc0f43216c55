//! Validation core for the pgtext codec
//!
//! This crate provides the failure taxonomy shared by every value type:
//! issues, their codes, rendered diagnostics, the pluggable formatter that
//! renders them, and the parse context that records the first failure.

mod context;
mod error;
mod error_code;
mod format;
mod issue;

pub use context::*;
pub use error::*;
pub use error_code::*;
pub use format::*;
pub use issue::*;

/// Non-throwing result shape: the value or the diagnostic explaining the failure
pub type SafeResult<T> = std::result::Result<T, Diagnostic>;

/// Throwing result shape used by `parse`, `equals` and friends
pub type Result<T> = std::result::Result<T, CodecError>;
