//! PostgreSQL text wire-format codec
//!
//! This crate provides:
//! - Validated value types for PostgreSQL's scalar, range, multirange and
//!   array text grammars (re-exported from `pgtext-types`)
//! - Typed diagnostics with a pluggable formatter (from `pgtext-diagnostics`)
//! - The [`Parser`] adapter for pre-flight validation of driver input
//! - [`Codec`] sessions with their own formatter
//! - A [`TypeRegistry`] resolving type names and OIDs to parsers
//!
//! # Example
//!
//! ```
//! use pgtext::{ArrayCodec, Int4, Int4Range, PgType};
//!
//! let range = Int4Range::parse("[1,10)")?;
//! assert!(range.is_within_range(1)?);
//! assert!(!range.is_within_range(10)?);
//!
//! let array = ArrayCodec::<Int4>::default().parse("{1,NULL,3}")?;
//! assert_eq!(array.to_string(), "{1,NULL,3}");
//! # Ok::<(), pgtext::CodecError>(())
//! ```

pub mod codec;
pub mod parser;
pub mod registry;

pub use pgtext_diagnostics as diagnostics;
pub use pgtext_types as types;

pub use codec::Codec;
pub use parser::{DynFactory, Parsed, Parser, ParserKind};
pub use registry::TypeRegistry;

pub use pgtext_diagnostics::{
    CodecError, DefaultFormatter, Diagnostic, ErrorFormatter, Issue, IssueCode, SafeResult,
    error_formatter, reset_error_formatter, set_error_formatter,
};
pub use pgtext_types::*;
