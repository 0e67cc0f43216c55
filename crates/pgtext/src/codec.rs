//! Codec sessions
//!
//! A [`Codec`] carries its own error formatter. Everything parsed through a
//! session renders its diagnostics with that formatter, independent of the
//! process-wide one and of other sessions.

use crate::parser::{Parsed, Parser};
use crate::registry::TypeRegistry;
use pgtext_diagnostics::{CodecError, DefaultFormatter, ErrorFormatter, SafeResult, SharedFormatter};
use pgtext_types::{ArrayCodec, Equality, Factory, PgArray, PgType};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Codec {
    formatter: SharedFormatter,
}

impl Codec {
    /// A session using the built-in English formatter
    pub fn new() -> Self {
        Self::with_shared_formatter(Arc::new(DefaultFormatter))
    }

    pub fn with_formatter(formatter: impl ErrorFormatter + 'static) -> Self {
        Self::with_shared_formatter(Arc::new(formatter))
    }

    pub fn with_shared_formatter(formatter: SharedFormatter) -> Self {
        Self { formatter }
    }

    /// A session snapshotting the current process-wide formatter
    pub fn from_active_formatter() -> Self {
        Self::with_shared_formatter(pgtext_diagnostics::error_formatter())
    }

    pub fn formatter(&self) -> SharedFormatter {
        Arc::clone(&self.formatter)
    }

    pub fn safe_parse<T: PgType>(&self, raw: impl Into<Value>) -> SafeResult<T> {
        self.safe_parse_with(&Factory::<T>::default(), raw)
    }

    pub fn parse<T: PgType>(&self, raw: impl Into<Value>) -> Result<T, CodecError> {
        self.safe_parse(raw).map_err(CodecError::from)
    }

    /// Parse through a configured factory
    pub fn safe_parse_with<T: PgType>(&self, factory: &Factory<T>, raw: impl Into<Value>) -> SafeResult<T> {
        factory.safe_parse_with(raw, self.formatter())
    }

    /// Parse `raw` as `value`'s kind and compare
    pub fn safe_equals<T: PgType>(&self, value: &T, raw: impl Into<Value>) -> SafeResult<Equality<T>> {
        self.safe_parse_with(&Factory::<T>::new(value.config()), raw)
            .map(|data| Equality {
                equals: *value == data,
                data,
            })
    }

    pub fn equals<T: PgType>(&self, value: &T, raw: impl Into<Value>) -> Result<bool, CodecError> {
        self.safe_equals(value, raw)
            .map(|eq| eq.equals)
            .map_err(CodecError::from)
    }

    pub fn safe_parse_array<T: PgType>(&self, codec: &ArrayCodec<T>, raw: impl Into<Value>) -> SafeResult<PgArray<T>> {
        let raw = raw.into();
        let mut ctx = pgtext_diagnostics::ParseContext::new(self.formatter());
        let outcome = codec.decode(&raw, &mut ctx);
        ctx.finish(outcome, &codec.type_name())
    }

    /// Run a parser adapter with this session's formatter
    pub fn is_valid(&self, parser: &Parser, raw: Option<&Value>) -> SafeResult<Parsed> {
        parser.is_valid_with(raw, self.formatter())
    }

    /// Resolve a type by name and validate `raw` against it
    ///
    /// Returns `None` when the registry does not know the type.
    pub fn is_valid_as(&self, registry: &TypeRegistry, type_name: &str, raw: Option<&Value>) -> Option<SafeResult<Parsed>> {
        registry
            .by_name(type_name)
            .map(|parser| self.is_valid(parser, raw))
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}
