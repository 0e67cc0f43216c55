//! The value-type contract
//!
//! Every PostgreSQL type implements [`PgType`]. The trait is the minimal
//! capability the generic range, multirange and array codecs need: a factory
//! (`decode`), a type guard (`guard`) and a canonical text form (`Display`).

use crate::structure::expect_keys;
use crate::PgValue;
use pgtext_diagnostics::{
    CodecError, Issue, ParseContext, ParseOutcome, SafeResult, SharedFormatter, received_kind,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

/// A PostgreSQL value type
pub trait PgType:
    Sized + Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static
{
    /// Factory configuration (a width, a label set, ...); `()` for most types
    type Config: Clone + Default + fmt::Debug + Send + Sync + 'static;

    /// Whether raw JSON numbers are accepted in place of text
    const ACCEPTS_NUMBERS: bool = false;
    /// Whether raw JSON booleans are accepted in place of text
    const ACCEPTS_BOOLEANS: bool = false;
    /// Element separator inside array literals
    const ARRAY_DELIMITER: char = ',';

    /// PostgreSQL type name, e.g. `int4`
    fn type_name() -> &'static str;

    /// PostgreSQL type OID, when the type has a fixed one
    fn type_oid() -> Option<u32>;

    /// Parse the type's text form
    fn decode_text(text: &str, config: &Self::Config, ctx: &mut ParseContext) -> ParseOutcome<Self>;

    /// Rebuild a value from the object produced by [`PgType::to_json`]
    ///
    /// The default form is `{"value": <raw>}`.
    fn decode_structure(
        object: &Map<String, Value>,
        config: &Self::Config,
        ctx: &mut ParseContext,
    ) -> ParseOutcome<Self> {
        let fields = pgtext_diagnostics::try_valid!(expect_keys(object, &["value"], &[], ctx));
        match fields.get("value") {
            Some(Value::Object(_)) | None => {
                ctx.report(Issue::invalid_type(Self::type_name(), "object"))
            }
            Some(raw) => Self::decode(raw, config, ctx),
        }
    }

    /// Parse any raw input: text, a structural object, or a JSON scalar
    fn decode(raw: &Value, config: &Self::Config, ctx: &mut ParseContext) -> ParseOutcome<Self> {
        match raw {
            Value::String(text) => Self::decode_text(text, config, ctx),
            Value::Object(object) => Self::decode_structure(object, config, ctx),
            Value::Number(n) if Self::ACCEPTS_NUMBERS => {
                Self::decode_text(&n.to_string(), config, ctx)
            }
            Value::Bool(b) if Self::ACCEPTS_BOOLEANS => {
                Self::decode_text(if *b { "true" } else { "false" }, config, ctx)
            }
            other => ctx.report(Issue::invalid_type(Self::type_name(), received_kind(other))),
        }
    }

    /// The configuration this value was created with
    fn config(&self) -> Self::Config;

    /// Structural form for persistence and caching
    fn to_json(&self) -> Value {
        serde_json::json!({ "value": self.to_string() })
    }

    /// Type guard over the dynamic value enum
    fn guard(value: &PgValue) -> Option<&Self>;

    /// Wrap into the dynamic value enum
    fn into_pg_value(self) -> PgValue;

    /// Parse with the default configuration, never failing loudly
    fn safe_parse(raw: impl Into<Value>) -> SafeResult<Self> {
        Factory::<Self>::default().safe_parse(raw)
    }

    /// Parse with the default configuration
    fn parse(raw: impl Into<Value>) -> Result<Self, CodecError> {
        Self::safe_parse(raw).map_err(CodecError::from)
    }

    /// Parse `raw` as this value's kind and compare
    fn safe_equals(&self, raw: impl Into<Value>) -> SafeResult<Equality<Self>> {
        Factory::<Self>::new(self.config())
            .safe_parse(raw)
            .map(|data| Equality {
                equals: *self == data,
                data,
            })
    }

    /// Parse `raw` as this value's kind and compare
    fn equals(&self, raw: impl Into<Value>) -> Result<bool, CodecError> {
        self.safe_equals(raw)
            .map(|eq| eq.equals)
            .map_err(CodecError::from)
    }
}

/// Result of [`PgType::safe_equals`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equality<T> {
    pub equals: bool,
    pub data: T,
}

/// A configured constructor for `T`
pub struct Factory<T: PgType> {
    config: T::Config,
    _marker: PhantomData<fn() -> T>,
}

impl<T: PgType> Factory<T> {
    pub fn new(config: T::Config) -> Self {
        Self {
            config,
            _marker: PhantomData,
        }
    }

    pub fn config(&self) -> &T::Config {
        &self.config
    }

    pub fn type_name(&self) -> &'static str {
        T::type_name()
    }

    /// Parse into an outcome, recording failures in `ctx`
    pub fn decode(&self, raw: &Value, ctx: &mut ParseContext) -> ParseOutcome<T> {
        T::decode(raw, &self.config, ctx)
    }

    /// Parse with the process-wide formatter
    pub fn safe_parse(&self, raw: impl Into<Value>) -> SafeResult<T> {
        self.safe_parse_with(raw, pgtext_diagnostics::error_formatter())
    }

    /// Parse with an explicit formatter
    pub fn safe_parse_with(&self, raw: impl Into<Value>, formatter: SharedFormatter) -> SafeResult<T> {
        let raw = raw.into();
        let mut ctx = ParseContext::new(formatter);
        let outcome = self.decode(&raw, &mut ctx);
        ctx.finish(outcome, T::type_name())
    }

    pub fn parse(&self, raw: impl Into<Value>) -> Result<T, CodecError> {
        self.safe_parse(raw).map_err(CodecError::from)
    }

    /// Check whether a dynamic value is a `T`
    pub fn is(&self, value: &PgValue) -> bool {
        T::guard(value).is_some()
    }
}

impl<T: PgType> Default for Factory<T> {
    fn default() -> Self {
        Self::new(T::Config::default())
    }
}

impl<T: PgType> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self::new(self.config.clone())
    }
}

impl<T: PgType> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("type", &T::type_name())
            .field("config", &self.config)
            .finish()
    }
}
