//! Parser adapter
//!
//! A [`Parser`] wraps a factory chosen at runtime and adds null, absence and
//! array acceptance on top of it. It is the pre-flight validation surface a
//! driver calls before sending a value to the database.

use pgtext_diagnostics::{
    Issue, ParseContext, ParseOutcome, SafeResult, SharedFormatter, received_kind,
    try_valid,
};
use pgtext_types::{ArrayCodec, Factory, PgType, PgValue, RawElement, parse_array_literal};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Received-kind label for an absent input
pub const ABSENT: &str = "undefined";

/// A factory whose value type is erased
pub trait DynFactory: Send + Sync + fmt::Debug {
    fn type_name(&self) -> String;

    fn type_oid(&self) -> Option<u32>;

    /// Element separator inside array literals of this type
    fn array_delimiter(&self) -> char;

    fn decode_value(&self, raw: &Value, ctx: &mut ParseContext) -> ParseOutcome<PgValue>;
}

impl<T: PgType> DynFactory for Factory<T> {
    fn type_name(&self) -> String {
        T::type_name().to_string()
    }

    fn type_oid(&self) -> Option<u32> {
        T::type_oid()
    }

    fn array_delimiter(&self) -> char {
        T::ARRAY_DELIMITER
    }

    fn decode_value(&self, raw: &Value, ctx: &mut ParseContext) -> ParseOutcome<PgValue> {
        self.decode(raw, ctx).map(PgType::into_pg_value)
    }
}

/// Decodes whole arrays, used when the registry resolves an array type by OID
impl<T: PgType> DynFactory for ArrayCodec<T> {
    fn type_name(&self) -> String {
        ArrayCodec::type_name(self)
    }

    fn type_oid(&self) -> Option<u32> {
        None
    }

    fn array_delimiter(&self) -> char {
        T::ARRAY_DELIMITER
    }

    fn decode_value(&self, raw: &Value, ctx: &mut ParseContext) -> ParseOutcome<PgValue> {
        self.decode(raw, ctx).map(|array| array.into_pg_value())
    }
}

/// What a parser validates against
#[derive(Debug, Clone)]
pub enum ParserKind {
    /// A concrete type's factory
    Typed(Arc<dyn DynFactory>),
    /// Any input is passed through untouched
    Untyped,
}

/// A successfully validated input
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// The input was absent and the parser is optional
    Absent,
    /// The input was `null` and the parser is nullable
    Null,
    Value(PgValue),
    Array(Vec<PgValue>),
    /// Untyped pass-through
    Raw(Value),
}

/// Builder-configured validation wrapper around a factory
///
/// ```
/// use pgtext::{Int4, Parsed, Parser};
/// use serde_json::json;
///
/// let parser = Parser::of::<Int4>().nullable();
/// assert_eq!(parser.is_valid(Some(&json!(null))), Ok(Parsed::Null));
/// assert!(parser.is_valid(None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    kind: ParserKind,
    nullable: bool,
    optional: bool,
    array: bool,
}

impl Parser {
    pub fn new(kind: ParserKind) -> Self {
        Self {
            kind,
            nullable: false,
            optional: false,
            array: false,
        }
    }

    /// A parser for `T` with its default configuration
    pub fn of<T: PgType>() -> Self {
        Self::typed(Factory::<T>::default())
    }

    /// A parser for a configured factory
    pub fn typed<T: PgType>(factory: Factory<T>) -> Self {
        Self::new(ParserKind::Typed(Arc::new(factory)))
    }

    pub fn from_dyn(factory: Arc<dyn DynFactory>) -> Self {
        Self::new(ParserKind::Typed(factory))
    }

    pub fn untyped() -> Self {
        Self::new(ParserKind::Untyped)
    }

    /// Accept a top-level `null`
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Accept an absent input
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Require an array and validate every element as a single value
    ///
    /// Elements are never nullable, whatever the parser's own flags.
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn kind(&self) -> &ParserKind {
        &self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    /// Type label used in diagnostics
    pub fn type_name(&self) -> String {
        let element = match &self.kind {
            ParserKind::Typed(factory) => factory.type_name(),
            ParserKind::Untyped => "unknown".to_string(),
        };
        if self.array {
            format!("_{}", element)
        } else {
            element
        }
    }

    /// Validate an input with the process-wide formatter
    ///
    /// `None` stands for an absent input.
    pub fn is_valid(&self, raw: Option<&Value>) -> SafeResult<Parsed> {
        self.is_valid_with(raw, pgtext_diagnostics::error_formatter())
    }

    /// Validate an input with an explicit formatter
    pub fn is_valid_with(&self, raw: Option<&Value>, formatter: SharedFormatter) -> SafeResult<Parsed> {
        let mut ctx = ParseContext::new(formatter);
        let outcome = self.check(raw, &mut ctx);
        let result = ctx.finish(outcome, &self.type_name());
        if let Err(diagnostic) = &result {
            log::debug!("{} rejected input: {}", self.type_name(), diagnostic.code);
        }
        result
    }

    fn check(&self, raw: Option<&Value>, ctx: &mut ParseContext) -> ParseOutcome<Parsed> {
        let raw = match raw {
            None if self.optional => return ParseOutcome::Valid(Parsed::Absent),
            None => return ctx.report(Issue::invalid_type(self.type_name(), ABSENT)),
            Some(Value::Null) if self.nullable => return ParseOutcome::Valid(Parsed::Null),
            Some(Value::Null) => return ctx.report(Issue::invalid_type(self.type_name(), "null")),
            Some(raw) => raw,
        };
        if self.array {
            return self.check_array(raw, ctx);
        }
        match &self.kind {
            ParserKind::Typed(factory) => factory.decode_value(raw, ctx).map(Parsed::Value),
            ParserKind::Untyped => ParseOutcome::Valid(Parsed::Raw(raw.clone())),
        }
    }

    fn check_array(&self, raw: &Value, ctx: &mut ParseContext) -> ParseOutcome<Parsed> {
        match raw {
            Value::Array(items) => self.check_elements(items.iter().map(Cow::Borrowed), ctx),
            Value::String(text) => {
                let delimiter = match &self.kind {
                    ParserKind::Typed(factory) => factory.array_delimiter(),
                    ParserKind::Untyped => ',',
                };
                let Some(parsed) = parse_array_literal(text, delimiter) else {
                    return ctx.report(Issue::invalid_string("array", text.as_str()));
                };
                self.check_elements(parsed.into_iter().map(|e| Cow::Owned(raw_element_value(e))), ctx)
            }
            other => ctx.report(Issue::invalid_type(self.type_name(), received_kind(other))),
        }
    }

    /// Validate elements in order, stopping at the first rejected one
    fn check_elements<'a>(
        &self,
        elements: impl Iterator<Item = Cow<'a, Value>>,
        ctx: &mut ParseContext,
    ) -> ParseOutcome<Parsed> {
        let mut values = Vec::new();
        let mut raws = Vec::new();
        for element in elements {
            if matches!(*element, Value::Null | Value::Array(_)) {
                let element_name = match &self.kind {
                    ParserKind::Typed(factory) => factory.type_name(),
                    ParserKind::Untyped => "unknown".to_string(),
                };
                return ctx.report(Issue::invalid_type(element_name, received_kind(&element)));
            }
            match &self.kind {
                ParserKind::Typed(factory) => values.push(try_valid!(factory.decode_value(&element, ctx))),
                ParserKind::Untyped => raws.push(element.into_owned()),
            }
        }
        match &self.kind {
            ParserKind::Typed(_) => ParseOutcome::Valid(Parsed::Array(values)),
            ParserKind::Untyped => ParseOutcome::Valid(Parsed::Raw(Value::Array(raws))),
        }
    }
}

fn raw_element_value(element: RawElement) -> Value {
    match element {
        RawElement::Null => Value::Null,
        RawElement::Text(text) => Value::String(text),
        RawElement::Array(items) => Value::Array(items.into_iter().map(raw_element_value).collect()),
    }
}
