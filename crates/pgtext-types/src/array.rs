//! Array literals
//!
//! [`parse_array_literal`] scans `{...}` text into untyped elements in a
//! single left-to-right pass. [`ArrayCodec`] then runs every element through
//! the element type's factory and checks the result is rectangular.

use crate::{Factory, PgType, PgValue};
use pgtext_diagnostics::{
    CodecError, Issue, ParseContext, ParseOutcome, SafeResult, received_kind, try_valid,
};
use serde_json::Value;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Validation name reported for malformed array literals
pub const ARRAY_VALIDATION: &str = "array";

/// Deepest nesting PostgreSQL accepts (`MAXDIM`)
pub const MAX_DIMENSIONS: usize = 6;

const NULL_TOKEN: &str = "NULL";

/// An element of an array literal before type conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawElement {
    Null,
    Text(String),
    Array(Vec<RawElement>),
}

/// Parse an array literal into raw elements
///
/// An optional dimension decoration (`[1:3]=`) is skipped. Returns `None`
/// when braces or quotes do not balance, nesting goes deeper than
/// [`MAX_DIMENSIONS`], or anything trails the closing brace.
pub fn parse_array_literal(text: &str, delimiter: char) -> Option<Vec<RawElement>> {
    let mut body = text.trim_start();
    if body.starts_with('[') {
        let (_, rest) = body.split_once('=')?;
        body = rest.trim_start();
    }
    let mut chars = body.chars().peekable();
    if chars.next()? != '{' {
        return None;
    }
    let elements = scan_list(&mut chars, delimiter, 1)?;
    if chars.any(|c| !c.is_whitespace()) {
        return None;
    }
    Some(elements)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

/// Scan the elements of one brace level; the opening brace is consumed
fn scan_list(chars: &mut Peekable<Chars<'_>>, delimiter: char, depth: usize) -> Option<Vec<RawElement>> {
    let mut elements = Vec::new();
    skip_whitespace(chars);
    if chars.next_if_eq(&'}').is_some() {
        return Some(elements);
    }
    loop {
        skip_whitespace(chars);
        let element = match chars.peek()? {
            '{' if depth < MAX_DIMENSIONS => {
                chars.next();
                RawElement::Array(scan_list(chars, delimiter, depth + 1)?)
            }
            '{' => return None,
            '"' => {
                chars.next();
                RawElement::Text(scan_quoted(chars)?)
            }
            _ => scan_unquoted(chars, delimiter)?,
        };
        elements.push(element);
        skip_whitespace(chars);
        match chars.next()? {
            '}' => return Some(elements),
            c if c == delimiter => continue,
            _ => return None,
        }
    }
}

fn scan_quoted(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut text = String::new();
    loop {
        match chars.next()? {
            '\\' => text.push(chars.next()?),
            '"' => return Some(text),
            c => text.push(c),
        }
    }
}

fn scan_unquoted(chars: &mut Peekable<Chars<'_>>, delimiter: char) -> Option<RawElement> {
    let mut text = String::new();
    let mut escaped = false;
    // Trailing whitespace is dropped unless it was escaped
    let mut kept = 0;
    while let Some(&c) = chars.peek() {
        if c == delimiter || c == '}' {
            break;
        }
        chars.next();
        match c {
            '\\' => {
                text.push(chars.next()?);
                escaped = true;
                kept = text.len();
            }
            '{' | '"' => return None,
            c => {
                text.push(c);
                if !c.is_whitespace() {
                    kept = text.len();
                }
            }
        }
    }
    text.truncate(kept);
    if text.is_empty() {
        return None;
    }
    if !escaped && text.eq_ignore_ascii_case(NULL_TOKEN) {
        return Some(RawElement::Null);
    }
    Some(RawElement::Text(text))
}

/// A typed array element
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement<T> {
    Null,
    Value(T),
    Array(Vec<ArrayElement<T>>),
}

impl<T> ArrayElement<T> {
    fn children(&self) -> Option<&[ArrayElement<T>]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    fn map<U>(self, f: &impl Fn(T) -> U) -> ArrayElement<U> {
        match self {
            Self::Null => ArrayElement::Null,
            Self::Value(v) => ArrayElement::Value(f(v)),
            Self::Array(items) => ArrayElement::Array(items.into_iter().map(|e| e.map(f)).collect()),
        }
    }
}

/// Dimensions of a nested list, or `None` when it is ragged
///
/// Every level must hold either only sub-arrays or only scalars (and nulls),
/// and sibling sub-arrays must share one shape.
fn dimensions<T>(items: &[ArrayElement<T>]) -> Option<Vec<usize>> {
    let mut dims = vec![items.len()];
    let nested: Vec<&[ArrayElement<T>]> = items.iter().filter_map(ArrayElement::children).collect();
    if nested.is_empty() {
        return Some(dims);
    }
    if nested.len() != items.len() {
        return None;
    }
    let inner = dimensions(nested[0])?;
    for sibling in &nested[1..] {
        if dimensions(sibling)? != inner {
            return None;
        }
    }
    dims.extend(inner);
    Some(dims)
}

/// A validated array of `T`
#[derive(Debug, Clone, PartialEq)]
pub struct PgArray<T> {
    elements: Vec<ArrayElement<T>>,
    delimiter: char,
}

impl<T> PgArray<T> {
    pub fn elements(&self) -> &[ArrayElement<T>] {
        &self.elements
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Length of each dimension, outermost first
    pub fn dimensions(&self) -> Vec<usize> {
        dimensions(&self.elements).unwrap_or_default()
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> PgArray<U> {
        PgArray {
            elements: self.elements.into_iter().map(|e| e.map(&f)).collect(),
            delimiter: self.delimiter,
        }
    }
}

impl<T: PgType> PgArray<T> {
    /// Structural form: nested JSON arrays with `null` for NULL elements
    pub fn to_json(&self) -> Value {
        fn element<T: PgType>(e: &ArrayElement<T>) -> Value {
            match e {
                ArrayElement::Null => Value::Null,
                ArrayElement::Value(v) => v.to_json(),
                ArrayElement::Array(items) => Value::Array(items.iter().map(element).collect()),
            }
        }
        Value::Array(self.elements.iter().map(element).collect())
    }

    pub fn into_pg_value(self) -> PgValue {
        PgValue::Array(self.map(PgType::into_pg_value))
    }
}

pub(crate) fn quote_element(text: &str, delimiter: char) -> String {
    let needs_quotes = text.is_empty()
        || text.eq_ignore_ascii_case(NULL_TOKEN)
        || text
            .chars()
            .any(|c| c == delimiter || matches!(c, '"' | '\\' | '{' | '}') || c.is_whitespace());
    if !needs_quotes {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn write_elements<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    elements: &[ArrayElement<T>],
    delimiter: char,
) -> fmt::Result {
    f.write_str("{")?;
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", delimiter)?;
        }
        match element {
            ArrayElement::Null => f.write_str(NULL_TOKEN)?,
            ArrayElement::Value(v) => f.write_str(&quote_element(&v.to_string(), delimiter))?,
            ArrayElement::Array(items) => write_elements(f, items, delimiter)?,
        }
    }
    f.write_str("}")
}

impl<T: fmt::Display> fmt::Display for PgArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_elements(f, &self.elements, self.delimiter)
    }
}

/// Parser and serializer for arrays of `T`
#[derive(Debug, Clone)]
pub struct ArrayCodec<T: PgType> {
    element: Factory<T>,
}

impl<T: PgType> Default for ArrayCodec<T> {
    fn default() -> Self {
        Self::new(Factory::default())
    }
}

impl<T: PgType> ArrayCodec<T> {
    pub fn new(element: Factory<T>) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Factory<T> {
        &self.element
    }

    /// Array type name, e.g. `_int4`
    pub fn type_name(&self) -> String {
        format!("_{}", T::type_name())
    }

    /// Parse array text or a JSON array of raw elements
    pub fn decode(&self, raw: &Value, ctx: &mut ParseContext) -> ParseOutcome<PgArray<T>> {
        let elements = match raw {
            Value::String(text) => {
                let Some(parsed) = parse_array_literal(text, T::ARRAY_DELIMITER) else {
                    return ctx.report(Issue::invalid_string(ARRAY_VALIDATION, text.as_str()));
                };
                try_valid!(self.convert_raw(parsed, ctx))
            }
            Value::Array(items) => try_valid!(self.convert_json(items, 1, ctx)),
            other => {
                return ctx.report(Issue::invalid_type(self.type_name(), received_kind(other)));
            }
        };
        if dimensions(&elements).is_none() {
            return ctx.report(Issue::invalid_string(ARRAY_VALIDATION, raw_text(raw)));
        }
        ParseOutcome::Valid(PgArray {
            elements,
            delimiter: T::ARRAY_DELIMITER,
        })
    }

    fn convert_raw(&self, items: Vec<RawElement>, ctx: &mut ParseContext) -> ParseOutcome<Vec<ArrayElement<T>>> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(match item {
                RawElement::Null => ArrayElement::Null,
                RawElement::Text(text) => {
                    ArrayElement::Value(try_valid!(self.element.decode(&Value::String(text), ctx)))
                }
                RawElement::Array(nested) => ArrayElement::Array(try_valid!(self.convert_raw(nested, ctx))),
            });
        }
        ParseOutcome::Valid(out)
    }

    fn convert_json(
        &self,
        items: &[Value],
        depth: usize,
        ctx: &mut ParseContext,
    ) -> ParseOutcome<Vec<ArrayElement<T>>> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(match item {
                Value::Null => ArrayElement::Null,
                Value::Array(_) if depth >= MAX_DIMENSIONS => {
                    log::debug!("array nesting exceeds {} dimensions", MAX_DIMENSIONS);
                    return ctx.report(Issue::invalid_string(ARRAY_VALIDATION, item.to_string()));
                }
                Value::Array(nested) => {
                    ArrayElement::Array(try_valid!(self.convert_json(nested, depth + 1, ctx)))
                }
                other => ArrayElement::Value(try_valid!(self.element.decode(other, ctx))),
            });
        }
        ParseOutcome::Valid(out)
    }

    pub fn safe_parse(&self, raw: impl Into<Value>) -> SafeResult<PgArray<T>> {
        let raw = raw.into();
        let mut ctx = ParseContext::with_active_formatter();
        let outcome = self.decode(&raw, &mut ctx);
        ctx.finish(outcome, &self.type_name())
    }

    pub fn parse(&self, raw: impl Into<Value>) -> Result<PgArray<T>, CodecError> {
        self.safe_parse(raw).map_err(CodecError::from)
    }

    /// Serialize a JSON array of raw values as an array literal
    ///
    /// See [`serialize_raw_array`].
    pub fn serialize_raw(&self, raw: &Value) -> Option<String> {
        serialize_raw_array(&self.element, raw)
    }
}

fn raw_text(raw: &Value) -> String {
    match raw {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Serialize a JSON array of raw values as an array literal
///
/// Each element goes through the element factory; elements it rejects are
/// written as `NULL`. Returns `None` when `raw` is not an array or nests
/// deeper than [`MAX_DIMENSIONS`].
pub fn serialize_raw_array<T: PgType>(factory: &Factory<T>, raw: &Value) -> Option<String> {
    fn write<T: PgType>(factory: &Factory<T>, items: &[Value], depth: usize, out: &mut String) -> Option<()> {
        if depth > MAX_DIMENSIONS {
            return None;
        }
        out.push('{');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(T::ARRAY_DELIMITER);
            }
            match item {
                Value::Array(nested) => write(factory, nested, depth + 1, out)?,
                Value::Null => out.push_str(NULL_TOKEN),
                other => {
                    let mut ctx = ParseContext::with_active_formatter();
                    match factory.decode(other, &mut ctx) {
                        ParseOutcome::Valid(v) => {
                            out.push_str(&quote_element(&v.to_string(), T::ARRAY_DELIMITER));
                        }
                        ParseOutcome::Invalid => {
                            log::trace!("writing rejected {} element as NULL", T::type_name());
                            out.push_str(NULL_TOKEN);
                        }
                    }
                }
            }
        }
        out.push('}');
        Some(())
    }

    let items = raw.as_array()?;
    let mut out = String::new();
    write(factory, items, 1, &mut out)?;
    Some(out)
}
