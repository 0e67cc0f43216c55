//! `json` and `jsonb`
//!
//! Both accept either JSON text or an already-decoded JSON value. `json`
//! prints the text exactly as written; `jsonb` prints the normalized form
//! PostgreSQL produces (keys ordered by length then bytes, duplicate keys
//! collapsed, `", "` and `": "` separators).

use crate::PgType;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome};
use serde_json::{Map, Value};
use std::fmt;

fn decode_document(text: &str, ctx: &mut ParseContext) -> ParseOutcome<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(document) => ParseOutcome::Valid(document),
        Err(e) => ctx.report(Issue::InvalidJson {
            reason: e.to_string(),
        }),
    }
}

/// `json`, a document kept as written
#[derive(Debug, Clone)]
pub struct Json {
    text: String,
    document: Value,
}

impl Json {
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Documents compare by value; whitespace and key order do not matter
impl PartialEq for Json {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PgType for Json {
    type Config = ();

    fn type_name() -> &'static str {
        "json"
    }

    fn type_oid() -> Option<u32> {
        Some(114)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        decode_document(text, ctx).map(|document| Self {
            text: text.to_string(),
            document,
        })
    }

    fn decode(raw: &Value, config: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        match raw {
            Value::String(text) => Self::decode_text(text, config, ctx),
            other => ParseOutcome::Valid(Self {
                text: other.to_string(),
                document: other.clone(),
            }),
        }
    }

    fn decode_structure(object: &Map<String, Value>, config: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        Self::decode(&Value::Object(object.clone()), config, ctx)
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        self.document.clone()
    }

    crate::value_glue!(Json);
}

/// `jsonb`, a document in normalized form
#[derive(Debug, Clone, PartialEq)]
pub struct Jsonb(Value);

impl Jsonb {
    pub fn document(&self) -> &Value {
        &self.0
    }
}

fn jsonb_key_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

fn write_jsonb(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_jsonb(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| jsonb_key_order(a, b));
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push_str(": ");
                write_jsonb(&map[key.as_str()], out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

impl fmt::Display for Jsonb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_jsonb(&self.0, &mut out);
        f.write_str(&out)
    }
}

impl PgType for Jsonb {
    type Config = ();

    fn type_name() -> &'static str {
        "jsonb"
    }

    fn type_oid() -> Option<u32> {
        Some(3802)
    }

    fn decode_text(text: &str, _: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        decode_document(text, ctx).map(Self)
    }

    fn decode(raw: &Value, config: &(), ctx: &mut ParseContext) -> ParseOutcome<Self> {
        match raw {
            Value::String(text) => Self::decode_text(text, config, ctx),
            other => ParseOutcome::Valid(Self(other.clone())),
        }
    }

    fn decode_structure(object: &Map<String, Value>, _: &(), _: &mut ParseContext) -> ParseOutcome<Self> {
        ParseOutcome::Valid(Self(Value::Object(object.clone())))
    }

    fn config(&self) {}

    fn to_json(&self) -> Value {
        self.0.clone()
    }

    crate::value_glue!(Jsonb);
}
