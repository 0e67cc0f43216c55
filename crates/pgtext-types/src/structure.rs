//! Reading the structural (JSON object) form of values
//!
//! Every value's `to_json` produces an object that the same type's factory
//! accepts back. [`expect_keys`] checks the key set and hands out typed fields.

use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome, received_kind};
use serde_json::{Map, Value};

/// Check the key set of a structural object
///
/// Missing required keys are reported before unknown keys.
pub fn expect_keys<'a>(
    object: &'a Map<String, Value>,
    required: &[&str],
    optional: &[&str],
    ctx: &mut ParseContext,
) -> ParseOutcome<Fields<'a>> {
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return ctx.report(Issue::MissingKeys { keys: missing });
    }

    let unknown: Vec<String> = object
        .keys()
        .filter(|key| !required.contains(&key.as_str()) && !optional.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return ctx.report(Issue::UnrecognizedKeys { keys: unknown });
    }

    ParseOutcome::Valid(Fields { object })
}

fn non_finite(text: &str) -> Option<f64> {
    match text {
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    }
}

/// Typed access to the fields of a checked structural object
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key)
    }

    fn wrong_type<T>(key: &str, expected: &str, value: Option<&Value>, ctx: &mut ParseContext) -> ParseOutcome<T> {
        let received = value.map_or("undefined", received_kind);
        ctx.report(Issue::invalid_type(format!("{} ({})", expected, key), received))
    }

    pub fn string(&self, key: &str, ctx: &mut ParseContext) -> ParseOutcome<&'a str> {
        match self.get(key) {
            Some(Value::String(s)) => ParseOutcome::Valid(s.as_str()),
            other => Self::wrong_type(key, "string", other, ctx),
        }
    }

    pub fn boolean(&self, key: &str, ctx: &mut ParseContext) -> ParseOutcome<bool> {
        match self.get(key) {
            Some(Value::Bool(b)) => ParseOutcome::Valid(*b),
            other => Self::wrong_type(key, "boolean", other, ctx),
        }
    }

    /// A number, or one of the texts `Infinity`, `-Infinity` and `NaN`
    pub fn float(&self, key: &str, ctx: &mut ParseContext) -> ParseOutcome<f64> {
        let value = match self.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => non_finite(s),
            _ => None,
        };
        match value {
            Some(n) => ParseOutcome::Valid(n),
            None => Self::wrong_type(key, "number", self.get(key), ctx),
        }
    }

    pub fn integer(&self, key: &str, ctx: &mut ParseContext) -> ParseOutcome<i64> {
        match self.get(key).and_then(Value::as_i64) {
            Some(n) => ParseOutcome::Valid(n),
            None => Self::wrong_type(key, "integer", self.get(key), ctx),
        }
    }

    pub fn array(&self, key: &str, ctx: &mut ParseContext) -> ParseOutcome<&'a Vec<Value>> {
        match self.get(key) {
            Some(Value::Array(items)) => ParseOutcome::Valid(items),
            other => Self::wrong_type(key, "array", other, ctx),
        }
    }

    /// An optional field that may also be `null`
    pub fn optional_string(&self, key: &str, ctx: &mut ParseContext) -> ParseOutcome<Option<&'a str>> {
        match self.get(key) {
            None | Some(Value::Null) => ParseOutcome::Valid(None),
            Some(Value::String(s)) => ParseOutcome::Valid(Some(s.as_str())),
            other => Self::wrong_type(key, "string", other, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgtext_diagnostics::{DefaultFormatter, IssueCode};
    use serde_json::json;
    use std::sync::Arc;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_missing_keys_reported_first() {
        let obj = object(json!({ "x": 1, "extra": true }));
        let mut ctx = ParseContext::new(Arc::new(DefaultFormatter));
        assert!(!expect_keys(&obj, &["x", "y"], &[], &mut ctx).is_valid());
        let diagnostic = ctx.diagnostic().unwrap();
        assert_eq!(diagnostic.code, IssueCode::MissingKeys);
        assert_eq!(diagnostic.issue, Issue::MissingKeys { keys: vec!["y".into()] });
    }

    #[test]
    fn test_unrecognized_keys() {
        let obj = object(json!({ "x": 1, "extra": true }));
        let mut ctx = ParseContext::new(Arc::new(DefaultFormatter));
        assert!(!expect_keys(&obj, &["x"], &[], &mut ctx).is_valid());
        assert_eq!(ctx.diagnostic().unwrap().code, IssueCode::UnrecognizedKeys);
    }

    #[test]
    fn test_typed_fields() {
        let obj = object(json!({ "x": 1.5, "label": "a", "flag": false }));
        let mut ctx = ParseContext::new(Arc::new(DefaultFormatter));
        let fields = expect_keys(&obj, &["x", "label"], &["flag"], &mut ctx)
            .into_option()
            .unwrap();
        assert_eq!(fields.float("x", &mut ctx).into_option(), Some(1.5));
        assert_eq!(fields.string("label", &mut ctx).into_option(), Some("a"));
        assert_eq!(fields.boolean("flag", &mut ctx).into_option(), Some(false));
        assert!(!fields.string("x", &mut ctx).is_valid());
        assert_eq!(ctx.diagnostic().unwrap().code, IssueCode::InvalidType);
    }

    #[test]
    fn test_non_finite_floats() {
        let obj = object(json!({ "a": "Infinity", "b": "-Infinity", "c": "NaN", "d": "1.5" }));
        let mut ctx = ParseContext::new(Arc::new(DefaultFormatter));
        let fields = expect_keys(&obj, &["a", "b", "c", "d"], &[], &mut ctx)
            .into_option()
            .unwrap();
        assert_eq!(fields.float("a", &mut ctx).into_option(), Some(f64::INFINITY));
        assert_eq!(fields.float("b", &mut ctx).into_option(), Some(f64::NEG_INFINITY));
        assert!(fields.float("c", &mut ctx).into_option().unwrap().is_nan());
        assert!(!fields.float("d", &mut ctx).is_valid());
        assert_eq!(ctx.diagnostic().unwrap().code, IssueCode::InvalidType);
    }
}
