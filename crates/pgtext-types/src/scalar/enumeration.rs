use crate::PgType;
use pgtext_diagnostics::{Issue, ParseContext, ParseOutcome};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// The label set of a user-defined enum type, in declaration order
///
/// An empty set accepts any label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumLabels(Arc<Vec<String>>);

impl EnumLabels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(labels.into_iter().map(Into::into).collect()))
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.0.iter().position(|l| l == label)
    }
}

/// A value of a user-defined enum type
///
/// Values order by the label's declaration position, as PostgreSQL does.
#[derive(Debug, Clone)]
pub struct PgEnum {
    label: String,
    labels: EnumLabels,
}

impl PgEnum {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for PgEnum {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl PartialOrd for PgEnum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.labels.position(&self.label), self.labels.position(&other.label)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.label.partial_cmp(&other.label),
        }
    }
}

impl fmt::Display for PgEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl PgType for PgEnum {
    type Config = EnumLabels;

    fn type_name() -> &'static str {
        "enum"
    }

    fn type_oid() -> Option<u32> {
        None
    }

    fn decode_text(text: &str, config: &EnumLabels, ctx: &mut ParseContext) -> ParseOutcome<Self> {
        if !config.labels().is_empty() && config.position(text).is_none() {
            return ctx.report(Issue::InvalidEnumValue {
                options: config.labels().to_vec(),
                received: text.to_string(),
            });
        }
        ParseOutcome::Valid(Self {
            label: text.to_string(),
            labels: config.clone(),
        })
    }

    fn config(&self) -> EnumLabels {
        self.labels.clone()
    }

    crate::value_glue!(Enum);
}
