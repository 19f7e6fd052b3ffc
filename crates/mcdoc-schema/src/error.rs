//! # Validation Errors
//!
//! Two channels, never mixed:
//!
//! - **Data errors** form an [`ErrorTree`]. Aggregating validators
//!   (struct, list, union) keep going after a failure and attach every
//!   failure as a child, so one call reports everything wrong with a
//!   document.
//! - **Schema-definition errors** ([`SchemaDefinitionError`]) mean the
//!   schema itself is ambiguous. No data can fix them, so they abort the
//!   enclosing validation instead of being folded into the tree.

use std::fmt;

use mcdoc_core::KeyPath;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{EnumLiteral, LiteralValue, ValueRange};

/// Which side of a [`ValueRange`] was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Min,
    Max,
}

/// What a range applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSubject {
    /// A numeric value.
    Value,
    /// The length of a sequence.
    Length,
}

/// Failure taxonomy for one node of an [`ErrorTree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// The value has the wrong runtime shape, or a reference could not be
    /// resolved.
    TypeMismatch { expected: String },
    /// A number or a length is outside its declared bounds.
    RangeViolation {
        subject: RangeSubject,
        bound: Bound,
        actual: f64,
        range: ValueRange,
    },
    MissingField { field: String, expected: String },
    UnexpectedField { field: String },
    EnumMembership { candidates: Vec<EnumLiteral> },
    LiteralMismatch { expected: LiteralValue },
    /// Every member of a union failed; one child per member.
    UnionExhausted { tried: usize },
    /// A struct had failing fields; one child per failure.
    InvalidFields,
    /// A sequence had failing elements or a bad length; one child per failure.
    InvalidItems { expected: String },
    /// No discriminant could be extracted, or it is not registered.
    DispatcherUnresolved {
        registry: String,
        key: Option<String>,
    },
    RecursionLimitExceeded { limit: usize },
}

/// One node of an aggregated validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorTree {
    /// Where in the document the failure sits.
    pub path: KeyPath,
    /// The offending value, if there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ErrorTree>,
}

impl ErrorTree {
    pub fn new(path: &KeyPath, value: Option<&Value>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.clone(),
            value: value.cloned(),
            kind,
            message: message.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ErrorTree>) -> Self {
        self.children = children;
        self
    }

    /// Wrong runtime shape.
    pub fn type_mismatch(path: &KeyPath, value: &Value, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        let message = format!("expected {expected}, found {}", value_kind(value));
        Self::new(path, Some(value), ErrorKind::TypeMismatch { expected }, message)
    }

    /// Out-of-range number or length.
    pub fn range(
        path: &KeyPath,
        value: &Value,
        subject: RangeSubject,
        actual: f64,
        range: ValueRange,
    ) -> Self {
        let bound = match range.min {
            Some(min) if actual < min => Bound::Min,
            _ => Bound::Max,
        };
        let what = match subject {
            RangeSubject::Value => "value",
            RangeSubject::Length => "length",
        };
        let message = match bound {
            Bound::Min => format!("{what} {actual} is less than the minimum of {range}"),
            Bound::Max => format!("{what} {actual} is greater than the maximum of {range}"),
        };
        Self::new(
            path,
            Some(value),
            ErrorKind::RangeViolation {
                subject,
                bound,
                actual,
                range,
            },
            message,
        )
    }

    /// True for nodes that carry no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Every leaf failure below (and including) this node, depth first.
    pub fn leaves(&self) -> Vec<&ErrorTree> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ErrorTree>) {
        if self.children.is_empty() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}: {}", "", self.path, self.message, indent = depth * 2)?;
        for child in &self.children {
            child.render(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

impl std::error::Error for ErrorTree {}

/// The schema is ambiguous regardless of the data under test.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaDefinitionError {
    #[error("struct at {path} declares {count} spread fields; at most one is allowed")]
    DuplicateSpread { path: KeyPath, count: usize },
}

/// Outcome of a failed validation call.
#[derive(Error, Debug)]
pub enum ValidateError {
    /// The document does not conform.
    #[error("document failed validation:\n{0}")]
    Invalid(Box<ErrorTree>),

    /// The schema cannot be applied to any document.
    #[error("schema definition error: {0}")]
    SchemaDefinition(#[from] SchemaDefinitionError),
}

impl ValidateError {
    /// The data error tree, if this is a data failure.
    pub fn tree(&self) -> Option<&ErrorTree> {
        match self {
            ValidateError::Invalid(tree) => Some(tree),
            ValidateError::SchemaDefinition(_) => None,
        }
    }
}

impl From<ErrorTree> for ValidateError {
    fn from(tree: ErrorTree) -> Self {
        ValidateError::Invalid(Box::new(tree))
    }
}

/// Runtime type name of a document value.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "struct",
    }
}
