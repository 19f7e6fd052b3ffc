//! # Schema Model
//!
//! Typed representation of the mcdoc schema language. Every node kind is a
//! variant of the closed [`Schema`] enum, decoded with serde from the
//! `kind`-tagged JSON found in symbol documents:
//!
//! ```json
//! { "kind": "struct", "fields": [
//!     { "kind": "pair", "key": "count", "type": { "kind": "int" }, "optional": true }
//! ] }
//! ```
//!
//! Kinds this engine does not model (`any`, `tuple`, `template`, ...)
//! decode to [`Schema::Absent`], which accepts every value. A known kind
//! with a malformed payload fails the decode; see [`Schema::decode`] for
//! how that failure is contained to one corpus entry.

use std::collections::BTreeMap;
use std::fmt;

use mcdoc_core::GameVersion;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A schema node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schema {
    /// Named reference into the corpus.
    Reference {
        path: String,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    /// Alternatives, tried in declaration order.
    Union {
        #[serde(default, deserialize_with = "null_as_default")]
        members: Vec<Schema>,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    /// Homogeneous sequence.
    List {
        item: Box<Schema>,
        #[serde(default, rename = "lengthRange", skip_serializing_if = "Option::is_none")]
        length_range: Option<ValueRange>,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    /// Sequence of integers.
    #[serde(alias = "long_array", alias = "byte_array")]
    IntArray {
        #[serde(default, rename = "lengthRange", skip_serializing_if = "Option::is_none")]
        length_range: Option<ValueRange>,
        /// Bounds on each element.
        #[serde(default, rename = "valueRange", skip_serializing_if = "Option::is_none")]
        value_range: Option<ValueRange>,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    /// Sequence of fractional numbers.
    #[serde(alias = "double_array")]
    FloatArray {
        #[serde(default, rename = "lengthRange", skip_serializing_if = "Option::is_none")]
        length_range: Option<ValueRange>,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    String {
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    #[serde(alias = "short", alias = "long")]
    Int {
        #[serde(default, rename = "valueRange", skip_serializing_if = "Option::is_none")]
        value_range: Option<ValueRange>,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    #[serde(alias = "double")]
    Float {
        #[serde(default, rename = "valueRange", skip_serializing_if = "Option::is_none")]
        value_range: Option<ValueRange>,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    Boolean {
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    Byte {
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    /// Exactly one value.
    Literal {
        value: LiteralValue,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    Struct {
        #[serde(default, deserialize_with = "null_as_default")]
        fields: Vec<StructField>,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    Enum {
        #[serde(rename = "enumKind")]
        enum_kind: EnumKind,
        #[serde(default, deserialize_with = "null_as_default")]
        values: Vec<EnumValue>,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    /// Registry lookup keyed by a discriminant taken from the data.
    Dispatcher {
        #[serde(rename = "parallelIndices")]
        parallel_indices: Vec<DispatcherIndex>,
        registry: String,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    /// Pruned away, or a kind this engine does not model. Accepts anything.
    #[serde(other)]
    Absent,
}

/// `{"name": "since", "value": {"kind": "literal", ...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AttributeValue>,
}

impl Attribute {
    /// The string payload of a literal-valued attribute, e.g. the version
    /// in `#[since="1.21"]`.
    pub fn string_literal(&self) -> Option<&str> {
        match &self.value {
            Some(AttributeValue::Literal {
                value: LiteralValue::String { value },
            }) => Some(value),
            _ => None,
        }
    }
}

/// Payload of an [`Attribute`]. Inert metadata apart from the version
/// literals read by the pruner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeValue {
    Literal {
        value: LiteralValue,
    },
    Reference {
        path: String,
    },
    Tree {
        #[serde(default)]
        values: BTreeMap<String, AttributeValue>,
    },
    Dispatcher {
        #[serde(rename = "parallelIndices")]
        parallel_indices: Vec<DispatcherIndex>,
        registry: String,
    },
    #[serde(other)]
    Other,
}

/// A typed literal: `{"kind": "string", "value": "minecraft:stone"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiteralValue {
    String {
        value: String,
    },
    #[serde(alias = "short", alias = "long")]
    Int {
        value: i64,
    },
    Boolean {
        value: bool,
    },
    /// Bytes double as booleans: `1b` matches `true`.
    Byte {
        value: i64,
    },
    #[serde(alias = "double")]
    Float {
        value: f64,
    },
}

impl LiteralValue {
    /// Exact match against a document value.
    pub fn matches(&self, data: &Value) -> bool {
        match self {
            LiteralValue::String { value } => data.as_str() == Some(value.as_str()),
            LiteralValue::Int { value } => integer_of(data) == Some(*value),
            LiteralValue::Boolean { value } => data.as_bool() == Some(*value),
            LiteralValue::Byte { value } => match data {
                Value::Bool(b) => i64::from(*b) == *value,
                other => integer_of(other) == Some(*value),
            },
            LiteralValue::Float { value } => data.as_f64() == Some(*value),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String { value } => write!(f, "{value:?}"),
            LiteralValue::Int { value } => write!(f, "{value}"),
            LiteralValue::Boolean { value } => write!(f, "{value}"),
            LiteralValue::Byte { value } => write!(f, "{value}b"),
            LiteralValue::Float { value } => write!(f, "{value}"),
        }
    }
}

/// Inclusive bounds on a number or a collection length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValueRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, n: f64) -> bool {
        self.min.map_or(true, |min| n >= min) && self.max.map_or(true, |max| n <= max)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{min}..={max}"),
            (Some(min), None) => write!(f, "{min}.."),
            (None, Some(max)) => write!(f, "..={max}"),
            (None, None) => f.write_str(".."),
        }
    }
}

/// A struct field: a named (or computed-key) pair, or a spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructField {
    Pair {
        key: FieldKey,
        #[serde(rename = "type")]
        value_type: Schema,
        #[serde(default)]
        optional: bool,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
    /// Catch-all for keys no pair consumed.
    Spread {
        #[serde(rename = "type")]
        value_type: Schema,
        #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
    },
}

impl StructField {
    /// A required pair with a literal key.
    pub fn pair(key: impl Into<String>, value_type: Schema) -> Self {
        StructField::Pair {
            key: FieldKey::Name(key.into()),
            value_type,
            optional: false,
            attributes: Vec::new(),
        }
    }

    /// An optional pair with a literal key.
    pub fn optional(key: impl Into<String>, value_type: Schema) -> Self {
        StructField::Pair {
            key: FieldKey::Name(key.into()),
            value_type,
            optional: true,
            attributes: Vec::new(),
        }
    }

    pub fn spread(value_type: Schema) -> Self {
        StructField::Spread {
            value_type,
            attributes: Vec::new(),
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            StructField::Pair { attributes, .. } | StructField::Spread { attributes, .. } => {
                attributes
            }
        }
    }
}

/// Key of a struct pair: a literal name, or a schema every matching key
/// must satisfy (`[string]: int`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldKey {
    Name(String),
    Computed(Box<Schema>),
}

/// Runtime type of an enum's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumKind {
    String,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl EnumKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumKind::String => "string",
            EnumKind::Byte => "byte",
            EnumKind::Short => "short",
            EnumKind::Int => "int",
            EnumKind::Long => "long",
            EnumKind::Float => "float",
            EnumKind::Double => "double",
        }
    }

    /// Runtime type check ahead of the membership test.
    pub fn admits(&self, data: &Value) -> bool {
        match self {
            EnumKind::String => data.is_string(),
            EnumKind::Byte => data.is_boolean() || is_integer(data),
            EnumKind::Short | EnumKind::Int | EnumKind::Long => is_integer(data),
            EnumKind::Float | EnumKind::Double => data.is_number(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub identifier: String,
    pub value: EnumLiteral,
}

/// Value of an enum member. Membership ignores the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumLiteral {
    Int(i64),
    Float(f64),
    String(String),
}

impl EnumLiteral {
    pub fn matches(&self, data: &Value) -> bool {
        match self {
            EnumLiteral::String(s) => data.as_str() == Some(s.as_str()),
            EnumLiteral::Int(n) => match data {
                Value::Bool(b) => i64::from(*b) == *n,
                other => match integer_of(other) {
                    Some(i) => i == *n,
                    None => other.as_f64() == Some(*n as f64),
                },
            },
            EnumLiteral::Float(f) => data.as_f64() == Some(*f),
        }
    }
}

impl fmt::Display for EnumLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumLiteral::Int(n) => write!(f, "{n}"),
            EnumLiteral::Float(x) => write!(f, "{x}"),
            EnumLiteral::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// How a dispatcher obtains its discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatcherIndex {
    /// Walk the data along `accessor`.
    Dynamic { accessor: Vec<AccessorStep> },
    /// A constant discriminant.
    Static { value: String },
}

/// One step of a dynamic accessor walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccessorStep {
    Index(usize),
    Key(String),
    /// `{"keyword": "parent"}` steps to the enclosing value; a final
    /// `{"keyword": "key"}` yields the map key the value is stored under.
    Keyword { keyword: String },
}

impl Schema {
    /// Decode a raw corpus definition and prune it for `version`.
    ///
    /// Decoding never fails: a definition that does not fit the schema
    /// language is logged and replaced by [`Schema::Absent`], so one bad
    /// entry cannot take the rest of the corpus down with it.
    pub fn decode(raw: &Value, version: &GameVersion) -> Schema {
        match Schema::deserialize(raw) {
            Ok(schema) => schema.prune(version),
            Err(e) => {
                tracing::warn!(error = %e, "malformed schema definition; treating as absent");
                tracing::debug!(definition = %raw, "rejected schema definition");
                Schema::Absent
            }
        }
    }

    /// Attributes of this node (empty for [`Schema::Absent`]).
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Schema::Reference { attributes, .. }
            | Schema::Union { attributes, .. }
            | Schema::List { attributes, .. }
            | Schema::IntArray { attributes, .. }
            | Schema::FloatArray { attributes, .. }
            | Schema::String { attributes }
            | Schema::Int { attributes, .. }
            | Schema::Float { attributes, .. }
            | Schema::Boolean { attributes }
            | Schema::Byte { attributes }
            | Schema::Literal { attributes, .. }
            | Schema::Struct { attributes, .. }
            | Schema::Enum { attributes, .. }
            | Schema::Dispatcher { attributes, .. } => attributes,
            Schema::Absent => &[],
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Schema::Absent)
    }

    /// Short description of the expected shape, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Schema::Reference { path, .. } => path.clone(),
            Schema::Union { members, .. } => format!("union of {}", members.len()),
            Schema::List { item, .. } => format!("list[{}]", item.describe()),
            Schema::IntArray { .. } => "list[int]".to_string(),
            Schema::FloatArray { .. } => "list[float]".to_string(),
            Schema::String { .. } => "string".to_string(),
            Schema::Int { .. } => "int".to_string(),
            Schema::Float { .. } => "float".to_string(),
            Schema::Boolean { .. } => "boolean".to_string(),
            Schema::Byte { .. } => "byte".to_string(),
            Schema::Literal { value, .. } => value.to_string(),
            Schema::Struct { .. } => "struct".to_string(),
            Schema::Enum { enum_kind, .. } => format!("enum<{}>", enum_kind.as_str()),
            Schema::Dispatcher { registry, .. } => format!("{registry}[...]"),
            Schema::Absent => "any".to_string(),
        }
    }

    // ---- attribute-free constructors ----

    pub fn reference(path: impl Into<String>) -> Self {
        Schema::Reference {
            path: path.into(),
            attributes: Vec::new(),
        }
    }

    pub fn union(members: Vec<Schema>) -> Self {
        Schema::Union {
            members,
            attributes: Vec::new(),
        }
    }

    pub fn list(item: Schema, length_range: Option<ValueRange>) -> Self {
        Schema::List {
            item: Box::new(item),
            length_range,
            attributes: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Schema::String {
            attributes: Vec::new(),
        }
    }

    pub fn int(value_range: Option<ValueRange>) -> Self {
        Schema::Int {
            value_range,
            attributes: Vec::new(),
        }
    }

    pub fn float(value_range: Option<ValueRange>) -> Self {
        Schema::Float {
            value_range,
            attributes: Vec::new(),
        }
    }

    pub fn boolean() -> Self {
        Schema::Boolean {
            attributes: Vec::new(),
        }
    }

    pub fn structure(fields: Vec<StructField>) -> Self {
        Schema::Struct {
            fields,
            attributes: Vec::new(),
        }
    }

    pub fn dispatcher(registry: impl Into<String>, parallel_indices: Vec<DispatcherIndex>) -> Self {
        Schema::Dispatcher {
            parallel_indices,
            registry: registry.into(),
            attributes: Vec::new(),
        }
    }
}

/// Integral value of a JSON number, if it has one.
pub(crate) fn integer_of(data: &Value) -> Option<i64> {
    match data {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// True for numbers without a fractional representation.
pub(crate) fn is_integer(data: &Value) -> bool {
    matches!(data, Value::Number(n) if n.is_i64() || n.is_u64())
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
