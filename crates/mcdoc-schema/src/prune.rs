//! # Version Pruning
//!
//! Strips schema nodes and struct fields that do not exist in the target
//! game version. A node is kept iff every `until` attribute names a
//! version strictly greater than the target and every `since` attribute
//! names a version less than or equal to it.
//!
//! Pruning is total: it never fails. Removed nodes in required slots
//! (list items, field types, the root) become [`Schema::Absent`]; removed
//! struct fields and union members are dropped from their lists.

use mcdoc_core::GameVersion;

use crate::model::{Attribute, FieldKey, Schema, StructField};

/// Whether a node carrying `attributes` exists in `version`.
pub fn is_applicable(attributes: &[Attribute], version: &GameVersion) -> bool {
    attributes.iter().all(|attr| {
        let bound = match attr.name.as_str() {
            "since" | "until" => attr.string_literal(),
            _ => None,
        };
        let Some(raw) = bound else {
            return true;
        };
        let bound = match GameVersion::parse(raw) {
            Ok(bound) => bound,
            Err(e) => {
                tracing::warn!(attribute = %attr.name, error = %e, "ignoring unparseable version attribute");
                return true;
            }
        };
        if attr.name == "since" {
            *version >= bound
        } else {
            *version < bound
        }
    })
}

impl Schema {
    /// Remove everything that does not apply to `version`.
    pub fn prune(self, version: &GameVersion) -> Schema {
        if !is_applicable(self.attributes(), version) {
            return Schema::Absent;
        }

        match self {
            Schema::Union { members, attributes } => Schema::Union {
                members: members
                    .into_iter()
                    .filter(|m| is_applicable(m.attributes(), version))
                    .map(|m| m.prune(version))
                    .collect(),
                attributes,
            },
            Schema::List {
                item,
                length_range,
                attributes,
            } => Schema::List {
                item: Box::new(item.prune(version)),
                length_range,
                attributes,
            },
            Schema::Struct { fields, attributes } => Schema::Struct {
                fields: fields
                    .into_iter()
                    .filter(|f| is_applicable(f.attributes(), version))
                    .map(|f| prune_field(f, version))
                    .collect(),
                attributes,
            },
            leaf @ (Schema::Reference { .. }
            | Schema::IntArray { .. }
            | Schema::FloatArray { .. }
            | Schema::String { .. }
            | Schema::Int { .. }
            | Schema::Float { .. }
            | Schema::Boolean { .. }
            | Schema::Byte { .. }
            | Schema::Literal { .. }
            | Schema::Enum { .. }
            | Schema::Dispatcher { .. }
            | Schema::Absent) => leaf,
        }
    }
}

fn prune_field(field: StructField, version: &GameVersion) -> StructField {
    match field {
        StructField::Pair {
            key,
            value_type,
            optional,
            attributes,
        } => StructField::Pair {
            key: match key {
                FieldKey::Computed(schema) => FieldKey::Computed(Box::new(schema.prune(version))),
                name @ FieldKey::Name(_) => name,
            },
            value_type: value_type.prune(version),
            optional,
            attributes,
        },
        StructField::Spread {
            value_type,
            attributes,
        } => StructField::Spread {
            value_type: value_type.prune(version),
            attributes,
        },
    }
}
