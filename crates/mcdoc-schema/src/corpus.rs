//! # Schema Corpus
//!
//! The raw, already-fetched schema documents a [`Resolver`] reads from:
//!
//! - `schemas`: reference path (`::java::world::item::ItemStack`) to a raw
//!   schema definition.
//! - `registries`: registry path (`minecraft:data_component`) to a map of
//!   discriminant to raw schema definition.
//!
//! The symbol-document layout produced by the upstream fetch layer is
//!
//! ```json
//! { "mcdoc": { "<path>": { ... } }, "mcdoc/dispatcher": { "<registry>": { "<key>": { ... } } } }
//! ```
//!
//! A corpus is an immutable snapshot. Replacing it goes through
//! [`Resolver::reload`](crate::Resolver::reload).
//!
//! [`Resolver`]: crate::Resolver

use std::collections::HashMap;
use std::path::Path;

use mcdoc_core::McdocError;
use serde_json::{Map, Value};

/// Section holding named schema definitions.
pub const SCHEMAS_SECTION: &str = "mcdoc";
/// Section holding dispatcher registries.
pub const REGISTRIES_SECTION: &str = "mcdoc/dispatcher";

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    schemas: HashMap<String, Value>,
    /// Kept raw: a registry that is not a map is reported at resolution.
    registries: HashMap<String, Value>,
}

impl Corpus {
    /// Build a corpus from a parsed symbol document.
    ///
    /// Either section may be missing; a missing section is logged and
    /// treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`McdocError::Load`] if the document or one of its sections
    /// is not a JSON object.
    pub fn from_symbols(symbols: Value) -> Result<Self, McdocError> {
        let Value::Object(mut root) = symbols else {
            return Err(McdocError::load("symbol document", "top level must be an object"));
        };

        let schemas = take_section(&mut root, SCHEMAS_SECTION)?;
        let registries = take_section(&mut root, REGISTRIES_SECTION)?;

        tracing::debug!(
            schemas = schemas.len(),
            registries = registries.len(),
            "loaded schema corpus"
        );

        Ok(Self {
            schemas: schemas.into_iter().collect(),
            registries: registries.into_iter().collect(),
        })
    }

    /// Read and parse a symbol document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`McdocError::Read`] if the file cannot be read and
    /// [`McdocError::Load`] if it is not a valid symbol document.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, McdocError> {
        let path = path.as_ref();
        let content = McdocError::read_to_string(path)?;
        let symbols: Value = serde_json::from_str(&content)
            .map_err(|e| McdocError::load(path.display().to_string(), format!("invalid JSON: {e}")))?;
        Self::from_symbols(symbols).map_err(|e| match e {
            McdocError::Load { reason, .. } => McdocError::load(path.display().to_string(), reason),
            other => other,
        })
    }

    /// Add or replace a named schema definition.
    pub fn with_schema(mut self, path: impl Into<String>, definition: Value) -> Self {
        self.schemas.insert(path.into(), definition);
        self
    }

    /// Add or replace a registry (expected to be a map of key to definition).
    pub fn with_registry(mut self, path: impl Into<String>, entries: Value) -> Self {
        self.registries.insert(path.into(), entries);
        self
    }

    pub fn schema(&self, path: &str) -> Option<&Value> {
        self.schemas.get(path)
    }

    pub fn registry(&self, path: &str) -> Option<&Value> {
        self.registries.get(path)
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub fn registry_count(&self) -> usize {
        self.registries.len()
    }

    /// Names of all schemas, sorted alphabetically.
    pub fn schema_paths(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Names of all registries, sorted alphabetically.
    pub fn registry_paths(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.registries.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

fn take_section(root: &mut Map<String, Value>, name: &str) -> Result<Map<String, Value>, McdocError> {
    match root.remove(name) {
        Some(Value::Object(section)) => Ok(section),
        Some(other) => Err(McdocError::load(
            "symbol document",
            format!("section {name:?} must be an object, found {}", crate::error::value_kind(&other)),
        )),
        None => {
            tracing::warn!(section = name, "symbol document has no such section; treating as empty");
            Ok(Map::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_from_symbols_reads_both_sections() {
        let corpus = Corpus::from_symbols(json!({
            "mcdoc": { "::a::B": { "kind": "string" }, "::a::A": { "kind": "int" } },
            "mcdoc/dispatcher": { "minecraft:entity": { "zombie": { "kind": "struct", "fields": [] } } },
            "other": 1
        }))
        .unwrap();
        assert_eq!(corpus.schema_count(), 2);
        assert_eq!(corpus.registry_count(), 1);
        assert_eq!(corpus.schema_paths(), vec!["::a::A", "::a::B"]);
        assert!(corpus.registry("minecraft:entity").is_some());
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let corpus = Corpus::from_symbols(json!({})).unwrap();
        assert_eq!(corpus.schema_count(), 0);
        assert_eq!(corpus.registry_count(), 0);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(Corpus::from_symbols(json!([])).is_err());
        assert!(Corpus::from_symbols(json!({ "mcdoc": [] })).is_err());
    }

    #[test]
    fn test_builder() {
        let corpus = Corpus::default()
            .with_schema("::x", json!({ "kind": "boolean" }))
            .with_registry("r", json!({}));
        assert_eq!(corpus.schema("::x"), Some(&json!({ "kind": "boolean" })));
        assert_eq!(corpus.registry_paths(), vec!["r"]);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mcdoc": {{"::x": {{"kind": "string"}}}}}}"#).unwrap();
        let corpus = Corpus::from_path(file.path()).unwrap();
        assert_eq!(corpus.schema_count(), 1);
    }

    #[test]
    fn test_from_path_invalid_json_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = Corpus::from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = Corpus::from_path("/nonexistent/mcdoc/symbols.json").unwrap_err();
        assert!(matches!(&err, McdocError::Read { path, .. } if path == "/nonexistent/mcdoc/symbols.json"));
    }
}
