//! # Document Loading
//!
//! Documents under validation are JSON or YAML, chosen by file extension.
//! YAML is converted into the JSON value tree the validator works on;
//! conversion failures name the file and the location inside it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use mcdoc_core::KeyPath;
use serde_json::Value;
use serde_yaml::Value as Yaml;

/// Read a document. `.yaml`/`.yml` files are parsed as YAML, everything
/// else as JSON.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read document {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => {
            let yaml: Yaml = serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?;
            yaml_to_json(yaml, &KeyPath::root())
                .with_context(|| format!("{} has no JSON equivalent", path.display()))
        }
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display())),
    }
}

/// Tags are dropped and scalar map keys become strings. Anything else
/// fails with the location `at` of the offending node.
fn yaml_to_json(yaml: Yaml, at: &KeyPath) -> Result<Value> {
    let value = match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                match n.as_f64().and_then(serde_json::Number::from_f64) {
                    Some(f) => Value::Number(f),
                    None => bail!("{at}: number {n} is not finite"),
                }
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| yaml_to_json(item, &at.index(i)))
                .collect::<Result<_>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => bail!("{at}: map keys must be scalars"),
                };
                let value = yaml_to_json(value, &at.key(key.as_str()))?;
                object.insert(key, value);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value, at)?,
    };
    Ok(value)
}
