//! # Schema Resolver
//!
//! Turns corpus paths into decoded, version-pruned [`Schema`] nodes and
//! memoizes the result, so every path is decoded at most once per corpus
//! generation.
//!
//! ## Cache discipline
//!
//! The cache is one generation: a corpus snapshot plus the memo maps
//! filled from it. Lookups read-check the memo, decode on a miss outside
//! any lock, and insert only if no other thread got there first, so a
//! caller never sees a half-built entry. Two threads may decode the same
//! path concurrently; decoding is a pure function of the corpus, so the
//! loser's result is simply dropped.
//!
//! [`Resolver::reload`] replaces the whole generation atomically. A
//! validation that already holds the old generation finishes against it.
//!
//! ## Failure policy
//!
//! Resolution fails soft. A missing or malformed entry yields
//! [`Schema::Absent`] (or an empty [`Registry`]) plus a `warn` diagnostic.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use mcdoc_core::GameVersion;
use parking_lot::RwLock;
use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::corpus::Corpus;
use crate::model::Schema;

/// Namespace implied when a discriminant has none.
const DEFAULT_NAMESPACE: &str = "minecraft:";

/// Decoded dispatcher registry: discriminant to schema.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, Arc<Schema>>,
}

impl Registry {
    /// Look up a discriminant, falling back to the key without its
    /// `minecraft:` namespace.
    pub fn get(&self, key: &str) -> Option<&Arc<Schema>> {
        self.entries.get(key).or_else(|| {
            key.strip_prefix(DEFAULT_NAMESPACE)
                .and_then(|bare| self.entries.get(bare))
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered discriminants, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

impl FromIterator<(String, Schema)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, Schema)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
        }
    }
}

/// One corpus snapshot and everything decoded from it.
#[derive(Debug)]
struct Generation {
    corpus: Arc<Corpus>,
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
    registries: RwLock<HashMap<String, Arc<Registry>>>,
}

impl Generation {
    fn new(corpus: Arc<Corpus>) -> Self {
        Self {
            corpus,
            schemas: RwLock::new(HashMap::new()),
            registries: RwLock::new(HashMap::new()),
        }
    }
}

/// Memoizing resolver over a [`Corpus`], bound to one target version.
///
/// `Resolver` is `Send + Sync`; share one across threads by reference or
/// behind an `Arc`.
#[derive(Debug)]
pub struct Resolver {
    version: GameVersion,
    generation: RwLock<Arc<Generation>>,
}

impl Resolver {
    pub fn new(corpus: Corpus, version: GameVersion) -> Self {
        Self {
            version,
            generation: RwLock::new(Arc::new(Generation::new(Arc::new(corpus)))),
        }
    }

    /// Resolver for the version named in `config`.
    pub fn from_config(corpus: Corpus, config: &ValidatorConfig) -> Self {
        Self::new(corpus, config.version.clone())
    }

    /// The version nodes are pruned against.
    pub fn version(&self) -> &GameVersion {
        &self.version
    }

    /// The corpus of the current generation.
    pub fn corpus(&self) -> Arc<Corpus> {
        Arc::clone(&self.current().corpus)
    }

    /// Swap in a new corpus, discarding every cached entry.
    pub fn reload(&self, corpus: Corpus) {
        let fresh = Arc::new(Generation::new(Arc::new(corpus)));
        *self.generation.write() = fresh;
        tracing::info!("schema corpus reloaded; resolver cache cleared");
    }

    /// Decode and prune a raw definition for this resolver's version.
    pub fn decode(&self, definition: &Value) -> Schema {
        Schema::decode(definition, &self.version)
    }

    /// Resolve a named schema. Unknown paths resolve to [`Schema::Absent`].
    pub fn resolve(&self, path: &str) -> Arc<Schema> {
        self.snapshot().resolve(path)
    }

    /// Resolve a named schema, or `None` if the corpus has no such path.
    ///
    /// A path that exists but fails to decode still resolves (to
    /// [`Schema::Absent`]).
    pub fn try_resolve(&self, path: &str) -> Option<Arc<Schema>> {
        self.snapshot().try_resolve(path)
    }

    /// Resolve a dispatcher registry. A missing registry, or one that is
    /// not a map, resolves to an empty registry.
    pub fn resolve_registry(&self, path: &str) -> Arc<Registry> {
        self.snapshot().resolve_registry(path)
    }

    /// Pin the current generation. Lookups through the snapshot keep
    /// using it even if the resolver is reloaded meanwhile.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            version: &self.version,
            generation: self.current(),
        }
    }

    /// Number of decoded schemas cached in the current generation.
    pub fn cached_schemas(&self) -> usize {
        self.current().schemas.read().len()
    }

    fn current(&self) -> Arc<Generation> {
        Arc::clone(&*self.generation.read())
    }
}

/// A resolver pinned to one cache generation.
#[derive(Debug, Clone)]
pub struct Snapshot<'r> {
    version: &'r GameVersion,
    generation: Arc<Generation>,
}

impl Snapshot<'_> {
    pub fn resolve(&self, path: &str) -> Arc<Schema> {
        self.try_resolve(path).unwrap_or_else(|| {
            tracing::warn!(path, "unresolved schema reference");
            Arc::new(Schema::Absent)
        })
    }

    pub fn try_resolve(&self, path: &str) -> Option<Arc<Schema>> {
        if let Some(hit) = self.generation.schemas.read().get(path) {
            return Some(Arc::clone(hit));
        }

        let definition = self.generation.corpus.schema(path)?;
        let decoded = Arc::new(Schema::decode(definition, self.version));
        if decoded.is_absent() {
            tracing::debug!(path, "schema resolved to absent");
        }

        let mut schemas = self.generation.schemas.write();
        let entry = schemas.entry(path.to_string()).or_insert(decoded);
        Some(Arc::clone(entry))
    }

    pub fn resolve_registry(&self, path: &str) -> Arc<Registry> {
        if let Some(hit) = self.generation.registries.read().get(path) {
            return Arc::clone(hit);
        }

        let decoded = Arc::new(match self.generation.corpus.registry(path) {
            Some(Value::Object(entries)) => entries
                .iter()
                .map(|(key, definition)| (key.clone(), Schema::decode(definition, self.version)))
                .collect(),
            Some(other) => {
                tracing::warn!(
                    registry = path,
                    found = crate::error::value_kind(other),
                    "dispatcher registry is not a map"
                );
                Registry::default()
            }
            None => {
                tracing::warn!(registry = path, "unknown dispatcher registry");
                Registry::default()
            }
        });

        let mut registries = self.generation.registries.write();
        let entry = registries.entry(path.to_string()).or_insert(decoded);
        Arc::clone(entry)
    }
}
