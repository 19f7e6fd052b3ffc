//! # Validation
//!
//! Recursive matching of a JSON-like document against a [`Schema`].
//!
//! ## Propagation
//!
//! Scalar checks fail atomically. Structs, sequences and unions aggregate:
//! they examine every field, element or member and return all failures as
//! children of one [`ErrorTree`] node. Union success discards the failures
//! of the members tried before it.
//!
//! A [`SchemaDefinitionError`] is never aggregated. It aborts the whole
//! call, because no other member or field can make an ambiguous schema
//! valid.
//!
//! ## Dispatchers
//!
//! A dispatcher extracts a discriminant from the data (first index whose
//! accessor walk succeeds), looks it up in its registry and validates the
//! *whole* value against the registered schema. The special registry
//! entries `%none` (no discriminant found) and `%unknown` (discriminant not
//! registered) apply when present; otherwise the dispatcher fails with
//! `DispatcherUnresolved`.
//!
//! ## Termination
//!
//! Every nested check counts towards `max_depth`, so a reference cycle
//! with no base case ends in `RecursionLimitExceeded` instead of a stack
//! overflow. A reference entered again on the very value it is already
//! being checked against fails at once with the same kind.

use std::cell::RefCell;
use std::collections::HashSet;

use mcdoc_core::{KeyPath, PathSegment};
use serde_json::{Map, Value};

use crate::config::{ValidatorConfig, DEFAULT_MAX_DEPTH};
use crate::error::{ErrorKind, ErrorTree, RangeSubject, SchemaDefinitionError, ValidateError};
use crate::model::{
    is_integer, AccessorStep, DispatcherIndex, EnumKind, EnumValue, FieldKey, Schema, StructField,
    ValueRange,
};
use crate::resolver::{Resolver, Snapshot};

/// Registry entry used when no index yields a discriminant.
pub const NONE_KEY: &str = "%none";
/// Registry entry used when the discriminant is not registered.
pub const UNKNOWN_KEY: &str = "%unknown";

/// Validates documents against schemas resolved through a [`Resolver`].
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    resolver: &'r Resolver,
    max_depth: usize,
}

impl<'r> Validator<'r> {
    pub fn new(resolver: &'r Resolver) -> Self {
        Self {
            resolver,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_config(resolver: &'r Resolver, config: &ValidatorConfig) -> Self {
        Self::new(resolver).with_max_depth(config.max_depth)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn run(&self) -> Run<'r> {
        Run {
            snapshot: self.resolver.snapshot(),
            max_depth: self.max_depth,
            active: RefCell::new(HashSet::new()),
        }
    }

    /// Validate `data` against `schema`. `path` locates `data` inside the
    /// enclosing document and prefixes every reported error path.
    ///
    /// # Errors
    ///
    /// - [`ValidateError::Invalid`] with the full error tree if the data does
    ///   not conform.
    /// - [`ValidateError::SchemaDefinition`] if the schema is ambiguous.
    pub fn validate(&self, data: &Value, schema: &Schema, path: &KeyPath) -> Result<(), ValidateError> {
        let run = self.run();
        run.check(data, schema, Scope::root(path))
    }

    /// Validate `data` against the corpus entry at `schema_path`. A path
    /// missing from the corpus is reported as a type mismatch.
    pub fn validate_reference(&self, data: &Value, schema_path: &str) -> Result<(), ValidateError> {
        self.validate(data, &Schema::reference(schema_path), &KeyPath::root())
    }

    /// Validate `data` against the entry `key` of dispatcher registry
    /// `registry`.
    pub fn validate_registry_entry(&self, data: &Value, registry: &str, key: &str) -> Result<(), ValidateError> {
        let run = self.run();
        let root = KeyPath::root();
        match run.snapshot.resolve_registry(registry).get(key) {
            Some(schema) => run.check(data, schema, Scope::root(&root)),
            None => Err(unregistered(&root, data, registry, key).into()),
        }
    }

    /// Validate every entry of the map `data` against the registry entry
    /// named by its key, the way item components are checked against
    /// `minecraft:data_component`. Unregistered keys fail with
    /// `DispatcherUnresolved`.
    pub fn validate_registry_map(&self, data: &Value, registry: &str) -> Result<(), ValidateError> {
        let run = self.run();
        let root = KeyPath::root();
        let Value::Object(map) = data else {
            return Err(ErrorTree::type_mismatch(&root, data, "struct").into());
        };

        let entries = run.snapshot.resolve_registry(registry);
        let mut errors = Vec::new();
        for (key, value) in map {
            let path = root.key(key);
            match entries.get(key) {
                Some(schema) => {
                    collect(run.check(value, schema, Scope::root(&path).child_of(data)), &mut errors)?
                }
                None => errors.push(unregistered(&path, value, registry, key)),
            }
        }
        aggregate_fields(&root, data, errors)
    }
}

/// Position of the value under inspection.
#[derive(Debug, Clone, Copy)]
struct Scope<'a> {
    path: &'a KeyPath,
    /// The value containing the one under inspection.
    parent: Option<&'a Value>,
    /// Set while validating the leftover keys of a struct against its
    /// spread; `parent` is then the whole struct.
    in_spread: bool,
    depth: usize,
}

impl<'a> Scope<'a> {
    fn root(path: &'a KeyPath) -> Self {
        Self {
            path,
            parent: None,
            in_spread: false,
            depth: 0,
        }
    }

    /// Same value, one level deeper (references, union members, dispatch).
    fn deeper(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    /// A value nested inside `parent` at `path`.
    fn child<'b>(&self, path: &'b KeyPath, parent: &'b Value) -> Scope<'b> {
        Scope {
            path,
            parent: Some(parent),
            in_spread: false,
            depth: self.depth + 1,
        }
    }

    fn child_of(self, parent: &'a Value) -> Self {
        Self {
            parent: Some(parent),
            ..self
        }
    }

    /// The map key the value sits under, if any.
    fn key(&self) -> Option<&'a str> {
        match self.path.last() {
            Some(PathSegment::Key(k)) => Some(k.as_str()),
            _ => None,
        }
    }
}

/// State of one validation call, pinned to one resolver generation.
struct Run<'r> {
    snapshot: Snapshot<'r>,
    max_depth: usize,
    /// References being checked, keyed by the address of the value they
    /// are checked against. Entering one again while it is in progress
    /// means the schema loops without consuming data.
    active: RefCell<HashSet<(String, *const Value)>>,
}

impl Run<'_> {
    fn check(&self, data: &Value, schema: &Schema, scope: Scope<'_>) -> Result<(), ValidateError> {
        let path = scope.path;
        if scope.depth > self.max_depth {
            return Err(ErrorTree::new(
                path,
                Some(data),
                ErrorKind::RecursionLimitExceeded {
                    limit: self.max_depth,
                },
                format!("schema nesting exceeds {} levels", self.max_depth),
            )
            .into());
        }

        match schema {
            Schema::Absent => Ok(()),

            Schema::Reference {
                path: reference, ..
            } => match self.snapshot.try_resolve(reference) {
                Some(resolved) => {
                    let entry = (reference.clone(), data as *const Value);
                    if !self.active.borrow_mut().insert(entry.clone()) {
                        return Err(ErrorTree::new(
                            path,
                            Some(data),
                            ErrorKind::RecursionLimitExceeded {
                                limit: self.max_depth,
                            },
                            format!("schema reference {reference} re-enters itself on the same value"),
                        )
                        .into());
                    }
                    let result = self.check(data, &resolved, scope.deeper());
                    self.active.borrow_mut().remove(&entry);
                    result
                }
                None => Err(ErrorTree::new(
                    path,
                    Some(data),
                    ErrorKind::TypeMismatch {
                        expected: reference.clone(),
                    },
                    format!("unresolved schema reference {reference}"),
                )
                .into()),
            },

            Schema::Union { members, .. } => self.check_union(data, members, scope),

            Schema::List {
                item, length_range, ..
            } => {
                let expected = schema.describe();
                self.check_sequence(data, &expected, length_range.as_ref(), scope, |elem, child| {
                    self.check(elem, item, child)
                })
            }

            Schema::IntArray {
                length_range,
                value_range,
                ..
            } => self.check_sequence(data, "list[int]", length_range.as_ref(), scope, |elem, child| {
                if !is_integer(elem) {
                    return Err(ErrorTree::type_mismatch(child.path, elem, "int").into());
                }
                check_range(elem, value_range.as_ref(), child.path)
            }),

            Schema::FloatArray { length_range, .. } => {
                self.check_sequence(data, "list[float]", length_range.as_ref(), scope, |elem, child| {
                    if elem.is_f64() {
                        Ok(())
                    } else {
                        Err(ErrorTree::type_mismatch(child.path, elem, "float").into())
                    }
                })
            }

            Schema::String { .. } => expect(data.is_string(), path, data, "string"),

            Schema::Boolean { .. } => expect(data.is_boolean(), path, data, "boolean"),

            Schema::Byte { .. } => expect(data.is_boolean() || is_integer(data), path, data, "byte"),

            Schema::Int { value_range, .. } => {
                expect(is_integer(data), path, data, "int")?;
                check_range(data, value_range.as_ref(), path)
            }

            // Integers satisfy float schemas.
            Schema::Float { value_range, .. } => {
                expect(data.is_number(), path, data, "float")?;
                check_range(data, value_range.as_ref(), path)
            }

            Schema::Literal { value, .. } => {
                if value.matches(data) {
                    Ok(())
                } else {
                    Err(ErrorTree::new(
                        path,
                        Some(data),
                        ErrorKind::LiteralMismatch {
                            expected: value.clone(),
                        },
                        format!("expected literal {value}, found {data}"),
                    )
                    .into())
                }
            }

            Schema::Struct { fields, .. } => self.check_struct(data, fields, scope),

            Schema::Enum {
                enum_kind, values, ..
            } => check_enum(data, *enum_kind, values, path),

            Schema::Dispatcher {
                parallel_indices,
                registry,
                ..
            } => self.check_dispatcher(data, parallel_indices, registry, scope),
        }
    }

    fn check_union(&self, data: &Value, members: &[Schema], scope: Scope<'_>) -> Result<(), ValidateError> {
        let mut failures = Vec::with_capacity(members.len());
        for member in members {
            match self.check(data, member, scope.deeper()) {
                Ok(()) => return Ok(()),
                Err(ValidateError::Invalid(tree)) => failures.push(*tree),
                Err(e @ ValidateError::SchemaDefinition(_)) => return Err(e),
            }
        }

        let message = if members.is_empty() {
            "no union member applies".to_string()
        } else {
            format!("value matches none of the {} union members", members.len())
        };
        Err(ErrorTree::new(
            scope.path,
            Some(data),
            ErrorKind::UnionExhausted {
                tried: members.len(),
            },
            message,
        )
        .with_children(failures)
        .into())
    }

    /// Shared by lists and typed arrays: length first, then every element.
    fn check_sequence<F>(
        &self,
        data: &Value,
        expected: &str,
        length_range: Option<&ValueRange>,
        scope: Scope<'_>,
        mut check_item: F,
    ) -> Result<(), ValidateError>
    where
        F: FnMut(&Value, Scope<'_>) -> Result<(), ValidateError>,
    {
        let path = scope.path;
        let Value::Array(items) = data else {
            return Err(ErrorTree::type_mismatch(path, data, expected).into());
        };

        let mut errors = Vec::new();
        if let Some(range) = length_range {
            let len = items.len() as f64;
            if !range.contains(len) {
                errors.push(ErrorTree::range(path, data, RangeSubject::Length, len, *range));
            }
        }

        for (i, item) in items.iter().enumerate() {
            let child = path.index(i);
            collect(check_item(item, scope.child(&child, data)), &mut errors)?;
        }

        if errors.is_empty() {
            return Ok(());
        }
        let message = format!("{} invalid element(s) in {expected}", errors.len());
        Err(ErrorTree::new(
            path,
            Some(data),
            ErrorKind::InvalidItems {
                expected: expected.to_string(),
            },
            message,
        )
        .with_children(errors)
        .into())
    }

    fn check_struct(&self, data: &Value, fields: &[StructField], scope: Scope<'_>) -> Result<(), ValidateError> {
        let path = scope.path;

        let spreads: Vec<&Schema> = fields
            .iter()
            .filter_map(|f| match f {
                StructField::Spread { value_type, .. } => Some(value_type),
                StructField::Pair { .. } => None,
            })
            .collect();
        if spreads.len() > 1 {
            return Err(SchemaDefinitionError::DuplicateSpread {
                path: path.clone(),
                count: spreads.len(),
            }
            .into());
        }

        let Value::Object(map) = data else {
            return Err(ErrorTree::type_mismatch(path, data, "struct").into());
        };

        let mut errors = Vec::new();
        let mut consumed: HashSet<&str> = HashSet::new();
        let mut computed: Vec<(&Schema, &Schema)> = Vec::new();

        for field in fields {
            let StructField::Pair {
                key,
                value_type,
                optional,
                ..
            } = field
            else {
                continue;
            };
            match key {
                FieldKey::Name(name) => match map.get(name) {
                    Some(value) => {
                        consumed.insert(name.as_str());
                        let child = path.key(name);
                        collect(self.check(value, value_type, scope.child(&child, data)), &mut errors)?;
                    }
                    None if !optional => errors.push(ErrorTree::new(
                        &path.key(name),
                        None,
                        ErrorKind::MissingField {
                            field: name.clone(),
                            expected: value_type.describe(),
                        },
                        format!("missing required field {name:?}"),
                    )),
                    None => {}
                },
                FieldKey::Computed(key_schema) => computed.push((key_schema, value_type)),
            }
        }

        if !computed.is_empty() {
            self.check_computed_keys(data, map, &computed, &mut consumed, scope, &mut errors)?;
        }

        let remaining: Vec<(&String, &Value)> = map
            .iter()
            .filter(|(k, _)| !consumed.contains(k.as_str()))
            .collect();

        match spreads.first() {
            Some(spread) => self.check_spread(data, &remaining, spread, scope, &mut errors)?,
            None => {
                for (key, value) in remaining {
                    errors.push(ErrorTree::new(
                        &path.key(key),
                        Some(value),
                        ErrorKind::UnexpectedField { field: key.clone() },
                        format!("unexpected field {key:?}"),
                    ));
                }
            }
        }

        aggregate_fields(path, data, errors)
    }

    /// Keys no named pair consumed are matched against computed-key pairs
    /// in declaration order; the first whose key schema accepts the key
    /// claims it.
    fn check_computed_keys<'d>(
        &self,
        data: &Value,
        map: &'d Map<String, Value>,
        computed: &[(&Schema, &Schema)],
        consumed: &mut HashSet<&'d str>,
        scope: Scope<'_>,
        errors: &mut Vec<ErrorTree>,
    ) -> Result<(), SchemaDefinitionError> {
        for (key, value) in map {
            if consumed.contains(key.as_str()) {
                continue;
            }
            let key_value = Value::String(key.clone());
            let child = scope.path.key(key);
            for (key_schema, value_type) in computed {
                match self.check(&key_value, key_schema, scope.child(&child, data)) {
                    Ok(()) => {
                        consumed.insert(key.as_str());
                        collect(self.check(value, value_type, scope.child(&child, data)), errors)?;
                        break;
                    }
                    Err(ValidateError::Invalid(_)) => continue,
                    Err(ValidateError::SchemaDefinition(e)) => return Err(e),
                }
            }
        }
        Ok(())
    }

    /// Object-shaped spreads see the leftover keys as one sub-map; any
    /// other spread schema is applied to each leftover value.
    fn check_spread(
        &self,
        data: &Value,
        remaining: &[(&String, &Value)],
        spread: &Schema,
        scope: Scope<'_>,
        errors: &mut Vec<ErrorTree>,
    ) -> Result<(), SchemaDefinitionError> {
        if self.is_object_shaped(spread, &mut HashSet::new()) {
            // Nothing consumed: the slice is the struct itself, which keeps
            // its address visible to the reference cycle check.
            let owned;
            let slice = if data.as_object().is_some_and(|m| m.len() == remaining.len()) {
                data
            } else {
                owned = Value::Object(
                    remaining
                        .iter()
                        .map(|(k, v)| ((*k).clone(), (*v).clone()))
                        .collect(),
                );
                &owned
            };
            let slice_scope = Scope {
                path: scope.path,
                parent: Some(data),
                in_spread: true,
                depth: scope.depth + 1,
            };
            return collect(self.check(slice, spread, slice_scope), errors);
        }

        for (key, value) in remaining {
            let child = scope.path.key(*key);
            collect(self.check(value, spread, scope.child(&child, data)), errors)?;
        }
        Ok(())
    }

    /// `seen` holds every reference already followed; a reference reached
    /// again adds nothing, so each is resolved at most once.
    fn is_object_shaped(&self, schema: &Schema, seen: &mut HashSet<String>) -> bool {
        match schema {
            Schema::Struct { .. } | Schema::Dispatcher { .. } | Schema::Absent => true,
            Schema::Reference { path, .. } => {
                if !seen.insert(path.clone()) {
                    return false;
                }
                // A dangling reference is reported once, against the sub-map.
                self.snapshot
                    .try_resolve(path)
                    .map_or(true, |resolved| self.is_object_shaped(&resolved, seen))
            }
            Schema::Union { members, .. } => members.iter().any(|m| self.is_object_shaped(m, seen)),
            Schema::List { .. }
            | Schema::IntArray { .. }
            | Schema::FloatArray { .. }
            | Schema::String { .. }
            | Schema::Int { .. }
            | Schema::Float { .. }
            | Schema::Boolean { .. }
            | Schema::Byte { .. }
            | Schema::Literal { .. }
            | Schema::Enum { .. } => false,
        }
    }

    fn check_dispatcher(
        &self,
        data: &Value,
        indices: &[DispatcherIndex],
        registry_path: &str,
        scope: Scope<'_>,
    ) -> Result<(), ValidateError> {
        let path = scope.path;
        if !(data.is_object() || data.is_array()) {
            return Err(ErrorTree::type_mismatch(path, data, "struct or list").into());
        }

        let registry = self.snapshot.resolve_registry(registry_path);
        let discriminant = indices.iter().find_map(|index| discriminant(index, data, scope));

        let target = match &discriminant {
            Some(key) => registry.get(key).or_else(|| registry.get(UNKNOWN_KEY)),
            None => registry.get(NONE_KEY),
        };

        match target {
            Some(schema) => self.check(data, schema, scope.deeper()),
            None => {
                let message = match &discriminant {
                    _ if registry.is_empty() => {
                        format!("dispatcher registry {registry_path} is empty or missing")
                    }
                    Some(key) => format!("{key:?} is not registered in {registry_path}"),
                    None => format!("no dispatcher index yields a discriminant for {registry_path}"),
                };
                Err(ErrorTree::new(
                    path,
                    Some(data),
                    ErrorKind::DispatcherUnresolved {
                        registry: registry_path.to_string(),
                        key: discriminant,
                    },
                    message,
                )
                .into())
            }
        }
    }
}

/// Discriminant produced by one dispatcher index, if its walk succeeds.
fn discriminant(index: &DispatcherIndex, data: &Value, scope: Scope<'_>) -> Option<String> {
    match index {
        DispatcherIndex::Static { value } => Some(value.clone()),
        DispatcherIndex::Dynamic { accessor } => {
            walk(accessor, data, scope.parent, scope.key()).or_else(|| {
                // Leftover keys of a spread: the discriminant usually sits
                // on the enclosing struct.
                if scope.in_spread {
                    scope.parent.and_then(|whole| walk(accessor, whole, None, None))
                } else {
                    None
                }
            })
        }
    }
}

/// Follow `steps` from `start`. The walk must end on a string.
fn walk(steps: &[AccessorStep], start: &Value, parent: Option<&Value>, key: Option<&str>) -> Option<String> {
    let mut current = start;
    let mut up = parent;
    let mut current_key = key.map(str::to_string);

    for (i, step) in steps.iter().enumerate() {
        let next = match step {
            AccessorStep::Key(k) => {
                let next = current.as_object()?.get(k)?;
                current_key = Some(k.clone());
                up = Some(current);
                next
            }
            AccessorStep::Index(n) => {
                let next = current.as_array()?.get(*n)?;
                current_key = None;
                up = Some(current);
                next
            }
            AccessorStep::Keyword { keyword } => match keyword.as_str() {
                "parent" => {
                    let next = up.take()?;
                    current_key = None;
                    next
                }
                // `%key`: the name the current value is stored under.
                "key" if i + 1 == steps.len() => return current_key,
                _ => return None,
            },
        };
        current = next;
    }

    current.as_str().map(str::to_string)
}

fn check_enum(data: &Value, kind: EnumKind, values: &[EnumValue], path: &KeyPath) -> Result<(), ValidateError> {
    expect(kind.admits(data), path, data, kind.as_str())?;
    if values.iter().any(|v| v.value.matches(data)) {
        return Ok(());
    }
    let candidates: Vec<_> = values.iter().map(|v| v.value.clone()).collect();
    let listed = candidates
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ErrorTree::new(
        path,
        Some(data),
        ErrorKind::EnumMembership { candidates },
        format!("{data} is not one of [{listed}]"),
    )
    .into())
}

fn expect(ok: bool, path: &KeyPath, data: &Value, expected: &str) -> Result<(), ValidateError> {
    if ok {
        Ok(())
    } else {
        Err(ErrorTree::type_mismatch(path, data, expected).into())
    }
}

fn check_range(data: &Value, range: Option<&ValueRange>, path: &KeyPath) -> Result<(), ValidateError> {
    match (range, data.as_f64()) {
        (Some(range), Some(n)) if !range.contains(n) => {
            Err(ErrorTree::range(path, data, RangeSubject::Value, n, *range).into())
        }
        _ => Ok(()),
    }
}

fn unregistered(path: &KeyPath, data: &Value, registry: &str, key: &str) -> ErrorTree {
    ErrorTree::new(
        path,
        Some(data),
        ErrorKind::DispatcherUnresolved {
            registry: registry.to_string(),
            key: Some(key.to_string()),
        },
        format!("{key:?} is not registered in {registry}"),
    )
}

/// Fold a child result into `errors`; schema-definition errors escape.
fn collect(result: Result<(), ValidateError>, errors: &mut Vec<ErrorTree>) -> Result<(), SchemaDefinitionError> {
    match result {
        Ok(()) => Ok(()),
        Err(ValidateError::Invalid(tree)) => {
            errors.push(*tree);
            Ok(())
        }
        Err(ValidateError::SchemaDefinition(e)) => Err(e),
    }
}

fn aggregate_fields(path: &KeyPath, data: &Value, errors: Vec<ErrorTree>) -> Result<(), ValidateError> {
    if errors.is_empty() {
        return Ok(());
    }
    let message = format!("{} invalid field(s)", errors.len());
    Err(ErrorTree::new(path, Some(data), ErrorKind::InvalidFields, message)
        .with_children(errors)
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::model::{EnumLiteral, LiteralValue};
    use mcdoc_core::GameVersion;
    use serde_json::json;

    fn resolver(corpus: Corpus) -> Resolver {
        Resolver::new(corpus, GameVersion::parse("1.21.8").unwrap())
    }

    fn check(schema: &Schema, data: Value) -> Result<(), ValidateError> {
        let r = resolver(Corpus::default());
        Validator::new(&r).validate(&data, schema, &KeyPath::root())
    }

    fn tree(result: Result<(), ValidateError>) -> ErrorTree {
        match result {
            Err(ValidateError::Invalid(tree)) => *tree,
            other => panic!("expected data error, got {other:?}"),
        }
    }

    // ---- scalars ----

    #[test]
    fn test_string_boolean_byte() {
        assert!(check(&Schema::string(), json!("x")).is_ok());
        assert!(check(&Schema::string(), json!(1)).is_err());
        assert!(check(&Schema::boolean(), json!(false)).is_ok());
        assert!(check(&Schema::boolean(), json!(0)).is_err());
        let byte = Schema::Byte { attributes: vec![] };
        assert!(check(&byte, json!(true)).is_ok());
        assert!(check(&byte, json!(7)).is_ok());
        assert!(check(&byte, json!(7.5)).is_err());
    }

    #[test]
    fn test_int_rejects_fraction_and_checks_range() {
        let schema = Schema::int(Some(ValueRange::new(Some(0.0), Some(10.0))));
        assert!(check(&schema, json!(10)).is_ok());
        let err = tree(check(&schema, json!(2.5)));
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
        let err = tree(check(&schema, json!(11)));
        assert!(matches!(err.kind, ErrorKind::RangeViolation { subject: RangeSubject::Value, .. }));
    }

    #[test]
    fn test_float_accepts_integers() {
        let schema = Schema::float(Some(ValueRange::new(None, Some(1.0))));
        assert!(check(&schema, json!(1)).is_ok());
        assert!(check(&schema, json!(0.5)).is_ok());
        assert!(check(&schema, json!(1.5)).is_err());
        assert!(check(&schema, json!("1")).is_err());
    }

    #[test]
    fn test_literal() {
        let schema = Schema::Literal {
            value: LiteralValue::String { value: "minecraft:stone".into() },
            attributes: vec![],
        };
        assert!(check(&schema, json!("minecraft:stone")).is_ok());
        let err = tree(check(&schema, json!("minecraft:dirt")));
        assert!(matches!(err.kind, ErrorKind::LiteralMismatch { .. }));
    }

    #[test]
    fn test_absent_accepts_anything() {
        assert!(check(&Schema::Absent, json!(null)).is_ok());
        assert!(check(&Schema::Absent, json!({"any": [1, 2]})).is_ok());
    }

    // ---- enums ----

    fn enum_schema(kind: EnumKind, values: Vec<EnumLiteral>) -> Schema {
        Schema::Enum {
            enum_kind: kind,
            values: values
                .into_iter()
                .enumerate()
                .map(|(i, value)| EnumValue {
                    identifier: format!("V{i}"),
                    value,
                })
                .collect(),
            attributes: vec![],
        }
    }

    #[test]
    fn test_enum_membership_lists_candidates() {
        let schema = enum_schema(
            EnumKind::String,
            vec![EnumLiteral::String("red".into()), EnumLiteral::String("blue".into())],
        );
        assert!(check(&schema, json!("red")).is_ok());
        let err = tree(check(&schema, json!("green")));
        let ErrorKind::EnumMembership { candidates } = &err.kind else {
            panic!("expected enum membership, got {:?}", err.kind);
        };
        assert_eq!(candidates.len(), 2);
        assert!(err.message.contains("\"red\""));
    }

    #[test]
    fn test_enum_kind_checked_first() {
        let schema = enum_schema(EnumKind::Int, vec![EnumLiteral::Int(1)]);
        let err = tree(check(&schema, json!("1")));
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
        let bytes = enum_schema(EnumKind::Byte, vec![EnumLiteral::Int(1)]);
        assert!(check(&bytes, json!(true)).is_ok());
        let floats = enum_schema(EnumKind::Double, vec![EnumLiteral::Float(2.0)]);
        assert!(check(&floats, json!(2)).is_ok());
    }

    // ---- sequences ----

    #[test]
    fn test_list_collects_every_element() {
        let schema = Schema::list(Schema::int(None), None);
        let err = tree(check(&schema, json!([1, "a", 2, "b"])));
        assert_eq!(err.children.len(), 2);
        let paths: Vec<String> = err.children.iter().map(|c| c.path.to_string()).collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
    }

    #[test]
    fn test_length_error_reported_alongside_items() {
        let schema = Schema::list(Schema::int(None), Some(ValueRange::new(Some(3.0), None)));
        let err = tree(check(&schema, json!(["x"])));
        assert_eq!(err.children.len(), 2);
        assert!(matches!(
            err.children[0].kind,
            ErrorKind::RangeViolation { subject: RangeSubject::Length, .. }
        ));
    }

    #[test]
    fn test_typed_arrays_are_strict() {
        let ints = Schema::IntArray {
            length_range: None,
            value_range: Some(ValueRange::new(Some(0.0), None)),
            attributes: vec![],
        };
        let floats = Schema::FloatArray {
            length_range: None,
            attributes: vec![],
        };
        assert!(check(&ints, json!([1, 2, 3])).is_ok());
        assert!(check(&ints, json!([1, 2.0])).is_err());
        assert!(check(&ints, json!([-1])).is_err());
        assert!(check(&floats, json!([1.0, 2.5])).is_ok());
        assert!(check(&floats, json!([1.0, 2])).is_err());
        assert!(check(&floats, json!({})).is_err());
    }

    // ---- structs ----

    #[test]
    fn test_missing_and_unexpected() {
        let schema = Schema::structure(vec![
            StructField::pair("id", Schema::string()),
            StructField::optional("count", Schema::int(None)),
        ]);
        let err = tree(check(&schema, json!({ "extra": 1 })));
        assert_eq!(err.children.len(), 2);
        assert!(err
            .children
            .iter()
            .any(|c| matches!(&c.kind, ErrorKind::MissingField { field, .. } if field == "id")));
        assert!(err
            .children
            .iter()
            .any(|c| matches!(&c.kind, ErrorKind::UnexpectedField { field } if field == "extra")));
    }

    #[test]
    fn test_nested_paths() {
        let inner = Schema::structure(vec![StructField::pair("n", Schema::int(None))]);
        let schema = Schema::structure(vec![StructField::pair("inner", Schema::list(inner, None))]);
        let err = tree(check(&schema, json!({ "inner": [{ "n": 1 }, { "n": "x" }] })));
        let leaves = err.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].path.to_string(), "inner[1].n");
    }

    #[test]
    fn test_computed_keys_claim_matching_keys() {
        let schema = Schema::structure(vec![
            StructField::pair("name", Schema::string()),
            StructField::Pair {
                key: FieldKey::Computed(Box::new(enum_schema(
                    EnumKind::String,
                    vec![EnumLiteral::String("a".into()), EnumLiteral::String("b".into())],
                ))),
                value_type: Schema::int(None),
                optional: true,
                attributes: vec![],
            },
        ]);
        assert!(check(&schema, json!({ "name": "x", "a": 1, "b": 2 })).is_ok());
        let err = tree(check(&schema, json!({ "name": "x", "a": "1", "c": 3 })));
        assert_eq!(err.children.len(), 2);
        assert!(err
            .children
            .iter()
            .any(|c| matches!(&c.kind, ErrorKind::UnexpectedField { field } if field == "c")));
        assert!(err.children.iter().any(|c| c.path.to_string() == "a"));
    }

    #[test]
    fn test_struct_spread_merges_fields() {
        let base = Schema::structure(vec![StructField::pair("x", Schema::int(None))]);
        let schema = Schema::structure(vec![
            StructField::pair("id", Schema::string()),
            StructField::spread(base),
        ]);
        assert!(check(&schema, json!({ "id": "a", "x": 1 })).is_ok());
        // The spread struct still requires `x` when nothing is left over.
        assert!(check(&schema, json!({ "id": "a" })).is_err());
        let err = tree(check(&schema, json!({ "id": "a", "x": 1, "y": 2 })));
        let leaves = err.leaves();
        assert_eq!(leaves.len(), 1);
        assert!(matches!(&leaves[0].kind, ErrorKind::UnexpectedField { field } if field == "y"));
    }

    #[test]
    fn test_duplicate_spread_is_schema_error() {
        let schema = Schema::structure(vec![
            StructField::spread(Schema::string()),
            StructField::spread(Schema::int(None)),
        ]);
        for data in [json!({}), json!(1), json!(null)] {
            assert!(matches!(
                check(&schema, data),
                Err(ValidateError::SchemaDefinition(SchemaDefinitionError::DuplicateSpread { count: 2, .. }))
            ));
        }
    }

    #[test]
    fn test_schema_error_escapes_union_and_struct() {
        let bad = Schema::structure(vec![
            StructField::spread(Schema::string()),
            StructField::spread(Schema::string()),
        ]);
        let schema = Schema::structure(vec![
            StructField::pair("a", Schema::int(None)),
            StructField::pair("b", Schema::union(vec![Schema::int(None), bad])),
        ]);
        let result = check(&schema, json!({ "a": "wrong", "b": {} }));
        assert!(matches!(result, Err(ValidateError::SchemaDefinition(_))));
    }

    // ---- unions ----

    #[test]
    fn test_union_exhausted_keeps_every_failure() {
        let schema = Schema::union(vec![Schema::int(None), Schema::boolean()]);
        let err = tree(check(&schema, json!("x")));
        assert_eq!(err.kind, ErrorKind::UnionExhausted { tried: 2 });
        assert_eq!(err.children.len(), 2);
    }

    #[test]
    fn test_empty_union_fails() {
        let err = tree(check(&Schema::union(vec![]), json!(1)));
        assert_eq!(err.kind, ErrorKind::UnionExhausted { tried: 0 });
    }

    // ---- references & recursion ----

    #[test]
    fn test_dangling_reference_is_type_mismatch() {
        let err = tree(check(&Schema::reference("::missing"), json!(1)));
        assert!(matches!(&err.kind, ErrorKind::TypeMismatch { expected } if expected == "::missing"));
    }

    #[test]
    fn test_reference_cycle_hits_limit() {
        let r = resolver(Corpus::default().with_schema("::loop", json!({ "kind": "reference", "path": "::loop" })));
        let validator = Validator::new(&r).with_max_depth(16);
        let err = tree(validator.validate_reference(&json!(1), "::loop"));
        assert_eq!(err.kind, ErrorKind::RecursionLimitExceeded { limit: 16 });
    }

    #[test]
    fn test_self_referencing_union_fails_fast() {
        let looped = json!({ "kind": "reference", "path": "::u" });
        let r = resolver(Corpus::default().with_schema("::u", json!({ "kind": "union", "members": [looped, looped] })));
        let err = tree(Validator::new(&r).validate_reference(&json!(1), "::u"));
        assert_eq!(err.kind, ErrorKind::UnionExhausted { tried: 2 });
        assert_eq!(err.leaves().len(), 2);
        assert!(err
            .leaves()
            .iter()
            .all(|leaf| leaf.kind == ErrorKind::RecursionLimitExceeded { limit: DEFAULT_MAX_DEPTH }));
    }

    #[test]
    fn test_self_referencing_spread_fails_fast() {
        let looped = json!({ "kind": "reference", "path": "::s" });
        let r = resolver(
            Corpus::default()
                .with_schema(
                    "::s",
                    json!({
                        "kind": "struct",
                        "fields": [{ "kind": "spread", "type": { "kind": "union", "members": [looped, looped] } }]
                    }),
                )
                .with_schema("::v", json!({ "kind": "union", "members": [
                    { "kind": "reference", "path": "::v" }, { "kind": "reference", "path": "::v" }
                ] }))
                .with_schema(
                    "::w",
                    json!({ "kind": "struct", "fields": [{ "kind": "spread", "type": { "kind": "reference", "path": "::v" } }] }),
                ),
        );
        let validator = Validator::new(&r);
        assert!(validator.validate_reference(&json!({ "a": 1 }), "::s").is_err());
        // The spread target never reaches a struct, so each leftover value
        // is checked on its own.
        let err = tree(validator.validate_reference(&json!({ "a": 1, "b": 2 }), "::w"));
        assert_eq!(err.children.len(), 2);
    }

    #[test]
    fn test_same_reference_on_sibling_values_is_not_a_cycle() {
        let r = resolver(Corpus::default().with_schema("::n", json!({ "kind": "int" })));
        let schema = Schema::list(Schema::reference("::n"), None);
        let data = json!([1, 2, 3]);
        assert!(Validator::new(&r).validate(&data, &schema, &KeyPath::root()).is_ok());
    }

    #[test]
    fn test_recursive_shape_validates() {
        let r = resolver(Corpus::default().with_schema(
            "::tree",
            json!({
                "kind": "struct",
                "fields": [
                    { "kind": "pair", "key": "value", "type": { "kind": "int" } },
                    { "kind": "pair", "key": "children", "optional": true,
                      "type": { "kind": "list", "item": { "kind": "reference", "path": "::tree" } } }
                ]
            }),
        ));
        let validator = Validator::new(&r);
        let doc = json!({ "value": 1, "children": [{ "value": 2 }, { "value": 3, "children": [] }] });
        assert!(validator.validate_reference(&doc, "::tree").is_ok());
        let bad = json!({ "value": 1, "children": [{ "value": "two" }] });
        let err = tree(validator.validate_reference(&bad, "::tree"));
        assert_eq!(err.leaves()[0].path.to_string(), "children[0].value");
    }

    // ---- accessor walks ----

    #[test]
    fn test_walk_steps() {
        let doc = json!({ "a": [{ "b": "hit" }] });
        let steps = vec![
            AccessorStep::Key("a".into()),
            AccessorStep::Index(0),
            AccessorStep::Key("b".into()),
        ];
        assert_eq!(walk(&steps, &doc, None, None).as_deref(), Some("hit"));
        assert_eq!(walk(&[AccessorStep::Key("a".into())], &doc, None, None), None);
        assert_eq!(walk(&[AccessorStep::Key("zzz".into())], &doc, None, None), None);
    }

    #[test]
    fn test_walk_keywords() {
        let parent = json!({ "type": "zombie", "data": {} });
        let parent_steps = vec![
            AccessorStep::Keyword { keyword: "parent".into() },
            AccessorStep::Key("type".into()),
        ];
        assert_eq!(
            walk(&parent_steps, &parent["data"], Some(&parent), None).as_deref(),
            Some("zombie")
        );
        let key_step = vec![AccessorStep::Keyword { keyword: "key".into() }];
        assert_eq!(walk(&key_step, &json!({}), None, Some("food")).as_deref(), Some("food"));
        let unknown = vec![AccessorStep::Keyword { keyword: "spawnitem".into() }];
        assert_eq!(walk(&unknown, &json!({}), None, Some("food")), None);
    }
}
