//! # mcdoc-schema — Schema Engine
//!
//! Validates JSON-like documents against mcdoc schemas: the type
//! definitions (structs, unions, enums, dispatchers, ...) describing
//! Minecraft data such as item components and entity NBT.
//!
//! ## Pipeline
//!
//! 1. [`Corpus`] holds the raw schema and registry definitions of one
//!    symbol document.
//! 2. [`Resolver`] decodes definitions into [`Schema`] nodes on demand,
//!    prunes them for its target [`GameVersion`](mcdoc_core::GameVersion)
//!    (`since`/`until` attributes, see [`prune`]) and memoizes the result.
//! 3. [`Validator`] walks a document against a schema and returns either
//!    success or one [`ErrorTree`] listing every problem found.
//!
//! ## Error Channels
//!
//! - Data that does not conform: [`ValidateError::Invalid`].
//! - A schema that cannot be applied (two spreads in one struct):
//!   [`ValidateError::SchemaDefinition`].
//! - Corpus and configuration loading: [`McdocError`](mcdoc_core::McdocError).
//!
//! ## Crate Policy
//!
//! - Depends only on `mcdoc-core` internally.
//! - Never panics on corpus content. Malformed definitions degrade to
//!   [`Schema::Absent`] with a `warn` diagnostic.

pub mod config;
pub mod corpus;
pub mod error;
pub mod model;
pub mod prune;
pub mod resolver;
pub mod validate;

pub use config::ValidatorConfig;
pub use corpus::Corpus;
pub use error::{ErrorKind, ErrorTree, SchemaDefinitionError, ValidateError};
pub use model::{
    AccessorStep, Attribute, DispatcherIndex, EnumKind, EnumLiteral, EnumValue, FieldKey,
    LiteralValue, Schema, StructField, ValueRange,
};
pub use prune::is_applicable;
pub use resolver::{Registry, Resolver, Snapshot};
pub use validate::Validator;
