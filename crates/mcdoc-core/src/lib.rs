//! # mcdoc-core — Foundational Types for mcdoc Validation
//!
//! Leaf crate of the workspace. Defines the small value types every other
//! crate agrees on:
//!
//! 1. **`GameVersion`.** The comparable version token used to prune schema
//!    nodes tagged with `since`/`until` attributes. Parsing is validated;
//!    comparison ignores the leading epoch component and pads missing
//!    trailing components with zero.
//!
//! 2. **`KeyPath`.** The key/index trail from a document root to the value
//!    under inspection. Every validation error carries one.
//!
//! 3. **`McdocError`.** Failures loading corpora, documents, configuration
//!    and version strings.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mcdoc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod path;
pub mod version;

// Re-export primary types for ergonomic imports.
pub use error::McdocError;
pub use path::{KeyPath, PathSegment};
pub use version::GameVersion;
