//! # mcdoc-cli — Command-Line Interface
//!
//! Provides the `mcdoc` binary on top of `mcdoc-schema`.
//!
//! ## Subcommands
//!
//! - `mcdoc validate`: check a document against a schema or registry.
//! - `mcdoc inspect`: print decoded schemas and registry keys.
//!
//! ```bash
//! mcdoc validate --corpus symbols.json --schema ::java::world::item::ItemStack item.json
//! mcdoc validate --corpus symbols.json --registry minecraft:data_component components.yaml
//! mcdoc inspect --corpus symbols.json --registry minecraft:entity
//! ```
//!
//! ## Exit Codes
//!
//! `0` valid, `1` invalid, `2` operational error (unreadable corpus,
//! document or configuration, ambiguous schema).
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; validation logic lives in `mcdoc-schema`.
//! - Handlers return an exit code; only `main` talks to the process.

pub mod document;
pub mod inspect;
pub mod validate;
