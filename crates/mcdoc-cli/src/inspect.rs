//! # Inspect Subcommand
//!
//! Prints what the resolver sees for the target version: a decoded,
//! pruned schema (`--schema`), the keys of a dispatcher registry
//! (`--registry`), or without either flag the names of everything in the
//! corpus. Output is JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::{json, Value};

use mcdoc_core::GameVersion;
use mcdoc_schema::{Corpus, Resolver, ValidatorConfig};

/// Arguments for the `mcdoc inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Symbol document holding the schema corpus.
    #[arg(long, value_name = "FILE")]
    pub corpus: PathBuf,

    /// Named schema to print.
    #[arg(long, value_name = "PATH", conflicts_with = "registry")]
    pub schema: Option<String>,

    /// Dispatcher registry whose keys to print.
    #[arg(long, value_name = "REGISTRY")]
    pub registry: Option<String>,

    /// Target game version (overrides the configuration file).
    #[arg(long, value_name = "VERSION")]
    pub version: Option<GameVersion>,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs, config: &ValidatorConfig) -> Result<u8> {
    let version = args.version.clone().unwrap_or_else(|| config.version.clone());
    let corpus = Corpus::from_path(&args.corpus).context("failed to load schema corpus")?;
    let resolver = Resolver::new(corpus, version);

    let output = inspect(args, &resolver)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}

/// Build the JSON printed by `mcdoc inspect`.
pub fn inspect(args: &InspectArgs, resolver: &Resolver) -> Result<Value> {
    if let Some(path) = &args.schema {
        let Some(schema) = resolver.try_resolve(path) else {
            bail!("corpus has no schema named {path}");
        };
        return serde_json::to_value(&*schema).context("cannot serialize schema");
    }

    if let Some(registry) = &args.registry {
        if resolver.corpus().registry(registry).is_none() {
            bail!("corpus has no registry named {registry}");
        }
        let entries = resolver.resolve_registry(registry);
        let keys: Vec<&str> = entries.keys().collect();
        return Ok(json!({
            "registry": registry,
            "version": resolver.version(),
            "keys": keys,
        }));
    }

    let corpus = resolver.corpus();
    Ok(json!({
        "version": resolver.version(),
        "schemas": corpus.schema_paths(),
        "registries": corpus.registry_paths(),
    }))
}
