//! # Validate Subcommand
//!
//! Validates one document against either a named schema (`--schema`), one
//! registry entry (`--registry` with `--key`) or a whole registry map
//! (`--registry` alone, the shape of an item's `components`).
//!
//! Exit code 0 on success, 1 when the document is invalid, 2 (through the
//! returned error) when the corpus, document or schema cannot be used.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde_json::json;

use mcdoc_core::GameVersion;
use mcdoc_schema::{Corpus, Resolver, ValidateError, Validator, ValidatorConfig};

use crate::document::load_document;

/// Arguments for the `mcdoc validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Symbol document holding the schema corpus.
    #[arg(long, value_name = "FILE")]
    pub corpus: PathBuf,

    /// Named schema to validate against.
    #[arg(long, value_name = "PATH", conflicts_with = "registry", required_unless_present = "registry")]
    pub schema: Option<String>,

    /// Dispatcher registry to validate against.
    #[arg(long, value_name = "REGISTRY")]
    pub registry: Option<String>,

    /// Registry entry; without it every key of the document is looked up.
    #[arg(long, value_name = "KEY", requires = "registry")]
    pub key: Option<String>,

    /// Target game version (overrides the configuration file).
    #[arg(long, value_name = "VERSION")]
    pub version: Option<GameVersion>,

    /// Maximum schema nesting depth (overrides the configuration file).
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// JSON or YAML document to validate.
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl ValidateArgs {
    /// `config` with command-line overrides applied.
    pub fn effective_config(&self, config: &ValidatorConfig) -> ValidatorConfig {
        let mut effective = config.clone();
        if let Some(version) = &self.version {
            effective = effective.with_version(version.clone());
        }
        if let Some(max_depth) = self.max_depth {
            effective = effective.with_max_depth(max_depth);
        }
        effective
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &ValidatorConfig) -> Result<u8> {
    let config = args.effective_config(config);
    let corpus = Corpus::from_path(&args.corpus).context("failed to load schema corpus")?;
    let document = load_document(&args.document)?;

    tracing::info!(
        version = %config.version,
        schemas = corpus.schema_count(),
        registries = corpus.registry_count(),
        "loaded schema corpus"
    );

    let resolver = Resolver::from_config(corpus, &config);
    let validator = Validator::with_config(&resolver, &config);

    let result = match (&args.schema, &args.registry, &args.key) {
        (Some(schema), _, _) => validator.validate_reference(&document, schema),
        (None, Some(registry), Some(key)) => validator.validate_registry_entry(&document, registry, key),
        (None, Some(registry), None) => validator.validate_registry_map(&document, registry),
        (None, None, _) => bail!("one of --schema or --registry is required"),
    };

    tracing::debug!(cached_schemas = resolver.cached_schemas(), "validation finished");

    let (output, code) = render(&args.document, result, args.format)?;
    print!("{output}");
    Ok(code)
}

/// Format a validation outcome and pick the exit code.
///
/// Schema-definition errors are not a verdict on the document and are
/// returned as errors.
pub fn render(document: &Path, result: Result<(), ValidateError>, format: OutputFormat) -> Result<(String, u8)> {
    let tree = match result {
        Ok(()) => None,
        Err(ValidateError::Invalid(tree)) => Some(tree),
        Err(e @ ValidateError::SchemaDefinition(_)) => {
            return Err(e).context("schema cannot be applied");
        }
    };

    let code = if tree.is_some() { 1 } else { 0 };
    let output = match (format, tree) {
        (OutputFormat::Text, None) => format!("OK: {}\n", document.display()),
        (OutputFormat::Text, Some(tree)) => {
            let leaves = tree.leaves().len();
            format!("FAIL: {} ({leaves} problem(s))\n{tree}", document.display())
        }
        (OutputFormat::Json, tree) => {
            let report = json!({
                "document": document.display().to_string(),
                "valid": tree.is_none(),
                "errors": tree,
            });
            format!("{}\n", serde_json::to_string_pretty(&report)?)
        }
    };
    Ok((output, code))
}
