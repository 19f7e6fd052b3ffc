//! # mcdoc CLI entry point
//!
//! Parses command-line arguments, loads the optional configuration file
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mcdoc_cli::inspect::{run_inspect, InspectArgs};
use mcdoc_cli::validate::{run_validate, ValidateArgs};
use mcdoc_schema::ValidatorConfig;

/// mcdoc schema engine
///
/// Validates Minecraft data documents (JSON or YAML) against an mcdoc
/// schema corpus and inspects the decoded, version-pruned schemas.
#[derive(Parser, Debug)]
#[command(name = "mcdoc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a configuration file (JSON or YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a document against a named schema or a dispatcher registry.
    Validate(ValidateArgs),

    /// Print a decoded schema, a registry's keys, or the corpus contents.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match ValidatorConfig::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::from(2);
            }
        },
        None => ValidatorConfig::default(),
    };

    tracing::debug!(version = %config.version, max_depth = config.max_depth, "configuration loaded");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Inspect(args) => run_inspect(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
