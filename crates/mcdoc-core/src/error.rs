//! # Error Types
//!
//! Errors raised while turning external input (version strings, corpus
//! files, documents, configuration) into in-memory values. Validation
//! failures are not errors in this sense; they live in `mcdoc-schema` as
//! error trees.

use thiserror::Error;

/// Top-level load error shared across the workspace.
#[derive(Error, Debug)]
pub enum McdocError {
    /// A version token could not be parsed.
    #[error("invalid version {input:?}: {reason}")]
    InvalidVersion {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A corpus, document or config file had the wrong shape.
    #[error("cannot load {source_name}: {reason}")]
    Load {
        /// File path or logical name of the input.
        source_name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An input file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// The file that was requested.
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl McdocError {
    /// Shorthand for [`McdocError::Load`].
    pub fn load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Read a whole file, reporting failures against its path.
    pub fn read_to_string(path: &std::path::Path) -> Result<String, Self> {
        std::fs::read_to_string(path).map_err(|source| Self::Read {
            path: path.display().to_string(),
            source,
        })
    }
}
