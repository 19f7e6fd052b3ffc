//! # Validator Configuration
//!
//! Settings fixed for the lifetime of a resolver/validator pair: the game
//! version schemas are pruned against and the recursion ceiling for
//! self-referential schemas. Loadable from JSON or YAML; every field has a
//! default.
//!
//! ```yaml
//! version: "1.21.8"
//! max_depth: 256
//! ```

use std::path::Path;

use mcdoc_core::{GameVersion, McdocError};
use serde::{Deserialize, Serialize};

/// Game version targeted when no configuration says otherwise.
pub const DEFAULT_VERSION: &str = "1.21.8";

/// Nesting ceiling for one validation call.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Target game version for `since`/`until` pruning.
    pub version: GameVersion,
    /// Maximum schema nesting depth before `RecursionLimitExceeded`.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidatorConfig {
    /// Load a configuration file. `.yaml`/`.yml` files are parsed as YAML,
    /// everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`McdocError::Read`] if the file cannot be read and
    /// [`McdocError::Load`] if it cannot be parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, McdocError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let content = McdocError::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| McdocError::load(&name, format!("invalid YAML: {e}"))),
            _ => serde_json::from_str(&content)
                .map_err(|e| McdocError::load(&name, format!("invalid JSON: {e}"))),
        }
    }

    pub fn with_version(mut self, version: GameVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

fn default_version() -> GameVersion {
    GameVersion::from_parts(&[1, 21, 8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.version.as_str(), DEFAULT_VERSION);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "version: \"1.20.4\"").unwrap();
        let config = ValidatorConfig::from_path(file.path()).unwrap();
        assert_eq!(config.version, GameVersion::parse("1.20.4").unwrap());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"max_depth": 12}}"#).unwrap();
        let config = ValidatorConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.version.as_str(), DEFAULT_VERSION);
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "version: latest").unwrap();
        let err = ValidatorConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, McdocError::Load { .. }));
    }

    #[test]
    fn test_builders() {
        let config = ValidatorConfig::default()
            .with_version(GameVersion::parse("1.19").unwrap())
            .with_max_depth(8);
        assert_eq!(config.version.as_str(), "1.19");
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = ValidatorConfig::from_path("/nonexistent/mcdoc/config.yaml").unwrap_err();
        assert!(matches!(err, McdocError::Read { .. }));
    }
}
