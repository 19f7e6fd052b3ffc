//! # Game Versions
//!
//! `GameVersion` is the token schema attributes are compared against when
//! pruning (`since`/`until`). Versions are dot-separated non-negative
//! integers such as `1.21.8`.
//!
//! ## Ordering
//!
//! - The first component is an epoch marker and never takes part in the
//!   comparison: `1.21` and `2.21` compare equal.
//! - The remaining components compare numerically, left to right.
//! - Missing trailing components count as `0`, so `1.21` == `1.21.0`.
//!
//! Equality is defined by the ordering, which keeps `PartialEq`, `Eq` and
//! `Ord` consistent.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::McdocError;

/// A parsed, comparable game version.
#[derive(Debug, Clone)]
pub struct GameVersion {
    raw: String,
    /// Numeric components after the epoch marker.
    components: Vec<u32>,
}

impl GameVersion {
    /// Parse a dot-separated version string.
    ///
    /// # Errors
    ///
    /// Returns [`McdocError::InvalidVersion`] if the string is empty, has
    /// an empty component (`1..2`), or a component that is not a
    /// non-negative integer.
    pub fn parse(s: &str) -> Result<Self, McdocError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(McdocError::InvalidVersion {
                input: s.to_string(),
                reason: "version is empty".to_string(),
            });
        }

        let mut parts = Vec::new();
        for part in trimmed.split('.') {
            let n = part.parse::<u32>().map_err(|e| McdocError::InvalidVersion {
                input: s.to_string(),
                reason: format!("component {part:?} is not a number: {e}"),
            })?;
            parts.push(n);
        }

        // The first component is the epoch marker.
        let components = parts.split_off(1);

        Ok(Self {
            raw: trimmed.to_string(),
            components,
        })
    }

    /// Build a version from numeric parts, epoch marker first.
    pub fn from_parts(parts: &[u32]) -> Self {
        let raw = if parts.is_empty() {
            "0".to_string()
        } else {
            parts.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".")
        };
        Self {
            raw,
            components: parts.iter().skip(1).copied().collect(),
        }
    }

    /// The version as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The compared components (epoch marker dropped).
    pub fn components(&self) -> &[u32] {
        &self.components
    }
}

impl Ord for GameVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for GameVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GameVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GameVersion {}

impl FromStr for GameVersion {
    type Err = McdocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for GameVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for GameVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
