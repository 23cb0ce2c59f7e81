//! Four-part version values as used by FOMOD scripts
//!
//! Install scripts were authored against the .NET `System.Version` type, so
//! this reproduces its behavior: two to four dot-separated numeric
//! components, with missing components ordering *below* explicit zeros
//! (`"1.2" < "1.2.0"`), and display printing only the components that were
//! actually given.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when a version string cannot be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid version string: {0:?}")]
pub struct VersionParseError(pub String);

/// A version with up to four numeric components (major.minor.build.revision)
///
/// Components that were not present in the parsed string are stored as -1 so
/// that ordering matches the scripts' original expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    parts: [i64; 4],
}

impl Version {
    /// The `0.0.0.0` version used as the fallback for unreadable game versions
    pub const ZERO: Version = Version { parts: [0, 0, 0, 0] };

    pub fn new(major: u32, minor: u32) -> Self {
        Version {
            parts: [major as i64, minor as i64, -1, -1],
        }
    }

    pub fn with_build(major: u32, minor: u32, build: u32) -> Self {
        Version {
            parts: [major as i64, minor as i64, build as i64, -1],
        }
    }

    pub fn with_revision(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Version {
            parts: [major as i64, minor as i64, build as i64, revision as i64],
        }
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let fields: Vec<&str> = trimmed.split('.').collect();
        if fields.len() < 2 || fields.len() > 4 {
            return Err(VersionParseError(input.to_string()));
        }
        let mut parts = [-1i64; 4];
        for (slot, field) in parts.iter_mut().zip(&fields) {
            *slot = field
                .trim()
                .parse::<u32>()
                .map(i64::from)
                .map_err(|_| VersionParseError(input.to_string()))?;
        }
        Ok(Version { parts })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().take_while(|p| **p >= 0).enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
