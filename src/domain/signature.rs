//! Library signatures.
//!
//! A signature identifies a versioned content type, e.g. `"H5P.Column 1.13"`.
//! The part before the first space is the bare machine name used as the
//! dispatch key during extraction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Versioned content type identifier (`"<machine name> <major>.<minor>"`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibrarySignature(String);

impl LibrarySignature {
    /// Wrap a library string as found in content (`"H5P.Image 1.1"`)
    pub fn new(library: impl Into<String>) -> Self {
        Self(library.into())
    }

    /// Build a signature from a library registry row
    pub fn from_parts(machine_name: &str, major_version: u32, minor_version: u32) -> Self {
        Self(format!("{} {}.{}", machine_name, major_version, minor_version))
    }

    /// Machine name portion (everything before the first space)
    pub fn machine_name(&self) -> &str {
        match self.0.split_once(' ') {
            Some((name, _)) => name,
            None => &self.0,
        }
    }

    /// Machine name only when the signature carries a version part
    pub fn versioned_machine_name(&self) -> Option<&str> {
        self.0.split_once(' ').map(|(name, _)| name)
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LibrarySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LibrarySignature {
    fn from(library: &str) -> Self {
        Self::new(library)
    }
}
