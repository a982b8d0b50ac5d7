//! Content sources.
//!
//! A source yields the top-level H5P content records of a site, in a stable
//! order. Two sources are provided:
//! - [`SqliteSource`]: reads the node / h5p_nodes / h5p_libraries tables
//! - [`DumpSource`]: reads JSONL dumps of the same query

pub mod dump;
pub mod sqlite;

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

use crate::domain::ContentRecord;

pub use dump::DumpSource;
pub use sqlite::SqliteSource;

/// Trait for content record providers
pub trait ContentSource {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Fetch every content record, in processing order
    fn fetch(&self) -> Result<Vec<ContentRecord>>;
}

/// Where records come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// SQLite database file
    Database(PathBuf),
    /// Glob pattern of JSONL dump files
    Dump(String),
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Database(path) => write!(f, "database {}", path.display()),
            SourceSpec::Dump(pattern) => write!(f, "dump {}", pattern),
        }
    }
}

/// Open the source described by `spec`
pub fn open(spec: &SourceSpec) -> Result<Box<dyn ContentSource>> {
    match spec {
        SourceSpec::Database(path) => Ok(Box::new(SqliteSource::open(path)?)),
        SourceSpec::Dump(pattern) => Ok(Box::new(DumpSource::new(pattern.clone()))),
    }
}
