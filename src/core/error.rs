//! Error types for extraction.
//!
//! Every variant is fatal for a run. Elements that merely lack a
//! `library`/`params` pair are skipped and never produce an error.

use thiserror::Error;

/// Errors raised while decoding or traversing content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Top-level content did not decode to a JSON object
    #[error("Could not parse JSON content of node {nid}: {raw}")]
    MalformedContent { nid: i64, raw: String },

    /// A container type is flagged as embedding content but has no rules
    #[error("Unhandlable type: {machine_name} (no extraction rule registered)")]
    SchemaGap { machine_name: String },

    /// An extracted signature or machine name is unusable
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    /// Nesting went past the configured ceiling
    #[error("Maximum nesting depth exceeded in {machine_name}: limit {limit}")]
    DepthExceeded { machine_name: String, limit: usize },
}

impl ExtractError {
    /// Create a data integrity error
    pub fn data_integrity(msg: impl Into<String>) -> Self {
        ExtractError::DataIntegrity(msg.into())
    }

    /// Create a schema gap error
    pub fn schema_gap(machine_name: impl Into<String>) -> Self {
        ExtractError::SchemaGap {
            machine_name: machine_name.into(),
        }
    }
}
