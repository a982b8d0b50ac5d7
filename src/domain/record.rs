//! Content records as returned by a content source.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::signature::LibrarySignature;
use crate::core::ExtractError;

/// One top-level H5P content item.
///
/// Field names match the columns of the source query so that JSONL dumps of
/// that query deserialize directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Node identifier
    pub nid: i64,

    /// H5P content identifier (node revision)
    pub content_id: i64,

    /// Machine name of the main library
    pub machine_name: String,

    pub major_version: u32,

    pub minor_version: u32,

    /// Raw JSON parameters of the content
    pub json_content: String,

    /// Filtered JSON parameters (passed through, never read by extraction)
    #[serde(default, alias = "filtered")]
    pub filtered_json_content: Option<String>,
}

impl ContentRecord {
    /// Signature of the main library (`"<machine name> <major>.<minor>"`)
    pub fn signature(&self) -> LibrarySignature {
        LibrarySignature::from_parts(&self.machine_name, self.major_version, self.minor_version)
    }

    /// Decode `json_content`, which must be a JSON object.
    ///
    /// Parsing imposes no nesting limit; container depth is bounded by the
    /// extractor instead.
    pub fn decode(&self) -> Result<Value, ExtractError> {
        match parse_unbounded(&self.json_content) {
            Ok(value) if value.is_object() => Ok(value),
            _ => Err(ExtractError::MalformedContent {
                nid: self.nid,
                raw: self.json_content.clone(),
            }),
        }
    }
}

/// Parse JSON of any nesting depth, growing the stack as needed
fn parse_unbounded(raw: &str) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_str(raw);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}
