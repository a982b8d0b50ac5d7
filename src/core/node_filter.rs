//! Find content nodes that include a given type.
//!
//! Unlike the extractor this looks at most one level deep, and only inside
//! `H5P.Column` records (using the column's first rule). Any other record
//! matches only through its own top-level machine name.

use serde::{Serialize, Serializer};
use tracing::debug;

use super::error::ExtractError;
use super::registry::{SchemaRegistry, COLUMN};
use crate::domain::{ContentRecord, LibrarySignature};

/// A node containing the requested type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMatch {
    pub nid: i64,
    /// Signature of the matching instance
    pub signature: LibrarySignature,
}

impl Serialize for NodeMatch {
    /// Serialized as a `[nid, signature]` row
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.nid, &self.signature).serialize(serializer)
    }
}

/// Nodes whose content is, or directly holds inside a column, `target`
pub fn containing_nodes(
    records: &[ContentRecord],
    target: &str,
    registry: &SchemaRegistry,
) -> Result<Vec<NodeMatch>, ExtractError> {
    let column_rule = registry
        .rules_for(COLUMN)
        .and_then(|rules| rules.first())
        .ok_or_else(|| ExtractError::schema_gap(COLUMN))?;

    let mut matches = Vec::new();

    for record in records {
        if record.machine_name == COLUMN {
            let document = record.decode()?;
            for pair in column_rule.pairs(&document) {
                // Version-less library strings never match
                if pair.signature.versioned_machine_name() == Some(target) {
                    matches.push(NodeMatch {
                        nid: record.nid,
                        signature: pair.signature,
                    });
                }
            }
        } else if record.machine_name == target {
            matches.push(NodeMatch {
                nid: record.nid,
                signature: record.signature(),
            });
        }
    }

    debug!(machine_name = target, matches = matches.len(), "Node filter complete");
    Ok(matches)
}
