//! Recursive extraction of embedded content.
//!
//! Given a decoded document and its machine name, the extractor applies the
//! registry's rules, hands every `{library, params}` pair to an
//! [`Accumulator`] and descends into the pair's params using the pair's own
//! machine name. Traversal is depth-first pre-order in document order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::accumulator::Accumulator;
use super::error::ExtractError;
use super::registry::SchemaRegistry;
use crate::domain::ContentRecord;

/// Limits applied during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractLimits {
    /// Maximum container nesting depth below a top-level record (default: 128)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    128
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Schema-driven recursive extractor
#[derive(Debug, Clone)]
pub struct Extractor<'r> {
    registry: &'r SchemaRegistry,
    limits: ExtractLimits,
}

impl<'r> Extractor<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            limits: ExtractLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ExtractLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    pub fn limits(&self) -> ExtractLimits {
        self.limits
    }

    /// Extract everything embedded in `node`, which is content of type `machine_name`
    pub fn extract<A>(&self, node: &Value, machine_name: &str, acc: &mut A) -> Result<(), ExtractError>
    where
        A: Accumulator + ?Sized,
    {
        self.descend(node, machine_name, acc, 0)
    }

    /// Record a top-level content record and everything it embeds
    pub fn extract_record<A>(&self, record: &ContentRecord, acc: &mut A) -> Result<(), ExtractError>
    where
        A: Accumulator + ?Sized,
    {
        let document = record.decode()?;
        let signature = record.signature();

        debug!(nid = record.nid, %signature, "Extracting record");
        acc.record(&signature, &document)?;
        self.extract(&document, &record.machine_name, acc)
    }

    fn descend<A>(
        &self,
        node: &Value,
        machine_name: &str,
        acc: &mut A,
        depth: usize,
    ) -> Result<(), ExtractError>
    where
        A: Accumulator + ?Sized,
    {
        let Some(rules) = self.registry.rules_for(machine_name) else {
            if self.registry.is_embedding(machine_name) {
                return Err(ExtractError::schema_gap(machine_name));
            }
            return Ok(());
        };

        if depth >= self.limits.max_depth {
            return Err(ExtractError::DepthExceeded {
                machine_name: machine_name.to_string(),
                limit: self.limits.max_depth,
            });
        }

        for rule in rules {
            for pair in rule.pairs(node) {
                acc.record(&pair.signature, pair.params)?;
                self.descend(pair.params, pair.signature.machine_name(), acc, depth + 1)?;
            }
        }

        Ok(())
    }
}
