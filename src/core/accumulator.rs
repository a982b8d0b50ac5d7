//! Aggregation policies fed by the extractor.
//!
//! - [`DedupStore`]: first-seen signature wins, later payloads are ignored
//! - [`OccurrenceCounter`]: every visit counts, keyed by bare machine name

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::error::ExtractError;
use crate::domain::LibrarySignature;

/// Receives every `{library, params}` pair visited during extraction
pub trait Accumulator {
    /// Record one visit of `signature` carrying `params`
    fn record(&mut self, signature: &LibrarySignature, params: &Value) -> Result<(), ExtractError>;
}

/// Parameters of each library version, first occurrence only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupStore {
    entries: BTreeMap<LibrarySignature, Value>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, signature: &str) -> Option<&Value> {
        self.entries.get(&LibrarySignature::new(signature))
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.get(signature).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LibrarySignature, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// SHA256 of the serialized map (keys are sorted, so equal maps hash equal)
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(&self.entries)?;
        Ok(hex::encode(Sha256::digest(&json)))
    }
}

impl Accumulator for DedupStore {
    fn record(&mut self, signature: &LibrarySignature, params: &Value) -> Result<(), ExtractError> {
        // Extraction already skips empty libraries; this covers direct callers
        if signature.is_empty() {
            return Err(ExtractError::data_integrity(
                "Empty library definition, check the content data",
            ));
        }

        if !self.entries.contains_key(signature) {
            self.entries.insert(signature.clone(), params.clone());
        }

        Ok(())
    }
}

/// A counted machine name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub machine_name: String,
    pub count: u64,
}

/// Number of occurrences of each machine name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceCounter {
    counts: BTreeMap<String, u64>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of a bare machine name
    pub fn bump(&mut self, machine_name: &str) -> Result<(), ExtractError> {
        if machine_name.is_empty() {
            return Err(ExtractError::data_integrity("Bad machine name: empty"));
        }

        *self.counts.entry(machine_name.to_string()).or_insert(0) += 1;
        Ok(())
    }

    pub fn count(&self, machine_name: &str) -> u64 {
        self.counts.get(machine_name).copied().unwrap_or(0)
    }

    /// Counted machine names in sorted order
    pub fn entries(&self) -> Vec<TypeCount> {
        self.counts
            .iter()
            .map(|(machine_name, count)| TypeCount {
                machine_name: machine_name.clone(),
                count: *count,
            })
            .collect()
    }

    /// Total number of counted visits
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Accumulator for OccurrenceCounter {
    fn record(&mut self, signature: &LibrarySignature, _params: &Value) -> Result<(), ExtractError> {
        self.bump(signature.machine_name())
    }
}

impl Serialize for OccurrenceCounter {
    /// `{"<machine name>": {"machine_name": ..., "count": ...}, ...}`
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: BTreeMap<&str, TypeCount> = self
            .counts
            .iter()
            .map(|(machine_name, count)| {
                let entry = TypeCount {
                    machine_name: machine_name.clone(),
                    count: *count,
                };
                (machine_name.as_str(), entry)
            })
            .collect();
        entries.serialize(serializer)
    }
}
