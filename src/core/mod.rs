//! Extraction core.
//!
//! This module contains:
//! - Registry: container types and where they embed content
//! - Extractor: recursive, schema-driven traversal
//! - Accumulator: dedup and occurrence aggregation policies
//! - NodeFilter: one-level lookup of nodes including a type
//! - Scan: batch drivers over content records

pub mod accumulator;
pub mod error;
pub mod extractor;
pub mod node_filter;
pub mod path;
pub mod registry;
pub mod scan;

// Re-export commonly used types
pub use accumulator::{Accumulator, DedupStore, OccurrenceCounter, TypeCount};
pub use error::ExtractError;
pub use extractor::{ExtractLimits, Extractor};
pub use node_filter::{containing_nodes, NodeMatch};
pub use path::{FieldPath, PathError, PathSegment};
pub use registry::{ExtractedPair, ExtractionRule, SchemaRegistry, COLUMN};
pub use scan::{collect_types_data, count_types, scan};
