//! h5pscan - H5P content type inventory
//!
//! Extracts the content type instances embedded in H5P content. Container
//! types (columns, course presentations, question sets, ...) nest further
//! `{library, params}` instances inside their JSON parameters, to any depth.
//!
//! # Architecture
//!
//! Extraction is schema-driven:
//! - A registry maps each container machine name to the paths where it keeps
//!   embedded instances
//! - The extractor walks those paths recursively, depth-first
//! - An accumulator decides what to keep (first-seen params, or counts)
//!
//! # Modules
//!
//! - `adapters`: Content sources (SQLite, JSONL dumps)
//! - `core`: Registry, extractor, accumulators, node filter
//! - `domain`: Data structures (ContentRecord, LibrarySignature)
//! - `report`: CSV/JSON report files
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Parameters of every content type version in use
//! h5pscan --database site.sqlite types-data
//!
//! # Content type counts, including embedded types
//! h5pscan --database site.sqlite type-counts --format json
//!
//! # Nodes that include a question set
//! h5pscan --dump 'dumps/*.jsonl' nodes-including H5P.QuestionSet
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;

// Re-export main types at crate root for convenience
pub use adapters::{ContentSource, DumpSource, SourceSpec, SqliteSource};
pub use core::{
    collect_types_data, containing_nodes, count_types, Accumulator, DedupStore, ExtractError,
    ExtractLimits, Extractor, NodeMatch, OccurrenceCounter, SchemaRegistry,
};
pub use domain::{ContentRecord, LibrarySignature};
pub use report::OutputFormat;
