//! Domain types for h5pscan.
//!
//! - ContentRecord: one top-level content item from a source
//! - LibrarySignature: versioned content type identifier

pub mod record;
pub mod signature;

// Re-export commonly used types
pub use record::ContentRecord;
pub use signature::LibrarySignature;
