//! JSONL dump source.
//!
//! Each non-blank line is one [`ContentRecord`] using the query's column
//! names. The pattern is a glob; matching files are read in sorted order.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::ContentSource;
use crate::domain::ContentRecord;

/// Source backed by one or more JSONL files
pub struct DumpSource {
    pattern: String,
}

impl DumpSource {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Files matching the pattern, sorted
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = glob::glob(&self.pattern)
            .with_context(|| format!("Invalid dump pattern: {}", self.pattern))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read dump path")?;
        files.sort();

        if files.is_empty() {
            anyhow::bail!("No dump files match: {}", self.pattern);
        }
        Ok(files)
    }
}

/// Parse JSONL content; `origin` names the file in error messages
pub fn parse_lines(content: &str, origin: &str) -> Result<Vec<ContentRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid record at {}:{}", origin, idx + 1))
        })
        .collect()
}

impl ContentSource for DumpSource {
    fn name(&self) -> &str {
        &self.pattern
    }

    fn fetch(&self) -> Result<Vec<ContentRecord>> {
        let mut records = Vec::new();

        for path in self.files()? {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read dump: {}", path.display()))?;
            let parsed = parse_lines(&content, &path.display().to_string())?;
            tracing::debug!(file = %path.display(), records = parsed.len(), "Read dump file");
            records.extend(parsed);
        }

        tracing::info!(source = %self.pattern, nodes = records.len(), "Fetched content records");
        Ok(records)
    }
}
