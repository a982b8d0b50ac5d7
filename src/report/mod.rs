//! Report serialization.
//!
//! Reports are written into an output directory with fixed file names:
//!
//! ```text
//! results/
//! ├── h5p_content_types_data.json      # signature -> params
//! ├── h5p_type_counts.{csv,json}       # machine name -> count
//! └── h5p_nodes_including_type.{csv,json}
//! ```

pub mod csv;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::fs;

use crate::core::{DedupStore, NodeMatch, OccurrenceCounter};

pub const TYPES_DATA_FILE: &str = "h5p_content_types_data";
pub const TYPE_COUNTS_FILE: &str = "h5p_type_counts";
pub const NODES_INCLUDING_FILE: &str = "h5p_nodes_including_type";

/// Report file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// JSON document
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Path of a report file inside `dir`
pub fn report_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", stem, format.extension()))
}

/// Render occurrence counts (`machine_name,count`)
pub fn render_type_counts(counter: &OccurrenceCounter, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(counter),
        OutputFormat::Csv => Ok(csv::encode_table(
            &["machine_name", "count"],
            counter
                .entries()
                .into_iter()
                .map(|entry| vec![entry.machine_name, entry.count.to_string()]),
        )),
    }
}

/// Render node filter matches (`nid,type`)
pub fn render_node_matches(matches: &[NodeMatch], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(matches),
        OutputFormat::Csv => Ok(csv::encode_table(
            &["nid", "type"],
            matches
                .iter()
                .map(|m| vec![m.nid.to_string(), m.signature.to_string()]),
        )),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to serialize report")
}

/// Write report content, creating the directory if needed
pub async fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = content.len(), "Report written");
    Ok(())
}

/// Write the content types data report (always JSON)
pub async fn write_types_data(dir: &Path, store: &DedupStore) -> Result<PathBuf> {
    let path = report_path(dir, TYPES_DATA_FILE, OutputFormat::Json);
    write_report(&path, &to_json(store)?).await?;
    Ok(path)
}

/// Write the type counts report
pub async fn write_type_counts(dir: &Path, counter: &OccurrenceCounter, format: OutputFormat) -> Result<PathBuf> {
    let path = report_path(dir, TYPE_COUNTS_FILE, format);
    write_report(&path, &render_type_counts(counter, format)?).await?;
    Ok(path)
}

/// Write the nodes-including-type report
pub async fn write_node_matches(dir: &Path, matches: &[NodeMatch], format: OutputFormat) -> Result<PathBuf> {
    let path = report_path(dir, NODES_INCLUDING_FILE, format);
    write_report(&path, &render_node_matches(matches, format)?).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> OccurrenceCounter {
        let mut counter = OccurrenceCounter::new();
        counter.bump("H5P.Column").unwrap();
        counter.bump("H5P.Text").unwrap();
        counter.bump("H5P.Text").unwrap();
        counter
    }

    #[test]
    fn test_report_path() {
        let path = report_path(Path::new("results"), TYPE_COUNTS_FILE, OutputFormat::Csv);
        assert_eq!(path, PathBuf::from("results/h5p_type_counts.csv"));
    }

    #[test]
    fn test_type_counts_csv() {
        let csv = render_type_counts(&counter(), OutputFormat::Csv).unwrap();
        assert_eq!(csv, "machine_name,count\nH5P.Column,1\nH5P.Text,2\n");
    }

    #[test]
    fn test_type_counts_json() {
        let json = render_type_counts(&counter(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["H5P.Text"]["count"], 2);
        assert_eq!(value["H5P.Text"]["machine_name"], "H5P.Text");
    }

    #[test]
    fn test_node_matches_csv_and_json() {
        let matches = vec![
            NodeMatch { nid: 3, signature: "H5P.QuestionSet 1.17".into() },
            NodeMatch { nid: 8, signature: "H5P.QuestionSet 1.16".into() },
        ];

        assert_eq!(
            render_node_matches(&matches, OutputFormat::Csv).unwrap(),
            "nid,type\n3,H5P.QuestionSet 1.17\n8,H5P.QuestionSet 1.16\n"
        );
        assert_eq!(
            render_node_matches(&matches, OutputFormat::Json).unwrap(),
            r#"[[3,"H5P.QuestionSet 1.17"],[8,"H5P.QuestionSet 1.16"]]"#
        );
    }

    #[test]
    fn test_empty_matches_csv_has_header() {
        assert_eq!(render_node_matches(&[], OutputFormat::Csv).unwrap(), "nid,type\n");
    }
}
