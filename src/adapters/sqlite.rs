//! SQLite content source.
//!
//! Reads H5P content the way the Drupal H5P module stores it: nodes of type
//! `h5p_content` joined to their `h5p_nodes` row (by revision) and to the main
//! library in `h5p_libraries`.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, Row};

use super::ContentSource;
use crate::domain::ContentRecord;

/// Content query; ordered so that repeated runs see records in the same order
pub const CONTENT_QUERY: &str = "SELECT node.nid, h5p_nodes.content_id, h5p_libraries.machine_name, \
     h5p_libraries.major_version, h5p_libraries.minor_version, \
     h5p_nodes.json_content, h5p_nodes.filtered \
     FROM node \
     INNER JOIN h5p_nodes ON h5p_nodes.content_id = node.vid \
     INNER JOIN h5p_libraries ON h5p_libraries.library_id = h5p_nodes.main_library_id \
     WHERE node.type = 'h5p_content' \
     ORDER BY node.nid, h5p_nodes.content_id";

/// Read-only SQLite source
pub struct SqliteSource {
    conn: Connection,
    name: String,
}

impl SqliteSource {
    /// Open a database file read-only
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Database not found: {}", path.display());
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database: {}", path.display()))?;

        Ok(Self {
            conn,
            name: format!("sqlite:{}", path.display()),
        })
    }

    /// Use an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            name: "sqlite".to_string(),
        }
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<ContentRecord> {
    Ok(ContentRecord {
        nid: row.get(0)?,
        content_id: row.get(1)?,
        machine_name: row.get(2)?,
        major_version: row.get(3)?,
        minor_version: row.get(4)?,
        json_content: row.get(5)?,
        filtered_json_content: row.get(6)?,
    })
}

impl ContentSource for SqliteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<ContentRecord>> {
        let mut stmt = self
            .conn
            .prepare(CONTENT_QUERY)
            .context("Failed to prepare content query")?;

        let records = stmt
            .query_map([], read_record)
            .context("Failed to run content query")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read content row")?;

        tracing::info!(source = %self.name, nodes = records.len(), "Fetched content records");
        Ok(records)
    }
}
