// 📥 Ingestor - five CSV files → five replace-mode tables
//
// Each table is written on its own: if the third file fails, the first two
// tables stay written. No transaction spans the whole run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::db::{open_database, replace_table};
use crate::entities::SourceTable;
use crate::table::read_csv_table;

/// What one table write produced
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub table: String,
    pub rows: usize,
    pub columns: Vec<String>,

    /// SHA-256 of the source CSV bytes (same digest → same table)
    pub source_digest: String,
}

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub tables: Vec<TableSummary>,
    pub completed_at: DateTime<Utc>,
}

impl IngestSummary {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn table(&self, name: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.table == name)
    }
}

/// Hex SHA-256 of the bytes a table was built from
pub fn source_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Load one CSV and replace its table
///
/// The file is read once; the digest and the table come from the same bytes.
pub fn ingest_table(conn: &mut Connection, csv_path: &Path, table_name: &str) -> Result<TableSummary> {
    let bytes = fs::read(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    let source_digest = source_digest(&bytes);

    let table = read_csv_table(csv::Reader::from_reader(&bytes[..]), table_name)
        .with_context(|| format!("Failed to read CSV file {}", csv_path.display()))?;
    debug!(
        table = table_name,
        columns = ?table.column_names(),
        "loaded CSV"
    );

    let rows = replace_table(conn, &table)?;

    info!(table = table_name, rows, digest = %source_digest, "table written");

    Ok(TableSummary {
        table: table_name.to_string(),
        rows,
        columns: table.columns.into_iter().map(|c| c.name).collect(),
        source_digest,
    })
}

/// Ingest every source table into `config.db_path`
pub fn ingest(config: &Config) -> Result<IngestSummary> {
    info!(
        data_dir = %config.data_dir.display(),
        db = %config.db_path().display(),
        "starting ingest"
    );

    let mut conn = open_database(config.db_path())?;

    let mut tables = Vec::with_capacity(SourceTable::ALL.len());
    for source in SourceTable::ALL {
        let csv_path = config.csv_path(source.file_name());
        let summary = ingest_table(&mut conn, &csv_path, source.table_name())
            .with_context(|| format!("Failed to ingest {}", source.file_name()))?;
        tables.push(summary);
    }

    let summary = IngestSummary {
        tables,
        completed_at: Utc::now(),
    };

    info!(
        tables = summary.tables.len(),
        rows = summary.total_rows(),
        completed_at = %summary.completed_at.to_rfc3339(),
        "ingest complete"
    );

    Ok(summary)
}
