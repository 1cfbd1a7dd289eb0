// 📋 In-memory tables - CSV contents with inferred column types
//
// A CsvTable keeps the header names and row order exactly as read. Each
// column gets one SQLite storage class for the whole table:
//   all non-empty cells are integers  → INTEGER
//   all non-empty cells are numbers   → REAL
//   anything else (or all empty)      → TEXT
// Empty cells and the usual missing-value markers (NA, N/A, NULL, nan, ...)
// become NULL. An integer column with NULLs is widened to REAL.

use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use std::collections::HashMap;

// ============================================================================
// COLUMN TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Declared type used in CREATE TABLE
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Map a declared SQLite type back (used when reading a table)
    pub fn from_declared(declared: &str) -> ColumnType {
        let declared = declared.to_ascii_uppercase();
        if declared.contains("INT") {
            ColumnType::Integer
        } else if declared.contains("REAL")
            || declared.contains("FLOA")
            || declared.contains("DOUB")
        {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }

    /// Pick the narrowest type that holds every cell of a column
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> ColumnType {
        let mut seen_value = false;
        let mut seen_empty = false;
        let mut all_int = true;

        for cell in cells {
            let cell = cell.trim();
            if is_missing(cell) {
                seen_empty = true;
                continue;
            }
            seen_value = true;

            if cell.parse::<i64>().is_ok() {
                continue;
            }
            all_int = false;

            if parse_float(cell).is_none() {
                return ColumnType::Text;
            }
        }

        match (seen_value, all_int, seen_empty) {
            (false, _, _) => ColumnType::Text,
            (true, true, false) => ColumnType::Integer,
            _ => ColumnType::Real,
        }
    }

    /// Convert one raw cell into a value of this column type
    pub fn convert(&self, cell: &str) -> Value {
        let trimmed = cell.trim();
        if is_missing(trimmed) {
            return Value::Null;
        }

        match self {
            ColumnType::Integer => trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(cell.to_string())),
            ColumnType::Real => parse_float(trimmed)
                .map(Value::Real)
                .unwrap_or_else(|| Value::Text(cell.to_string())),
            ColumnType::Text => Value::Text(cell.to_string()),
        }
    }
}

/// Cell contents read as NULL, whatever the column type
pub const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

/// Finite floats only; "inf" stays text
fn parse_float(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|value| value.is_finite())
}

// ============================================================================
// TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    /// Target table name in the database
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl CsvTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// All values of one column, in row order
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Build a typed table from a header and raw string records
    pub fn from_records(name: &str, headers: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        let headers = normalize_headers(name, headers)?;

        let columns: Vec<Column> = headers
            .into_iter()
            .enumerate()
            .map(|(idx, header)| Column {
                column_type: ColumnType::infer(records.iter().map(|r| r[idx].as_str())),
                name: header,
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .zip(&columns)
                    .map(|(cell, column)| column.column_type.convert(cell))
                    .collect()
            })
            .collect();

        Ok(CsvTable {
            name: name.to_string(),
            columns,
            rows,
        })
    }
}

/// Blank names become "Unnamed: <index>", repeats get ".1", ".2", ...
fn normalize_headers(table: &str, headers: Vec<String>) -> Result<Vec<String>> {
    if headers.is_empty() {
        bail!("CSV for table '{}' has no header row", table);
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(headers.len());

    for (idx, header) in headers.into_iter().enumerate() {
        let mut name = if header.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            header
        };

        let mut seen = counts.get(&name).copied().unwrap_or(0);
        while seen > 0 {
            counts.insert(name.clone(), seen + 1);
            name = format!("{}.{}", name, seen);
            seen = counts.get(&name).copied().unwrap_or(0);
        }
        counts.insert(name.clone(), seen + 1);
        names.push(name);
    }

    Ok(names)
}

// ============================================================================
// CSV LOADING
// ============================================================================

/// Read a headed CSV into a table named `table_name`
///
/// Fails on a missing header, invalid UTF-8, or ragged rows.
pub fn read_csv_table<R: std::io::Read>(mut rdr: csv::Reader<R>, table_name: &str) -> Result<CsvTable> {
    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // Header is line 1
        let record = result.with_context(|| format!("Malformed CSV record at line {}", idx + 2))?;
        records.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    CsvTable::from_records(table_name, headers, records)
}
