use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::Path;

use crate::table::{Column, ColumnType, CsvTable};

/// Open (or create) the database for writing
pub fn open_database(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database {} for writing", db_path.display()))?;
    Ok(conn)
}

/// Open an existing database read-only; a missing file is an error
pub fn open_database_read_only(db_path: &Path) -> Result<Connection> {
    if !db_path.exists() {
        bail!(
            "Database not found: {} (run ingest-data first)",
            db_path.display()
        );
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    Ok(conn)
}

/// Quote a table or column name taken from a CSV header
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Drop-and-recreate `table.name`, then insert every row in order
///
/// The whole replacement runs in one SQLite transaction: either the new
/// table is fully written or the previous one is left untouched. Indices on
/// the old table go with it.
pub fn replace_table(conn: &mut Connection, table: &CsvTable) -> Result<usize> {
    let table_name = quote_identifier(&table.name);

    let column_defs: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type.sql_type()))
        .collect();

    let tx = conn
        .transaction()
        .with_context(|| format!("Failed to begin write of table '{}'", table.name))?;

    tx.execute(&format!("DROP TABLE IF EXISTS {}", table_name), [])
        .with_context(|| format!("Failed to drop table '{}'", table.name))?;

    tx.execute(
        &format!("CREATE TABLE {} ({})", table_name, column_defs.join(", ")),
        [],
    )
    .with_context(|| format!("Failed to create table '{}'", table.name))?;

    let mut inserted = 0;
    {
        let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("?{}", i)).collect();
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} VALUES ({})",
            table_name,
            placeholders.join(", ")
        ))?;

        for row in &table.rows {
            stmt.execute(params_from_iter(row.iter()))
                .with_context(|| format!("Failed to insert row {} into '{}'", inserted + 1, table.name))?;
            inserted += 1;
        }
    }

    tx.commit()
        .with_context(|| format!("Failed to commit table '{}'", table.name))?;

    Ok(inserted)
}

pub fn table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table_name],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Column names and declared types, in table order
pub fn table_columns(conn: &Connection, table_name: &str) -> Result<Vec<Column>> {
    let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;

    let columns = stmt
        .query_map([table_name], |row| {
            let name: String = row.get(0)?;
            let declared: String = row.get(1)?;
            Ok(Column {
                name,
                column_type: ColumnType::from_declared(&declared),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns)
}

/// Read a whole table back in insertion order
pub fn read_table(conn: &Connection, table_name: &str) -> Result<CsvTable> {
    if !table_exists(conn, table_name)? {
        bail!("Table '{}' does not exist", table_name);
    }

    let columns = table_columns(conn, table_name)?;
    let width = columns.len();

    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} ORDER BY rowid",
        quote_identifier(table_name)
    ))?;

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read table '{}'", table_name))?;

    Ok(CsvTable {
        name: table_name.to_string(),
        columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departments() -> CsvTable {
        CsvTable::from_records(
            "departments",
            vec!["department_id".to_string(), "department_name".to_string()],
            vec![
                vec!["2".to_string(), "Finance".to_string()],
                vec!["1".to_string(), "Engineering".to_string()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        let table = departments();

        let inserted = replace_table(&mut conn, &table).unwrap();
        assert_eq!(inserted, 2);

        let back = read_table(&conn, "departments").unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_replace_drops_previous_contents() {
        let mut conn = Connection::open_in_memory().unwrap();
        replace_table(&mut conn, &departments()).unwrap();
        replace_table(&mut conn, &departments()).unwrap();

        assert_eq!(read_table(&conn, "departments").unwrap().row_count(), 2);
    }

    #[test]
    fn test_replace_drops_old_schema_and_indices() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE departments (legacy TEXT, other TEXT, extra TEXT);
             CREATE INDEX idx_legacy ON departments(legacy);
             INSERT INTO departments VALUES ('x', 'y', 'z');",
        )
        .unwrap();

        replace_table(&mut conn, &departments()).unwrap();

        let columns = table_columns(&conn, "departments").unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["department_id", "department_name"]);

        let indices: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = 'departments'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indices, 0);
    }

    #[test]
    fn test_identifiers_are_quoted() {
        assert_eq!(quote_identifier("amount"), "\"amount\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");

        let mut conn = Connection::open_in_memory().unwrap();
        let table = CsvTable::from_records(
            "weird table",
            vec!["select".to_string(), "has space".to_string()],
            vec![vec!["1".to_string(), "a".to_string()]],
        )
        .unwrap();

        replace_table(&mut conn, &table).unwrap();
        assert_eq!(read_table(&conn, "weird table").unwrap(), table);
    }

    #[test]
    fn test_read_missing_table_fails() {
        let conn = Connection::open_in_memory().unwrap();
        let err = read_table(&conn, "expenses").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_read_only_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("compliance_data.db");

        assert!(open_database_read_only(&missing).is_err());
        assert!(!missing.exists(), "read-only open must not create the file");
    }
}
