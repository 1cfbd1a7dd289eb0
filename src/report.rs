// 🚩 Reporter - flag non-compliant and high-risk expenses
//
// One fixed query over the five ingested tables. An expense is flagged when
// its amount is strictly above its category maximum OR its merchant's risk
// level is exactly "High". Inner joins drop expenses with dangling
// references; those are counted and logged, never reported.

use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::{open_database_read_only, table_columns, table_exists};
use crate::entities::SourceTable;
use crate::format::render_table;

/// Printed instead of an empty table
pub const NO_RESULTS_MESSAGE: &str = "No high-risk or non-compliant expenses found.";

pub const FLAGGED_EXPENSES_QUERY: &str = "
    SELECT
      e.full_name,
      d.department_name,
      x.submission_date,
      m.merchant_name,
      m.merchant_risk_level,
      x.amount,
      r.max_amount
    FROM expenses x
    JOIN employees e ON x.employee_id = e.employee_id
    JOIN departments d ON e.department_id = d.department_id
    JOIN merchants m ON x.merchant_id = m.merchant_id
    JOIN compliance_rules r ON x.category = r.category
    WHERE x.amount > r.max_amount
       OR m.merchant_risk_level = 'High'
    ORDER BY x.submission_date";

// ============================================================================
// RESULT TABLE
// ============================================================================

/// Query result: column headers plus raw SQLite values, in query order
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ReportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Aligned table, or the fixed message when there are no rows
    pub fn to_display_string(&self) -> String {
        if self.is_empty() {
            NO_RESULTS_MESSAGE.to_string()
        } else {
            render_table(&self.columns, &self.rows)
        }
    }
}

/// Run the flagged-expense query
pub fn find_flagged_expenses(conn: &Connection) -> Result<ReportTable> {
    let mut stmt = conn
        .prepare(FLAGGED_EXPENSES_QUERY)
        .context("Failed to prepare flagged expenses query")?;

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read flagged expenses")?;

    Ok(ReportTable { columns, rows })
}

// ============================================================================
// ORPHAN DIAGNOSTICS
// ============================================================================

/// Expenses the inner join silently drops, by the reference that is missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrphanCounts {
    pub missing_employee: i64,
    pub missing_department: i64,
    pub missing_merchant: i64,
    pub missing_rule: i64,
}

impl OrphanCounts {
    /// Sum over references; one expense may be counted more than once
    pub fn total(&self) -> i64 {
        self.missing_employee + self.missing_department + self.missing_merchant + self.missing_rule
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

pub fn find_orphaned_expenses(conn: &Connection) -> Result<OrphanCounts> {
    let count = |sql: &str| -> Result<i64> {
        conn.query_row(sql, [], |row| row.get(0))
            .context("Failed to count orphaned expenses")
    };

    Ok(OrphanCounts {
        missing_employee: count(
            "SELECT COUNT(*) FROM expenses x
             WHERE NOT EXISTS (SELECT 1 FROM employees e WHERE e.employee_id = x.employee_id)",
        )?,
        missing_department: count(
            "SELECT COUNT(*) FROM expenses x
             WHERE EXISTS (SELECT 1 FROM employees e WHERE e.employee_id = x.employee_id)
               AND NOT EXISTS (
                 SELECT 1 FROM employees e
                 JOIN departments d ON e.department_id = d.department_id
                 WHERE e.employee_id = x.employee_id
               )",
        )?,
        missing_merchant: count(
            "SELECT COUNT(*) FROM expenses x
             WHERE NOT EXISTS (SELECT 1 FROM merchants m WHERE m.merchant_id = x.merchant_id)",
        )?,
        missing_rule: count(
            "SELECT COUNT(*) FROM expenses x
             WHERE NOT EXISTS (SELECT 1 FROM compliance_rules r WHERE r.category = x.category)",
        )?,
    })
}

fn log_orphans(orphans: &OrphanCounts) {
    if orphans.is_clean() {
        debug!("every expense references existing rows");
        return;
    }

    let checks = [
        ("employee", orphans.missing_employee),
        ("department", orphans.missing_department),
        ("merchant", orphans.missing_merchant),
        ("compliance rule", orphans.missing_rule),
    ];
    for (reference, expenses) in checks {
        if expenses > 0 {
            warn!(reference, expenses, "expenses dropped from report: referenced row missing");
        }
    }
}

// ============================================================================
// RUN
// ============================================================================

/// Fail early, with a readable message, if ingest has not produced a table
pub fn check_schema(conn: &Connection) -> Result<()> {
    for source in SourceTable::ALL {
        let table = source.table_name();
        if !table_exists(conn, table)? {
            bail!("Table '{}' is missing (run ingest-data first)", table);
        }

        let columns = table_columns(conn, table)?;
        for expected in source.expected_columns() {
            if !columns.iter().any(|c| c.name == *expected) {
                bail!("Table '{}' has no column '{}'", table, expected);
            }
        }
    }

    Ok(())
}

/// Open the database and produce exactly what the reporter prints
pub fn run_report(config: &Config) -> Result<String> {
    let conn = open_database_read_only(config.db_path())?;
    check_schema(&conn)?;

    log_orphans(&find_orphaned_expenses(&conn)?);

    let report = find_flagged_expenses(&conn)?;
    info!(flagged = report.len(), "report complete");

    Ok(report.to_display_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(conn: &Connection, risk: &str, amount: &str) {
        conn.execute_batch(&format!(
            "CREATE TABLE departments (department_id INTEGER, department_name TEXT);
             CREATE TABLE employees (employee_id INTEGER, full_name TEXT, department_id INTEGER);
             CREATE TABLE merchants (merchant_id INTEGER, merchant_name TEXT, merchant_risk_level TEXT);
             CREATE TABLE expenses (employee_id INTEGER, merchant_id INTEGER, category TEXT, submission_date TEXT, amount INTEGER);
             CREATE TABLE compliance_rules (category TEXT, max_amount INTEGER);
             INSERT INTO departments VALUES (1, 'Engineering');
             INSERT INTO employees VALUES (1, 'Jane Doe', 1);
             INSERT INTO merchants VALUES (1, 'Acme', '{risk}');
             INSERT INTO compliance_rules VALUES ('Travel', 100);
             INSERT INTO expenses VALUES (1, 1, 'Travel', '2024-01-01', {amount});"
        ))
        .unwrap();
    }

    #[test]
    fn test_over_limit_is_flagged() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn, "Low", "150");

        let report = find_flagged_expenses(&conn).unwrap();

        assert_eq!(
            report.columns,
            vec![
                "full_name",
                "department_name",
                "submission_date",
                "merchant_name",
                "merchant_risk_level",
                "amount",
                "max_amount"
            ]
        );
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.rows[0],
            vec![
                Value::Text("Jane Doe".into()),
                Value::Text("Engineering".into()),
                Value::Text("2024-01-01".into()),
                Value::Text("Acme".into()),
                Value::Text("Low".into()),
                Value::Integer(150),
                Value::Integer(100),
            ]
        );
    }

    #[test]
    fn test_high_risk_flagged_under_limit() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn, "High", "50");

        let report = find_flagged_expenses(&conn).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.rows[0][4], Value::Text("High".into()));
        assert_eq!(report.rows[0][5], Value::Integer(50));
    }

    #[test]
    fn test_compliant_low_risk_prints_message() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn, "Low", "50");

        let report = find_flagged_expenses(&conn).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.to_display_string(), NO_RESULTS_MESSAGE);
    }

    #[test]
    fn test_amount_equal_to_limit_not_flagged() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn, "Medium", "100");

        assert!(find_flagged_expenses(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_rows_ordered_by_submission_date() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn, "High", "50");
        conn.execute_batch(
            "INSERT INTO expenses VALUES (1, 1, 'Travel', '2023-12-31', 10);
             INSERT INTO expenses VALUES (1, 1, 'Travel', '2024-03-15', 500);
             INSERT INTO expenses VALUES (1, 1, 'Travel', '2024-02-01', 20);",
        )
        .unwrap();

        let report = find_flagged_expenses(&conn).unwrap();
        let dates: Vec<&Value> = report.rows.iter().map(|r| &r[2]).collect();
        assert_eq!(
            dates,
            vec![
                &Value::Text("2023-12-31".into()),
                &Value::Text("2024-01-01".into()),
                &Value::Text("2024-02-01".into()),
                &Value::Text("2024-03-15".into()),
            ]
        );
    }

    #[test]
    fn test_orphans_are_dropped_and_counted() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn, "High", "50");
        conn.execute_batch(
            "INSERT INTO expenses VALUES (99, 1, 'Travel', '2024-01-02', 500);
             INSERT INTO expenses VALUES (1, 42, 'Travel', '2024-01-03', 500);
             INSERT INTO expenses VALUES (1, 1, 'Gifts', '2024-01-04', 500);
             INSERT INTO employees VALUES (2, 'John Roe', 7);
             INSERT INTO expenses VALUES (2, 1, 'Travel', '2024-01-05', 500);",
        )
        .unwrap();

        let report = find_flagged_expenses(&conn).unwrap();
        assert_eq!(report.len(), 1, "only the fully-joined expense survives");

        let orphans = find_orphaned_expenses(&conn).unwrap();
        assert_eq!(
            orphans,
            OrphanCounts {
                missing_employee: 1,
                missing_department: 1,
                missing_merchant: 1,
                missing_rule: 1,
            }
        );
        assert_eq!(orphans.total(), 4);
        assert!(!orphans.is_clean());
    }

    #[test]
    fn test_check_schema_reports_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn, "Low", "50");
        conn.execute_batch("DROP TABLE merchants;").unwrap();

        let err = check_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("'merchants' is missing"));
    }

    #[test]
    fn test_check_schema_reports_missing_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE departments (department_id INTEGER, department_name TEXT);
             CREATE TABLE employees (employee_id INTEGER, name TEXT, department_id INTEGER);",
        )
        .unwrap();

        let err = check_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("no column 'full_name'"));
    }
}
