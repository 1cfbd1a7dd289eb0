// Expense Compliance - Core Library
// Shared by the ingest-data and analyze-expenses binaries and the tests

pub mod config;
pub mod db;
pub mod entities;
pub mod format;
pub mod ingest;
pub mod report;
pub mod table;

// Re-export commonly used types
pub use config::{init_logging, Config};
pub use db::{
    open_database, open_database_read_only, read_table, replace_table, table_exists,
};
pub use entities::{
    ComplianceRule, Department, Employee, Expense, Merchant, SourceTable, HIGH_RISK_LEVEL,
};
pub use ingest::{ingest, ingest_table, IngestSummary, TableSummary};
pub use report::{
    find_flagged_expenses, find_orphaned_expenses, run_report, OrphanCounts, ReportTable,
    NO_RESULTS_MESSAGE,
};
pub use table::{read_csv_table, ColumnType, CsvTable};
