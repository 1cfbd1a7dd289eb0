// Entity Models - the five CSV sources
//
// Each source is a flat record with no computed fields:
// - departments and employees (who spent)
// - merchants (where, and how risky)
// - compliance_rules and expenses (what, and the per-category limit)
//
// Ingestion itself is schema-agnostic; these records describe the expected
// columns and give tests a typed way to build fixtures.

pub mod expense;
pub mod merchant;
pub mod organization;

pub use expense::{ComplianceRule, Expense};
pub use merchant::{Merchant, HIGH_RISK_LEVEL};
pub use organization::{Department, Employee};

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

// ============================================================================
// SOURCE TABLES
// ============================================================================

/// SourceTable - one CSV file that becomes one database table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    Departments,
    Employees,
    Merchants,
    Expenses,
    ComplianceRules,
}

impl SourceTable {
    /// Ingestion order
    pub const ALL: [SourceTable; 5] = [
        SourceTable::Departments,
        SourceTable::Employees,
        SourceTable::Merchants,
        SourceTable::Expenses,
        SourceTable::ComplianceRules,
    ];

    /// Table name inside compliance_data.db
    pub fn table_name(&self) -> &'static str {
        match self {
            SourceTable::Departments => "departments",
            SourceTable::Employees => "employees",
            SourceTable::Merchants => "merchants",
            SourceTable::Expenses => "expenses",
            SourceTable::ComplianceRules => "compliance_rules",
        }
    }

    /// CSV file name relative to the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            SourceTable::Departments => "departments.csv",
            SourceTable::Employees => "employees.csv",
            SourceTable::Merchants => "merchants.csv",
            SourceTable::Expenses => "expenses.csv",
            SourceTable::ComplianceRules => "compliance_rules.csv",
        }
    }

    /// Columns the report query relies on
    pub fn expected_columns(&self) -> &'static [&'static str] {
        match self {
            SourceTable::Departments => &["department_id", "department_name"],
            SourceTable::Employees => &["employee_id", "full_name", "department_id"],
            SourceTable::Merchants => &["merchant_id", "merchant_name", "merchant_risk_level"],
            SourceTable::Expenses => &[
                "employee_id",
                "merchant_id",
                "category",
                "submission_date",
                "amount",
            ],
            SourceTable::ComplianceRules => &["category", "max_amount"],
        }
    }
}

/// Write records as a headed CSV file (column names from the serde field names)
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;

    for record in records {
        wtr.serialize(record)
            .with_context(|| format!("Failed to write record to {}", path.display()))?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}
