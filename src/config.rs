// ⚙️ Configuration - where the CSVs live and where the database goes
// No CLI arguments: defaults plus environment overrides

use std::env;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

/// Database file name, created next to the CSV files by default
pub const DEFAULT_DB_FILE: &str = "compliance_data.db";

/// Overrides the directory holding the five CSV files
pub const DATA_DIR_ENV: &str = "EXPENSE_DATA_DIR";

/// Overrides the database file path
pub const DB_PATH_ENV: &str = "EXPENSE_DB_PATH";

/// Log filter directive (falls back to RUST_LOG, then "warn")
pub const LOG_ENV: &str = "EXPENSE_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding departments.csv, employees.csv, ...
    pub data_dir: PathBuf,

    /// SQLite database written by the ingestor and read by the reporter
    pub db_path: PathBuf,
}

impl Config {
    /// Config rooted at `data_dir`, database alongside the CSVs
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let db_path = data_dir.join(DEFAULT_DB_FILE);
        Self { data_dir, db_path }
    }

    /// Defaults to the working directory, then applies environment overrides
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `get`; blank values are ignored
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| get(key).filter(|value| !value.trim().is_empty());

        let mut config = match lookup(DATA_DIR_ENV) {
            Some(dir) => Self::new(dir),
            None => Self::new("."),
        };

        if let Some(db_path) = lookup(DB_PATH_ENV) {
            config.db_path = PathBuf::from(db_path);
        }

        config
    }

    pub fn csv_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".")
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Install the stderr subscriber used by both binaries
///
/// Stdout is reserved for the report, so all logging goes to stderr.
pub fn init_logging() {
    let filter = non_empty_var(LOG_ENV)
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
