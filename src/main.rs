// Ingestor - rebuild compliance_data.db from the five CSV files
// Takes no arguments; see config.rs for the environment overrides

use anyhow::Result;

use expense_compliance::{ingest, init_logging, Config};

fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env();
    ingest(&config)?;

    Ok(())
}
