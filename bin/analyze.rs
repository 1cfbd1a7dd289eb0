// Reporter - print flagged expenses from compliance_data.db
// Run ingest-data first

use anyhow::Result;

use expense_compliance::{init_logging, run_report, Config};

fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env();
    let output = run_report(&config)?;
    println!("{}", output);

    Ok(())
}
