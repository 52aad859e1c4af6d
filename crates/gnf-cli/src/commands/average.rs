use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gnf_core::average::{average_data, write_table};

#[derive(Args)]
pub struct AverageArgs {
    /// Folder of CSV files sharing the columns to average
    pub directory: PathBuf,

    /// Comma-separated column labels to average
    #[arg(long, value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Output CSV
    #[arg(short, long, default_value = "averaged.csv")]
    pub output: PathBuf,
}

pub fn run(args: &AverageArgs) -> Result<()> {
    let table = average_data(&args.directory, &args.columns)
        .with_context(|| format!("Failed to average {}", args.directory.display()))?;
    write_table(&args.output, &table)?;

    println!(
        "Averaged columns {:?} ({} rows) saved to {}",
        args.columns,
        table.rows(),
        args.output.display()
    );
    Ok(())
}
