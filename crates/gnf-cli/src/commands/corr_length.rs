use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gnf_core::bounds::Bounds;
use gnf_core::correlation::corr_length;
use gnf_core::io::csv_io::{read_records, CorrelationRecord};

#[derive(Args)]
pub struct CorrLengthArgs {
    /// CSV with columns (R, C)
    pub input: PathBuf,

    /// Separation bounds in pixels: "200" or "20,200"
    #[arg(long)]
    pub range: Option<Bounds>,

    /// Microns per pixel; also reports the length in microns
    #[arg(long)]
    pub mpp: Option<f64>,
}

pub fn run(args: &CorrLengthArgs) -> Result<()> {
    let records: Vec<CorrelationRecord> = read_records(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let fit = corr_length(&records, args.range.unwrap_or_default())?;

    println!("Points fitted:      {}", records.len());
    println!("Decay rate:         {:.6} 1/px", fit.rate);
    println!("Correlation length: {:.2} px", fit.length);
    if let Some(mpp) = args.mpp {
        println!("                    {:.2} um", fit.length * mpp);
    }

    Ok(())
}
