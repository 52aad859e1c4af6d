use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gnf_core::bounds::Bounds;
use gnf_core::io::csv_io::{read_records, write_records, FluctuationRecord};
use gnf_core::normalize::{collapse_curves, normalize_gnf};

#[derive(Args)]
pub struct NormalizeArgs {
    /// Fluctuation CSVs with columns (n, d); several inputs are collapsed
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Single-bacterium length in pixels (x-axis normalization)
    #[arg(long)]
    pub lb: f64,

    /// Box-size bounds on the normalized axis: "40" or "10,40"
    #[arg(long)]
    pub xlim: Option<Bounds>,

    /// Keep every k-th point
    #[arg(long, default_value = "3")]
    pub sparse: usize,

    /// Output CSV
    #[arg(short, long, default_value = "normalized.csv")]
    pub output: PathBuf,
}

pub fn run(args: &NormalizeArgs) -> Result<()> {
    let xlim = args.xlim.unwrap_or_default();

    let mut curves = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let records: Vec<FluctuationRecord> =
            read_records(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let curve = normalize_gnf(&records, args.lb, xlim, args.sparse)
            .with_context(|| format!("Failed to normalize {}", path.display()))?;
        curves.push(curve);
    }

    if curves.len() == 1 {
        write_records(&args.output, &curves[0])?;
        println!(
            "Normalized curve ({} points) saved to {}",
            curves[0].len(),
            args.output.display()
        );
    } else {
        let collapsed = collapse_curves(&curves)?;
        write_records(&args.output, &collapsed)?;
        println!(
            "Collapsed {} curves ({} points) into {}",
            curves.len(),
            collapsed.len(),
            args.output.display()
        );
    }

    Ok(())
}
