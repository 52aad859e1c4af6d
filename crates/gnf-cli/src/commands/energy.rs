use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use gnf_core::io::csv_io::{write_records, EnergyOrderRecord};
use gnf_core::io::sequence::read_data_files;
use gnf_core::piv::read_piv;

#[derive(Args)]
pub struct EnergyArgs {
    /// Folder of PIV result CSVs with columns (x, y, u, v)
    pub piv_folder: PathBuf,

    /// Acquisition frame rate, converts frame indices to seconds
    #[arg(long, default_value = "10.0")]
    pub fps: f64,

    /// Output CSV of (t, E, OP) records
    #[arg(short, long, default_value = "energy_order.csv")]
    pub output: PathBuf,
}

pub fn run(args: &EnergyArgs) -> Result<()> {
    anyhow::ensure!(args.fps > 0.0, "fps must be positive");
    let entries = read_data_files(&args.piv_folder)
        .with_context(|| format!("No PIV data in {}", args.piv_folder.display()))?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Processing fields");

    let mut records = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let field = read_piv(&entry.path)
            .with_context(|| format!("Failed to read {}", entry.path.display()))?;
        // Frame index from the file name when available, file order otherwise.
        let frame = if entry.index != i64::MAX {
            entry.index as f64
        } else {
            position as f64
        };
        records.push(EnergyOrderRecord {
            t: frame / args.fps,
            energy: field.kinetic_energy(),
            order: field.order_parameter(),
        });
        pb.inc(1);
    }
    pb.finish_with_message("Fields processed");

    write_records(&args.output, &records)?;
    println!("Energy and order saved to {}", args.output.display());
    Ok(())
}
