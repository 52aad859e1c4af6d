use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use gnf_core::io::csv_io::{write_records, IntensityRecord};
use gnf_core::io::sequence::{load_frame, read_sequence};

#[derive(Args)]
pub struct IntensityArgs {
    /// Folder of image frames named by acquisition index
    pub input: PathBuf,

    /// Output CSV of (t, intensity) records
    #[arg(short, long, default_value = "intensity.csv")]
    pub output: PathBuf,
}

pub fn run(args: &IntensityArgs) -> Result<()> {
    let entries = read_sequence(&args.input)
        .with_context(|| format!("No image sequence in {}", args.input.display()))?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Reading frames");

    let mut records = Vec::with_capacity(entries.len());
    for entry in &entries {
        let frame = load_frame(entry)
            .with_context(|| format!("Failed to load {}", entry.path.display()))?;
        records.push(IntensityRecord {
            t: frame.index,
            intensity: frame.mean_intensity(),
        });
        pb.inc(1);
    }
    pb.finish_with_message("Frames read");

    write_records(&args.output, &records)?;
    println!("Intensity series saved to {}", args.output.display());
    Ok(())
}
