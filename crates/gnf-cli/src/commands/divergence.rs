use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use gnf_core::io::csv_io::{write_records, ProcessingLog};
use gnf_core::io::sequence::read_data_files;
use gnf_core::piv::read_piv;

use crate::summary::print_summary;

#[derive(Args)]
pub struct DivergenceArgs {
    /// Folder of PIV result CSVs with columns (x, y, u, v)
    pub piv_folder: PathBuf,

    /// Output folder; one (x, y, div) CSV is written per input file
    pub output: PathBuf,
}

pub fn run(args: &DivergenceArgs) -> Result<()> {
    let entries = read_data_files(&args.piv_folder)
        .with_context(|| format!("No PIV data in {}", args.piv_folder.display()))?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut log = ProcessingLog::create(&args.output.join("log.txt"))?;

    print_summary(
        "Velocity Divergence",
        &[
            ("Input", args.piv_folder.display().to_string()),
            ("Output", args.output.display().to_string()),
            ("Fields", entries.len().to_string()),
        ],
    );

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Processing fields");

    for entry in &entries {
        let field = read_piv(&entry.path)
            .with_context(|| format!("Failed to read {}", entry.path.display()))?;
        let records = field.divergence_records()?;
        write_records(&args.output.join(format!("{}.csv", entry.name)), &records)?;
        log.record(&entry.name)?;
        pb.inc(1);
    }
    pb.finish_with_message("Fields processed");

    println!("Divergence fields saved to {}", args.output.display());
    Ok(())
}
