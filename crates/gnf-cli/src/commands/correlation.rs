use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ndarray::Array2;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use gnf_core::correlation::{autocorrelation, correlation_records};
use gnf_core::io::csv_io::write_records;
use gnf_core::io::sequence::{load_frame, read_sequence};
use gnf_core::window::divide_windows;

#[derive(Args)]
pub struct CorrelationArgs {
    /// Folder of image frames named by acquisition index
    pub input: PathBuf,

    /// Window side length in pixels for the coarse intensity grid
    #[arg(long, default_value = "50")]
    pub winsize: usize,

    /// Stride between window origins in pixels
    #[arg(long, default_value = "25")]
    pub step: usize,

    /// Output CSV of (R, C) records
    #[arg(short, long, default_value = "corr.csv")]
    pub output: PathBuf,
}

pub fn run(args: &CorrelationArgs) -> Result<()> {
    let entries = read_sequence(&args.input)
        .with_context(|| format!("No image sequence in {}", args.input.display()))?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Correlating frames");

    // Average the per-frame correlation quadrants.
    let mut sum: Option<Array2<f64>> = None;
    for entry in &entries {
        let frame = load_frame(entry)
            .with_context(|| format!("Failed to load {}", entry.path.display()))?;
        let grid = divide_windows(&frame.data, args.winsize, args.step)?;
        anyhow::ensure!(
            !grid.is_empty(),
            "window size {} does not fit in frame {}",
            args.winsize,
            entry.path.display()
        );
        let corr = autocorrelation(&grid.mean);

        match sum.as_mut() {
            Some(sum) => {
                anyhow::ensure!(
                    sum.dim() == corr.dim(),
                    "frame {} produced a different grid shape",
                    entry.path.display()
                );
                *sum += &corr;
            }
            None => sum = Some(corr),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Frames correlated");

    let mut avg = sum.expect("sequence is non-empty");
    avg /= entries.len() as f64;
    info!(frames = entries.len(), "Averaged correlation quadrant");

    let records = correlation_records(&avg, args.step as f64);
    write_records(&args.output, &records)?;
    println!("Correlation data saved to {}", args.output.display());

    Ok(())
}
