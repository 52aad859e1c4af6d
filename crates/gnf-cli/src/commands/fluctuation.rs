use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use gnf_core::fluctuation::{FluctuationAccumulator, FluctuationParams};
use gnf_core::io::csv_io::{write_records, ProcessingLog};
use gnf_core::io::sequence::{load_frame, read_sequence};

use crate::summary::print_summary;

#[derive(Args)]
pub struct FluctuationArgs {
    /// Folder of image frames named by acquisition index
    pub input: PathBuf,

    /// Output folder for df_average.csv and log.txt
    pub output: PathBuf,

    /// Smallest window side length in pixels
    #[arg(long, default_value = "5")]
    pub size_min: usize,

    /// Stride between window origins (default 50 * size_min)
    #[arg(long)]
    pub step: Option<usize>,

    /// TOML file overriding the windowing parameters
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write the pooled (all windows, all frames) estimate
    #[arg(long)]
    pub pooled: bool,
}

pub fn run(args: &FluctuationArgs) -> Result<()> {
    let params = load_params(args)?;
    let entries = read_sequence(&args.input)
        .with_context(|| format!("No image sequence in {}", args.input.display()))?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut log = ProcessingLog::create(&args.output.join("log.txt"))?;
    log.parameter("size_min", params.size_min)?;
    log.parameter("step", params.stride())?;

    print_summary(
        "Density Fluctuation",
        &[
            ("Input", args.input.display().to_string()),
            ("Output", args.output.display().to_string()),
            ("Frames", entries.len().to_string()),
            ("Min window", format!("{} px", params.size_min)),
            ("Stride", format!("{} px", params.stride())),
        ],
    );

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Processing frames");

    let mut acc: Option<FluctuationAccumulator> = None;
    for entry in &entries {
        let frame = load_frame(entry)
            .with_context(|| format!("Failed to load {}", entry.path.display()))?;
        if acc.is_none() {
            acc = Some(FluctuationAccumulator::new(
                frame.height(),
                frame.width(),
                &params,
            )?);
        }
        acc.as_mut().expect("just initialized").add_frame(&frame)?;
        log.record(&entry.name)?;
        pb.inc(1);
    }
    pb.finish_with_message("Frames processed");

    let acc = acc.expect("sequence is non-empty");
    info!(
        sizes = acc.sizes().len(),
        frames = acc.frames(),
        "Window statistics accumulated"
    );

    let average_path = args.output.join("df_average.csv");
    write_records(&average_path, &acc.temporal_records()?)?;
    println!("Fluctuation curve saved to {}", average_path.display());

    if args.pooled {
        let pooled_path = args.output.join("df_pooled.csv");
        write_records(&pooled_path, &acc.pooled_records()?)?;
        println!("Pooled estimate saved to {}", pooled_path.display());
    }

    Ok(())
}

fn load_params(args: &FluctuationArgs) -> Result<FluctuationParams> {
    if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid windowing config")
    } else {
        Ok(FluctuationParams {
            size_min: args.size_min,
            step: args.step,
        })
    }
}
