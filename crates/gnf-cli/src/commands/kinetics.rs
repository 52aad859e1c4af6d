use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use gnf_core::fluctuation::{FluctuationAccumulator, FluctuationParams};
use gnf_core::io::csv_io::{write_records, KineticsRecord, ProcessingLog};
use gnf_core::io::sequence::{load_frame, read_sequence};

use crate::summary::print_summary;

#[derive(Args)]
pub struct KineticsArgs {
    /// Folder of image frames named by acquisition index
    pub input: PathBuf,

    /// Output folder for kinetics.csv and log.txt
    pub output: PathBuf,

    /// Smallest window side length in pixels
    #[arg(long, default_value = "5")]
    pub size_min: usize,

    /// Stride between window origins (default 50 * size_min)
    #[arg(long)]
    pub step: Option<usize>,

    /// Frames per segment
    #[arg(long, default_value = "100")]
    pub seg_length: usize,

    /// TOML file overriding the windowing parameters
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &KineticsArgs) -> Result<()> {
    anyhow::ensure!(args.seg_length > 0, "segment length must be at least 1");

    let params = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid windowing config")?
    } else {
        FluctuationParams {
            size_min: args.size_min,
            step: args.step,
        }
    };

    let entries = read_sequence(&args.input)
        .with_context(|| format!("No image sequence in {}", args.input.display()))?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut log = ProcessingLog::create(&args.output.join("log.txt"))?;
    log.parameter("size_min", params.size_min)?;
    log.parameter("step", params.stride())?;
    log.parameter("seg_length", args.seg_length)?;

    print_summary(
        "Fluctuation Kinetics",
        &[
            ("Input", args.input.display().to_string()),
            ("Output", args.output.display().to_string()),
            ("Frames", entries.len().to_string()),
            ("Segment", format!("{} frames", args.seg_length)),
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

    // One accumulator per segment, flushed as each segment fills.
    let mut records: Vec<KineticsRecord> = Vec::new();
    let mut acc: Option<FluctuationAccumulator> = None;
    let mut segment = 1u32;
    let mut dims: Option<(usize, usize)> = None;

    for entry in &entries {
        let frame = load_frame(entry)
            .with_context(|| format!("Failed to load {}", entry.path.display()))?;
        let (height, width) = *dims.get_or_insert((frame.height(), frame.width()));

        if acc.is_none() {
            acc = Some(FluctuationAccumulator::new(height, width, &params)?);
        }
        let current = acc.as_mut().expect("just initialized");
        current.add_frame(&frame)?;
        log.record(&entry.name)?;
        pb.inc(1);

        if current.frames() == args.seg_length {
            flush_segment(&mut acc, segment, &mut records)?;
            segment += 1;
        }
    }
    // Trailing partial segment.
    if acc.as_ref().map(|a| a.frames() > 0).unwrap_or(false) {
        flush_segment(&mut acc, segment, &mut records)?;
    }
    pb.finish_with_message("Frames processed");

    info!(segments = segment, "Kinetics segments computed");

    let path = args.output.join("kinetics.csv");
    write_records(&path, &records)?;
    println!("Kinetics curves saved to {}", path.display());

    Ok(())
}

fn flush_segment(
    acc: &mut Option<FluctuationAccumulator>,
    segment: u32,
    records: &mut Vec<KineticsRecord>,
) -> Result<()> {
    let current = acc.take().expect("segment has frames");
    records.extend(
        current
            .temporal_records()?
            .into_iter()
            .map(|r| KineticsRecord {
                segment,
                n: r.n,
                d: r.d,
            }),
    );
    Ok(())
}
