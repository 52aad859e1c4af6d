use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gnf_core::bounds::Bounds;
use gnf_core::io::csv_io::{
    read_records, write_records, ExponentRecord, IntensityRecord, KineticsRecord,
};
use gnf_core::series::{align_to_light_on, exponent_series, smooth_series, ExponentParams};

#[derive(Args)]
pub struct ExponentsArgs {
    /// Kinetics CSV with columns (segment, n, d)
    pub input: PathBuf,

    /// Single-bacterium length in pixels (x-axis normalization)
    #[arg(long)]
    pub lb: f64,

    /// Box-size bounds on the normalized axis: "40" or "10,40"
    #[arg(long)]
    pub xlim: Option<Bounds>,

    /// Time bounds in seconds: "300" or "60,300"
    #[arg(long)]
    pub tlim: Option<Bounds>,

    /// Frames per segment used when the kinetics were computed
    #[arg(long, default_value = "100")]
    pub seg_length: usize,

    /// Acquisition frame rate
    #[arg(long, default_value = "10.0")]
    pub fps: f64,

    /// Keep every k-th point of each segment's curve before fitting
    #[arg(long, default_value = "3")]
    pub sparse: usize,

    /// Gaussian-smooth the exponent series
    #[arg(long)]
    pub smooth: bool,

    /// Intensity CSV (t, intensity); shifts the time axis so light-on is t=0
    #[arg(long)]
    pub from_light_on: Option<PathBuf>,

    /// Output CSV of (t, alpha) records
    #[arg(short, long, default_value = "exponents.csv")]
    pub output: PathBuf,
}

pub fn run(args: &ExponentsArgs) -> Result<()> {
    let kinetics: Vec<KineticsRecord> = read_records(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let params = ExponentParams {
        lb: args.lb,
        xlim: args.xlim.unwrap_or_default(),
        tlim: args.tlim.unwrap_or_default(),
        seg_length: args.seg_length,
        fps: args.fps,
        sparse: args.sparse,
    };
    let mut series = exponent_series(&kinetics, &params)?;

    if let Some(ref intensity_path) = args.from_light_on {
        let intensity: Vec<IntensityRecord> = read_records(intensity_path)
            .with_context(|| format!("Failed to read {}", intensity_path.display()))?;
        let t: Vec<f64> = intensity.iter().map(|r| r.t as f64 / args.fps).collect();
        let values: Vec<f64> = intensity.iter().map(|r| r.intensity).collect();
        series = align_to_light_on(&series, &t, &values)?;
    }

    if args.smooth {
        let alphas: Vec<f64> = series.iter().map(|r| r.alpha).collect();
        let smoothed = smooth_series(&alphas);
        series = series
            .iter()
            .zip(smoothed)
            .map(|(r, alpha)| ExponentRecord { t: r.t, alpha })
            .collect();
    }

    write_records(&args.output, &series)?;
    println!(
        "Exponent kinetics ({} points) saved to {}",
        series.len(),
        args.output.display()
    );
    Ok(())
}
