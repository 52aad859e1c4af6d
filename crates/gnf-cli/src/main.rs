mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gnf", about = "Density fluctuation analysis for bacterial suspension imaging")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the density-fluctuation curve of an image sequence
    Fluctuation(commands::fluctuation::FluctuationArgs),
    /// Time-resolved fluctuation curves over consecutive frame segments
    Kinetics(commands::kinetics::KineticsArgs),
    /// Velocity divergence fields from a folder of PIV results
    Divergence(commands::divergence::DivergenceArgs),
    /// Spatial intensity autocorrelation of an image sequence
    Correlation(commands::correlation::CorrelationArgs),
    /// Kinetic energy and polar order of PIV fields over time
    Energy(commands::energy::EnergyArgs),
    /// Mean image intensity over time
    Intensity(commands::intensity::IntensityArgs),
    /// Normalize fluctuation curves and collapse repeated runs
    Normalize(commands::normalize::NormalizeArgs),
    /// Fit a correlation length to (R, C) data
    CorrLength(commands::corr_length::CorrLengthArgs),
    /// Average columns across every CSV in a directory
    Average(commands::average::AverageArgs),
    /// Scaling-exponent kinetics from segmented fluctuation data
    Exponents(commands::exponents::ExponentsArgs),
    /// Print or save default windowing parameters as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Fluctuation(args) => commands::fluctuation::run(args),
        Commands::Kinetics(args) => commands::kinetics::run(args),
        Commands::Divergence(args) => commands::divergence::run(args),
        Commands::Correlation(args) => commands::correlation::run(args),
        Commands::Energy(args) => commands::energy::run(args),
        Commands::Intensity(args) => commands::intensity::run(args),
        Commands::Normalize(args) => commands::normalize::run(args),
        Commands::CorrLength(args) => commands::corr_length::run(args),
        Commands::Average(args) => commands::average::run(args),
        Commands::Exponents(args) => commands::exponents::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
