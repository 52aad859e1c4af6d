use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GnfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Frame dimensions {got_width}x{got_height} do not match sequence dimensions {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },

    #[error("No valid window sizes: size_min = {size_min} exceeds (L - size_min)/2 for shorter side L = {shorter_side}")]
    WindowRange {
        size_min: usize,
        shorter_side: usize,
    },

    #[error("Column '{column}' does not exist in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("No data points left after applying bounds")]
    EmptySelection,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Inconsistent table: {0}")]
    TableMismatch(String),

    #[error("Curve fit failed: {0}")]
    FitFailed(String),

    #[error("PIV data is not a regular grid: {0}")]
    RaggedGrid(String),
}

pub type Result<T> = std::result::Result<T, GnfError>;
