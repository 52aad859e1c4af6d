use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::error::{GnfError, Result};
use crate::frame::Frame;

/// File extensions treated as image frames.
const IMAGE_EXTENSIONS: [&str; 6] = ["tif", "tiff", "png", "jpg", "jpeg", "bmp"];

/// One file of an ordered sequence (image frames or per-frame CSV data).
#[derive(Clone, Debug)]
pub struct SequenceEntry {
    /// Ordering key parsed from the file name.
    pub index: i64,
    /// File stem, used to name derived outputs and log lines.
    pub name: String,
    pub path: PathBuf,
}

/// List the image files in `dir` whose stems parse as integers, ordered by
/// that integer. Frames are conventionally named by acquisition index
/// (`900.tif`, `901.tif`, ...).
pub fn read_sequence(dir: &Path) -> Result<Vec<SequenceEntry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !has_extension(&path, &IMAGE_EXTENSIONS) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Ok(index) = stem.parse::<i64>() {
            entries.push(SequenceEntry {
                index,
                name: stem.to_string(),
                path,
            });
        }
    }

    if entries.is_empty() {
        return Err(GnfError::EmptySequence);
    }
    entries.sort_by_key(|e| e.index);
    Ok(entries)
}

/// List the CSV files in `dir`, ordered by the leading integer of the stem
/// when present (PIV exports are named like `900-930.csv`), then by name.
pub fn read_data_files(dir: &Path) -> Result<Vec<SequenceEntry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !has_extension(&path, &["csv"]) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        entries.push(SequenceEntry {
            index: leading_integer(stem).unwrap_or(i64::MAX),
            name: stem.to_string(),
            path,
        });
    }

    if entries.is_empty() {
        return Err(GnfError::EmptySequence);
    }
    entries.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            extensions.iter().any(|&x| x == e)
        })
        .unwrap_or(false)
}

fn leading_integer(stem: &str) -> Option<i64> {
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Load a sequence entry as a grayscale frame, pixel values scaled to [0, 1].
pub fn load_frame(entry: &SequenceEntry) -> Result<Frame> {
    let img = image::open(&entry.path)?;
    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    let mut data = Array2::<f32>::zeros((h as usize, w as usize));

    for row in 0..h as usize {
        for col in 0..w as usize {
            let pixel = gray.get_pixel(col as u32, row as u32);
            data[[row, col]] = pixel.0[0] as f32 / 65535.0;
        }
    }

    Ok(Frame::new(data, entry.index))
}
