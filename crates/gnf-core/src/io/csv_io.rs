use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One point of a fluctuation curve: window area `n` and fluctuation
/// magnitude `d` (std of window intensity scaled by the area).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluctuationRecord {
    pub n: f64,
    pub d: f64,
}

/// Fluctuation record tagged with its time segment (numbered from 1).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KineticsRecord {
    pub segment: u32,
    pub n: f64,
    pub d: f64,
}

/// Spatial correlation sample: separation `R` in pixels, correlation `C`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    #[serde(rename = "R")]
    pub r: f64,
    #[serde(rename = "C")]
    pub c: f64,
}

/// Per-frame mean intensity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntensityRecord {
    pub t: i64,
    pub intensity: f64,
}

/// Mean kinetic energy and polar order parameter of one PIV field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyOrderRecord {
    pub t: f64,
    #[serde(rename = "E")]
    pub energy: f64,
    #[serde(rename = "OP")]
    pub order: f64,
}

/// Velocity divergence sampled at one PIV grid node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivergenceRecord {
    pub x: f64,
    pub y: f64,
    pub div: f64,
}

/// One point of a collapsed (multi-run averaged) normalized curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollapsedRecord {
    pub x: f64,
    pub avg: f64,
    pub std: f64,
}

/// One point of a normalized fluctuation curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    pub x: f64,
    pub y: f64,
}

/// Scaling exponent at one instant of the kinetics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExponentRecord {
    pub t: f64,
    pub alpha: f64,
}

/// Read all rows of a headed CSV file into typed records.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Write typed records as a headed CSV file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Plain-text processing log: a parameter header followed by one timestamped
/// line per processed input, e.g.
/// `Tue Jul  7 12:58:00 2020 // 922 calculated`.
pub struct ProcessingLog {
    file: File,
}

impl ProcessingLog {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            file: File::create(path)?,
        })
    }

    pub fn parameter(&mut self, name: &str, value: impl std::fmt::Display) -> Result<()> {
        writeln!(self.file, "{name} = {value}")?;
        Ok(())
    }

    pub fn record(&mut self, name: &str) -> Result<()> {
        let stamp = chrono::Local::now().format("%a %b %e %H:%M:%S %Y");
        writeln!(self.file, "{stamp} // {name} calculated")?;
        Ok(())
    }
}
