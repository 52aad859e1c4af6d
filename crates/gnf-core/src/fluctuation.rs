use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_SIZE_MIN, DEFAULT_STEP_FACTOR};
use crate::error::{GnfError, Result};
use crate::frame::Frame;
use crate::io::csv_io::{FluctuationRecord, KineticsRecord};
use crate::window::{divide_windows_with, integral_image, window_sizes};

/// Windowing parameters of the density-fluctuation estimator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FluctuationParams {
    /// Smallest window side length in pixels.
    #[serde(default = "default_size_min")]
    pub size_min: usize,
    /// Stride between window origins; defaults to 50 * size_min.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

fn default_size_min() -> usize {
    DEFAULT_SIZE_MIN
}

impl Default for FluctuationParams {
    fn default() -> Self {
        Self {
            size_min: DEFAULT_SIZE_MIN,
            step: None,
        }
    }
}

impl FluctuationParams {
    pub fn stride(&self) -> usize {
        self.step.unwrap_or(DEFAULT_STEP_FACTOR * self.size_min)
    }
}

/// Accumulates per-window intensity statistics over a frame sequence.
///
/// For every derived window size the accumulator keeps the running sum and
/// sum of squares of each window's mean intensity, which is enough for both
/// fluctuation estimates:
///
/// - *temporal*: std of each window across time, averaged over windows
///   ("time variance -> spatial average");
/// - *pooled*: one std over all windows of a size across all frames.
pub struct FluctuationAccumulator {
    height: usize,
    width: usize,
    step: usize,
    sizes: Vec<usize>,
    /// Per size: running Σ I per window, row-major over the window grid.
    sum: Vec<Vec<f64>>,
    /// Per size: running Σ I² per window.
    sum_sq: Vec<Vec<f64>>,
    frames: usize,
}

impl FluctuationAccumulator {
    /// Build an accumulator for frames of the given dimensions. Fails when
    /// `size_min` exceeds half the shorter side (empty window-size set).
    pub fn new(height: usize, width: usize, params: &FluctuationParams) -> Result<Self> {
        let step = params.stride();
        if step == 0 {
            return Err(GnfError::InvalidParameter(
                "window stride must be at least 1".to_string(),
            ));
        }
        let sizes = window_sizes(params.size_min, height.min(width))?;
        debug!(
            count = sizes.len(),
            smallest = sizes.first(),
            largest = sizes.last(),
            "Derived window-size set"
        );

        // Window counts per size are fixed by the frame dimensions.
        let counts: Vec<usize> = sizes
            .iter()
            .map(|&size| {
                let fit = |dim: usize| (dim - size) / step + 1;
                fit(height) * fit(width)
            })
            .collect();

        Ok(Self {
            height,
            width,
            step,
            sum: counts.iter().map(|&c| vec![0.0; c]).collect(),
            sum_sq: counts.iter().map(|&c| vec![0.0; c]).collect(),
            sizes,
            frames: 0,
        })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Fold one frame into the running statistics.
    pub fn add_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.height() != self.height || frame.width() != self.width {
            return Err(GnfError::DimensionMismatch {
                width: self.width,
                height: self.height,
                got_width: frame.width(),
                got_height: frame.height(),
            });
        }

        let integral = integral_image(&frame.data);
        let step = self.step;
        let grids: Vec<Vec<f64>> = self
            .sizes
            .par_iter()
            .map(|&size| {
                // Sizes are pre-validated, so tiling cannot fail here.
                let grid = divide_windows_with(&integral, size, step)
                    .expect("validated window size tiles the frame");
                grid.mean.iter().copied().collect()
            })
            .collect();

        for (i, means) in grids.into_iter().enumerate() {
            for (j, m) in means.into_iter().enumerate() {
                self.sum[i][j] += m;
                self.sum_sq[i][j] += m * m;
            }
        }
        self.frames += 1;
        Ok(())
    }

    /// "Time variance -> spatial average": per window, the population std of
    /// its intensity across frames scaled by the window area; then the mean
    /// over all windows of that size. One record per window size, ordered by
    /// increasing area `n`.
    pub fn temporal_records(&self) -> Result<Vec<FluctuationRecord>> {
        if self.frames == 0 {
            return Err(GnfError::EmptySequence);
        }
        let count = self.frames as f64;

        Ok(self
            .sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let area = (size * size) as f64;
                let windows = self.sum[i].len() as f64;
                let d_sum: f64 = self.sum[i]
                    .iter()
                    .zip(&self.sum_sq[i])
                    .map(|(&s, &sq)| {
                        let mean = s / count;
                        let var = (sq / count - mean * mean).max(0.0);
                        area * var.sqrt()
                    })
                    .sum();
                FluctuationRecord {
                    n: area,
                    d: d_sum / windows,
                }
            })
            .collect())
    }

    /// Pooled estimate: for each window size, one population std over the
    /// intensities of all windows of that size across all frames.
    pub fn pooled_records(&self) -> Result<Vec<FluctuationRecord>> {
        if self.frames == 0 {
            return Err(GnfError::EmptySequence);
        }

        Ok(self
            .sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let area = (size * size) as f64;
                let count = (self.sum[i].len() * self.frames) as f64;
                let total: f64 = self.sum[i].iter().sum();
                let total_sq: f64 = self.sum_sq[i].iter().sum();
                let mean = total / count;
                let var = (total_sq / count - mean * mean).max(0.0);
                FluctuationRecord {
                    n: area,
                    d: area * var.sqrt(),
                }
            })
            .collect())
    }
}

/// Run the temporal estimator over a whole in-memory sequence.
pub fn fluctuation_records(
    frames: &[Frame],
    params: &FluctuationParams,
) -> Result<Vec<FluctuationRecord>> {
    let first = frames.first().ok_or(GnfError::EmptySequence)?;
    let mut acc = FluctuationAccumulator::new(first.height(), first.width(), params)?;
    for frame in frames {
        acc.add_frame(frame)?;
    }
    acc.temporal_records()
}

/// Run the pooled estimator over a whole in-memory sequence.
pub fn pooled_fluctuation(
    frames: &[Frame],
    params: &FluctuationParams,
) -> Result<Vec<FluctuationRecord>> {
    let first = frames.first().ok_or(GnfError::EmptySequence)?;
    let mut acc = FluctuationAccumulator::new(first.height(), first.width(), params)?;
    for frame in frames {
        acc.add_frame(frame)?;
    }
    acc.pooled_records()
}

/// Split the sequence into consecutive segments of `seg_length` frames
/// (trailing partial segment kept) and run the temporal estimator per
/// segment. Segments are numbered from 1.
pub fn kinetics_records(
    frames: &[Frame],
    params: &FluctuationParams,
    seg_length: usize,
) -> Result<Vec<KineticsRecord>> {
    if seg_length == 0 {
        return Err(GnfError::InvalidParameter(
            "segment length must be at least 1".to_string(),
        ));
    }
    let first = frames.first().ok_or(GnfError::EmptySequence)?;

    let mut records = Vec::new();
    for (seg, chunk) in frames.chunks(seg_length).enumerate() {
        let mut acc = FluctuationAccumulator::new(first.height(), first.width(), params)?;
        for frame in chunk {
            acc.add_frame(frame)?;
        }
        let segment = (seg + 1) as u32;
        records.extend(
            acc.temporal_records()?
                .into_iter()
                .map(|r| KineticsRecord {
                    segment,
                    n: r.n,
                    d: r.d,
                }),
        );
    }
    Ok(records)
}
