use std::collections::BTreeMap;

use crate::bounds::Bounds;
use crate::consts::{DEFAULT_FPS, DEFAULT_SEG_LENGTH, DEFAULT_SPARSE, SMOOTH_SIGMA_DIVISOR};
use crate::error::{GnfError, Result};
use crate::io::csv_io::{ExponentRecord, FluctuationRecord, KineticsRecord};
use crate::normalize::{normalize_gnf, scaling_exponent};

/// Gaussian-smooth a series with the house rule `sigma = len/15 + 1`.
pub fn smooth_series(values: &[f64]) -> Vec<f64> {
    let sigma = (values.len() / SMOOTH_SIGMA_DIVISOR + 1) as f64;
    gaussian_smooth(values, sigma)
}

/// 1D Gaussian convolution, kernel radius 3 sigma, edges clamped.
pub fn gaussian_smooth(values: &[f64], sigma: f64) -> Vec<f64> {
    if values.is_empty() || sigma <= 0.0 {
        return values.to_vec();
    }
    let kernel = make_gaussian_kernel(sigma);
    let radius = kernel.len() / 2;
    let n = values.len();

    (0..n)
        .map(|i| {
            let mut sum = 0.0f64;
            for (k, &kv) in kernel.iter().enumerate() {
                let src =
                    (i as isize + k as isize - radius as isize).clamp(0, n as isize - 1) as usize;
                sum += values[src] * kv;
            }
            sum
        })
        .collect()
}

fn make_gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (sigma * 3.0).ceil() as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f64; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f64;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f64 - radius as f64;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Shift and scale a series onto [0, 1]. A flat series maps to all zeros.
pub fn rescale_unit(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / range).collect()
}

/// Index of the first sample above the midpoint of the series' min and max —
/// the moment the illumination switches on in a light-response experiment.
pub fn light_on_index(intensity: &[f64]) -> Option<usize> {
    if intensity.is_empty() {
        return None;
    }
    let min = intensity.iter().copied().fold(f64::INFINITY, f64::min);
    let max = intensity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let threshold = (max + min) / 2.0;
    intensity.iter().position(|&v| v > threshold)
}

/// Parameters of the exponent-kinetics computation.
#[derive(Clone, Copy, Debug)]
pub struct ExponentParams {
    /// Single-bacterium length in pixels (x-axis normalization).
    pub lb: f64,
    /// Box-size bounds on the normalized x axis.
    pub xlim: Bounds,
    /// Time bounds in seconds, applied to segment start times.
    pub tlim: Bounds,
    /// Frames per kinetics segment.
    pub seg_length: usize,
    /// Acquisition frame rate.
    pub fps: f64,
    /// Curve sparsification before fitting.
    pub sparse: usize,
}

impl Default for ExponentParams {
    fn default() -> Self {
        Self {
            lb: 1.0,
            xlim: Bounds::All,
            tlim: Bounds::All,
            seg_length: DEFAULT_SEG_LENGTH,
            fps: DEFAULT_FPS,
            sparse: DEFAULT_SPARSE,
        }
    }
}

/// Per-segment GNF exponent over time: normalize each segment's curve and
/// fit the log-log slope; `t` is the segment start in seconds.
pub fn exponent_series(
    kinetics: &[KineticsRecord],
    params: &ExponentParams,
) -> Result<Vec<ExponentRecord>> {
    if params.fps <= 0.0 {
        return Err(GnfError::InvalidParameter(
            "fps must be positive".to_string(),
        ));
    }
    if params.seg_length == 0 {
        return Err(GnfError::InvalidParameter(
            "segment length must be at least 1".to_string(),
        ));
    }

    let mut segments: BTreeMap<u32, Vec<_>> = BTreeMap::new();
    for rec in kinetics {
        segments.entry(rec.segment).or_default().push(*rec);
    }

    let mut series = Vec::new();
    for (segment, records) in segments {
        let t = (segment.saturating_sub(1)) as f64 * params.seg_length as f64 / params.fps;
        if !params.tlim.contains(t) {
            continue;
        }
        let curve: Vec<_> = records
            .iter()
            .map(|r| FluctuationRecord { n: r.n, d: r.d })
            .collect();
        let normalized = normalize_gnf(&curve, params.lb, params.xlim, params.sparse)?;
        let alpha = scaling_exponent(&normalized)?;
        series.push(ExponentRecord { t, alpha });
    }

    if series.is_empty() {
        return Err(GnfError::EmptySelection);
    }
    Ok(series)
}

/// Translate an exponent series so the light-on instant is `t = 0`,
/// dropping samples from before the light came on.
pub fn align_to_light_on(
    exponents: &[ExponentRecord],
    intensity_t: &[f64],
    intensity: &[f64],
) -> Result<Vec<ExponentRecord>> {
    let on = light_on_index(intensity).ok_or(GnfError::EmptySelection)?;
    let t0 = *intensity_t
        .get(on)
        .ok_or_else(|| {
            GnfError::TableMismatch("time axis shorter than the intensity series".to_string())
        })?;

    let aligned: Vec<ExponentRecord> = exponents
        .iter()
        .filter(|e| e.t >= t0)
        .map(|e| ExponentRecord {
            t: e.t - t0,
            alpha: e.alpha,
        })
        .collect();
    if aligned.is_empty() {
        return Err(GnfError::EmptySelection);
    }
    Ok(aligned)
}
