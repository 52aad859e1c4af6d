use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::bounds::Bounds;
use crate::consts::{DECAY_RATE_GUESS, FIT_MAX_ITERATIONS, FIT_TOLERANCE};
use crate::error::{GnfError, Result};
use crate::io::csv_io::CorrelationRecord;

/// Exponential decay model for spatial correlations, `C(R) = exp(-a R)`.
pub fn exp_decay(x: f64, a: f64) -> f64 {
    (-a * x).exp()
}

/// Fitted exponential decay: rate `a` and correlation length `1/a`.
#[derive(Clone, Copy, Debug)]
pub struct DecayFit {
    pub rate: f64,
    pub length: f64,
}

/// Fit the decay rate of `C(R) = exp(-a R)` by Gauss-Newton least squares
/// with an analytic Jacobian. Single attempt from `guess`; non-convergence
/// or a degenerate Jacobian is an error.
pub fn fit_decay_rate(r: &[f64], c: &[f64], guess: f64) -> Result<f64> {
    if r.len() != c.len() {
        return Err(GnfError::TableMismatch(format!(
            "{} separations vs {} correlation values",
            r.len(),
            c.len()
        )));
    }
    if r.is_empty() {
        return Err(GnfError::EmptySelection);
    }

    let mut a = guess;
    for _ in 0..FIT_MAX_ITERATIONS {
        // Model f = exp(-a r), Jacobian df/da = -r exp(-a r).
        let mut jt_res = 0.0f64;
        let mut jt_j = 0.0f64;
        for (&ri, &ci) in r.iter().zip(c) {
            let f = exp_decay(ri, a);
            let jac = -ri * f;
            jt_res += jac * (ci - f);
            jt_j += jac * jac;
        }

        if jt_j < f64::MIN_POSITIVE {
            return Err(GnfError::FitFailed(
                "degenerate Jacobian; separations may all be zero".to_string(),
            ));
        }
        let delta = jt_res / jt_j;
        a += delta;
        if !a.is_finite() {
            return Err(GnfError::FitFailed("parameter diverged".to_string()));
        }
        if delta.abs() <= FIT_TOLERANCE * a.abs().max(1.0) {
            return Ok(a);
        }
    }
    Err(GnfError::FitFailed(format!(
        "no convergence after {FIT_MAX_ITERATIONS} iterations"
    )))
}

/// Correlation length of `(R, C)` data: restrict `R` by `fitting_range`,
/// fit the exponential decay from the fixed initial guess, return `1/a`.
pub fn corr_length(records: &[CorrelationRecord], fitting_range: Bounds) -> Result<DecayFit> {
    let kept: Vec<&CorrelationRecord> = records
        .iter()
        .filter(|rec| fitting_range.contains(rec.r))
        .collect();
    if kept.is_empty() {
        return Err(GnfError::EmptySelection);
    }

    let r: Vec<f64> = kept.iter().map(|rec| rec.r).collect();
    let c: Vec<f64> = kept.iter().map(|rec| rec.c).collect();
    let rate = fit_decay_rate(&r, &c, DECAY_RATE_GUESS)?;
    Ok(DecayFit {
        rate,
        length: 1.0 / rate,
    })
}

/// Radial separation of each `(x, y)` point from the first point.
pub fn xy_to_r(x: &[f64], y: &[f64]) -> Vec<f64> {
    let (x0, y0) = match (x.first(), y.first()) {
        (Some(&x0), Some(&y0)) => (x0, y0),
        _ => return Vec::new(),
    };
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| ((xi - x0).powi(2) + (yi - y0).powi(2)).sqrt())
        .collect()
}

/// Normalized spatial autocorrelation of a scalar field (a windowed
/// intensity grid), non-circular via zero-padded FFT.
///
/// Returns the non-negative-shift quadrant up to half the field extent,
/// shape `(h/2 + 1, w/2 + 1)`, with `corr[[0, 0]] == 1` for any field with
/// nonzero variance. A constant field returns all zeros.
pub fn autocorrelation(field: &Array2<f64>) -> Array2<f64> {
    let (h, w) = field.dim();
    let (qh, qw) = (h / 2 + 1, w / 2 + 1);

    let mean = field.iter().sum::<f64>() / (h * w) as f64;
    let variance = field.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (h * w) as f64;
    if variance <= f64::MIN_POSITIVE {
        return Array2::zeros((qh, qw));
    }

    // Zero-pad to twice the extent so shifts do not wrap around.
    let (ph, pw) = (2 * h, 2 * w);
    let mut padded = Array2::<Complex<f64>>::zeros((ph, pw));
    for row in 0..h {
        for col in 0..w {
            padded[[row, col]] = Complex::new(field[[row, col]] - mean, 0.0);
        }
    }

    // Wiener-Khinchin: autocovariance = IFFT(|FFT|^2).
    let mut spectrum = fft_2d(padded, false);
    for v in spectrum.iter_mut() {
        *v = Complex::new(v.norm_sqr(), 0.0);
    }
    let auto = fft_2d(spectrum, true);

    // Each shift only overlaps (h - dy)(w - dx) samples of the field.
    let mut corr = Array2::<f64>::zeros((qh, qw));
    for dy in 0..qh {
        for dx in 0..qw {
            let overlap = ((h - dy) * (w - dx)) as f64;
            corr[[dy, dx]] = auto[[dy, dx]].re / (ph * pw) as f64 / overlap / variance;
        }
    }
    corr
}

/// Flatten a correlation quadrant into `(R, C)` records, separations scaled
/// by the window stride, sorted by increasing `R`.
pub fn correlation_records(corr: &Array2<f64>, step: f64) -> Vec<CorrelationRecord> {
    let (qh, qw) = corr.dim();
    let mut records: Vec<CorrelationRecord> = (0..qh)
        .flat_map(|dy| {
            (0..qw).map(move |dx| CorrelationRecord {
                r: ((dx * dx + dy * dy) as f64).sqrt() * step,
                c: corr[[dy, dx]],
            })
        })
        .collect();
    records.sort_by(|a, b| a.r.partial_cmp(&b.r).expect("separations are finite"));
    records
}

/// 2D FFT (forward or inverse): row-wise pass, then column-wise pass.
/// The inverse pass is unnormalized, as rustfft leaves scaling to callers.
fn fft_2d(mut data: Array2<Complex<f64>>, inverse: bool) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = if inverse {
        planner.plan_fft_inverse(w)
    } else {
        planner.plan_fft_forward(w)
    };
    let fft_col = if inverse {
        planner.plan_fft_inverse(h)
    } else {
        planner.plan_fft_forward(h)
    };

    for row in 0..h {
        let mut row_data: Vec<Complex<f64>> = (0..w).map(|c| data[[row, c]]).collect();
        fft_row.process(&mut row_data);
        for col in 0..w {
            data[[row, col]] = row_data[col];
        }
    }

    for col in 0..w {
        let mut col_data: Vec<Complex<f64>> = (0..h).map(|r| data[[r, col]]).collect();
        fft_col.process(&mut col_data);
        for row in 0..h {
            data[[row, col]] = col_data[row];
        }
    }

    data
}
