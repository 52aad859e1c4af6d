use crate::bounds::Bounds;
use crate::error::{GnfError, Result};
use crate::io::csv_io::{CollapsedRecord, CurveRecord, FluctuationRecord};

/// Normalize a raw fluctuation curve for comparison across experiments.
///
/// `x = n / lb^2` (window area in units of the single-bacterium area),
/// `y = d / sqrt(n)` rescaled so the first kept point is exactly 1.
/// `xlim` is expressed on the `x` axis and filters before rescaling;
/// `sparse` keeps every k-th point starting from the first.
pub fn normalize_gnf(
    records: &[FluctuationRecord],
    lb: f64,
    xlim: Bounds,
    sparse: usize,
) -> Result<Vec<CurveRecord>> {
    if lb <= 0.0 {
        return Err(GnfError::InvalidParameter(
            "bacterium length lb must be positive".to_string(),
        ));
    }
    if sparse == 0 {
        return Err(GnfError::InvalidParameter(
            "sparse must be at least 1".to_string(),
        ));
    }

    let scale = lb * lb;
    let limit = xlim.scaled(scale);
    let kept: Vec<&FluctuationRecord> = records
        .iter()
        .filter(|r| limit.contains(r.n))
        .collect();
    let first = kept.first().ok_or(GnfError::EmptySelection)?;

    let y0 = first.d / first.n.sqrt();
    if y0 == 0.0 {
        return Err(GnfError::InvalidParameter(
            "first fluctuation value is zero; curve cannot be rescaled".to_string(),
        ));
    }

    Ok(kept
        .iter()
        .step_by(sparse)
        .map(|r| CurveRecord {
            x: r.n / scale,
            y: (r.d / r.n.sqrt()) / y0,
        })
        .collect())
}

/// Average several normalized curves from identically-parameterized runs.
///
/// All curves must share their `x` grid. The spread is the sample std
/// across curves (0 when a single curve is supplied).
pub fn collapse_curves(curves: &[Vec<CurveRecord>]) -> Result<Vec<CollapsedRecord>> {
    let first = curves.first().ok_or(GnfError::EmptySelection)?;
    let len = first.len();
    for curve in curves {
        if curve.len() != len {
            return Err(GnfError::TableMismatch(format!(
                "curve has {} points, expected {}",
                curve.len(),
                len
            )));
        }
    }

    let k = curves.len();
    let mut collapsed = Vec::with_capacity(len);
    for i in 0..len {
        let x = first[i].x;
        for curve in curves {
            if (curve[i].x - x).abs() > 1e-9 * x.abs().max(1.0) {
                return Err(GnfError::TableMismatch(format!(
                    "curves disagree on x grid at point {i}: {} vs {x}",
                    curve[i].x
                )));
            }
        }

        let avg = curves.iter().map(|c| c[i].y).sum::<f64>() / k as f64;
        let std = if k > 1 {
            let ss: f64 = curves.iter().map(|c| (c[i].y - avg).powi(2)).sum();
            (ss / (k - 1) as f64).sqrt()
        } else {
            0.0
        };
        collapsed.push(CollapsedRecord { x, avg, std });
    }
    Ok(collapsed)
}

/// GNF exponent: least-squares slope of `ln y` against `ln x`.
pub fn scaling_exponent(curve: &[CurveRecord]) -> Result<f64> {
    let points: Vec<(f64, f64)> = curve
        .iter()
        .filter(|p| p.x > 0.0 && p.y > 0.0)
        .map(|p| (p.x.ln(), p.y.ln()))
        .collect();
    if points.len() < 2 {
        return Err(GnfError::FitFailed(
            "scaling exponent needs at least two positive points".to_string(),
        ));
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.0).sum();
    let sum_y: f64 = points.iter().map(|p| p.1).sum();
    let sum_xx: f64 = points.iter().map(|p| p.0 * p.0).sum();
    let sum_xy: f64 = points.iter().map(|p| p.0 * p.1).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return Err(GnfError::FitFailed(
            "x values are degenerate; slope is undefined".to_string(),
        ));
    }
    Ok((n * sum_xy - sum_x * sum_y) / denom)
}
