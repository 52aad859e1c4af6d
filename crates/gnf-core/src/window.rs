use ndarray::Array2;

use crate::consts::LOGSPACE_POINTS;
use crate::error::{GnfError, Result};

/// Derive the window-size set for a frame whose shorter side is
/// `shorter_side`: log-spaced integers from `size_min` up to
/// `(shorter_side - size_min)/2`, duplicates merged.
///
/// The result is strictly increasing; every element lies in
/// `[size_min, (shorter_side - size_min)/2]`.
pub fn window_sizes(size_min: usize, shorter_side: usize) -> Result<Vec<usize>> {
    if size_min == 0 {
        return Err(GnfError::InvalidParameter(
            "size_min must be at least 1".to_string(),
        ));
    }
    let upper = (shorter_side as f64 - size_min as f64) / 2.0;
    if (size_min as f64) > upper {
        return Err(GnfError::WindowRange {
            size_min,
            shorter_side,
        });
    }

    let lo = (size_min as f64).log10();
    let hi = upper.log10();
    let largest = upper.floor() as usize;
    let mut sizes = Vec::with_capacity(LOGSPACE_POINTS);
    for i in 0..LOGSPACE_POINTS {
        let t = i as f64 / (LOGSPACE_POINTS - 1) as f64;
        // Clamp away the round-off of 10^log10(x) at the endpoints.
        let size = (10f64.powf(lo + (hi - lo) * t).floor() as usize).clamp(size_min, largest);
        if sizes.last() != Some(&size) {
            sizes.push(size);
        }
    }
    Ok(sizes)
}

/// Summed-area table of a frame, shape `(h + 1, w + 1)`.
///
/// `integral[[r, c]]` holds the sum of all pixels above and left of `(r, c)`,
/// so any window sum is four lookups regardless of window size.
pub fn integral_image(data: &Array2<f32>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut integral = Array2::<f64>::zeros((h + 1, w + 1));
    for row in 0..h {
        let mut row_sum = 0.0f64;
        for col in 0..w {
            row_sum += data[[row, col]] as f64;
            integral[[row + 1, col + 1]] = integral[[row, col + 1]] + row_sum;
        }
    }
    integral
}

/// Mean intensity of every window of one size tiled over a frame.
///
/// Windows sit at stride multiples of `step` and must fit entirely inside
/// the frame; `x`/`y` hold the window-center coordinates of the grid columns
/// and rows.
#[derive(Clone, Debug)]
pub struct WindowGrid {
    pub size: usize,
    pub step: usize,
    /// Window-center x coordinate per grid column.
    pub x: Vec<f64>,
    /// Window-center y coordinate per grid row.
    pub y: Vec<f64>,
    /// Mean window intensity, shape = (y.len(), x.len()).
    pub mean: Array2<f64>,
}

impl WindowGrid {
    /// Number of windows in the grid.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Iterate `(x, y, mean)` in row-major order, matching the flattened
    /// column layout of the CSV outputs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        let cols = self.x.len();
        self.mean
            .iter()
            .enumerate()
            .map(move |(i, &m)| (self.x[i % cols], self.y[i / cols], m))
    }
}

/// Tile a frame into `size` x `size` windows at stride `step` and record
/// each window's mean intensity.
pub fn divide_windows(data: &Array2<f32>, size: usize, step: usize) -> Result<WindowGrid> {
    let integral = integral_image(data);
    divide_windows_with(&integral, size, step)
}

/// Same as [`divide_windows`], reusing a precomputed summed-area table so a
/// frame shared by many window sizes is walked once.
pub fn divide_windows_with(
    integral: &Array2<f64>,
    size: usize,
    step: usize,
) -> Result<WindowGrid> {
    if step == 0 {
        return Err(GnfError::InvalidParameter(
            "window stride must be at least 1".to_string(),
        ));
    }
    let (h, w) = (integral.nrows() - 1, integral.ncols() - 1);

    let origins = |dim: usize| -> Vec<usize> {
        (0..)
            .map(|i| i * step)
            .take_while(|&o| o + size <= dim)
            .collect()
    };
    let row_origins = origins(h);
    let col_origins = origins(w);

    let area = (size * size) as f64;
    let mut mean = Array2::<f64>::zeros((row_origins.len(), col_origins.len()));
    for (gr, &r) in row_origins.iter().enumerate() {
        for (gc, &c) in col_origins.iter().enumerate() {
            let sum = integral[[r + size, c + size]] - integral[[r, c + size]]
                - integral[[r + size, c]]
                + integral[[r, c]];
            mean[[gr, gc]] = sum / area;
        }
    }

    let half = size as f64 / 2.0;
    Ok(WindowGrid {
        size,
        step,
        x: col_origins.iter().map(|&c| c as f64 + half).collect(),
        y: row_origins.iter().map(|&r| r as f64 + half).collect(),
        mean,
    })
}
