use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;

use crate::error::{GnfError, Result};
use crate::io::csv_io::DivergenceRecord;

#[derive(Debug, Deserialize)]
struct PivRow {
    x: f64,
    y: f64,
    u: f64,
    v: f64,
}

/// A velocity field on a regular grid, as exported by PIV software.
///
/// Rows are stored y-major with x varying fastest; `u`/`v` have shape
/// `(y.len(), x.len())`.
#[derive(Clone, Debug)]
pub struct PivField {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub u: Array2<f64>,
    pub v: Array2<f64>,
}

/// Read a PIV CSV with columns `x, y, u, v` and reassemble the grid.
pub fn read_piv(path: &Path) -> Result<PivField> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let rows: Vec<PivRow> = reader
        .deserialize()
        .collect::<std::result::Result<_, _>>()?;
    if rows.is_empty() {
        return Err(GnfError::RaggedGrid("no data rows".to_string()));
    }

    // x varies fastest: the first row of the grid runs until y changes.
    let y0 = rows[0].y;
    let nx = rows.iter().take_while(|r| r.y == y0).count();
    if nx == 0 || rows.len() % nx != 0 {
        return Err(GnfError::RaggedGrid(format!(
            "{} rows do not tile a grid of width {nx}",
            rows.len()
        )));
    }
    let ny = rows.len() / nx;

    let x: Vec<f64> = rows[..nx].iter().map(|r| r.x).collect();
    let mut y = Vec::with_capacity(ny);
    let mut u = Array2::<f64>::zeros((ny, nx));
    let mut v = Array2::<f64>::zeros((ny, nx));

    for (j, block) in rows.chunks(nx).enumerate() {
        y.push(block[0].y);
        for (i, row) in block.iter().enumerate() {
            if row.x != x[i] || row.y != block[0].y {
                return Err(GnfError::RaggedGrid(format!(
                    "irregular coordinates at grid node ({i}, {j})"
                )));
            }
            u[[j, i]] = row.u;
            v[[j, i]] = row.v;
        }
    }

    Ok(PivField { x, y, u, v })
}

impl PivField {
    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Velocity divergence du/dx + dv/dy by central differences, one-sided
    /// at the grid boundary. Needs at least a 2x2 grid.
    pub fn divergence(&self) -> Result<Array2<f64>> {
        let (nx, ny) = (self.nx(), self.ny());
        if nx < 2 || ny < 2 {
            return Err(GnfError::RaggedGrid(format!(
                "divergence needs at least a 2x2 grid, got {nx}x{ny}"
            )));
        }
        let dx = (self.x[nx - 1] - self.x[0]) / (nx - 1) as f64;
        let dy = (self.y[ny - 1] - self.y[0]) / (ny - 1) as f64;
        if dx == 0.0 || dy == 0.0 {
            return Err(GnfError::RaggedGrid(
                "grid spacing is zero along one axis".to_string(),
            ));
        }

        let mut div = Array2::<f64>::zeros((ny, nx));
        for j in 0..ny {
            for i in 0..nx {
                let du_dx = if i == 0 {
                    (self.u[[j, 1]] - self.u[[j, 0]]) / dx
                } else if i == nx - 1 {
                    (self.u[[j, nx - 1]] - self.u[[j, nx - 2]]) / dx
                } else {
                    (self.u[[j, i + 1]] - self.u[[j, i - 1]]) / (2.0 * dx)
                };
                let dv_dy = if j == 0 {
                    (self.v[[1, i]] - self.v[[0, i]]) / dy
                } else if j == ny - 1 {
                    (self.v[[ny - 1, i]] - self.v[[ny - 2, i]]) / dy
                } else {
                    (self.v[[j + 1, i]] - self.v[[j - 1, i]]) / (2.0 * dy)
                };
                div[[j, i]] = du_dx + dv_dy;
            }
        }
        Ok(div)
    }

    /// Divergence flattened to `(x, y, div)` records, x varying fastest.
    pub fn divergence_records(&self) -> Result<Vec<DivergenceRecord>> {
        let div = self.divergence()?;
        Ok((0..self.ny())
            .flat_map(|j| {
                let div = &div;
                (0..self.nx()).map(move |i| DivergenceRecord {
                    x: self.x[i],
                    y: self.y[j],
                    div: div[[j, i]],
                })
            })
            .collect())
    }

    /// Mean kinetic energy per unit mass, `<u^2 + v^2> / 2`.
    pub fn kinetic_energy(&self) -> f64 {
        let count = (self.nx() * self.ny()) as f64;
        if count == 0.0 {
            return 0.0;
        }
        let total: f64 = self
            .u
            .iter()
            .zip(self.v.iter())
            .map(|(&u, &v)| u * u + v * v)
            .sum();
        total / count / 2.0
    }

    /// Polar order parameter: magnitude of the mean unit velocity vector,
    /// 1 for a fully aligned field, ~0 for an isotropic one. Zero-velocity
    /// nodes carry no direction and are skipped.
    pub fn order_parameter(&self) -> f64 {
        let mut sum_x = 0.0f64;
        let mut sum_y = 0.0f64;
        let mut count = 0usize;
        for (&u, &v) in self.u.iter().zip(self.v.iter()) {
            let mag = (u * u + v * v).sqrt();
            if mag > 0.0 {
                sum_x += u / mag;
                sum_y += v / mag;
                count += 1;
            }
        }
        if count == 0 {
            return 0.0;
        }
        (sum_x * sum_x + sum_y * sum_y).sqrt() / count as f64
    }
}
