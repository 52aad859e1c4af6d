use std::fmt;
use std::str::FromStr;

/// Half-open filter over a scalar axis (box size, time, separation).
///
/// `Below(hi)` keeps `v < hi`; `Between(lo, hi)` keeps `lo <= v < hi`.
/// For positive data `Below(hi)` selects exactly the same points as
/// `Between(0.0, hi)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Bounds {
    #[default]
    All,
    Below(f64),
    Between(f64, f64),
}

impl Bounds {
    pub fn contains(&self, v: f64) -> bool {
        match *self {
            Bounds::All => true,
            Bounds::Below(hi) => v < hi,
            Bounds::Between(lo, hi) => v >= lo && v < hi,
        }
    }

    /// Multiply the bound values by `factor`, e.g. to move a limit expressed
    /// in units of lb^2 onto the raw `n` axis.
    pub fn scaled(&self, factor: f64) -> Bounds {
        match *self {
            Bounds::All => Bounds::All,
            Bounds::Below(hi) => Bounds::Below(hi * factor),
            Bounds::Between(lo, hi) => Bounds::Between(lo * factor, hi * factor),
        }
    }
}

impl FromStr for Bounds {
    type Err = String;

    /// Parse "40" as an upper limit and "10,40" as a two-sided bound.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [hi] => {
                let hi = hi
                    .parse::<f64>()
                    .map_err(|_| format!("invalid bound '{s}'"))?;
                Ok(Bounds::Below(hi))
            }
            [lo, hi] => {
                let lo = lo
                    .parse::<f64>()
                    .map_err(|_| format!("invalid bound '{s}'"))?;
                let hi = hi
                    .parse::<f64>()
                    .map_err(|_| format!("invalid bound '{s}'"))?;
                if lo >= hi {
                    return Err(format!("lower bound {lo} must be below upper bound {hi}"));
                }
                Ok(Bounds::Between(lo, hi))
            }
            _ => Err("bounds must be a number or two comma-separated numbers".to_string()),
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Bounds::All => write!(f, "all"),
            Bounds::Below(hi) => write!(f, "<{hi}"),
            Bounds::Between(lo, hi) => write!(f, "[{lo},{hi})"),
        }
    }
}
