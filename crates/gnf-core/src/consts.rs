/// Number of log-spaced samples drawn when deriving the window-size set.
/// Duplicates after flooring are merged, so the usable set is smaller.
pub const LOGSPACE_POINTS: usize = 100;

/// Default smallest window side length in pixels.
pub const DEFAULT_SIZE_MIN: usize = 5;

/// Default window stride = DEFAULT_STEP_FACTOR * size_min.
pub const DEFAULT_STEP_FACTOR: usize = 50;

/// Default number of frames per kinetics segment.
pub const DEFAULT_SEG_LENGTH: usize = 100;

/// Default acquisition frame rate.
pub const DEFAULT_FPS: f64 = 10.0;

/// Default curve sparsification: keep every k-th point.
pub const DEFAULT_SPARSE: usize = 3;

/// Fixed initial guess for the exponential decay rate in correlation fits.
pub const DECAY_RATE_GUESS: f64 = 0.01;

/// Iteration cap for the Gauss-Newton decay fit.
pub const FIT_MAX_ITERATIONS: usize = 100;

/// Convergence threshold on the Gauss-Newton parameter update.
pub const FIT_TOLERANCE: f64 = 1e-12;

/// Smoothing kernel width is the series length divided by this, plus one.
pub const SMOOTH_SIGMA_DIVISOR: usize = 15;
