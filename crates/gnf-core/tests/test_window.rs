use approx::assert_abs_diff_eq;
use ndarray::Array2;

use gnf_core::error::GnfError;
use gnf_core::window::{divide_windows, window_sizes};

#[test]
fn test_sizes_stay_in_range() {
    for shorter_side in [64, 200, 512, 1024] {
        let sizes = window_sizes(5, shorter_side).unwrap();
        let upper = (shorter_side as f64 - 5.0) / 2.0;
        assert!(!sizes.is_empty());
        for &s in &sizes {
            assert!(s >= 5, "size {s} below minimum");
            assert!((s as f64) <= upper, "size {s} above {upper}");
        }
    }
}

#[test]
fn test_sizes_strictly_increasing() {
    let sizes = window_sizes(5, 400).unwrap();
    for pair in sizes.windows(2) {
        assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
    }
}

#[test]
fn test_size_min_too_large_is_an_error() {
    // (12 - 5)/2 = 3.5 < 5: no valid window size exists.
    let err = window_sizes(5, 12).unwrap_err();
    assert!(matches!(err, GnfError::WindowRange { .. }));
}

#[test]
fn test_degenerate_range_keeps_the_minimum() {
    // (15 - 5)/2 = 5: the set collapses to the single smallest window.
    let sizes = window_sizes(5, 15).unwrap();
    assert_eq!(sizes, vec![5]);
}

#[test]
fn test_constant_image_windows_have_constant_mean() {
    let data = Array2::<f32>::from_elem((20, 30), 0.25);
    let grid = divide_windows(&data, 5, 5).unwrap();

    // 20 rows fit 4 window rows, 30 cols fit 6 window cols.
    assert_eq!(grid.mean.dim(), (4, 6));
    for &m in grid.mean.iter() {
        assert_abs_diff_eq!(m, 0.25, epsilon = 1e-9);
    }
}

#[test]
fn test_window_means_match_direct_summation() {
    // Deterministic non-uniform pattern.
    let mut data = Array2::<f32>::zeros((12, 12));
    for row in 0..12 {
        for col in 0..12 {
            data[[row, col]] = ((row * 7 + col * 13) % 5) as f32 / 5.0;
        }
    }

    let size = 4;
    let step = 3;
    let grid = divide_windows(&data, size, step).unwrap();

    for gr in 0..grid.y.len() {
        for gc in 0..grid.x.len() {
            let r0 = gr * step;
            let c0 = gc * step;
            let mut sum = 0.0f64;
            for r in r0..r0 + size {
                for c in c0..c0 + size {
                    sum += data[[r, c]] as f64;
                }
            }
            let expected = sum / (size * size) as f64;
            assert_abs_diff_eq!(grid.mean[[gr, gc]], expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_window_centers() {
    let data = Array2::<f32>::zeros((10, 10));
    let grid = divide_windows(&data, 4, 3).unwrap();
    // Origins 0 and 3 fit (origin 6 would end at 10: it fits too).
    assert_eq!(grid.x, vec![2.0, 5.0, 8.0]);
    assert_eq!(grid.y, vec![2.0, 5.0, 8.0]);
}

#[test]
fn test_points_flatten_row_major() {
    let mut data = Array2::<f32>::zeros((10, 10));
    data[[0, 5]] = 1.0; // lands in the second window of the first row
    let grid = divide_windows(&data, 4, 3).unwrap();

    let points: Vec<(f64, f64, f64)> = grid.points().collect();
    assert_eq!(points.len(), 9);
    assert_eq!(points[0], (2.0, 2.0, 0.0));
    // Second point is the next window along x.
    assert_eq!(points[1].0, 5.0);
    assert_eq!(points[1].1, 2.0);
    assert_abs_diff_eq!(points[1].2, 1.0 / 16.0, epsilon = 1e-9);
}

#[test]
fn test_zero_stride_is_an_error() {
    let data = Array2::<f32>::zeros((10, 10));
    assert!(matches!(
        divide_windows(&data, 4, 0),
        Err(GnfError::InvalidParameter(_))
    ));
}
