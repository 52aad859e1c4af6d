use approx::assert_abs_diff_eq;

use gnf_core::bounds::Bounds;
use gnf_core::error::GnfError;
use gnf_core::io::csv_io::{CurveRecord, FluctuationRecord};
use gnf_core::normalize::{collapse_curves, normalize_gnf, scaling_exponent};

fn sample_records() -> Vec<FluctuationRecord> {
    // d = sqrt(n) * n^0.3, so the normalized curve is y = (n/lb^2)^0.3
    // up to the first-point rescale.
    [25.0, 49.0, 100.0, 225.0, 400.0, 900.0, 1600.0]
        .iter()
        .map(|&n: &f64| FluctuationRecord {
            n,
            d: n.sqrt() * n.powf(0.3),
        })
        .collect()
}

#[test]
fn test_first_point_is_exactly_one() {
    let curve = normalize_gnf(&sample_records(), 2.0, Bounds::All, 1).unwrap();
    assert_eq!(curve[0].y, 1.0);

    // Rescaling holds under filtering and sparsification too.
    let curve = normalize_gnf(&sample_records(), 2.0, Bounds::Between(10.0, 300.0), 2).unwrap();
    assert_eq!(curve[0].y, 1.0);
}

#[test]
fn test_x_axis_is_normalized_by_lb_squared() {
    let curve = normalize_gnf(&sample_records(), 5.0, Bounds::All, 1).unwrap();
    assert_abs_diff_eq!(curve[0].x, 1.0, epsilon = 1e-12); // 25 / 25
    assert_abs_diff_eq!(curve[2].x, 4.0, epsilon = 1e-12); // 100 / 25
}

#[test]
fn test_upper_limit_equals_band_from_zero() {
    let records = sample_records();
    let below = normalize_gnf(&records, 2.0, Bounds::Below(100.0), 1).unwrap();
    let band = normalize_gnf(&records, 2.0, Bounds::Between(0.0, 100.0), 1).unwrap();
    assert_eq!(below, band);
}

#[test]
fn test_sparse_keeps_every_kth_point() {
    let full = normalize_gnf(&sample_records(), 2.0, Bounds::All, 1).unwrap();
    let sparse = normalize_gnf(&sample_records(), 2.0, Bounds::All, 3).unwrap();
    assert_eq!(sparse.len(), full.len().div_ceil(3));
    assert_eq!(sparse[0], full[0]);
    assert_eq!(sparse[1], full[3]);
}

#[test]
fn test_everything_filtered_out_is_an_error() {
    let err = normalize_gnf(&sample_records(), 2.0, Bounds::Below(0.1), 1).unwrap_err();
    assert!(matches!(err, GnfError::EmptySelection));
}

#[test]
fn test_zero_first_value_cannot_be_rescaled() {
    let records = vec![
        FluctuationRecord { n: 25.0, d: 0.0 },
        FluctuationRecord { n: 100.0, d: 1.0 },
    ];
    assert!(matches!(
        normalize_gnf(&records, 1.0, Bounds::All, 1),
        Err(GnfError::InvalidParameter(_))
    ));
}

#[test]
fn test_collapse_of_identical_curves() {
    let curve = normalize_gnf(&sample_records(), 2.0, Bounds::All, 1).unwrap();
    let collapsed = collapse_curves(&[curve.clone(), curve.clone(), curve.clone()]).unwrap();

    assert_eq!(collapsed.len(), curve.len());
    for (c, p) in collapsed.iter().zip(&curve) {
        assert_abs_diff_eq!(c.avg, p.y, epsilon = 1e-12);
        assert_abs_diff_eq!(c.std, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_collapse_rejects_mismatched_grids() {
    let a = normalize_gnf(&sample_records(), 2.0, Bounds::All, 1).unwrap();
    let b = normalize_gnf(&sample_records(), 2.0, Bounds::All, 2).unwrap();
    assert!(matches!(
        collapse_curves(&[a, b]),
        Err(GnfError::TableMismatch(_))
    ));
}

#[test]
fn test_scaling_exponent_recovers_power_law() {
    let curve: Vec<CurveRecord> = (1..40)
        .map(|i| {
            let x = i as f64;
            CurveRecord { x, y: x.powf(0.7) }
        })
        .collect();
    let alpha = scaling_exponent(&curve).unwrap();
    assert_abs_diff_eq!(alpha, 0.7, epsilon = 1e-10);
}

#[test]
fn test_scaling_exponent_needs_two_points() {
    let curve = vec![CurveRecord { x: 1.0, y: 1.0 }];
    assert!(matches!(
        scaling_exponent(&curve),
        Err(GnfError::FitFailed(_))
    ));
}
