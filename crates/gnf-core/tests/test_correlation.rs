use approx::assert_abs_diff_eq;
use ndarray::Array2;

use gnf_core::bounds::Bounds;
use gnf_core::correlation::{
    autocorrelation, corr_length, correlation_records, exp_decay, fit_decay_rate, xy_to_r,
};
use gnf_core::error::GnfError;
use gnf_core::io::csv_io::CorrelationRecord;

fn synthetic_decay(rate: f64) -> Vec<CorrelationRecord> {
    (0..80)
        .map(|i| {
            let r = i as f64 * 5.0;
            CorrelationRecord {
                r,
                c: exp_decay(r, rate),
            }
        })
        .collect()
}

#[test]
fn test_fit_recovers_decay_rate() {
    let records = synthetic_decay(0.05);
    let r: Vec<f64> = records.iter().map(|rec| rec.r).collect();
    let c: Vec<f64> = records.iter().map(|rec| rec.c).collect();
    let rate = fit_decay_rate(&r, &c, 0.01).unwrap();
    assert_abs_diff_eq!(rate, 0.05, epsilon = 1e-8);
}

#[test]
fn test_corr_length_is_inverse_rate() {
    let fit = corr_length(&synthetic_decay(0.05), Bounds::All).unwrap();
    assert_abs_diff_eq!(fit.rate, 0.05, epsilon = 1e-8);
    assert_abs_diff_eq!(fit.length, 20.0, epsilon = 1e-5);
}

#[test]
fn test_fitting_range_restricts_the_fit() {
    // Corrupt the tail; a bounded fit must not see it.
    let mut records = synthetic_decay(0.05);
    for rec in records.iter_mut().filter(|rec| rec.r >= 200.0) {
        rec.c = 0.5;
    }
    let fit = corr_length(&records, Bounds::Below(200.0)).unwrap();
    assert_abs_diff_eq!(fit.rate, 0.05, epsilon = 1e-8);
}

#[test]
fn test_empty_fitting_range_is_an_error() {
    let err = corr_length(&synthetic_decay(0.05), Bounds::Between(1e6, 2e6)).unwrap_err();
    assert!(matches!(err, GnfError::EmptySelection));
}

#[test]
fn test_degenerate_fit_is_an_error() {
    // All separations zero: the Jacobian vanishes.
    let r = vec![0.0; 10];
    let c = vec![1.0; 10];
    assert!(matches!(
        fit_decay_rate(&r, &c, 0.01),
        Err(GnfError::FitFailed(_))
    ));
}

#[test]
fn test_xy_to_r_measures_from_first_point() {
    let x = vec![25.0, 25.0, 50.0, 55.0];
    let y = vec![25.0, 50.0, 25.0, 65.0];
    let r = xy_to_r(&x, &y);
    assert_eq!(r[0], 0.0);
    assert_abs_diff_eq!(r[1], 25.0, epsilon = 1e-12);
    assert_abs_diff_eq!(r[2], 25.0, epsilon = 1e-12);
    assert_abs_diff_eq!(r[3], 50.0, epsilon = 1e-12);
}

#[test]
fn test_autocorrelation_of_constant_field_is_zero() {
    let field = Array2::<f64>::from_elem((16, 16), 3.0);
    let corr = autocorrelation(&field);
    for &v in corr.iter() {
        assert_eq!(v, 0.0);
    }
}

#[test]
fn test_autocorrelation_is_one_at_zero_shift() {
    let mut field = Array2::<f64>::zeros((16, 16));
    for row in 0..16 {
        for col in 0..16 {
            field[[row, col]] = ((row * 3 + col * 5) % 7) as f64;
        }
    }
    let corr = autocorrelation(&field);
    assert_eq!(corr.dim(), (9, 9));
    assert_abs_diff_eq!(corr[[0, 0]], 1.0, epsilon = 1e-9);
}

#[test]
fn test_periodic_stripes_correlate_at_their_period() {
    // Stripes of period 8 along x: shifting by the period realigns them.
    let mut field = Array2::<f64>::zeros((24, 24));
    for row in 0..24 {
        for col in 0..24 {
            field[[row, col]] = (std::f64::consts::TAU * col as f64 / 8.0).sin();
        }
    }
    let corr = autocorrelation(&field);
    assert_abs_diff_eq!(corr[[0, 8]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(corr[[0, 4]], -1.0, epsilon = 1e-6);
}

#[test]
fn test_correlation_records_sorted_and_scaled() {
    let mut field = Array2::<f64>::zeros((8, 8));
    field[[3, 3]] = 1.0;
    let corr = autocorrelation(&field);
    let records = correlation_records(&corr, 25.0);

    assert_eq!(records[0].r, 0.0);
    assert_abs_diff_eq!(records[0].c, 1.0, epsilon = 1e-9);
    for pair in records.windows(2) {
        assert!(pair[0].r <= pair[1].r);
    }
    // Nearest-neighbour separation is one stride.
    assert_abs_diff_eq!(records[1].r, 25.0, epsilon = 1e-12);
}
