mod common;

use approx::assert_abs_diff_eq;

use common::{frame_from_fn, uniform_frame};
use gnf_core::error::GnfError;
use gnf_core::fluctuation::{
    fluctuation_records, kinetics_records, pooled_fluctuation, FluctuationAccumulator,
    FluctuationParams,
};

fn params(size_min: usize, step: usize) -> FluctuationParams {
    FluctuationParams {
        size_min,
        step: Some(step),
    }
}

#[test]
fn test_all_zero_sequence_has_zero_fluctuation() {
    let frames: Vec<_> = (0..4).map(|i| uniform_frame(40, 40, 0.0, i)).collect();
    let p = params(5, 5);

    for record in fluctuation_records(&frames, &p).unwrap() {
        assert_eq!(record.d, 0.0, "temporal d at n = {}", record.n);
    }
    for record in pooled_fluctuation(&frames, &p).unwrap() {
        assert_eq!(record.d, 0.0, "pooled d at n = {}", record.n);
    }
}

#[test]
fn test_empty_sequence_is_an_error() {
    let p = params(5, 5);
    assert!(matches!(
        fluctuation_records(&[], &p),
        Err(GnfError::EmptySequence)
    ));

    let acc = FluctuationAccumulator::new(40, 40, &p).unwrap();
    assert!(matches!(
        acc.temporal_records(),
        Err(GnfError::EmptySequence)
    ));
}

#[test]
fn test_two_level_sequence_temporal_std() {
    // Every window sees intensity 0 then 0.4: population std is 0.2,
    // so d = size^2 * 0.2 for every size.
    let frames = vec![uniform_frame(40, 40, 0.0, 0), uniform_frame(40, 40, 0.4, 1)];
    let records = fluctuation_records(&frames, &params(5, 5)).unwrap();

    assert_eq!(records[0].n, 25.0);
    for record in &records {
        assert_abs_diff_eq!(record.d, record.n * 0.2, epsilon = 1e-5);
    }
}

#[test]
fn test_static_pattern_separates_the_estimators() {
    // A frozen spatial pattern: each window's intensity never changes, so
    // the temporal std is 0, while windows differ from each other, so the
    // pooled std is not.
    let pattern = |row: usize, col: usize| ((row / 5 + col / 5) % 2) as f32;
    let frames: Vec<_> = (0..3).map(|i| frame_from_fn(40, 40, i, pattern)).collect();
    let p = params(5, 5);

    for record in fluctuation_records(&frames, &p).unwrap() {
        assert_abs_diff_eq!(record.d, 0.0, epsilon = 1e-9);
    }
    let pooled = pooled_fluctuation(&frames, &p).unwrap();
    // The smallest windows tile the checker squares exactly.
    assert!(pooled[0].d > 1.0, "pooled d = {}", pooled[0].d);
}

#[test]
fn test_records_ordered_by_area() {
    let frames = vec![uniform_frame(64, 48, 0.5, 0)];
    let records = fluctuation_records(&frames, &params(5, 10)).unwrap();
    for pair in records.windows(2) {
        assert!(pair[0].n < pair[1].n);
    }
    // Window sizes derive from the shorter side.
    let upper = (48.0 - 5.0) / 2.0;
    for record in &records {
        let size = record.n.sqrt();
        assert!(size >= 5.0 && size <= upper);
    }
}

#[test]
fn test_dimension_mismatch_is_an_error() {
    let p = params(5, 5);
    let mut acc = FluctuationAccumulator::new(40, 40, &p).unwrap();
    acc.add_frame(&uniform_frame(40, 40, 0.1, 0)).unwrap();
    let err = acc.add_frame(&uniform_frame(40, 41, 0.1, 1)).unwrap_err();
    assert!(matches!(err, GnfError::DimensionMismatch { .. }));
}

#[test]
fn test_kinetics_segments_cover_the_sequence() {
    let frames: Vec<_> = (0..5)
        .map(|i| uniform_frame(40, 40, 0.1 * i as f32, i))
        .collect();
    let records = kinetics_records(&frames, &params(5, 5), 2).unwrap();

    let segments: Vec<u32> = {
        let mut s: Vec<u32> = records.iter().map(|r| r.segment).collect();
        s.dedup();
        s
    };
    // 5 frames at 2 per segment: segments 1, 2 and a trailing partial 3.
    assert_eq!(segments, vec![1, 2, 3]);

    let sizes = window_sizes_len(&frames[0]);
    assert_eq!(records.len(), 3 * sizes);
}

fn window_sizes_len(frame: &gnf_core::frame::Frame) -> usize {
    gnf_core::window::window_sizes(5, frame.shorter_side())
        .unwrap()
        .len()
}

#[test]
fn test_zero_segment_length_is_an_error() {
    let frames = vec![uniform_frame(40, 40, 0.0, 0)];
    assert!(matches!(
        kinetics_records(&frames, &params(5, 5), 0),
        Err(GnfError::InvalidParameter(_))
    ));
}
