#![allow(dead_code)]

use ndarray::Array2;

use gnf_core::frame::Frame;

/// Frame filled with one intensity value.
pub fn uniform_frame(height: usize, width: usize, value: f32, index: i64) -> Frame {
    Frame::new(Array2::from_elem((height, width), value), index)
}

/// Frame whose pixel intensity is a function of (row, col).
pub fn frame_from_fn(
    height: usize,
    width: usize,
    index: i64,
    f: impl Fn(usize, usize) -> f32,
) -> Frame {
    let mut data = Array2::<f32>::zeros((height, width));
    for row in 0..height {
        for col in 0..width {
            data[[row, col]] = f(row, col);
        }
    }
    Frame::new(data, index)
}

/// Write a CSV file under `dir` and return its path.
pub fn write_csv(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write CSV fixture");
    path
}
