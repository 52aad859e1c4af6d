use ndarray::Array2;

/// A single grayscale image frame.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Frame number parsed from the file stem (acquisition time in frames).
    pub index: i64,
}

impl Frame {
    pub fn new(data: Array2<f32>, index: i64) -> Self {
        Self { data, index }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Shorter side of the frame, the length scale bounding window sizes.
    pub fn shorter_side(&self) -> usize {
        self.width().min(self.height())
    }

    /// Mean pixel intensity over the whole frame.
    pub fn mean_intensity(&self) -> f64 {
        let count = (self.width() * self.height()) as f64;
        if count == 0.0 {
            return 0.0;
        }
        self.data.iter().map(|&v| v as f64).sum::<f64>() / count
    }
}
