use ndarray::Array2;

use crate::filters::convolve::convolve_2d;
use crate::filters::map_planes;
use crate::frame::Frame;

/// Sharpen with a 3x3 high-boost kernel.
///
/// The kernel is `[[-1,-1,-1],[-1,8+amount,-1],[-1,-1,-1]] / amount`, whose
/// weights sum to one, so flat regions pass through unchanged. `amount = 1`
/// gives the classic `9` center weight.
pub fn sharpen(frame: &Frame, amount: f32) -> Frame {
    let kernel = sharpen_kernel(amount);
    map_planes(frame, |plane| convolve_2d(plane, &kernel))
}

pub fn sharpen_kernel(amount: f32) -> Array2<f32> {
    let mut kernel = Array2::from_elem((3, 3), -1.0 / amount);
    kernel[[1, 1]] = (8.0 + amount) / amount;
    kernel
}
