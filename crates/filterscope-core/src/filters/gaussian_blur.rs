use crate::filters::convolve::convolve_separable;
use crate::filters::map_planes;
use crate::frame::Frame;

/// Apply Gaussian blur to a frame using separable 1D convolution.
///
/// An even `kernel_size` is widened to the next odd size.
pub fn gaussian_blur(frame: &Frame, kernel_size: usize, sigma: f32) -> Frame {
    let kernel = make_gaussian_kernel(kernel_size, sigma);
    map_planes(frame, |plane| convolve_separable(plane, &kernel, &kernel))
}

/// Normalized 1D Gaussian weights of odd length.
pub fn make_gaussian_kernel(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let size = if kernel_size % 2 == 0 {
        kernel_size + 1
    } else {
        kernel_size
    };
    let radius = size / 2;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}
