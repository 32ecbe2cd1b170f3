use ndarray::{Array2, Zip};

use crate::consts::NORMALIZE_EPSILON;
use crate::filters::convolve::convolve_separable;
use crate::filters::expand_like;
use crate::frame::Frame;

/// Sobel gradient magnitude on the luminance of `frame`, min–max
/// normalized to the full 8-bit range.
///
/// Normalization uses the extremes of this frame only, so the same scene
/// can map to different output levels from one live frame to the next.
/// A frame without any gradient comes out all zero.
pub fn sobel_edges(frame: &Frame, kernel_size: usize) -> Frame {
    let gray = frame.to_gray().plane(0);
    let magnitude = gradient_magnitude(&gray, kernel_size);
    expand_like(frame, &normalize_min_max(&magnitude))
}

/// Horizontal and vertical Sobel derivatives with a `kernel_size` aperture.
pub fn sobel_gradients(data: &Array2<f32>, kernel_size: usize) -> (Array2<f32>, Array2<f32>) {
    let smooth = smoothing_kernel(kernel_size);
    let deriv = derivative_kernel(kernel_size);
    let gx = convolve_separable(data, &deriv, &smooth);
    let gy = convolve_separable(data, &smooth, &deriv);
    (gx, gy)
}

/// Euclidean gradient magnitude `sqrt(gx² + gy²)`.
pub fn gradient_magnitude(data: &Array2<f32>, kernel_size: usize) -> Array2<f32> {
    let (gx, gy) = sobel_gradients(data, kernel_size);
    Zip::from(&gx)
        .and(&gy)
        .map_collect(|&x, &y| (x * x + y * y).sqrt())
}

/// Linearly map the plane's `[min, max]` onto `[0, 255]`.
pub fn normalize_min_max(data: &Array2<f32>) -> Array2<f32> {
    let min = data.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    if !range.is_finite() || range <= NORMALIZE_EPSILON {
        return Array2::zeros(data.dim());
    }

    let scale = 255.0 / range;
    data.mapv(|v| (v - min) * scale)
}

/// Binomial smoothing weights of length `size` (`[1, 2, 1]` for 3).
pub fn smoothing_kernel(size: usize) -> Vec<f32> {
    binomial(size.max(1) - 1)
}

/// Central-difference derivative of length `size` (`[-1, 0, 1]` for 3).
pub fn derivative_kernel(size: usize) -> Vec<f32> {
    let smooth = binomial(size.max(3) - 3);
    full_convolve(&[-1.0, 0.0, 1.0], &smooth)
}

fn binomial(order: usize) -> Vec<f32> {
    let mut coeffs = vec![1.0f32];
    for _ in 0..order {
        coeffs = full_convolve(&coeffs, &[1.0, 1.0]);
    }
    coeffs
}

fn full_convolve(a: &[f32], b: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0f32; a.len() + b.len() - 1];
    for (i, &av) in a.iter().enumerate() {
        for (j, &bv) in b.iter().enumerate() {
            out[i + j] += av * bv;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernels_match_classic_apertures() {
        assert_eq!(smoothing_kernel(3), vec![1.0, 2.0, 1.0]);
        assert_eq!(derivative_kernel(3), vec![-1.0, 0.0, 1.0]);
        assert_eq!(smoothing_kernel(5), vec![1.0, 4.0, 6.0, 4.0, 1.0]);
        assert_eq!(derivative_kernel(5), vec![-1.0, -2.0, 0.0, 2.0, 1.0]);
        assert_eq!(
            derivative_kernel(7),
            vec![-1.0, -4.0, -5.0, 0.0, 5.0, 4.0, 1.0]
        );
    }

    #[test]
    fn normalize_stretches_to_full_range() {
        let data = Array2::from_shape_vec((1, 3), vec![10.0, 20.0, 30.0]).unwrap();
        let n = normalize_min_max(&data);
        assert_eq!(n[[0, 0]], 0.0);
        assert!((n[[0, 1]] - 127.5).abs() < 1e-4);
        assert!((n[[0, 2]] - 255.0).abs() < 1e-4);
    }
}
