use crate::filters::convolve::convolve_separable;
use crate::filters::map_planes;
use crate::frame::Frame;

/// Unweighted k×k mean, applied per channel with replicated borders.
pub fn box_blur(frame: &Frame, kernel_size: usize) -> Frame {
    let kernel = box_kernel(kernel_size);
    map_planes(frame, |plane| convolve_separable(plane, &kernel, &kernel))
}

fn box_kernel(size: usize) -> Vec<f32> {
    vec![1.0 / size as f32; size]
}
