use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Correlate every row with a 1D kernel. Borders replicate the edge pixel.
pub fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;

    build_plane(h, w, |row, col| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_col = replicate(col as isize + ki as isize - radius as isize, w);
            sum += data[[row, src_col]] * kv;
        }
        sum
    })
}

/// Correlate every column with a 1D kernel. Borders replicate the edge pixel.
pub fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;

    build_plane(h, w, |row, col| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_row = replicate(row as isize + ki as isize - radius as isize, h);
            sum += data[[src_row, col]] * kv;
        }
        sum
    })
}

/// Separable correlation: `row_kernel` along x, then `col_kernel` along y.
pub fn convolve_separable(data: &Array2<f32>, row_kernel: &[f32], col_kernel: &[f32]) -> Array2<f32> {
    convolve_cols(&convolve_rows(data, row_kernel), col_kernel)
}

/// Full 2D correlation with a square, odd-sized kernel.
pub fn convolve_2d(data: &Array2<f32>, kernel: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let (kh, kw) = kernel.dim();
    let (ry, rx) = (kh / 2, kw / 2);

    build_plane(h, w, |row, col| {
        let mut sum = 0.0f32;
        for ky in 0..kh {
            let src_row = replicate(row as isize + ky as isize - ry as isize, h);
            for kx in 0..kw {
                let src_col = replicate(col as isize + kx as isize - rx as isize, w);
                sum += data[[src_row, src_col]] * kernel[[ky, kx]];
            }
        }
        sum
    })
}

fn replicate(idx: isize, len: usize) -> usize {
    idx.clamp(0, len as isize - 1) as usize
}

/// Evaluate `sample(row, col)` for every pixel, splitting rows across the
/// Rayon pool for large planes.
pub(crate) fn build_plane<F>(h: usize, w: usize, sample: F) -> Array2<f32>
where
    F: Fn(usize, usize) -> f32 + Sync,
{
    let mut result = Array2::<f32>::zeros((h, w));

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| (0..w).map(|col| sample(row, col)).collect())
            .collect();

        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
    } else {
        for row in 0..h {
            for col in 0..w {
                result[[row, col]] = sample(row, col);
            }
        }
    }

    result
}
