use ndarray::{Array2, Zip};

use crate::filters::expand_like;
use crate::filters::sobel::sobel_gradients;
use crate::frame::Frame;

/// tan(22.5°) and tan(67.5°), the sector boundaries for gradient direction.
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

const EDGE: f32 = 255.0;

/// Canny edge detection on the luminance of `frame`.
///
/// Gradients come from a 3x3 Sobel operator with L1 magnitude. Pixels above
/// `high` seed edges, which then grow through 8-connected neighbours above
/// `low`. The thresholds may be given in either order.
pub fn canny_edges(frame: &Frame, threshold1: f32, threshold2: f32) -> Frame {
    let low = threshold1.min(threshold2);
    let high = threshold1.max(threshold2);

    let gray = frame.to_gray().plane(0);
    let edges = canny_array(&gray, low, high);
    expand_like(frame, &edges)
}

/// Binary edge map (0 or 255) of a single plane.
pub fn canny_array(data: &Array2<f32>, low: f32, high: f32) -> Array2<f32> {
    let (gx, gy) = sobel_gradients(data, 3);
    let magnitude = Zip::from(&gx).and(&gy).map_collect(|&x, &y| x.abs() + y.abs());
    let thin = non_max_suppression(&magnitude, &gx, &gy, low);
    hysteresis(&magnitude, &thin, high)
}

/// Keep only pixels above `low` that are local maxima along their gradient.
fn non_max_suppression(mag: &Array2<f32>, gx: &Array2<f32>, gy: &Array2<f32>, low: f32) -> Array2<bool> {
    let (h, w) = mag.dim();
    let at = |r: isize, c: isize| -> f32 {
        if r < 0 || c < 0 || r >= h as isize || c >= w as isize {
            0.0
        } else {
            mag[[r as usize, c as usize]]
        }
    };

    Array2::from_shape_fn((h, w), |(row, col)| {
        let m = mag[[row, col]];
        if m <= low {
            return false;
        }

        let x = gx[[row, col]];
        let y = gy[[row, col]];
        let (ax, ay) = (x.abs(), y.abs());
        let (r, c) = (row as isize, col as isize);

        let (before, after) = if ay <= ax * TAN_22_5 {
            (at(r, c - 1), at(r, c + 1))
        } else if ay > ax * TAN_67_5 {
            (at(r - 1, c), at(r + 1, c))
        } else if (x > 0.0) == (y > 0.0) {
            (at(r - 1, c - 1), at(r + 1, c + 1))
        } else {
            (at(r - 1, c + 1), at(r + 1, c - 1))
        };

        // Strict on one side so plateaus yield a single-pixel line.
        m > before && m >= after
    })
}

/// Grow strong edges through connected candidates.
fn hysteresis(mag: &Array2<f32>, candidates: &Array2<bool>, high: f32) -> Array2<f32> {
    let (h, w) = mag.dim();
    let mut out = Array2::<f32>::zeros((h, w));
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for row in 0..h {
        for col in 0..w {
            if candidates[[row, col]] && mag[[row, col]] > high {
                out[[row, col]] = EDGE;
                stack.push((row, col));
            }
        }
    }

    while let Some((row, col)) = stack.pop() {
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let nr = row as isize + dr;
                let nc = col as isize + dc;
                if nr < 0 || nc < 0 || nr >= h as isize || nc >= w as isize {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if candidates[[nr, nc]] && out[[nr, nc]] == 0.0 {
                    out[[nr, nc]] = EDGE;
                    stack.push((nr, nc));
                }
            }
        }
    }

    out
}
