pub mod box_blur;
pub mod canny;
pub mod convolve;
pub mod gaussian_blur;
pub mod sharpen;
pub mod sobel;

use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    MAX_CANNY_THRESHOLD, MAX_KERNEL_SIZE, MAX_SHARPEN_AMOUNT, MAX_SIGMA, MAX_SOBEL_KERNEL_SIZE,
    MIN_KERNEL_SIZE, MIN_SHARPEN_AMOUNT, MIN_SIGMA,
};
use crate::error::FilterError;
use crate::frame::Frame;

/// The closed set of filter kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Identity,
    BoxBlur,
    GaussianBlur,
    Sharpen,
    Sobel,
    Canny,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        Self::Identity,
        Self::BoxBlur,
        Self::GaussianBlur,
        Self::Sharpen,
        Self::Sobel,
        Self::Canny,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::BoxBlur => "box_blur",
            Self::GaussianBlur => "gaussian_blur",
            Self::Sharpen => "sharpen",
            Self::Sobel => "sobel",
            Self::Canny => "canny",
        }
    }

    /// Parameter names accepted by [`FilterSpec::set_parameter`] for this kind.
    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            Self::Identity => &[],
            Self::BoxBlur | Self::Sobel => &["kernel_size"],
            Self::GaussianBlur => &["kernel_size", "sigma"],
            Self::Sharpen => &["amount"],
            Self::Canny => &["threshold1", "threshold2"],
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "identity" | "original" | "none" => Ok(Self::Identity),
            "box_blur" | "box" => Ok(Self::BoxBlur),
            "gaussian_blur" | "gaussian" => Ok(Self::GaussianBlur),
            "sharpen" => Ok(Self::Sharpen),
            "sobel" | "sobel_edge" => Ok(Self::Sobel),
            "canny" | "canny_edge" => Ok(Self::Canny),
            _ => Err(FilterError::UnknownKind(s.to_string())),
        }
    }
}

/// The active filter together with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    Identity,
    BoxBlur {
        kernel_size: usize,
    },
    GaussianBlur {
        kernel_size: usize,
        sigma: f32,
    },
    Sharpen {
        amount: f32,
    },
    #[serde(rename = "sobel")]
    SobelEdge {
        kernel_size: usize,
    },
    #[serde(rename = "canny")]
    CannyEdge {
        threshold1: f32,
        threshold2: f32,
    },
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::Identity
    }
}

impl std::fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identity => write!(f, "Original"),
            Self::BoxBlur { kernel_size } => write!(f, "Box Blur ({kernel_size}x{kernel_size})"),
            Self::GaussianBlur { kernel_size, sigma } => {
                write!(f, "Gaussian Blur ({kernel_size}x{kernel_size}, sigma {sigma:.2})")
            }
            Self::Sharpen { amount } => write!(f, "Sharpen (amount {amount:.2})"),
            Self::SobelEdge { kernel_size } => write!(f, "Sobel Edge (k={kernel_size})"),
            Self::CannyEdge {
                threshold1,
                threshold2,
            } => write!(f, "Canny Edge ({threshold1:.0}/{threshold2:.0})"),
        }
    }
}

impl FilterSpec {
    /// The spec selected when a kind is picked without explicit parameters.
    pub fn default_for(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Identity => Self::Identity,
            FilterKind::BoxBlur => Self::BoxBlur { kernel_size: 5 },
            FilterKind::GaussianBlur => Self::GaussianBlur {
                kernel_size: 5,
                sigma: 1.0,
            },
            FilterKind::Sharpen => Self::Sharpen { amount: 1.0 },
            FilterKind::Sobel => Self::SobelEdge { kernel_size: 3 },
            FilterKind::Canny => Self::CannyEdge {
                threshold1: 80.0,
                threshold2: 150.0,
            },
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Identity => FilterKind::Identity,
            Self::BoxBlur { .. } => FilterKind::BoxBlur,
            Self::GaussianBlur { .. } => FilterKind::GaussianBlur,
            Self::Sharpen { .. } => FilterKind::Sharpen,
            Self::SobelEdge { .. } => FilterKind::Sobel,
            Self::CannyEdge { .. } => FilterKind::Canny,
        }
    }

    /// Bring every parameter into its valid range.
    ///
    /// Even kernel sizes are bumped to the next odd size without a notice.
    /// Values outside their range are clamped and reported as
    /// [`FilterError::InvalidParameter`]. Canny thresholds keep their order
    /// here so slider positions survive; the detector swaps them when needed.
    pub fn sanitized(&self) -> (FilterSpec, Vec<FilterError>) {
        let kind = self.kind();
        let mut notices = Vec::new();

        let spec = match *self {
            Self::Identity => Self::Identity,
            Self::BoxBlur { kernel_size } => Self::BoxBlur {
                kernel_size: odd_kernel(kind, kernel_size, MAX_KERNEL_SIZE, &mut notices),
            },
            Self::GaussianBlur { kernel_size, sigma } => Self::GaussianBlur {
                kernel_size: odd_kernel(kind, kernel_size, MAX_KERNEL_SIZE, &mut notices),
                sigma: clamp_param(kind, "sigma", sigma, MIN_SIGMA, MAX_SIGMA, &mut notices),
            },
            Self::Sharpen { amount } => Self::Sharpen {
                amount: clamp_param(
                    kind,
                    "amount",
                    amount,
                    MIN_SHARPEN_AMOUNT,
                    MAX_SHARPEN_AMOUNT,
                    &mut notices,
                ),
            },
            Self::SobelEdge { kernel_size } => Self::SobelEdge {
                kernel_size: odd_kernel(kind, kernel_size, MAX_SOBEL_KERNEL_SIZE, &mut notices),
            },
            Self::CannyEdge {
                threshold1,
                threshold2,
            } => {
                let t1 = clamp_param(kind, "threshold1", threshold1, 0.0, MAX_CANNY_THRESHOLD, &mut notices);
                let t2 = clamp_param(kind, "threshold2", threshold2, 0.0, MAX_CANNY_THRESHOLD, &mut notices);
                Self::CannyEdge {
                    threshold1: t1,
                    threshold2: t2,
                }
            }
        };

        (spec, notices)
    }

    /// Update one named parameter in place.
    ///
    /// Returns the clamp notice when `value` had to be brought into range.
    /// Unknown names and non-finite values leave the spec untouched.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<Option<FilterError>, FilterError> {
        let kind = self.kind();
        if !kind.parameters().contains(&name) {
            return Err(FilterError::UnknownParameter {
                kind,
                name: name.to_string(),
            });
        }
        if !value.is_finite() {
            return Err(FilterError::NotFinite {
                kind,
                name: name.to_string(),
            });
        }

        let kernel = value.round().max(0.0) as usize;
        match (&mut *self, name) {
            (Self::BoxBlur { kernel_size }, "kernel_size")
            | (Self::GaussianBlur { kernel_size, .. }, "kernel_size")
            | (Self::SobelEdge { kernel_size }, "kernel_size") => *kernel_size = kernel,
            (Self::GaussianBlur { sigma, .. }, "sigma") => *sigma = value as f32,
            (Self::Sharpen { amount }, "amount") => *amount = value as f32,
            (Self::CannyEdge { threshold1, .. }, "threshold1") => *threshold1 = value as f32,
            (Self::CannyEdge { threshold2, .. }, "threshold2") => *threshold2 = value as f32,
            _ => {}
        }

        let (clamped, mut notices) = self.sanitized();
        *self = clamped;
        notices.retain(|n| matches!(n, FilterError::InvalidParameter { name: p, .. } if *p == name));
        Ok(notices.pop())
    }
}

fn odd_kernel(kind: FilterKind, k: usize, max: usize, notices: &mut Vec<FilterError>) -> usize {
    let clamped = k.clamp(MIN_KERNEL_SIZE, max);
    if clamped != k && !(k % 2 == 0 && k + 1 == clamped) {
        notices.push(FilterError::InvalidParameter {
            kind,
            name: "kernel_size",
            value: k as f64,
            clamped: clamped as f64,
        });
    }
    if clamped % 2 == 0 {
        clamped + 1
    } else {
        clamped
    }
}

fn clamp_param(
    kind: FilterKind,
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
    notices: &mut Vec<FilterError>,
) -> f32 {
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    if clamped != value {
        notices.push(FilterError::InvalidParameter {
            kind,
            name,
            value: value as f64,
            clamped: clamped as f64,
        });
    }
    clamped
}

/// Apply `spec` to `frame`, returning a new frame of the same dimensions.
///
/// Parameters are clamped before dispatch. Edge detectors work on
/// luminance and re-expand the result to the input layout.
pub fn apply(frame: &Frame, spec: &FilterSpec) -> Frame {
    let (spec, _) = spec.sanitized();

    match spec {
        FilterSpec::Identity => frame.clone(),
        FilterSpec::BoxBlur { kernel_size } => box_blur::box_blur(frame, kernel_size),
        FilterSpec::GaussianBlur { kernel_size, sigma } => {
            gaussian_blur::gaussian_blur(frame, kernel_size, sigma)
        }
        FilterSpec::Sharpen { amount } => sharpen::sharpen(frame, amount),
        FilterSpec::SobelEdge { kernel_size } => sobel::sobel_edges(frame, kernel_size),
        FilterSpec::CannyEdge {
            threshold1,
            threshold2,
        } => canny::canny_edges(frame, threshold1, threshold2),
    }
}

/// Run `op` on every channel plane independently.
pub(crate) fn map_planes(frame: &Frame, op: impl Fn(&Array2<f32>) -> Array2<f32>) -> Frame {
    let planes: Vec<Array2<f32>> = (0..frame.channels()).map(|c| op(&frame.plane(c))).collect();
    Frame::from_planes(frame.layout(), &planes)
}

/// Build a gray frame from a luminance result and expand it back to the
/// layout of `like`.
pub(crate) fn expand_like(like: &Frame, gray: &Array2<f32>) -> Frame {
    Frame::from_planes(crate::frame::ColorLayout::Gray, std::slice::from_ref(gray))
        .to_layout(like.layout())
}
