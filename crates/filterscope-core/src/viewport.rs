use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM};
use crate::frame::Frame;

/// Which of the two side-by-side views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportId {
    Original,
    Filtered,
}

impl std::fmt::Display for ViewportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => write!(f, "Original"),
            Self::Filtered => write!(f, "Filtered"),
        }
    }
}

/// Resampling used when a view is zoomed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resample {
    Nearest,
    #[default]
    Linear,
}

impl Resample {
    fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Linear => FilterType::Triangle,
        }
    }
}

/// Zoom and pan of one view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    zoom: f32,
    /// Offset of the image's top-left corner, in destination pixels.
    pan: (f32, f32),
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl ViewportState {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> (f32, f32) {
        self.pan
    }

    /// Multiply the zoom by `factor`, clamped to the allowed range.
    /// Non-positive or non-finite factors are ignored.
    pub fn zoom_by(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Shift the view. Pan is not bounded; the canvas scrolls freely.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.pan.0 += dx;
            self.pan.1 += dy;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The two views, addressed by [`ViewportId`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewports {
    pub original: ViewportState,
    pub filtered: ViewportState,
}

impl Viewports {
    pub fn get(&self, id: ViewportId) -> &ViewportState {
        match id {
            ViewportId::Original => &self.original,
            ViewportId::Filtered => &self.filtered,
        }
    }

    pub fn get_mut(&mut self, id: ViewportId) -> &mut ViewportState {
        match id {
            ViewportId::Original => &mut self.original,
            ViewportId::Filtered => &mut self.filtered,
        }
    }

    pub fn reset(&mut self) {
        self.original.reset();
        self.filtered.reset();
    }
}

/// A frame scaled for display, plus where to draw it.
#[derive(Clone, Debug)]
pub struct RenderedView {
    pub image: RgbImage,
    pub offset: (f32, f32),
}

impl RenderedView {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Scale `frame` by the view's zoom and attach its pan offset.
///
/// Pure: neither the frame nor the state is touched.
pub fn render(frame: &Frame, state: &ViewportState, resample: Resample) -> RenderedView {
    let image = frame.to_rgb_image();
    let (w, h) = scaled_size(frame.width(), frame.height(), state.zoom);

    let image = if (w, h) == (image.width(), image.height()) {
        image
    } else {
        imageops::resize(&image, w, h, resample.filter_type())
    };

    RenderedView {
        image,
        offset: state.pan,
    }
}

/// Destination size for a zoomed image, never smaller than 1x1.
pub fn scaled_size(width: usize, height: usize, zoom: f32) -> (u32, u32) {
    let w = ((width as f32 * zoom).round() as u32).max(1);
    let h = ((height as f32 * zoom).round() as u32).max(1);
    (w, h)
}
