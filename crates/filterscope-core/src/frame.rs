use image::{DynamicImage, RgbImage};
use ndarray::{Array2, Array3, ArrayView3, Axis};

use crate::consts::{COLOR_CHANNEL_COUNT, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::error::DecodeError;

/// Channel layout of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorLayout {
    Gray,
    Rgb,
}

impl ColorLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => COLOR_CHANNEL_COUNT,
        }
    }
}

impl std::fmt::Display for ColorLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gray => write!(f, "Gray"),
            Self::Rgb => write!(f, "RGB"),
        }
    }
}

/// A decoded 8-bit image sample.
///
/// Pixel data is row-major with shape `(height, width, channels)`. A frame
/// never changes after construction; filters and conversions allocate a new
/// one.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Array3<u8>,
    layout: ColorLayout,
}

impl Frame {
    /// Build a frame from an interleaved pixel buffer.
    pub fn from_raw(
        width: usize,
        height: usize,
        layout: ColorLayout,
        pixels: Vec<u8>,
    ) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyImage { width, height });
        }

        let channels = layout.channels();
        let expected = width * height * channels;
        if pixels.len() != expected {
            return Err(DecodeError::SizeMismatch {
                width,
                height,
                channels,
                expected,
                actual: pixels.len(),
            });
        }

        let data = Array3::from_shape_vec((height, width, channels), pixels).map_err(|_| {
            DecodeError::SizeMismatch {
                width,
                height,
                channels,
                expected,
                actual: expected,
            }
        })?;

        Ok(Self { data, layout })
    }

    /// Convert a decoded image. Luma images stay single-channel, everything
    /// else (alpha included) becomes RGB.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self, DecodeError> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        match img {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => {
                Self::from_raw(w, h, ColorLayout::Gray, img.to_luma8().into_raw())
            }
            _ => Self::from_raw(w, h, ColorLayout::Rgb, img.to_rgb8().into_raw()),
        }
    }

    /// Fill a frame with a single value per channel.
    pub fn filled(width: usize, height: usize, layout: ColorLayout, value: &[u8]) -> Result<Self, DecodeError> {
        let channels = layout.channels();
        let mut pixels = Vec::with_capacity(width * height * channels);
        for _ in 0..width * height {
            for c in 0..channels {
                pixels.push(value.get(c).copied().unwrap_or(0));
            }
        }
        Self::from_raw(width, height, layout, pixels)
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn layout(&self) -> ColorLayout {
        self.layout
    }

    /// Read-only view of the pixels, shape `(height, width, channels)`.
    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn pixel(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.data[[row, col, channel]]
    }

    /// Single-channel luminance copy. Gray frames are cloned as-is.
    pub fn to_gray(&self) -> Frame {
        match self.layout {
            ColorLayout::Gray => self.clone(),
            ColorLayout::Rgb => Self::from_planes(ColorLayout::Gray, &[self.luminance_plane()]),
        }
    }

    /// Three-channel copy. Gray values are replicated into R, G and B.
    pub fn to_rgb(&self) -> Frame {
        match self.layout {
            ColorLayout::Rgb => self.clone(),
            ColorLayout::Gray => {
                let (h, w, _) = self.data.dim();
                let data = Array3::from_shape_fn((h, w, COLOR_CHANNEL_COUNT), |(r, c, _)| {
                    self.data[[r, c, 0]]
                });
                Self {
                    data,
                    layout: ColorLayout::Rgb,
                }
            }
        }
    }

    /// Convert to `layout`, allocating only when the layout differs.
    pub fn to_layout(&self, layout: ColorLayout) -> Frame {
        match layout {
            ColorLayout::Gray => self.to_gray(),
            ColorLayout::Rgb => self.to_rgb(),
        }
    }

    /// Copy into an `image` buffer for display.
    pub fn to_rgb_image(&self) -> RgbImage {
        let rgb = self.to_rgb();
        let (h, w, _) = rgb.data.dim();
        RgbImage::from_fn(w as u32, h as u32, |x, y| {
            let (row, col) = (y as usize, x as usize);
            image::Rgb([
                rgb.data[[row, col, 0]],
                rgb.data[[row, col, 1]],
                rgb.data[[row, col, 2]],
            ])
        })
    }

    /// One channel as f32 samples on the 0..255 scale.
    pub fn plane(&self, channel: usize) -> Array2<f32> {
        self.data.index_axis(Axis(2), channel).mapv(|v| v as f32)
    }

    /// Luminance as f32 samples on the 0..255 scale.
    pub fn luminance_plane(&self) -> Array2<f32> {
        match self.layout {
            ColorLayout::Gray => self.plane(0),
            ColorLayout::Rgb => {
                let (h, w, _) = self.data.dim();
                Array2::from_shape_fn((h, w), |(r, c)| {
                    LUMINANCE_R * self.data[[r, c, 0]] as f32
                        + LUMINANCE_G * self.data[[r, c, 1]] as f32
                        + LUMINANCE_B * self.data[[r, c, 2]] as f32
                })
            }
        }
    }

    /// Reassemble a frame from f32 planes, rounding and clamping to 8 bits.
    ///
    /// All planes must share the same shape and there must be exactly
    /// `layout.channels()` of them.
    pub(crate) fn from_planes(layout: ColorLayout, planes: &[Array2<f32>]) -> Frame {
        debug_assert_eq!(planes.len(), layout.channels());
        let (h, w) = planes[0].dim();
        let data = Array3::from_shape_fn((h, w, layout.channels()), |(r, c, ch)| {
            quantize(planes[ch][[r, c]])
        });
        Frame { data, layout }
    }
}

/// Round to the nearest 8-bit value, saturating at both ends.
pub(crate) fn quantize(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
