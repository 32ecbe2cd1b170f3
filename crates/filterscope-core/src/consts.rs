/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in a color frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Gradient range below which Sobel normalization produces an all-zero frame.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Smallest and largest kernel size accepted by the blur filters.
pub const MIN_KERNEL_SIZE: usize = 3;
pub const MAX_KERNEL_SIZE: usize = 31;

/// Largest Sobel aperture.
pub const MAX_SOBEL_KERNEL_SIZE: usize = 7;

/// Gaussian sigma range.
pub const MIN_SIGMA: f32 = 0.1;
pub const MAX_SIGMA: f32 = 10.0;

/// Sharpen amount range. The kernel is divided by the amount, so it must stay positive.
pub const MIN_SHARPEN_AMOUNT: f32 = 0.1;
pub const MAX_SHARPEN_AMOUNT: f32 = 10.0;

/// Upper bound for Canny thresholds (8-bit gradient scale).
pub const MAX_CANNY_THRESHOLD: f32 = 255.0;

/// Viewport zoom bounds.
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 3.0;

/// Default delay between live-capture ticks, in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Consecutive read failures after which a live device is considered lost.
pub const DEFAULT_READ_FAILURE_THRESHOLD: u32 = 5;

/// How long a threaded capture poll waits for a fresh frame, in milliseconds.
pub const DEFAULT_FRAME_TIMEOUT_MS: u64 = 500;
