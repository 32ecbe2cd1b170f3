use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::capture::{CaptureDevice, DeviceOpener};
use crate::error::{Result, SourceError};
use crate::frame::Frame;
use crate::io::load_image;

/// What the caller wants to preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceRequest {
    Static(PathBuf),
    Live(u32),
}

impl std::fmt::Display for SourceRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(path) => write!(f, "image {}", path.display()),
            Self::Live(index) => write!(f, "camera {index}"),
        }
    }
}

/// A decoded image that serves the same frame on every poll.
#[derive(Clone, Debug)]
pub struct StaticImage {
    path: PathBuf,
    frame: Frame,
}

impl StaticImage {
    pub fn load(path: &Path) -> Result<Self> {
        let frame = load_image(path)?;
        Ok(Self::from_frame(path, frame))
    }

    pub fn from_frame(path: &Path, frame: Frame) -> Self {
        Self {
            path: path.to_path_buf(),
            frame,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

/// An open capture device plus its transient-failure bookkeeping.
///
/// The device is released when the capture is dropped, and only then.
pub struct LiveCapture {
    device: Box<dyn CaptureDevice>,
    index: u32,
    consecutive_failures: u32,
    failure_threshold: u32,
    last_error: Option<String>,
}

impl LiveCapture {
    pub fn new(device: Box<dyn CaptureDevice>, index: u32, failure_threshold: u32) -> Self {
        Self {
            device,
            index,
            consecutive_failures: 0,
            failure_threshold: failure_threshold.max(1),
            last_error: None,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn device_name(&self) -> String {
        self.device.name()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn read(&mut self) -> Result<Frame> {
        match self.device.read_frame() {
            Ok(frame) => {
                self.consecutive_failures = 0;
                self.last_error = None;
                Ok(frame)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.last_error = Some(e.to_string());
                warn!(
                    device = self.index,
                    failures = self.consecutive_failures,
                    "Capture read failed: {e}"
                );
                Err(SourceError::ReadFailed {
                    device: self.index,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn exhausted(&self) -> bool {
        self.consecutive_failures >= self.failure_threshold
    }
}

impl Drop for LiveCapture {
    fn drop(&mut self) {
        self.device.release();
        info!(device = self.index, "Released capture device");
    }
}

impl std::fmt::Debug for LiveCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveCapture")
            .field("device", &self.device.name())
            .field("index", &self.index)
            .field("consecutive_failures", &self.consecutive_failures)
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// The active provider of frames.
#[derive(Debug, Default)]
pub enum FrameSource {
    #[default]
    Closed,
    Static(StaticImage),
    Live(LiveCapture),
}

impl FrameSource {
    /// Decode `path` into a static source, replacing the current one.
    ///
    /// Decoding happens before anything is released, so a bad file leaves
    /// the current source in place.
    pub fn open_static(&mut self, path: &Path) -> Result<()> {
        let image = StaticImage::load(path)?;
        self.close();
        info!(path = %path.display(), "Opened static image");
        *self = Self::Static(image);
        Ok(())
    }

    /// Open capture device `index`, releasing the current source first.
    ///
    /// On failure the source is left `Closed`.
    pub fn open_live(
        &mut self,
        opener: &mut dyn DeviceOpener,
        index: u32,
        failure_threshold: u32,
    ) -> Result<()> {
        self.close();
        let device = opener.open(index).map_err(|e| SourceError::OpenFailed {
            device: index,
            reason: e.to_string(),
        })?;
        info!(device = index, name = %device.name(), "Opened capture device");
        *self = Self::Live(LiveCapture::new(device, index, failure_threshold));
        Ok(())
    }

    /// Release whatever is open. Closing a closed source does nothing.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    /// Fetch the next frame.
    ///
    /// A live read failure is returned as `ReadFailed` and the device stays
    /// open, until `failure_threshold` failures in a row: then the device is
    /// released, the source closes and `OpenFailed` is returned instead.
    pub fn poll(&mut self) -> Result<Frame> {
        match self {
            Self::Closed => Err(SourceError::Closed),
            Self::Static(image) => Ok(image.frame().clone()),
            Self::Live(capture) => {
                let read = capture.read();
                if read.is_ok() || !capture.exhausted() {
                    return read;
                }

                let device = capture.index();
                let failures = capture.consecutive_failures();
                let reason = format!(
                    "device lost after {failures} consecutive read failures ({})",
                    capture.last_error().unwrap_or("unknown error")
                );
                error!(device, failures, "Closing capture device");
                self.close();
                Err(SourceError::OpenFailed { device, reason })
            }
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Short description for status text.
    pub fn describe(&self) -> String {
        match self {
            Self::Closed => "no source".to_string(),
            Self::Static(image) => format!("image {}", image.path().display()),
            Self::Live(capture) => format!("camera {}", capture.device_name()),
        }
    }
}
