#[cfg(feature = "camera")]
pub mod camera;
pub mod threaded;

use crate::config::PreviewConfig;
use crate::error::DeviceError;
use crate::frame::Frame;

pub use threaded::{ThreadedCapture, ThreadedOpener};

/// A device that hands out one frame per read.
///
/// Implemented by the camera backend and by test doubles. Reads may block
/// for the duration of one device exchange.
pub trait CaptureDevice {
    /// Human-readable device name for status text.
    fn name(&self) -> String;

    /// Read the next frame.
    fn read_frame(&mut self) -> Result<Frame, DeviceError>;

    /// Stop streaming and give the device back to the system.
    ///
    /// Called exactly once by the owning source, when the source closes.
    fn release(&mut self) {}
}

/// Opens capture devices by index.
pub trait DeviceOpener {
    fn open(&mut self, index: u32) -> Result<Box<dyn CaptureDevice>, DeviceError>;
}

impl<F> DeviceOpener for F
where
    F: FnMut(u32) -> Result<Box<dyn CaptureDevice>, DeviceError>,
{
    fn open(&mut self, index: u32) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        self(index)
    }
}

/// Opener used when no capture backend is compiled in.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCaptureBackend;

impl DeviceOpener for NoCaptureBackend {
    fn open(&mut self, index: u32) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        Err(DeviceError::new(format!(
            "no capture backend available for device {index} (built without the `camera` feature)"
        )))
    }
}

/// Summary of an attached capture device.
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    pub index: u32,
    pub name: String,
    pub description: String,
}

/// The opener a session should use for `config`: the native camera backend
/// when compiled in (threaded if configured), otherwise [`NoCaptureBackend`].
pub fn default_opener(config: &PreviewConfig) -> Box<dyn DeviceOpener> {
    #[cfg(feature = "camera")]
    {
        if config.threaded_capture {
            Box::new(ThreadedOpener::new(camera::NokhwaOpener, config.frame_timeout()))
        } else {
            Box::new(camera::NokhwaOpener)
        }
    }
    #[cfg(not(feature = "camera"))]
    {
        let _ = config;
        Box::new(NoCaptureBackend)
    }
}
