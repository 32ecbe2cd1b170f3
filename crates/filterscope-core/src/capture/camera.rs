use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::{debug, info};

use crate::capture::{CaptureDevice, DeviceInfo, DeviceOpener};
use crate::error::DeviceError;
use crate::frame::{ColorLayout, Frame};

/// Webcam backed by the platform's native capture API.
pub struct NokhwaCamera {
    camera: Camera,
    index: u32,
    streaming: bool,
}

impl NokhwaCamera {
    pub fn open(index: u32) -> Result<Self, DeviceError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| DeviceError::new(format!("failed to create camera instance: {e}")))?;

        camera
            .open_stream()
            .map_err(|e| DeviceError::new(format!("failed to open camera stream: {e}")))?;

        info!(
            index,
            name = %camera.info().human_name(),
            format = %camera.camera_format(),
            "Opened camera"
        );

        Ok(Self {
            camera,
            index,
            streaming: true,
        })
    }
}

impl CaptureDevice for NokhwaCamera {
    fn name(&self) -> String {
        format!("{} (#{})", self.camera.info().human_name(), self.index)
    }

    fn read_frame(&mut self) -> Result<Frame, DeviceError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| DeviceError::new(format!("failed to get frame: {e}")))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| DeviceError::new(format!("failed to decode frame: {e}")))?;

        let (w, h) = (decoded.width() as usize, decoded.height() as usize);
        Frame::from_raw(w, h, ColorLayout::Rgb, decoded.into_raw())
            .map_err(|e| DeviceError::new(e.to_string()))
    }

    fn release(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        if let Err(e) = self.camera.stop_stream() {
            debug!(index = self.index, "stop_stream failed: {e}");
        }
    }
}

/// Opens [`NokhwaCamera`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct NokhwaOpener;

impl DeviceOpener for NokhwaOpener {
    fn open(&mut self, index: u32) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        Ok(Box::new(NokhwaCamera::open(index)?))
    }
}

/// Enumerate attached cameras.
pub fn list_devices() -> Result<Vec<DeviceInfo>, DeviceError> {
    let cameras = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| DeviceError::new(format!("failed to query cameras: {e}")))?;

    Ok(cameras
        .iter()
        .enumerate()
        .map(|(i, cam)| DeviceInfo {
            index: match cam.index() {
                CameraIndex::Index(n) => *n,
                CameraIndex::String(_) => i as u32,
            },
            name: cam.human_name(),
            description: cam.description().to_string(),
        })
        .collect())
}
