#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{Rgb, RgbImage};

use filterscope_core::capture::{CaptureDevice, DeviceOpener};
use filterscope_core::error::DeviceError;
use filterscope_core::frame::{ColorLayout, Frame};
use filterscope_core::pipeline::StatusEvent;

/// Shared counters for a fake capture device.
///
/// Clones observe the same counts, so a test can keep one copy while the
/// opener and its devices move into the scheduler.
#[derive(Clone, Default)]
pub struct DeviceLog {
    opens: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
    fail_reads: Arc<AtomicBool>,
    read_delay_ms: Arc<AtomicU64>,
}

impl DeviceLog {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every following read fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
    }

    /// Make every following read block for `ms` first.
    pub fn set_read_delay(&self, ms: u64) {
        self.read_delay_ms.store(ms, Ordering::SeqCst);
    }
}

/// A 4x3 RGB device whose frames are filled with the read count.
pub struct FakeCamera {
    log: DeviceLog,
}

impl CaptureDevice for FakeCamera {
    fn name(&self) -> String {
        "fake camera".into()
    }

    fn read_frame(&mut self) -> Result<Frame, DeviceError> {
        let delay = self.log.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        let n = self.log.reads.fetch_add(1, Ordering::SeqCst);
        if self.log.fail_reads.load(Ordering::SeqCst) {
            return Err(DeviceError::new("no signal"));
        }
        let v = (n % 256) as u8;
        Frame::filled(4, 3, ColorLayout::Rgb, &[v, v, v]).map_err(|e| DeviceError::new(e.to_string()))
    }

    fn release(&mut self) {
        self.log.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Opens [`FakeCamera`]s, or refuses to when `refuse` is set.
#[derive(Clone, Default)]
pub struct FakeOpener {
    pub log: DeviceLog,
    pub refuse: bool,
}

impl FakeOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }
}

impl DeviceOpener for FakeOpener {
    fn open(&mut self, index: u32) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        if self.refuse {
            return Err(DeviceError::new(format!("device {index} is busy")));
        }
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeCamera {
            log: self.log.clone(),
        }))
    }
}

/// A status sink that records every event, plus a handle to read them back.
pub fn recording_sink() -> (impl Fn(&StatusEvent) + 'static, Rc<RefCell<Vec<StatusEvent>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let writer = Rc::clone(&events);
    let sink = move |event: &StatusEvent| writer.borrow_mut().push(event.clone());
    (sink, events)
}

/// Write an RGB PNG whose pixels come from `pixel(x, y)`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    let img = RgbImage::from_fn(width, height, |x, y| Rgb(pixel(x, y)));
    img.save(&path).expect("write test PNG");
    path
}

/// Write a file with a `.png` name that is not an image.
pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"definitely not a png").expect("write garbage file");
    path
}

pub fn gray_frame(width: usize, height: usize, value: u8) -> Frame {
    Frame::filled(width, height, ColorLayout::Gray, &[value]).expect("gray frame")
}

pub fn rgb_frame(width: usize, height: usize, value: [u8; 3]) -> Frame {
    Frame::filled(width, height, ColorLayout::Rgb, &value).expect("rgb frame")
}

/// Gray frame whose left half is 0 and right half is 255.
pub fn step_frame(width: usize, height: usize) -> Frame {
    let pixels = (0..height)
        .flat_map(|_| (0..width).map(move |x| if x < width / 2 { 0 } else { 255 }))
        .collect();
    Frame::from_raw(width, height, ColorLayout::Gray, pixels).expect("step frame")
}
