use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::capture::{CaptureDevice, DeviceOpener};
use crate::error::DeviceError;
use crate::frame::Frame;

/// Back-off after a failed read on the worker, so a dead device does not spin.
const READ_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Single-slot mailbox: a newer read overwrites an unclaimed older one.
struct LatestSlot {
    value: Mutex<Option<Result<Frame, DeviceError>>>,
    ready: Condvar,
}

impl LatestSlot {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn publish(&self, read: Result<Frame, DeviceError>) {
        *self.value.lock() = Some(read);
        self.ready.notify_one();
    }

    fn take(&self, timeout: Duration) -> Option<Result<Frame, DeviceError>> {
        let mut guard = self.value.lock();
        if guard.is_none() {
            let _ = self.ready.wait_for(&mut guard, timeout);
        }
        guard.take()
    }
}

/// Capture device whose reads happen on a dedicated worker thread.
///
/// The worker owns the real device and keeps only the newest frame.
/// `read_frame` hands out that frame, waiting at most `timeout` for one to
/// arrive, so a slow device never stalls the caller for longer than that.
pub struct ThreadedCapture {
    name: String,
    slot: Arc<LatestSlot>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    timeout: Duration,
}

impl ThreadedCapture {
    /// Spawn the worker and open the device on it.
    ///
    /// Blocks until `open` has returned; an open failure is passed through
    /// and the worker exits.
    pub fn spawn<F>(open: F, timeout: Duration) -> Result<Self, DeviceError>
    where
        F: FnOnce() -> Result<Box<dyn CaptureDevice>, DeviceError> + Send + 'static,
    {
        let slot = Arc::new(LatestSlot::new());
        let stop = Arc::new(AtomicBool::new(false));
        let (opened_tx, opened_rx) = mpsc::channel::<Result<String, DeviceError>>();

        let worker_slot = Arc::clone(&slot);
        let worker_stop = Arc::clone(&stop);
        let worker = std::thread::Builder::new()
            .name("filterscope-capture".into())
            .spawn(move || {
                let mut device = match open() {
                    Ok(d) => d,
                    Err(e) => {
                        let _ = opened_tx.send(Err(e));
                        return;
                    }
                };
                let _ = opened_tx.send(Ok(device.name()));
                capture_loop(device.as_mut(), &worker_slot, &worker_stop);
                device.release();
                debug!("Capture worker released device");
            })
            .map_err(|e| DeviceError::new(format!("failed to spawn capture thread: {e}")))?;

        let name = match opened_rx.recv() {
            Ok(Ok(name)) => name,
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(DeviceError::new("capture thread exited before opening the device"));
            }
        };

        Ok(Self {
            name,
            slot,
            stop,
            worker: Some(worker),
            timeout,
        })
    }

    fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        if worker.join().is_err() {
            warn!(device = %self.name, "Capture worker panicked");
        }
    }
}

fn capture_loop(device: &mut dyn CaptureDevice, slot: &LatestSlot, stop: &AtomicBool) {
    while !stop.load(Ordering::Acquire) {
        let read = device.read_frame();
        let failed = read.is_err();
        slot.publish(read);
        if failed {
            std::thread::sleep(READ_RETRY_DELAY);
        }
    }
}

impl CaptureDevice for ThreadedCapture {
    fn name(&self) -> String {
        format!("{} [threaded]", self.name)
    }

    fn read_frame(&mut self) -> Result<Frame, DeviceError> {
        if self.worker.is_none() {
            return Err(DeviceError::new("capture worker stopped"));
        }
        match self.slot.take(self.timeout) {
            Some(read) => read,
            None => Err(DeviceError::new(format!(
                "no frame within {} ms",
                self.timeout.as_millis()
            ))),
        }
    }

    fn release(&mut self) {
        self.shutdown();
    }
}

impl Drop for ThreadedCapture {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Wraps another opener so every device it opens runs on its own worker.
#[derive(Clone, Debug)]
pub struct ThreadedOpener<O> {
    inner: O,
    timeout: Duration,
}

impl<O> ThreadedOpener<O> {
    pub fn new(inner: O, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<O> DeviceOpener for ThreadedOpener<O>
where
    O: DeviceOpener + Clone + Send + 'static,
{
    fn open(&mut self, index: u32) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        let mut inner = self.inner.clone();
        let capture = ThreadedCapture::spawn(move || inner.open(index), self.timeout)?;
        Ok(Box::new(capture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ColorLayout;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    struct Counter {
        reads: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl CaptureDevice for Counter {
        fn name(&self) -> String {
            "counter".into()
        }

        fn read_frame(&mut self) -> Result<Frame, DeviceError> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(1));
            Frame::filled(2, 2, ColorLayout::Gray, &[n.min(255) as u8])
                .map_err(|e| DeviceError::new(e.to_string()))
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn delivers_frames_and_releases_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let (r, rel) = (Arc::clone(&reads), Arc::clone(&released));

        let mut capture = ThreadedCapture::spawn(
            move || {
                Ok(Box::new(Counter {
                    reads: r,
                    released: rel,
                }) as Box<dyn CaptureDevice>)
            },
            Duration::from_secs(2),
        )
        .unwrap();

        let frame = capture.read_frame().unwrap();
        assert_eq!(frame.width(), 2);

        capture.release();
        drop(capture);
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(reads.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn open_failure_is_reported() {
        let result = ThreadedCapture::spawn(
            || Err(DeviceError::new("busy")),
            Duration::from_millis(50),
        );
        assert_eq!(result.err(), Some(DeviceError::new("busy")));
    }

    /// Takes far longer per read than any test is willing to wait.
    struct Stalled;

    impl CaptureDevice for Stalled {
        fn name(&self) -> String {
            "stalled".into()
        }

        fn read_frame(&mut self) -> Result<Frame, DeviceError> {
            std::thread::sleep(Duration::from_millis(300));
            Err(DeviceError::new("stalled"))
        }
    }

    #[test]
    fn newest_read_wins() {
        let reads = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let (r, rel) = (Arc::clone(&reads), Arc::clone(&released));

        let mut capture = ThreadedCapture::spawn(
            move || {
                Ok(Box::new(Counter {
                    reads: r,
                    released: rel,
                }) as Box<dyn CaptureDevice>)
            },
            Duration::from_secs(2),
        )
        .unwrap();

        std::thread::sleep(Duration::from_millis(60));
        let started = reads.load(Ordering::SeqCst);
        let value = capture.read_frame().unwrap().pixel(0, 0, 0) as usize;

        assert!(started > 2, "worker only read {started} frames");
        // Read `started - 1` may still be in flight; `started - 2` has landed.
        assert!(
            value + 2 >= started.min(255),
            "got frame {value} after {started} reads"
        );
    }

    #[test]
    fn read_times_out_without_frame() {
        let timeout = Duration::from_millis(20);
        let mut capture = ThreadedCapture::spawn(
            || Ok(Box::new(Stalled) as Box<dyn CaptureDevice>),
            timeout,
        )
        .unwrap();

        let start = Instant::now();
        let err = capture.read_frame().unwrap_err();
        let waited = start.elapsed();

        assert!(err.0.contains("no frame within 20 ms"), "{err}");
        assert!(waited >= timeout);
        assert!(waited < Duration::from_millis(250), "waited {waited:?}");
    }
}
