//! In-memory camera used by tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{CameraDevice, CapturedFrame, DeviceError, MediaStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCameraMode {
    /// Access granted, frames available
    Grant,
    /// Access refused
    Deny,
    /// No device present
    Missing,
    /// Access granted but the stream never yields a frame
    NoFrames,
}

/// Camera that counts opens and track stops
#[derive(Debug, Clone)]
pub struct FakeCamera {
    mode: FakeCameraMode,
    opened: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn new(mode: FakeCameraMode) -> Self {
        Self {
            mode,
            opened: Arc::new(AtomicUsize::new(0)),
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    fn name(&self) -> &str {
        "fake"
    }

    async fn open(&self) -> Result<Box<dyn MediaStream>, DeviceError> {
        match self.mode {
            FakeCameraMode::Deny => Err(DeviceError::PermissionDenied),
            FakeCameraMode::Missing => Err(DeviceError::Unavailable("no camera attached".into())),
            FakeCameraMode::Grant | FakeCameraMode::NoFrames => {
                self.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(FakeStream {
                    frames: self.mode == FakeCameraMode::Grant,
                    stopped: self.stopped.clone(),
                }))
            }
        }
    }
}

struct FakeStream {
    frames: bool,
    stopped: Arc<AtomicUsize>,
}

impl MediaStream for FakeStream {
    fn read_frame(&mut self) -> Option<CapturedFrame> {
        self.frames
            .then(|| CapturedFrame::new([10u8, 120, 30, 255].repeat(32 * 24), 32, 24))
    }

    fn stop(&mut self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}
