//! Camera Capture Layer
//!
//! Owns the device stream used for document scanning and turns one frame
//! into a still image per capture cycle. Devices are injected through
//! [`CameraDevice`] so the state machine runs the same against real
//! hardware, a still-image source, or a test fake.

pub mod artifact;
pub mod file_camera;
pub mod frame;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CaptureSettings;
use crate::gateway::UploadFile;
use crate::shared::DetectError;

pub use artifact::{CapturedArtifact, ObjectUrlRegistry};
pub use file_camera::ImageFileCamera;
pub use frame::CapturedFrame;

/// Device access failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("camera access was refused")]
    PermissionDenied,

    #[error("no capture device: {0}")]
    Unavailable(String),
}

/// A camera that can be opened into a live stream
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Display name for logs
    fn name(&self) -> &str;

    /// Request access and open a live stream
    async fn open(&self) -> Result<Box<dyn MediaStream>, DeviceError>;
}

/// A live device stream
pub trait MediaStream: Send {
    /// Current frame at the source's native resolution
    fn read_frame(&mut self) -> Option<CapturedFrame>;

    /// Stop every track; the stream is unusable afterwards
    fn stop(&mut self);
}

/// Capture session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    RequestingPermission,
    Active,
    Captured,
    Scanning,
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "Idle",
            CaptureState::RequestingPermission => "RequestingPermission",
            CaptureState::Active => "Active",
            CaptureState::Captured => "Captured",
            CaptureState::Scanning => "Scanning",
        }
    }
}

/// Camera lifecycle state machine.
///
/// A live stream is held only while `Active`; at most one captured still
/// (and so one live object reference) exists at a time.
pub struct CaptureController {
    device: Box<dyn CameraDevice>,
    settings: CaptureSettings,
    registry: ObjectUrlRegistry,
    state: CaptureState,
    stream: Option<Box<dyn MediaStream>>,
    artifact: Option<CapturedArtifact>,
}

impl CaptureController {
    /// Create a controller for `device`
    pub fn new(device: Box<dyn CameraDevice>, settings: CaptureSettings) -> Self {
        Self {
            device,
            settings,
            registry: ObjectUrlRegistry::new(),
            state: CaptureState::Idle,
            stream: None,
            artifact: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// The stored still, if a capture cycle completed
    pub fn artifact(&self) -> Option<&CapturedArtifact> {
        self.artifact.as_ref()
    }

    /// Whether a live device stream is held
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Request device access and go live.
    ///
    /// Only acts from `Idle`; on failure the controller stays `Idle`.
    pub async fn start(&mut self) -> Result<(), DetectError> {
        if self.state != CaptureState::Idle {
            debug!("Ignoring camera start in state {}", self.state.name());
            return Ok(());
        }

        self.state = CaptureState::RequestingPermission;
        info!("Requesting access to camera '{}'", self.device.name());

        match self.device.open().await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = CaptureState::Active;
                info!("Camera '{}' is live", self.device.name());
                Ok(())
            }
            Err(e) => {
                self.state = CaptureState::Idle;
                warn!("Unable to access camera '{}': {}", self.device.name(), e);
                Err(e.into())
            }
        }
    }

    /// Release the stream and any captured still. Valid from any state.
    pub fn stop(&mut self) {
        let had_resources = self.is_streaming() || self.artifact.is_some();
        self.release_stream();
        self.artifact = None;
        self.state = CaptureState::Idle;
        if had_resources {
            info!("Camera stopped");
        }
    }

    /// Grab the current frame as a still and release the device.
    ///
    /// Returns `false` without changing state outside `Active`, or when no
    /// frame could be read or encoded.
    pub async fn capture(&mut self) -> bool {
        if self.state != CaptureState::Active {
            debug!("Ignoring capture in state {}", self.state.name());
            return false;
        }

        let Some(frame) = self.stream.as_mut().and_then(|s| s.read_frame()) else {
            warn!("Camera produced no frame");
            return false;
        };

        debug!("Frame age {:?}", frame.timestamp.elapsed());
        let dimensions = frame.dimensions();
        let quality = self.settings.jpeg_quality;
        let encoded = tokio::task::spawn_blocking(move || frame.encode_jpeg(quality)).await;
        let bytes = match encoded {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                warn!("Failed to encode captured frame: {}", e);
                return false;
            }
            Err(e) => {
                warn!("Frame encoder task failed: {}", e);
                return false;
            }
        };

        let file = UploadFile::new(self.settings.file_name.clone(), self.settings.media_type.clone(), bytes);

        // Revoke the previous reference before minting the next one
        self.artifact = None;
        let url = self.registry.mint(&file);
        info!(
            "Captured {}x{} still ({} bytes) as {}",
            dimensions.0,
            dimensions.1,
            file.bytes.len(),
            url.href()
        );
        self.artifact = Some(CapturedArtifact { file, url, dimensions });

        self.release_stream();
        self.state = CaptureState::Captured;
        true
    }

    /// Discard the still and go live again. Only acts from `Captured`.
    pub async fn retake(&mut self) -> Result<(), DetectError> {
        if self.state != CaptureState::Captured {
            debug!("Ignoring retake in state {}", self.state.name());
            return Ok(());
        }

        self.artifact = None;
        self.state = CaptureState::Idle;
        self.start().await
    }

    /// Enter `Scanning` and hand out a copy of the still for upload
    pub fn begin_scan(&mut self) -> Option<UploadFile> {
        if self.state != CaptureState::Captured {
            return None;
        }
        let file = self.artifact.as_ref()?.file.clone();
        self.state = CaptureState::Scanning;
        Some(file)
    }

    /// Leave `Scanning`, keeping the still
    pub fn finish_scan(&mut self) {
        if self.state == CaptureState::Scanning {
            self.state = CaptureState::Captured;
        }
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Released stream for camera '{}'", self.device.name());
        }
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.stop();
        debug!(live = self.registry.live_count(), "Capture controller released");
    }
}
