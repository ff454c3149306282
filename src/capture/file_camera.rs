//! Frame source backed by a still image on disk
//!
//! Stands in for a live camera on machines without one: "opening" decodes
//! the image and every frame read returns it at its native resolution.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use image::ImageError;
use tracing::debug;

use super::{CameraDevice, CapturedFrame, DeviceError, MediaStream};

/// Camera that streams a single decoded image
#[derive(Debug, Clone)]
pub struct ImageFileCamera {
    path: PathBuf,
    name: String,
}

impl ImageFileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl CameraDevice for ImageFileCamera {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self) -> Result<Box<dyn MediaStream>, DeviceError> {
        let path = self.path.clone();
        let decoded = tokio::task::spawn_blocking(move || image::open(path))
            .await
            .map_err(|e| DeviceError::Unavailable(e.to_string()))?;

        let rgba = match decoded {
            Ok(img) => img.to_rgba8(),
            Err(ImageError::IoError(e)) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(DeviceError::PermissionDenied);
            }
            Err(e) => return Err(DeviceError::Unavailable(e.to_string())),
        };

        let (width, height) = rgba.dimensions();
        debug!("Frame source {} opened at {}x{}", self.name, width, height);
        Ok(Box::new(StillStream {
            frame: Some(CapturedFrame::new(rgba.into_raw(), width, height)),
        }))
    }
}

struct StillStream {
    frame: Option<CapturedFrame>,
}

impl MediaStream for StillStream {
    fn read_frame(&mut self) -> Option<CapturedFrame> {
        self.frame.as_ref().map(|f| CapturedFrame::new(f.data.clone(), f.width, f.height))
    }

    fn stop(&mut self) {
        self.frame = None;
    }
}
