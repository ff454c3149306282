//! Error taxonomy shared by every workflow

use crate::capture::DeviceError;

/// Failures a workflow can report back to the user.
///
/// Malformed backend payloads never surface here; they degrade to
/// placeholders inside the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    #[error("camera access was refused")]
    PermissionDenied,

    #[error("no capture device available")]
    DeviceUnavailable,

    #[error("{0} is not supported on this platform")]
    UnsupportedCapability(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("backend returned status {status}")]
    Backend { status: u16, body: Option<String> },
}

impl DetectError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error was raised before anything reached the network
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Network(_) | Self::Backend { .. })
    }

    /// The backend's own `error` message, if the failure body carried one
    pub fn backend_message(&self) -> Option<String> {
        let Self::Backend { body: Some(body), .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value
            .get("error")
            .and_then(|e| e.as_str())
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

impl From<DeviceError> for DetectError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::PermissionDenied => Self::PermissionDenied,
            DeviceError::Unavailable(_) => Self::DeviceUnavailable,
        }
    }
}
