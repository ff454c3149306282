//! User-facing notices produced by workflows

use super::error::DetectError;

/// How a notice should be surfaced by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Shown next to the input that caused it, blocks the action locally
    Inline,
    /// Shown once (alert style), the capture state stays idle
    OneShot,
    /// Generic failure that invites the user to try again
    Retry,
    /// A submit was ignored because a request is already pending
    Busy,
}

/// A message for the user, attached to a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Surface to use
    pub kind: NoticeKind,
    /// Text to display
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Notice for a submit that arrived while the channel was busy
    pub fn busy() -> Self {
        Self::new(NoticeKind::Busy, "A request is already in progress")
    }

    /// Map an error to its notice, using `retry_text` for remote failures
    /// that carry no backend message of their own.
    pub fn from_error(err: &DetectError, retry_text: &str) -> Self {
        match err {
            DetectError::Validation(message) => Self::new(NoticeKind::Inline, message.clone()),
            DetectError::PermissionDenied | DetectError::DeviceUnavailable => Self::new(
                NoticeKind::OneShot,
                "Unable to access camera. Check permissions and that a camera is connected.",
            ),
            DetectError::UnsupportedCapability(what) => Self::new(
                NoticeKind::OneShot,
                format!("{} not supported on this platform", capitalize(what)),
            ),
            DetectError::Network(_) => Self::new(NoticeKind::Retry, retry_text),
            DetectError::Backend { .. } => Self::new(
                NoticeKind::Retry,
                err.backend_message().unwrap_or_else(|| retry_text.to_string()),
            ),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
