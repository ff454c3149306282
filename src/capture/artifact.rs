//! Captured still images and the object references that point at them
//!
//! A reference is minted when a still is stored and revoked when its
//! [`ObjectUrl`] guard is dropped, so every path that discards an artifact
//! (retake, stop, error, teardown) releases the reference with it.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::gateway::UploadFile;

/// Issues and tracks live object references
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh reference for `file`
    pub fn mint(&self, file: &UploadFile) -> ObjectUrl {
        let href = format!("blob:{}", Uuid::new_v4());
        self.live.lock().insert(href.clone());
        debug!("Minted object reference {} for {} ({} bytes)", href, file.name, file.bytes.len());
        ObjectUrl {
            href,
            registry: self.clone(),
        }
    }

    /// Whether `href` is still live
    #[cfg(test)]
    pub fn is_live(&self, href: &str) -> bool {
        self.live.lock().contains(href)
    }

    /// Number of references not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    fn revoke(&self, href: &str) {
        if self.live.lock().remove(href) {
            debug!("Revoked object reference {}", href);
        }
    }
}

/// A live object reference, revoked on drop
#[derive(Debug)]
pub struct ObjectUrl {
    href: String,
    registry: ObjectUrlRegistry,
}

impl ObjectUrl {
    pub fn href(&self) -> &str {
        &self.href
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.href);
    }
}

/// The single still produced by one capture cycle
#[derive(Debug)]
pub struct CapturedArtifact {
    /// Encoded image, ready for upload
    pub file: UploadFile,
    /// Reference used to display the still
    pub url: ObjectUrl,
    /// Native resolution of the source frame
    pub dimensions: (u32, u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> UploadFile {
        UploadFile::new("capture.jpg", "image/jpeg", vec![0xFF, 0xD8])
    }

    #[test]
    fn test_drop_revokes_reference() {
        let registry = ObjectUrlRegistry::new();
        let url = registry.mint(&file());
        let href = url.href().to_string();
        assert!(registry.is_live(&href));
        assert_eq!(registry.live_count(), 1);

        drop(url);
        assert!(!registry.is_live(&href));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_references_are_unique() {
        let registry = ObjectUrlRegistry::new();
        let a = registry.mint(&file());
        let b = registry.mint(&file());
        assert_ne!(a.href(), b.href());
        assert!(a.href().starts_with("blob:"));
    }
}
