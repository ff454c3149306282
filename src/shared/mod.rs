//! Shared error taxonomy and user notices
//!
//! Every workflow reports failures as a [`DetectError`] and surfaces them
//! to presentation as a [`Notice`].

pub mod error;
pub mod messages;

pub use error::DetectError;
pub use messages::{Notice, NoticeKind};
