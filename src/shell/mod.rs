//! Orchestration Shell
//!
//! One workflow per detection channel plus the news feed. Each workflow
//! keeps its own input, last result and user notice, and follows the same
//! three steps:
//!
//! 1. `prepare` validates input and takes a ticket from the channel's
//!    request slot (a second submit while one is pending is refused)
//! 2. [`calls::Pending::run`] performs the gateway call and normalization
//! 3. `apply` installs the outcome if the ticket is still current
//!
//! `submit` chains all three for callers that simply await the result.

pub mod calls;
pub mod image;
pub mod news;
pub mod ocr;
pub mod slot;
pub mod text;
pub mod url;

pub use image::ImageWorkflow;
pub use news::NewsFeed;
pub use ocr::OcrWorkflow;
pub use text::TextWorkflow;
pub use url::UrlWorkflow;
