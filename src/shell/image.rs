//! Reverse-image search workflow

use tracing::debug;

use super::calls::{ImageCall, Pending};
use super::slot::{ChannelState, Completion};
use crate::gateway::{RequestGateway, UploadFile};
use crate::normalize::ImageResult;
use crate::shared::{DetectError, Notice};

pub struct ImageWorkflow {
    file: Option<UploadFile>,
    channel: ChannelState<ImageResult>,
}

impl Default for ImageWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWorkflow {
    pub fn new() -> Self {
        Self {
            file: None,
            channel: ChannelState::new("image", "Image search failed. Try again."),
        }
    }

    /// Pick the file to search; `None` clears the selection
    pub fn select_file(&mut self, file: Option<UploadFile>) {
        self.file = file;
    }

    pub fn result(&self) -> Option<&ImageResult> {
        self.channel.result()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.channel.notice()
    }

    pub fn is_busy(&self) -> bool {
        self.channel.is_busy()
    }

    pub fn prepare(&mut self) -> Option<Pending<ImageCall>> {
        let Some(file) = self.file.as_ref() else {
            self.channel
                .reject(&DetectError::validation("Please choose an image first"));
            return None;
        };
        if !file.is_image() {
            debug!("Rejecting {} ({})", file.name, file.media_type);
            self.channel
                .reject(&DetectError::validation("Only image files can be searched"));
            return None;
        }

        let ticket = self.channel.begin()?;
        Some(Pending::new(ticket, ImageCall(Some(file.clone()))))
    }

    pub fn apply(&mut self, completion: Completion<ImageResult>) -> bool {
        self.channel.apply(completion)
    }

    /// Abandon the pending search, its response will be dropped
    pub fn cancel(&mut self) {
        self.channel.invalidate();
    }

    pub async fn submit(&mut self, gateway: &RequestGateway) {
        if let Some(pending) = self.prepare() {
            let completion = pending.run(gateway).await;
            self.apply(completion);
        }
    }
}
