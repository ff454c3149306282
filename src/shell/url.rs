//! Article URL analysis workflow
//!
//! The warning banner combines two independent signals read straight from
//! the normalized record: an explicit failed source verification, or a
//! model prediction of "fake". Neither an unknown verification status nor
//! a missing prediction raises it.

use tracing::debug;

use super::calls::{Pending, UrlCall};
use super::slot::{ChannelState, Completion};
use crate::gateway::RequestGateway;
use crate::normalize::{format_prediction, UrlResult};
use crate::shared::{DetectError, Notice};

/// Whether the analysed article deserves a warning
pub fn url_warning(result: &UrlResult) -> bool {
    result.source_verified == Some(false) || result.model_label() == "fake"
}

pub struct UrlWorkflow {
    url: String,
    channel: ChannelState<UrlResult>,
}

impl Default for UrlWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlWorkflow {
    pub fn new() -> Self {
        Self {
            url: String::new(),
            channel: ChannelState::new("url", "Failed to analyze the URL. Try again."),
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn result(&self) -> Option<&UrlResult> {
        self.channel.result()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.channel.notice()
    }

    pub fn is_busy(&self) -> bool {
        self.channel.is_busy()
    }

    /// Warning banner state for the current result
    pub fn warning(&self) -> bool {
        self.result().is_some_and(url_warning)
    }

    /// `Fake`, `Authentic` or `N/A` for the current result
    pub fn prediction_label(&self) -> &'static str {
        format_prediction(self.result().and_then(|r| r.model_prediction.as_ref()))
    }

    pub fn prepare(&mut self) -> Option<Pending<UrlCall>> {
        let url = self.url.trim();
        if url.is_empty() {
            debug!("URL submit blocked: empty input");
            self.channel
                .reject(&DetectError::validation("Please enter a valid news URL"));
            return None;
        }
        let url = url.to_string();
        let ticket = self.channel.begin()?;
        Some(Pending::new(ticket, UrlCall(url)))
    }

    pub fn apply(&mut self, completion: Completion<UrlResult>) -> bool {
        self.channel.apply(completion)
    }

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
