//! Top headlines feed

use super::calls::{NewsCall, Pending};
use super::slot::{ChannelState, Completion};
use crate::gateway::RequestGateway;
use crate::normalize::Article;
use crate::shared::Notice;

pub struct NewsFeed {
    channel: ChannelState<Vec<Article>>,
}

impl Default for NewsFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl NewsFeed {
    pub fn new() -> Self {
        Self {
            channel: ChannelState::new("news", "Failed to fetch news. Try again."),
        }
    }

    /// Articles from the last successful refresh
    pub fn articles(&self) -> &[Article] {
        self.channel.result().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.channel.notice()
    }

    pub fn is_busy(&self) -> bool {
        self.channel.is_busy()
    }

    pub fn prepare(&mut self) -> Option<Pending<NewsCall>> {
        let ticket = self.channel.begin()?;
        Some(Pending::new(ticket, NewsCall))
    }

    pub fn apply(&mut self, completion: Completion<Vec<Article>>) -> bool {
        self.channel.apply(completion)
    }

    /// Abandon the pending refresh, keeping the current headlines
    pub fn cancel(&mut self) {
        self.channel.invalidate();
    }

    pub async fn refresh(&mut self, gateway: &RequestGateway) {
        if let Some(pending) = self.prepare() {
            let completion = pending.run(gateway).await;
            self.apply(completion);
        }
    }
}
