//! Per-channel in-flight guard
//!
//! A channel accepts one request at a time. Each accepted request gets a
//! ticket stamped with a generation; only the ticket of the current
//! generation may install its response, so a reply that arrives after a
//! cancel or reset is dropped on arrival.
//!
//! The slot only holds a weak handle on the outstanding ticket. Dropping a
//! request before its outcome is applied (a timeout, an interrupted event
//! loop) frees the channel again.

use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use crate::shared::{DetectError, Notice};

/// Proof that a request was accepted, keeps the channel busy while alive
#[derive(Debug)]
pub struct Ticket {
    generation: u64,
    _held: Arc<()>,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Busy token plus generation counter
#[derive(Debug, Default)]
pub struct RequestSlot {
    generation: u64,
    pending: Option<(u64, Weak<()>)>,
}

impl RequestSlot {
    /// Accept a new request, or `None` while one is pending
    pub fn try_begin(&mut self) -> Option<Ticket> {
        if self.is_busy() {
            return None;
        }
        if let Some((generation, _)) = self.pending.take() {
            debug!(generation, "Releasing slot held by an abandoned request");
        }
        self.generation += 1;
        let held = Arc::new(());
        self.pending = Some((self.generation, Arc::downgrade(&held)));
        Some(Ticket {
            generation: self.generation,
            _held: held,
        })
    }

    /// Settle `ticket`; returns whether it was still current
    pub fn complete(&mut self, ticket: &Ticket) -> bool {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|(generation, _)| *generation == ticket.generation);
        if current {
            self.pending = None;
        }
        current
    }

    /// Forget the pending request; its response will be discarded
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    /// Whether a live request holds the slot
    pub fn is_busy(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|(_, held)| held.strong_count() > 0)
    }
}

/// The outcome of a request, tagged with the ticket that issued it
#[derive(Debug)]
pub struct Completion<R> {
    pub ticket: Ticket,
    pub outcome: Result<R, DetectError>,
}

/// Result, notice and in-flight state of one channel
#[derive(Debug)]
pub struct ChannelState<R> {
    name: &'static str,
    retry_text: &'static str,
    slot: RequestSlot,
    result: Option<R>,
    notice: Option<Notice>,
}

impl<R> ChannelState<R> {
    pub fn new(name: &'static str, retry_text: &'static str) -> Self {
        Self {
            name,
            retry_text,
            slot: RequestSlot::default(),
            result: None,
            notice: None,
        }
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Take a ticket, or post a busy notice and return `None`
    pub fn begin(&mut self) -> Option<Ticket> {
        match self.slot.try_begin() {
            Some(ticket) => {
                self.notice = None;
                debug!(channel = self.name, generation = ticket.generation(), "Request accepted");
                Some(ticket)
            }
            None => {
                debug!(channel = self.name, "Ignoring submit while a request is pending");
                self.notice = Some(Notice::busy());
                None
            }
        }
    }

    /// Surface an error without touching the current result
    pub fn reject(&mut self, err: &DetectError) {
        self.notice = Some(Notice::from_error(err, self.retry_text));
    }

    /// Install a completion if its ticket is still current
    pub fn apply(&mut self, completion: Completion<R>) -> bool {
        let generation = completion.ticket.generation();
        if !self.slot.complete(&completion.ticket) {
            debug!(channel = self.name, generation, "Discarding superseded response");
            return false;
        }

        match completion.outcome {
            Ok(result) => {
                self.result = Some(result);
                self.notice = None;
            }
            Err(e) => {
                if e.is_local() {
                    debug!(channel = self.name, generation, "Request rejected: {}", e);
                } else {
                    warn!(channel = self.name, generation, "Request failed: {}", e);
                }
                self.reject(&e);
            }
        }
        true
    }

    /// Drop any pending request
    pub fn invalidate(&mut self) {
        self.slot.invalidate();
    }

    pub fn clear_result(&mut self) {
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::NoticeKind;

    #[test]
    fn test_slot_rejects_while_busy() {
        let mut slot = RequestSlot::default();
        let ticket = slot.try_begin().unwrap();
        assert!(slot.is_busy());
        assert!(slot.try_begin().is_none());

        assert!(slot.complete(&ticket));
        assert!(!slot.is_busy());
        assert!(slot.try_begin().is_some());
    }

    #[test]
    fn test_invalidated_ticket_is_stale() {
        let mut slot = RequestSlot::default();
        let stale = slot.try_begin().unwrap();
        slot.invalidate();
        let fresh = slot.try_begin().unwrap();

        assert_ne!(stale.generation(), fresh.generation());
        assert!(!slot.complete(&stale));
        assert!(slot.is_busy());
        assert!(slot.complete(&fresh));
    }

    #[test]
    fn test_ticket_completes_once() {
        let mut slot = RequestSlot::default();
        let ticket = slot.try_begin().unwrap();
        assert!(slot.complete(&ticket));
        assert!(!slot.complete(&ticket));
    }

    #[test]
    fn test_dropped_ticket_frees_slot() {
        let mut slot = RequestSlot::default();
        let abandoned = slot.try_begin().unwrap();
        assert!(slot.is_busy());

        drop(abandoned);
        assert!(!slot.is_busy());
        let next = slot.try_begin().unwrap();
        assert_eq!(next.generation(), 2);
        assert!(slot.complete(&next));
    }

    #[test]
    fn test_failure_preserves_previous_result() {
        let mut state: ChannelState<u32> = ChannelState::new("test", "Try again");
        let ticket = state.begin().unwrap();
        state.apply(Completion { ticket, outcome: Ok(7) });

        let ticket = state.begin().unwrap();
        state.apply(Completion {
            ticket,
            outcome: Err(DetectError::Network("reset".into())),
        });
        assert_eq!(state.result(), Some(&7));
        assert_eq!(state.notice().unwrap().kind, NoticeKind::Retry);
        assert_eq!(state.notice().unwrap().message, "Try again");
    }

    #[test]
    fn test_busy_submit_posts_notice() {
        let mut state: ChannelState<u32> = ChannelState::new("test", "Try again");
        let _ticket = state.begin().unwrap();
        assert!(state.begin().is_none());
        assert_eq!(state.notice().unwrap().kind, NoticeKind::Busy);
    }

    #[test]
    fn test_superseded_completion_is_discarded() {
        let mut state: ChannelState<u32> = ChannelState::new("test", "Try again");
        let ticket = state.begin().unwrap();
        state.invalidate();
        assert!(!state.apply(Completion { ticket, outcome: Ok(1) }));
        assert!(state.result().is_none());
        assert!(!state.is_busy());
    }
}
