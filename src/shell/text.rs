//! Free-text workflow with optional dictation

use tracing::debug;

use super::calls::{Pending, TextCall};
use super::slot::{ChannelState, Completion};
use crate::gateway::RequestGateway;
use crate::normalize::TextResult;
use crate::shared::{DetectError, Notice};
use crate::voice::{append_transcript, RecognitionError, VoiceBuffer, VoiceInputAdapter};

pub struct TextWorkflow {
    text: String,
    voice: Option<VoiceInputAdapter>,
    dictated: VoiceBuffer,
    channel: ChannelState<TextResult>,
}

impl TextWorkflow {
    /// `voice` is `None` when dictation is switched off
    pub fn new(voice: Option<VoiceInputAdapter>) -> Self {
        Self {
            text: String::new(),
            voice,
            dictated: VoiceBuffer::default(),
            channel: ChannelState::new("text", "Text analysis failed. Try again."),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Utterances dictated so far, in order
    pub fn dictated(&self) -> &VoiceBuffer {
        &self.dictated
    }

    pub fn voice_supported(&self) -> bool {
        self.voice.as_ref().is_some_and(|v| v.is_supported())
    }

    pub fn result(&self) -> Option<&TextResult> {
        self.channel.result()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.channel.notice()
    }

    pub fn is_busy(&self) -> bool {
        self.channel.is_busy()
    }

    /// Listen for one utterance and append it to the text
    pub async fn dictate(&mut self) {
        let Some(voice) = self.voice.as_mut() else {
            self.channel
                .reject(&DetectError::UnsupportedCapability("speech recognition"));
            return;
        };

        let text = &mut self.text;
        let dictated = &mut self.dictated;
        let outcome = voice
            .start_listening(|transcript| {
                let joined = append_transcript(text, transcript);
                *text = joined;
                dictated.push(transcript);
            })
            .await;

        match outcome {
            Ok(()) => {}
            Err(RecognitionError::Unsupported) => {
                self.channel
                    .reject(&DetectError::UnsupportedCapability("speech recognition"));
            }
            // Non-fatal, already logged by the adapter
            Err(RecognitionError::Failed(_)) => {}
        }
    }

    /// Validate and accept a submit
    pub fn prepare(&mut self) -> Option<Pending<TextCall>> {
        if self.text.trim().is_empty() {
            debug!("Text submit blocked: empty input");
            self.channel
                .reject(&DetectError::validation("Please enter some text to analyze"));
            return None;
        }
        let ticket = self.channel.begin()?;
        Some(Pending::new(ticket, TextCall(self.text.clone())))
    }

    pub fn apply(&mut self, completion: Completion<TextResult>) -> bool {
        self.channel.apply(completion)
    }

    /// Abandon the pending analysis, its response will be dropped
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
