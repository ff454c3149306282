//! Voice dictation for the text channel
//!
//! Speech recognition is a platform capability injected through
//! [`SpeechRecognizer`]. Listening is single-shot: one utterance, one
//! callback, then back to idle.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Recognition failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("speech recognition is not available")]
    Unsupported,

    #[error("recognition failed: {0}")]
    Failed(String),
}

/// Platform speech-to-text capability
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Capability probe, no side effects
    fn is_supported(&self) -> bool;

    /// Listen for a single utterance.
    ///
    /// `Ok(None)` means listening ended without a recognized utterance.
    async fn recognize(&self, language: &str) -> Result<Option<String>, RecognitionError>;
}

/// Recognizer for platforms with no speech support
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

#[async_trait]
impl SpeechRecognizer for UnavailableRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    async fn recognize(&self, _language: &str) -> Result<Option<String>, RecognitionError> {
        Err(RecognitionError::Unsupported)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    #[default]
    Idle,
    Listening,
}

/// Single-shot dictation source
pub struct VoiceInputAdapter {
    recognizer: Box<dyn SpeechRecognizer>,
    language: String,
    state: VoiceState,
}

impl VoiceInputAdapter {
    pub fn new(recognizer: Box<dyn SpeechRecognizer>, language: impl Into<String>) -> Self {
        Self {
            recognizer,
            language: language.into(),
            state: VoiceState::Idle,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    #[cfg(test)]
    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Listen for one utterance and hand it to `on_result`.
    ///
    /// Fails fast when the platform lacks speech recognition. Errors while
    /// listening are returned but leave the adapter idle.
    pub async fn start_listening<F>(&mut self, on_result: F) -> Result<(), RecognitionError>
    where
        F: FnOnce(&str),
    {
        if !self.is_supported() {
            return Err(RecognitionError::Unsupported);
        }

        if self.state == VoiceState::Listening {
            debug!("Previous listen was interrupted, starting over");
        }
        self.state = VoiceState::Listening;
        debug!("Listening for speech ({})", self.language);
        let outcome = self.recognizer.recognize(&self.language).await;
        self.state = VoiceState::Idle;

        match outcome {
            Ok(Some(transcript)) => {
                info!("Recognized utterance ({} chars)", transcript.len());
                on_result(&transcript);
                Ok(())
            }
            Ok(None) => {
                debug!("Listening ended without an utterance");
                Ok(())
            }
            Err(e) => {
                warn!("Speech recognition error: {}", e);
                Err(e)
            }
        }
    }
}

/// Append a transcript to a text buffer.
///
/// The buffer is kept as typed; a non-empty buffer gets exactly one space
/// before the transcript, an empty one gets none.
pub fn append_transcript(buffer: &str, transcript: &str) -> String {
    let transcript = transcript.trim();
    if transcript.is_empty() {
        buffer.to_string()
    } else if buffer.is_empty() {
        transcript.to_string()
    } else {
        format!("{} {}", buffer, transcript)
    }
}

/// Ordered transcript fragments dictated into the text channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceBuffer {
    fragments: Vec<String>,
}

impl VoiceBuffer {
    pub fn push(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if !fragment.is_empty() {
            self.fragments.push(fragment.to_string());
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}
