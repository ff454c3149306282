//! Camera-to-OCR workflow
//!
//! Owns the capture controller. A predict moves the controller through
//! `Scanning` and back to `Captured`; retaking or stopping the camera
//! abandons any prediction still in flight.

use tracing::debug;

use super::calls::{OcrCall, Pending};
use super::slot::{ChannelState, Completion};
use crate::capture::{CaptureController, CaptureState};
use crate::gateway::RequestGateway;
use crate::normalize::OcrResult;
use crate::shared::{DetectError, Notice};

pub struct OcrWorkflow {
    camera: CaptureController,
    channel: ChannelState<OcrResult>,
}

impl OcrWorkflow {
    pub fn new(camera: CaptureController) -> Self {
        Self {
            camera,
            channel: ChannelState::new("ocr", "Prediction failed"),
        }
    }

    pub fn camera(&self) -> &CaptureController {
        &self.camera
    }

    pub fn result(&self) -> Option<&OcrResult> {
        self.channel.result()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.channel.notice()
    }

    pub fn is_busy(&self) -> bool {
        self.channel.is_busy()
    }

    pub async fn start_camera(&mut self) {
        if let Err(e) = self.camera.start().await {
            self.channel.reject(&e);
        }
    }

    pub fn stop_camera(&mut self) {
        self.channel.invalidate();
        self.camera.stop();
    }

    pub async fn capture(&mut self) -> bool {
        self.camera.capture().await
    }

    /// Drop the still and its result, then go live again
    pub async fn retake(&mut self) {
        self.recover_abandoned_scan();
        if self.camera.state() != CaptureState::Captured {
            debug!("Ignoring retake in state {}", self.camera.state().name());
            return;
        }
        self.channel.invalidate();
        self.channel.clear_result();
        if let Err(e) = self.camera.retake().await {
            self.channel.reject(&e);
        }
    }

    pub fn prepare(&mut self) -> Option<Pending<OcrCall>> {
        self.recover_abandoned_scan();
        let ticket = self.channel.begin()?;
        let Some(file) = self.camera.begin_scan() else {
            self.channel.invalidate();
            self.channel
                .reject(&DetectError::validation("Capture an image before predicting"));
            return None;
        };
        Some(Pending::new(ticket, OcrCall(file)))
    }

    pub fn apply(&mut self, completion: Completion<OcrResult>) -> bool {
        let current = self.channel.apply(completion);
        if current {
            self.camera.finish_scan();
        }
        current
    }

    /// Abandon the pending prediction and keep the still
    pub fn cancel(&mut self) {
        self.channel.invalidate();
        self.camera.finish_scan();
    }

    /// A scan whose request was dropped unapplied leaves the camera in
    /// `Scanning` with a free slot
    fn recover_abandoned_scan(&mut self) {
        if self.camera.state() == CaptureState::Scanning && !self.channel.is_busy() {
            debug!("Recovering from an abandoned scan");
            self.camera.finish_scan();
        }
    }

    pub async fn submit(&mut self, gateway: &RequestGateway) {
        if let Some(pending) = self.prepare() {
            let completion = pending.run(gateway).await;
            self.apply(completion);
        }
    }
}
