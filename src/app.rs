//! Application Coordinator
//!
//! Wires configuration into the backend gateway and owns one workflow per
//! detection channel. Device and speech capabilities are injected so the
//! same coordinator runs against real sources or fakes.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::capture::{CameraDevice, CaptureController};
use crate::config::AppConfig;
use crate::gateway::{HttpTransport, RequestGateway, Transport};
use crate::shell::{ImageWorkflow, NewsFeed, OcrWorkflow, TextWorkflow, UrlWorkflow};
use crate::voice::{SpeechRecognizer, VoiceInputAdapter};

/// Main application coordinator
pub struct Workbench {
    gateway: RequestGateway,
    pub text: TextWorkflow,
    pub image: ImageWorkflow,
    pub ocr: OcrWorkflow,
    pub url: UrlWorkflow,
    pub news: NewsFeed,
}

impl Workbench {
    /// Build a workbench talking HTTP to the configured backend
    pub fn new(
        config: &AppConfig,
        camera: Box<dyn CameraDevice>,
        recognizer: Box<dyn SpeechRecognizer>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&config.backend)?;
        info!("Backend at {}", transport.base_url());
        Ok(Self::with_transport(config, Arc::new(transport), camera, recognizer))
    }

    /// Build a workbench over an arbitrary transport
    pub fn with_transport(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        camera: Box<dyn CameraDevice>,
        recognizer: Box<dyn SpeechRecognizer>,
    ) -> Self {
        let voice = config
            .voice
            .enabled
            .then(|| VoiceInputAdapter::new(recognizer, config.voice.language.clone()));

        let text = TextWorkflow::new(voice);
        info!(
            "Dictation {}",
            if text.voice_supported() { "available" } else { "unavailable" }
        );

        Self {
            gateway: RequestGateway::new(transport),
            text,
            image: ImageWorkflow::new(),
            ocr: OcrWorkflow::new(CaptureController::new(camera, config.capture.clone())),
            url: UrlWorkflow::new(),
            news: NewsFeed::new(),
        }
    }

    /// Abandon every pending request; late responses are dropped
    pub fn cancel_all(&mut self) {
        self.text.cancel();
        self.image.cancel();
        self.ocr.cancel();
        self.url.cancel();
        self.news.cancel();
        info!("Pending requests cancelled");
    }

    pub async fn submit_text(&mut self) {
        self.text.submit(&self.gateway).await;
    }

    pub async fn submit_image(&mut self) {
        self.image.submit(&self.gateway).await;
    }

    pub async fn predict_ocr(&mut self) {
        self.ocr.submit(&self.gateway).await;
    }

    pub async fn analyze_url(&mut self) {
        self.url.submit(&self.gateway).await;
    }

    pub async fn refresh_news(&mut self) {
        self.news.refresh(&self.gateway).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::fake::{FakeCamera, FakeCameraMode};
    use crate::capture::CaptureState;
    use crate::gateway::tests::RecordingTransport;
    use crate::gateway::{Endpoint, UploadFile};
    use crate::voice::tests::ScriptedRecognizer;
    use crate::voice::UnavailableRecognizer;
    use serde_json::json;

    fn workbench(transport: Arc<RecordingTransport>, config: &AppConfig) -> Workbench {
        Workbench::with_transport(
            config,
            transport,
            Box::new(FakeCamera::new(FakeCameraMode::Grant)),
            Box::new(ScriptedRecognizer::new(vec![Ok(Some("spoken words".into()))])),
        )
    }

    #[tokio::test]
    async fn test_channels_are_independent() {
        let transport = RecordingTransport::with_json(vec![
            json!({"result": {"prediction": "REAL"}}),
            json!({"articles": [{"title": "A", "url": "u"}]}),
        ]);
        let mut app = workbench(transport.clone(), &AppConfig::default());

        app.text.set_text("Sky is blue");
        app.submit_text().await;
        app.refresh_news().await;
        app.analyze_url().await;

        assert_eq!(app.text.result().unwrap().prediction, "REAL");
        assert_eq!(app.news.articles().len(), 1);
        assert!(app.url.result().is_none());
        assert!(app.url.notice().is_some());
        assert!(app.image.notice().is_none());

        let endpoints: Vec<Endpoint> = transport.requests.lock().iter().map(|r| r.endpoint).collect();
        assert_eq!(endpoints, [Endpoint::DetectText, Endpoint::TopNews]);
    }

    #[tokio::test]
    async fn test_full_ocr_cycle() {
        let transport = RecordingTransport::with_json(vec![json!({
            "ocr_text": "Headline",
            "classification": "Uncertain: text too short"
        })]);
        let mut app = workbench(transport.clone(), &AppConfig::default());

        app.ocr.start_camera().await;
        assert!(app.ocr.capture().await);
        app.predict_ocr().await;

        let result = app.ocr.result().unwrap();
        assert_eq!(result.prediction_label(), "No classification");
        assert_eq!(result.note.as_deref(), Some("Uncertain: text too short"));
        assert_eq!(app.ocr.camera().state(), CaptureState::Captured);
    }

    #[tokio::test]
    async fn test_disabled_voice_reports_unsupported() {
        let mut config = AppConfig::default();
        config.voice.enabled = false;
        let mut app = workbench(Arc::new(RecordingTransport::default()), &config);

        assert!(!app.text.voice_supported());
        app.text.dictate().await;
        assert!(app.text.text().is_empty());
        assert!(app.text.notice().is_some());
    }

    #[tokio::test]
    async fn test_dictated_text_is_submitted() {
        let transport = RecordingTransport::with_json(vec![json!({"result": {"prediction": "FAKE"}})]);
        let mut app = workbench(transport.clone(), &AppConfig::default());

        app.text.dictate().await;
        app.submit_text().await;

        assert_eq!(app.text.text(), "spoken words");
        assert_eq!(app.text.result().unwrap().prediction, "FAKE");
    }

    #[tokio::test]
    async fn test_cancel_all_discards_in_flight_responses() {
        let transport = RecordingTransport::with_json(vec![
            json!({"result": {"prediction": "FAKE"}}),
            json!({"articles": [{"title": "A", "url": "u"}]}),
        ]);
        let mut app = workbench(transport.clone(), &AppConfig::default());

        app.text.set_text("Sky is green");
        let text = app.text.prepare().unwrap();
        let news = app.news.prepare().unwrap();
        app.cancel_all();

        let text_done = text.run(&app.gateway).await;
        let news_done = news.run(&app.gateway).await;
        assert!(!app.text.apply(text_done));
        assert!(!app.news.apply(news_done));

        assert!(app.text.result().is_none());
        assert!(app.news.articles().is_empty());
        assert!(!app.text.is_busy());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_image_search_through_workbench() {
        let transport = RecordingTransport::with_json(vec![json!({"reverse_search_ranked": []})]);
        let mut app = Workbench::with_transport(
            &AppConfig::default(),
            transport.clone(),
            Box::new(FakeCamera::new(FakeCameraMode::Missing)),
            Box::new(UnavailableRecognizer),
        );
        app.image
            .select_file(Some(UploadFile::new("a.jpg", "image/jpeg", vec![0xFF, 0xD8])));
        app.submit_image().await;

        assert!(app.image.result().unwrap().ranked_matches.is_empty());
        assert_eq!(transport.calls(), 1);
    }
}
