//! Request Gateway
//!
//! Single point of contact with the classification backend. Each call
//! issues exactly one request through the injected [`Transport`]; there is
//! no retry and no deduplication here, in-flight discipline belongs to the
//! workflows.

pub mod http;
pub mod request;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::shared::DetectError;

pub use http::HttpTransport;
pub use request::{DetectionChannel, DetectionRequest, Endpoint, OutboundRequest, Payload, UploadFile};

/// Raw response from a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure, nothing usable came back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request could not be encoded: {0}")]
    Encode(String),

    #[error("{0}")]
    Connection(String),
}

/// Carries one outbound request to the backend
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// Uniform async interface to the five backend endpoints
#[derive(Clone)]
pub struct RequestGateway {
    transport: Arc<dyn Transport>,
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Classify free text
    pub async fn detect_text(&self, text: &str) -> Result<Value, DetectError> {
        if text.trim().is_empty() {
            return Err(DetectError::validation("no text provided"));
        }
        self.dispatch(DetectionRequest::new(DetectionChannel::Text, Payload::Text(text.to_string())))
            .await
    }

    /// Reverse-image search an uploaded picture
    pub async fn upload_image(&self, file: Option<UploadFile>) -> Result<Value, DetectError> {
        let file = file.ok_or_else(|| DetectError::validation("no file provided"))?;
        self.dispatch(DetectionRequest::new(DetectionChannel::Image, Payload::File(file)))
            .await
    }

    /// Extract and classify text from a document image
    pub async fn ocr_scan(&self, file: Option<UploadFile>) -> Result<Value, DetectError> {
        let file = file.ok_or_else(|| DetectError::validation("no file provided"))?;
        self.dispatch(DetectionRequest::new(DetectionChannel::Ocr, Payload::File(file)))
            .await
    }

    /// Verify an article URL and its source
    pub async fn analyze_url(&self, url: &str) -> Result<Value, DetectError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DetectError::validation("no url provided"));
        }
        self.dispatch(DetectionRequest::new(DetectionChannel::Url, Payload::Text(url.to_string())))
            .await
    }

    /// Fetch the current headlines
    pub async fn get_top_news(&self) -> Result<Value, DetectError> {
        self.send(OutboundRequest::empty(Endpoint::TopNews)).await
    }

    async fn dispatch(&self, request: DetectionRequest) -> Result<Value, DetectError> {
        let channel = request.channel;
        let issued_at = request.issued_at;
        let result = self.send(request.into_outbound()).await;
        debug!(
            channel = channel.name(),
            elapsed_ms = issued_at.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Detection request finished"
        );
        result
    }

    async fn send(&self, request: OutboundRequest) -> Result<Value, DetectError> {
        let endpoint = request.endpoint;
        let response = self.transport.send(request).await.map_err(|e| {
            warn!("Request to {} failed: {}", endpoint.path(), e);
            match e {
                TransportError::Encode(reason) => DetectError::Validation(reason),
                TransportError::Connection(reason) => DetectError::Network(reason),
            }
        })?;

        if !response.is_success() {
            warn!("{} returned status {}", endpoint.path(), response.status);
            let body = (!response.body.is_empty())
                .then(|| String::from_utf8_lossy(&response.body).into_owned());
            return Err(DetectError::Backend {
                status: response.status,
                body,
            });
        }

        Ok(decode_body(&response.body))
    }
}

/// Decode a success body; anything undecodable becomes `null` for the
/// normalizer to fill with placeholders.
fn decode_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        warn!("Backend returned an undecodable body: {}", e);
        Value::Null
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::request::RequestBody;
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Transport that records requests and replays canned responses
    #[derive(Default)]
    pub struct RecordingTransport {
        pub requests: Mutex<Vec<OutboundRequest>>,
        responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        delay: Option<Duration>,
    }

    impl RecordingTransport {
        pub fn with_json(values: Vec<Value>) -> Arc<Self> {
            Arc::new(Self::replaying(values, None))
        }

        /// Like `with_json`, but every response takes `delay` to arrive
        pub fn delayed(delay: Duration, values: Vec<Value>) -> Arc<Self> {
            Arc::new(Self::replaying(values, Some(delay)))
        }

        fn replaying(values: Vec<Value>, delay: Option<Duration>) -> Self {
            let transport = Self {
                delay,
                ..Self::default()
            };
            for value in values {
                transport.push(Ok(TransportResponse {
                    status: 200,
                    body: serde_json::to_vec(&value).unwrap(),
                }));
            }
            transport
        }

        pub fn push(&self, response: Result<TransportResponse, TransportError>) {
            self.responses.lock().push_back(response);
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
            self.requests.lock().push(request);
            let response = self.responses.lock().pop_front().unwrap_or(Ok(TransportResponse {
                status: 200,
                body: b"{}".to_vec(),
            }));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            response
        }
    }

    fn gateway(transport: &Arc<RecordingTransport>) -> RequestGateway {
        RequestGateway::new(transport.clone())
    }

    #[tokio::test]
    async fn test_blank_text_never_reaches_network() {
        let transport = Arc::new(RecordingTransport::default());
        let gw = gateway(&transport);
        for text in ["", "   "] {
            assert!(matches!(gw.detect_text(text).await, Err(DetectError::Validation(_))));
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_never_reaches_network() {
        let transport = Arc::new(RecordingTransport::default());
        let gw = gateway(&transport);
        let expected = Err(DetectError::Validation("no file provided".into()));
        assert_eq!(gw.ocr_scan(None).await, expected);
        assert_eq!(gw.upload_image(None).await, expected);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_url_never_reaches_network() {
        let transport = Arc::new(RecordingTransport::default());
        assert!(matches!(
            gateway(&transport).analyze_url("  ").await,
            Err(DetectError::Validation(_))
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_detect_text_sends_one_json_request() {
        let transport = RecordingTransport::with_json(vec![json!({"result": {"prediction": "FAKE"}})]);
        let body = gateway(&transport).detect_text("aliens landed").await.unwrap();
        assert_eq!(body["result"]["prediction"], "FAKE");

        let requests = transport.requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].endpoint, Endpoint::DetectText);
        assert_eq!(requests[0].body, RequestBody::Json(json!({"text": "aliens landed"})));
    }

    #[tokio::test]
    async fn test_file_endpoints_send_multipart_under_file_field() {
        let transport = RecordingTransport::with_json(vec![json!({}), json!({})]);
        let gw = gateway(&transport);
        let file = UploadFile::new("capture.jpg", "image/jpeg", vec![1, 2, 3]);
        gw.ocr_scan(Some(file.clone())).await.unwrap();
        gw.upload_image(Some(file.clone())).await.unwrap();

        let requests = transport.requests.lock();
        assert_eq!(requests[0].endpoint, Endpoint::OcrScan);
        assert_eq!(requests[1].endpoint, Endpoint::DetectImage);
        for request in requests.iter() {
            assert_eq!(request.body, RequestBody::Multipart { field: "file", file: file.clone() });
        }
    }

    #[tokio::test]
    async fn test_analyze_url_and_news_paths() {
        let transport = RecordingTransport::with_json(vec![json!({}), json!([])]);
        let gw = gateway(&transport);
        gw.analyze_url(" https://example.com/a ").await.unwrap();
        gw.get_top_news().await.unwrap();

        let requests = transport.requests.lock();
        assert_eq!(requests[0].body, RequestBody::Json(json!({"url": "https://example.com/a"})));
        assert_eq!(requests[1], OutboundRequest::empty(Endpoint::TopNews));
    }

    #[tokio::test]
    async fn test_non_success_status_is_backend_error() {
        let transport = Arc::new(RecordingTransport::default());
        transport.push(Ok(TransportResponse {
            status: 500,
            body: br#"{"error":"OCR failed"}"#.to_vec(),
        }));
        let err = gateway(&transport).detect_text("x").await.unwrap_err();
        assert_eq!(
            err,
            DetectError::Backend {
                status: 500,
                body: Some(r#"{"error":"OCR failed"}"#.into())
            }
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error_without_retry() {
        let transport = Arc::new(RecordingTransport::default());
        transport.push(Err(TransportError::Connection("connection refused".into())));
        let err = gateway(&transport).get_top_news().await.unwrap_err();
        assert_eq!(err, DetectError::Network("connection refused".into()));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_success_body_degrades_to_null() {
        let transport = Arc::new(RecordingTransport::default());
        transport.push(Ok(TransportResponse {
            status: 200,
            body: b"<html>oops</html>".to_vec(),
        }));
        assert_eq!(gateway(&transport).get_top_news().await, Ok(Value::Null));
    }
}
