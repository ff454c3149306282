//! Request model shared by the gateway and its transports

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

/// Multipart field name every file endpoint expects
pub const FILE_FIELD: &str = "file";

/// The four detection channels a user can submit through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionChannel {
    Text,
    Image,
    Ocr,
    Url,
}

impl DetectionChannel {
    /// Backend endpoint bound to this channel
    pub fn endpoint(&self) -> Endpoint {
        match self {
            DetectionChannel::Text => Endpoint::DetectText,
            DetectionChannel::Image => Endpoint::DetectImage,
            DetectionChannel::Ocr => Endpoint::OcrScan,
            DetectionChannel::Url => Endpoint::AnalyzeUrl,
        }
    }

    /// Display name for logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            DetectionChannel::Text => "text",
            DetectionChannel::Image => "image",
            DetectionChannel::Ocr => "ocr",
            DetectionChannel::Url => "url",
        }
    }
}

/// HTTP method used by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Backend endpoints, including the news feed which has no channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    DetectText,
    DetectImage,
    OcrScan,
    TopNews,
    AnalyzeUrl,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::TopNews => Method::Get,
            _ => Method::Post,
        }
    }

    /// Path relative to the configured base address
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::DetectText => "/api/detect/text",
            Endpoint::DetectImage => "/api/detect/image",
            Endpoint::OcrScan => "/api/ocr/scan",
            Endpoint::TopNews => "/api/news/top",
            Endpoint::AnalyzeUrl => "/api/url-check/analyze",
        }
    }
}

/// A named binary file with a declared media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its media type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let media_type = media_type_for(path).to_string();
        Ok(Self { name, media_type, bytes })
    }

    /// Whether the declared media type is an image type
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Guess a media type from a file extension
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Body of a detection request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// UTF-8 text (Text and URL channels)
    Text(String),
    /// Binary file (Image and OCR channels)
    File(UploadFile),
}

/// One submission on a detection channel
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub channel: DetectionChannel,
    pub payload: Payload,
    pub issued_at: Instant,
}

impl DetectionRequest {
    pub fn new(channel: DetectionChannel, payload: Payload) -> Self {
        Self {
            channel,
            payload,
            issued_at: Instant::now(),
        }
    }

    /// Encode into the wire form the channel's endpoint expects
    pub fn into_outbound(self) -> OutboundRequest {
        let endpoint = self.channel.endpoint();
        let body = match self.payload {
            Payload::Text(text) => {
                let key = match self.channel {
                    DetectionChannel::Url => "url",
                    _ => "text",
                };
                RequestBody::Json(serde_json::json!({ key: text }))
            }
            Payload::File(file) => RequestBody::Multipart {
                field: FILE_FIELD,
                file,
            },
        };
        OutboundRequest { endpoint, body }
    }
}

/// Encoded body of an outbound request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart {
        field: &'static str,
        file: UploadFile,
    },
}

/// A request ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub endpoint: Endpoint,
    pub body: RequestBody,
}

impl OutboundRequest {
    /// A body-less request, as used by the news feed
    pub fn empty(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            body: RequestBody::Empty,
        }
    }
}
