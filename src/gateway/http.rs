//! HTTP transport over reqwest

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::request::{Method, OutboundRequest, RequestBody};
use super::{Transport, TransportError, TransportResponse};
use crate::config::BackendConfig;

/// Transport that talks to the backend over HTTP
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build the process-wide client from backend settings
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Join a base address and an endpoint path with exactly one slash
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let url = join_url(&self.base_url, request.endpoint.path());
        let builder = match request.endpoint.method() {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart { field, file } => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.name)
                    .mime_str(&file.media_type)
                    .map_err(|e| TransportError::Encode(format!("invalid media type: {}", e)))?;
                builder.multipart(Form::new().part(field, part))
            }
        };

        debug!("Sending request to {}", url);
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
