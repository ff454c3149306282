//! Backend calls detached from their workflow
//!
//! A [`Pending`] owns everything its request needs, so it can be awaited
//! (or spawned) while the workflow stays free to accept stops, resets and
//! rejected duplicate submits.

use async_trait::async_trait;

use super::slot::{Completion, Ticket};
use crate::gateway::{RequestGateway, UploadFile};
use crate::normalize::{self, Article, ImageResult, OcrResult, TextResult, UrlResult};
use crate::shared::DetectError;

/// One gateway call plus normalization
#[async_trait]
pub trait Call: Send {
    type Output: Send;

    async fn execute(self, gateway: &RequestGateway) -> Result<Self::Output, DetectError>;
}

/// An accepted request waiting to be run
#[derive(Debug)]
pub struct Pending<C> {
    ticket: Ticket,
    call: C,
}

impl<C: Call> Pending<C> {
    pub(crate) fn new(ticket: Ticket, call: C) -> Self {
        Self { ticket, call }
    }

    /// Issue the request and normalize the response
    pub async fn run(self, gateway: &RequestGateway) -> Completion<C::Output> {
        Completion {
            ticket: self.ticket,
            outcome: self.call.execute(gateway).await,
        }
    }
}

#[derive(Debug)]
pub struct TextCall(pub String);

#[async_trait]
impl Call for TextCall {
    type Output = TextResult;

    async fn execute(self, gateway: &RequestGateway) -> Result<TextResult, DetectError> {
        let body = gateway.detect_text(&self.0).await?;
        Ok(normalize::normalize_text(&body))
    }
}

#[derive(Debug)]
pub struct ImageCall(pub Option<UploadFile>);

#[async_trait]
impl Call for ImageCall {
    type Output = ImageResult;

    async fn execute(self, gateway: &RequestGateway) -> Result<ImageResult, DetectError> {
        let body = gateway.upload_image(self.0).await?;
        Ok(normalize::normalize_image(&body))
    }
}

#[derive(Debug)]
pub struct OcrCall(pub UploadFile);

#[async_trait]
impl Call for OcrCall {
    type Output = OcrResult;

    async fn execute(self, gateway: &RequestGateway) -> Result<OcrResult, DetectError> {
        let body = gateway.ocr_scan(Some(self.0)).await?;
        Ok(normalize::normalize_ocr(&body))
    }
}

#[derive(Debug)]
pub struct UrlCall(pub String);

#[async_trait]
impl Call for UrlCall {
    type Output = UrlResult;

    async fn execute(self, gateway: &RequestGateway) -> Result<UrlResult, DetectError> {
        let body = gateway.analyze_url(&self.0).await?;
        Ok(normalize::normalize_url(&body))
    }
}

#[derive(Debug)]
pub struct NewsCall;

#[async_trait]
impl Call for NewsCall {
    type Output = Vec<Article>;

    async fn execute(self, gateway: &RequestGateway) -> Result<Vec<Article>, DetectError> {
        let body = gateway.get_top_news().await?;
        Ok(normalize::normalize_news(&body))
    }
}
