//! Terminal presentation
//!
//! Renders canonical records and notices as plain text. Colour decisions
//! come from [`Tone`] only.

use std::fmt::Write;

use crate::normalize::{
    format_prediction, Article, DetectionResult, ImageResult, OcrResult, TextResult, Tone, UrlResult,
};
use crate::shared::{Notice, NoticeKind};
use crate::shell::url::url_warning;

/// Verdict marker for a tone
pub fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Fake => "[FAKE]",
        Tone::Real => "[OK]",
        Tone::Neutral => "[--]",
    }
}

/// Render any channel's record
pub fn render(result: &DetectionResult) -> String {
    match result {
        DetectionResult::Text(r) => render_text(r),
        DetectionResult::Image(r) => render_image(r),
        DetectionResult::Ocr(r) => render_ocr(r),
        DetectionResult::Url(r) => render_url(r, format_prediction(r.model_prediction.as_ref()), url_warning(r)),
    }
}

pub fn render_notice(notice: &Notice) -> String {
    let prefix = match notice.kind {
        NoticeKind::Inline => "!",
        NoticeKind::OneShot => "Notice:",
        NoticeKind::Retry => "Error:",
        NoticeKind::Busy => "Busy:",
    };
    format!("{} {}", prefix, notice.message)
}

pub fn render_text(result: &TextResult) -> String {
    let mut out = format!("{} Prediction: {}", tone_marker(result.tone()), result.prediction);
    if let Some(confidence) = &result.confidence {
        let _ = write!(out, "\n  Confidence: {}", confidence);
    }
    if let Some(score) = result.authenticity_score {
        let _ = write!(out, "\n  Authenticity score: {:.2}", score);
    }
    out
}

pub fn render_image(result: &ImageResult) -> String {
    let mut out = String::new();
    if let Some(uploaded) = &result.uploaded_url {
        let _ = writeln!(out, "Uploaded as {}", uploaded);
    }
    if result.ranked_matches.is_empty() {
        out.push_str("No matching sources found");
        return out;
    }
    for (rank, m) in result.ranked_matches.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", rank + 1, m.title, m.source);
        let _ = writeln!(out, "   {}", m.snippet);
        let _ = writeln!(out, "   {}  relevance {:.2}", m.link, m.relevance_score);
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn render_ocr(result: &OcrResult) -> String {
    let mut out = format!(
        "Extracted text:\n  {}\n{} Prediction: {}",
        result.extracted_text,
        tone_marker(result.tone()),
        result.prediction_label()
    );
    if let Some(note) = &result.note {
        let _ = write!(out, "\n  {}", note);
    }
    out
}

/// URL analysis with its warning banner on top when raised
pub fn render_url(result: &UrlResult, prediction_label: &str, warning: bool) -> String {
    let mut out = String::new();
    if warning {
        out.push_str("WARNING: this article may be unreliable\n");
    }
    if let Some(url) = &result.url {
        let _ = writeln!(out, "URL: {}", url);
    }
    let _ = writeln!(out, "Domain: {}", result.domain);
    let _ = writeln!(out, "Title: {}", result.title);
    let _ = writeln!(out, "Author: {}", result.author);
    let _ = writeln!(out, "Snippet: {}", result.content_snippet);
    let verified = match result.source_verified {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    };
    let _ = writeln!(out, "Source verified: {}", verified);
    let _ = write!(out, "{} Prediction: {}", tone_marker(result.tone()), prediction_label);
    if let Some(reason) = &result.reason {
        let _ = write!(out, "\n  {}", reason);
    }
    out
}

pub fn render_news(articles: &[Article]) -> String {
    if articles.is_empty() {
        return "No headlines available".to_string();
    }
    articles
        .iter()
        .map(|a| match &a.source {
            Some(source) => format!("* {} [{}]\n  {}\n  {}", a.title, source, a.description, a.url),
            None => format!("* {}\n  {}\n  {}", a.title, a.description, a.url),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
