//! Result Normalizer
//!
//! The one place that reads raw backend JSON. Every function here accepts
//! any shape, never fails, and fills missing or renamed fields with fixed
//! placeholders so nothing downstream has to probe raw payloads.

pub mod records;

use serde_json::Value;
use tracing::debug;

pub use records::{
    Article, Classification, DetectionResult, ImageMatch, ImageResult, ModelPrediction, OcrResult, TextResult,
    Tone, UrlResult,
};
use records::{NOT_AVAILABLE, NO_SNIPPET, NO_TEXT_EXTRACTED, NO_TITLE, READ_MORE, UNKNOWN_SOURCE};

static NULL: Value = Value::Null;

/// First non-blank string found under any of `keys`
fn str_at<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Classifier label; scalar labels that are not strings are kept as text
fn label_at(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or(value: &Value, keys: &[&str], fallback: &str) -> String {
    str_at(value, keys).unwrap_or(fallback).to_string()
}

/// Numeric field that may arrive as a number or a numeric string
fn number_at(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `{ result: { prediction, confidence?, authenticity_score? } }`
pub fn normalize_text(body: &Value) -> TextResult {
    let result = body.get("result").unwrap_or(&NULL);
    TextResult {
        prediction: label_at(result, "prediction").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        confidence: str_at(result, &["confidence"]).map(str::to_string),
        authenticity_score: number_at(result, "authenticity_score"),
    }
}

/// `{ reverse_search_ranked: [...], uploaded_url }`
pub fn normalize_image(body: &Value) -> ImageResult {
    let ranked_matches = body
        .get("reverse_search_ranked")
        .and_then(Value::as_array)
        .map(|matches| matches.iter().map(normalize_match).collect())
        .unwrap_or_default();

    ImageResult {
        ranked_matches,
        uploaded_url: str_at(body, &["uploaded_url"]).map(str::to_string),
    }
}

fn normalize_match(entry: &Value) -> ImageMatch {
    ImageMatch {
        title: string_or(entry, &["title"], NO_TITLE),
        source: string_or(entry, &["source"], UNKNOWN_SOURCE),
        snippet: string_or(entry, &["snippet"], NO_SNIPPET),
        thumbnail: string_or(entry, &["thumbnail", "thumbnail_url"], ""),
        link: string_or(entry, &["link", "original"], ""),
        relevance_score: number_at(entry, "relevance_score").unwrap_or(0.0),
    }
}

/// `{ ocr_text, classification: { prediction } | "status" }`
pub fn normalize_ocr(body: &Value) -> OcrResult {
    let (classification, note) = match body.get("classification") {
        Some(Value::String(note)) if !note.trim().is_empty() => (None, Some(note.trim().to_string())),
        Some(c @ Value::Object(_)) => (
            label_at(c, "prediction").map(|prediction| Classification { prediction }),
            str_at(c, &["note"]).map(str::to_string),
        ),
        _ => (None, None),
    };

    OcrResult {
        extracted_text: body
            .get("ocr_text")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(NO_TEXT_EXTRACTED)
            .to_string(),
        classification,
        note,
    }
}

/// `{ domain, title, author, summary: { content_snippet, reason },
///    model_prediction: { prediction }, source_verification: { verified } }`
pub fn normalize_url(body: &Value) -> UrlResult {
    let summary = body.get("summary").unwrap_or(&NULL);

    let model_prediction = body
        .get("model_prediction")
        .filter(|p| p.is_object())
        .map(|p| ModelPrediction {
            prediction: label_at(p, "prediction"),
        });

    let source_verified = body
        .get("source_verification")
        .and_then(|v| v.get("verified"))
        .and_then(Value::as_bool);

    UrlResult {
        url: str_at(body, &["url"]).map(str::to_string),
        domain: string_or(body, &["domain"], ""),
        title: string_or(body, &["title"], ""),
        author: string_or(body, &["author"], ""),
        content_snippet: string_or(summary, &["content_snippet"], ""),
        model_prediction,
        source_verified,
        reason: str_at(summary, &["reason"]).map(str::to_string),
        final_prediction: str_at(body, &["final_prediction"]).map(str::to_string),
    }
}

/// Display label for a model prediction.
///
/// Closed two-way mapping with an explicit unknown: absent → `N/A`,
/// any casing of `fake` → `Fake`, every other label → `Authentic`.
pub fn format_prediction(prediction: Option<&ModelPrediction>) -> &'static str {
    match prediction.and_then(|p| p.prediction.as_deref()) {
        None => NOT_AVAILABLE,
        Some(label) if label.is_empty() => NOT_AVAILABLE,
        Some(label) if label.eq_ignore_ascii_case("fake") => "Fake",
        Some(_) => "Authentic",
    }
}

/// `{ articles: [...] }` or a bare sequence; anything else is empty
pub fn normalize_news(body: &Value) -> Vec<Article> {
    let entries: &[Value] = match body {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => match map.get("articles") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let articles: Vec<Article> = entries
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| Article {
            title: string_or(entry, &["title"], ""),
            url: string_or(entry, &["url"], ""),
            description: string_or(entry, &["description", "text"], READ_MORE),
            source: entry
                .get("source")
                .and_then(|s| str_at(s, &["name"]))
                .map(str::to_string),
        })
        .collect();

    if articles.len() != entries.len() {
        debug!("Skipped {} non-article entries in news feed", entries.len() - articles.len());
    }
    articles
}
