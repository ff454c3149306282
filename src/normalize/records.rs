//! Canonical result records, one per channel
//!
//! Records are already placeholder-filled; presentation renders them as-is
//! and picks colours through [`Tone`].

pub const NO_TITLE: &str = "No title available";
pub const UNKNOWN_SOURCE: &str = "Unknown";
pub const NO_SNIPPET: &str = "No snippet available";
pub const READ_MORE: &str = "Read more...";
pub const NO_TEXT_EXTRACTED: &str = "No text extracted";
pub const NO_CLASSIFICATION: &str = "No classification";
pub const NOT_AVAILABLE: &str = "N/A";

/// Verdict colouring, mapped to styles by presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Fake,
    Real,
    Neutral,
}

/// Text classifier verdict
#[derive(Debug, Clone, PartialEq)]
pub struct TextResult {
    /// Classifier label, `N/A` when the backend gave none
    pub prediction: String,
    pub confidence: Option<String>,
    pub authenticity_score: Option<f64>,
}

impl TextResult {
    pub fn tone(&self) -> Tone {
        if self.prediction == NOT_AVAILABLE {
            Tone::Neutral
        } else if self.prediction.eq_ignore_ascii_case("fake") {
            Tone::Fake
        } else {
            Tone::Real
        }
    }
}

/// One reverse-image search hit
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMatch {
    pub title: String,
    pub source: String,
    pub snippet: String,
    pub thumbnail: String,
    pub link: String,
    pub relevance_score: f64,
}

/// Reverse-image search outcome
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResult {
    /// Matches in backend ranking order
    pub ranked_matches: Vec<ImageMatch>,
    /// Where the backend stored the upload
    pub uploaded_url: Option<String>,
}

/// Classifier verdict attached to extracted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub prediction: String,
}

/// OCR outcome
#[derive(Debug, Clone, PartialEq)]
pub struct OcrResult {
    /// Extracted text, `No text extracted` when empty
    pub extracted_text: String,
    pub classification: Option<Classification>,
    /// Free-form status the backend sent instead of a verdict
    pub note: Option<String>,
}

impl OcrResult {
    /// Label shown for the verdict
    pub fn prediction_label(&self) -> &str {
        self.classification
            .as_ref()
            .map(|c| c.prediction.as_str())
            .unwrap_or(NO_CLASSIFICATION)
    }

    pub fn tone(&self) -> Tone {
        match self.classification.as_ref().map(|c| c.prediction.to_ascii_uppercase()) {
            Some(p) if p == "FAKE" => Tone::Fake,
            Some(p) if p == "REAL" => Tone::Real,
            _ => Tone::Neutral,
        }
    }
}

/// Model verdict for an article, `prediction` may itself be absent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelPrediction {
    pub prediction: Option<String>,
}

/// URL analysis outcome
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UrlResult {
    pub url: Option<String>,
    pub domain: String,
    pub title: String,
    pub author: String,
    pub content_snippet: String,
    pub model_prediction: Option<ModelPrediction>,
    /// `None` when the backend did not say either way
    pub source_verified: Option<bool>,
    pub reason: Option<String>,
    pub final_prediction: Option<String>,
}

impl UrlResult {
    /// Raw model label, lower-cased, empty when absent
    pub fn model_label(&self) -> String {
        self.model_prediction
            .as_ref()
            .and_then(|p| p.prediction.as_deref())
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Prediction colour: only an explicit fake label is red
    pub fn tone(&self) -> Tone {
        if self.model_label() == "fake" {
            Tone::Fake
        } else {
            Tone::Real
        }
    }
}

/// A headline from the news feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// Description or text, `Read more...` when neither is present
    pub description: String,
    pub source: Option<String>,
}

/// Canonical result of any detection channel
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    Text(TextResult),
    Image(ImageResult),
    Ocr(OcrResult),
    Url(UrlResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_tone() {
        let result = |p: &str| TextResult {
            prediction: p.to_string(),
            confidence: None,
            authenticity_score: None,
        };
        assert_eq!(result("FAKE").tone(), Tone::Fake);
        assert_eq!(result("REAL").tone(), Tone::Real);
        assert_eq!(result(NOT_AVAILABLE).tone(), Tone::Neutral);
    }

    #[test]
    fn test_ocr_tone_and_label() {
        let mut result = OcrResult {
            extracted_text: "text".into(),
            classification: None,
            note: None,
        };
        assert_eq!(result.prediction_label(), NO_CLASSIFICATION);
        assert_eq!(result.tone(), Tone::Neutral);

        result.classification = Some(Classification { prediction: "FAKE".into() });
        assert_eq!(result.tone(), Tone::Fake);
        result.classification = Some(Classification { prediction: "REAL".into() });
        assert_eq!(result.tone(), Tone::Real);
        result.classification = Some(Classification { prediction: "UNCERTAIN".into() });
        assert_eq!(result.tone(), Tone::Neutral);
        assert_eq!(result.prediction_label(), "UNCERTAIN");
    }

    #[test]
    fn test_url_tone() {
        let mut result = UrlResult::default();
        assert_eq!(result.tone(), Tone::Real);
        result.model_prediction = Some(ModelPrediction { prediction: Some("Fake".into()) });
        assert_eq!(result.tone(), Tone::Fake);
    }
}
