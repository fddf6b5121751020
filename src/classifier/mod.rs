//! Classifier Service (C3, §4.3): hybrid keyword + learned-model
//! classification with an override rule.

mod extract;
mod keywords;
mod model;
mod score;

pub use extract::{ExtractionError, NoExternalExtractor, TextExtractor};
pub use model::{LearnedModel, NullModel};
pub use score::{keyword_prediction, KeywordPrediction};

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use keywords::CATEGORIES;

/// The six document categories plus the catch-all `unknown_file` label.
pub const LABELS: &[&str] = &[
    "drivers_license",
    "bank_statement",
    "invoice",
    "tax_return",
    "medical_record",
    "insurance_claim",
];

pub const UNKNOWN_LABEL: &str = "unknown_file";

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported extension: {0}")]
    UnsupportedExtension(String),
    #[error("text extraction unavailable for this file type")]
    ExtractionUnavailable,
    #[error("file produced no extractable text")]
    Empty,
}

/// External capability the rest of the system depends on: classify a
/// staged file and return a category label. The keyword scorer and
/// the learned model are internal cooperating strategies behind this
/// single method (§9).
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, path: &Path) -> Result<String, ClassificationError>;
}

/// The hybrid classifier described in §4.3: keyword scoring plus an
/// optional learned-model override rule.
pub struct HybridClassifier {
    extractor: Box<dyn TextExtractor>,
    model: Box<dyn LearnedModel>,
}

impl HybridClassifier {
    pub fn new(extractor: Box<dyn TextExtractor>, model: Box<dyn LearnedModel>) -> Self {
        Self { extractor, model }
    }

    /// Construct with the built-in plain-text extractor and no learned
    /// model (keyword-only best effort, per §4.3's last paragraph).
    pub fn keyword_only() -> Self {
        Self::new(Box::new(extract::PlainTextExtractor), Box::new(NullModel))
    }
}

#[async_trait]
impl Classifier for HybridClassifier {
    async fn classify(&self, path: &Path) -> Result<String, ClassificationError> {
        match self.classify_inner(path).await {
            Ok(label) => Ok(label),
            Err(_) => Ok(filename_fallback(path).unwrap_or_else(|| UNKNOWN_LABEL.to_string())),
        }
    }
}

impl HybridClassifier {
    async fn classify_inner(&self, path: &Path) -> Result<String, ClassificationError> {
        let text = self.extractor.extract_text(path).await?;
        if text.trim().is_empty() {
            return Err(ClassificationError::Empty);
        }

        let keyword = keyword_prediction(&text, CATEGORIES);
        let model_label = self.model.predict(&text, CATEGORIES).await;

        let label = match model_label {
            Some(model_label) => {
                let overrides = keyword.score >= 3
                    && keyword.confidence > 0.65
                    && keyword.category != model_label;
                if overrides {
                    keyword.category.clone()
                } else {
                    model_label
                }
            }
            // No model artifact loaded: best-effort keyword prediction.
            None => keyword.category.clone(),
        };

        Ok(label)
    }
}

/// Last-resort signal when text extraction fails entirely: look for an
/// unambiguous category token in the filename itself, mirroring
/// `src/classifier.py`'s fallback in the original source
/// (`SPEC_FULL.md` §F.2). Never used when extraction succeeds.
fn filename_fallback(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?.to_lowercase();
    for category in CATEGORIES {
        if name.contains(category.name) {
            return Some(category.name.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn unreadable_file_falls_back_to_unknown() {
        let classifier = HybridClassifier::keyword_only();
        let result = classifier
            .classify(Path::new("/nonexistent/path/file.txt"))
            .await
            .unwrap();
        assert_eq!(result, UNKNOWN_LABEL);
    }

    #[tokio::test]
    async fn unreadable_file_with_hinting_filename_uses_fallback() {
        let classifier = HybridClassifier::keyword_only();
        let result = classifier
            .classify(Path::new("/nonexistent/invoice_march.txt"))
            .await
            .unwrap();
        assert_eq!(result, "invoice");
    }

    fn text_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    /// §4.3 step 5: a strong, unambiguous keyword match overrides a
    /// disagreeing model prediction.
    #[tokio::test]
    async fn override_fires_when_keyword_strongly_disagrees_with_model() {
        let file = text_file(
            "account balance transaction statement deposit withdraw bank checking savings",
        );
        let classifier = HybridClassifier::new(
            Box::new(extract::PlainTextExtractor),
            Box::new(model::StubModel("invoice")),
        );
        let result = classifier.classify(file.path()).await.unwrap();
        assert_eq!(result, "bank_statement");
    }

    /// When the keyword score is below the `score >= 3` threshold, the
    /// override does not fire and the model prediction stands.
    #[tokio::test]
    async fn override_does_not_fire_when_keyword_score_is_low() {
        let file = text_file("account balance");
        let classifier = HybridClassifier::new(
            Box::new(extract::PlainTextExtractor),
            Box::new(model::StubModel("invoice")),
        );
        let result = classifier.classify(file.path()).await.unwrap();
        assert_eq!(result, "invoice");
    }

    /// When the model agrees with the keyword prediction, the override
    /// condition's `category != model_label` clause is false and the
    /// (identical) model prediction stands.
    #[tokio::test]
    async fn override_does_not_fire_when_model_already_agrees() {
        let file = text_file(
            "account balance transaction statement deposit withdraw bank checking savings",
        );
        let classifier = HybridClassifier::new(
            Box::new(extract::PlainTextExtractor),
            Box::new(model::StubModel("bank_statement")),
        );
        let result = classifier.classify(file.path()).await.unwrap();
        assert_eq!(result, "bank_statement");
    }
}
