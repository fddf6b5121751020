//! The learned-model side of the hybrid classifier (§4.3 step 3, §1
//! "Deliberately OUT of scope"). Training, embeddings, and the
//! gradient-boosted model itself are external collaborators; this
//! core depends only on a `LearnedModel` capability.

use async_trait::async_trait;

use super::keywords::Category;

/// A learned classifier, loaded once at service startup from a
/// serialized artifact. Returns `None` when no artifact is loaded, in
/// which case the caller falls back to the keyword prediction alone
/// (§4.3's final paragraph).
#[async_trait]
pub trait LearnedModel: Send + Sync {
    async fn predict(&self, text: &str, categories: &[Category]) -> Option<String>;
}

/// No model artifact present. Matches the behavior when
/// `ClassifierService::load_model` fails in the original source: log
/// a warning and proceed keyword-only.
pub struct NullModel;

#[async_trait]
impl LearnedModel for NullModel {
    async fn predict(&self, _text: &str, _categories: &[Category]) -> Option<String> {
        None
    }
}

/// A fixed-answer model double used by tests exercising the override
/// rule in `HybridClassifier::classify_inner`: always predicts the
/// configured label regardless of input text.
#[cfg(test)]
pub(super) struct StubModel(pub(super) &'static str);

#[cfg(test)]
#[async_trait]
impl LearnedModel for StubModel {
    async fn predict(&self, _text: &str, _categories: &[Category]) -> Option<String> {
        Some(self.0.to_string())
    }
}
