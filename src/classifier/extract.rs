//! Text extraction boundary (§4.3 step 1, §1 "Deliberately OUT of
//! scope", §F.2).
//!
//! PDF/DOCX/OCR extraction libraries are out of core scope; this
//! module defines the seam the rest of the classifier depends on and
//! ships a real implementation only for the trivial formats (txt,
//! csv) that need no external library.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported extension: {0}")]
    UnsupportedExtension(String),
    #[error("no extractor available for this file type")]
    Unavailable,
}

impl From<ExtractionError> for super::ClassificationError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::Io { source, .. } => super::ClassificationError::Io(source),
            ExtractionError::UnsupportedExtension(ext) => {
                super::ClassificationError::UnsupportedExtension(ext)
            }
            ExtractionError::Unavailable => super::ClassificationError::ExtractionUnavailable,
        }
    }
}

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "jpg", "jpeg", "png", "bmp", "tiff", "gif", "txt", "csv",
];

/// Extracts plain text from a staged document so the keyword scorer
/// and learned model have something to operate on.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, path: &Path) -> Result<String, super::ClassificationError>;
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Extracts text directly for `.txt`/`.csv`; every other supported
/// extension (PDF text/OCR, DOCX, image OCR) requires a library this
/// core deliberately excludes (§1), so it returns
/// `ExtractionUnavailable`, which `classify` catches per the step-6
/// catch-all rule.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, super::ClassificationError> {
        let ext = extension_of(path)
            .ok_or_else(|| ExtractionError::UnsupportedExtension(String::new()))?;

        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ExtractionError::UnsupportedExtension(ext).into());
        }

        match ext.as_str() {
            "txt" | "csv" => {
                let bytes =
                    tokio::fs::read(path)
                        .await
                        .map_err(|source| ExtractionError::Io {
                            path: path.to_path_buf(),
                            source,
                        })?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => Err(ExtractionError::Unavailable.into()),
        }
    }
}

/// Placeholder for an injected OCR/PDF/DOCX extraction backend. Always
/// reports unavailable; a deployment that needs real extraction wires
/// in its own `TextExtractor` in front of (or instead of)
/// `PlainTextExtractor`.
pub struct NoExternalExtractor;

#[async_trait]
impl TextExtractor for NoExternalExtractor {
    async fn extract_text(&self, _path: &Path) -> Result<String, super::ClassificationError> {
        Err(ExtractionError::Unavailable.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_txt_files_directly() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "invoice total due date").unwrap();

        let extractor = PlainTextExtractor;
        let text = extractor.extract_text(file.path()).await.unwrap();
        assert!(text.contains("invoice"));
    }

    #[tokio::test]
    async fn rejects_disallowed_extension() {
        let file = tempfile::Builder::new().suffix(".exe").tempfile().unwrap();
        let extractor = PlainTextExtractor;
        let err = extractor.extract_text(file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            super::super::ClassificationError::UnsupportedExtension(_)
        ));
    }

    #[tokio::test]
    async fn pdf_extraction_is_unavailable_in_core() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let extractor = PlainTextExtractor;
        let err = extractor.extract_text(file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            super::super::ClassificationError::ExtractionUnavailable
        ));
    }
}
