//! Format-specific text extraction.
//!
//! Strategies are selected by the declared media type of an upload, never by
//! sniffing file bytes. A type whose capability is missing extracts to empty
//! text with a unit count of zero.

mod docx;
mod ocr;
mod pdf;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::capability::Capabilities;
use crate::media::MediaType;

pub use docx::DocxExtractor;
pub use ocr::OcrExtractor;
pub use pdf::PdfExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    #[error("OCR failed: {0}")]
    Ocr(String),
    #[error("Extraction task failed: {0}")]
    Task(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Plain text pulled out of a document plus its page or unit count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub unit_count: u32,
}

impl ExtractedText {
    #[must_use]
    pub fn new(text: String, unit_count: u32) -> Self {
        Self { text, unit_count }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    fn supported_types(&self) -> &[MediaType];

    fn can_extract(&self, media: MediaType) -> bool {
        self.supported_types().contains(&media)
    }

    async fn extract(&self, path: &Path, media: MediaType) -> ExtractionResult<ExtractedText>;
}

/// Dispatches to the registered strategy for a declared media type.
pub struct MediaTypeExtractor {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl MediaTypeExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Register a strategy for every capability present in `caps`.
    #[must_use]
    pub fn from_capabilities(caps: &Capabilities, ocr_language: Option<&str>) -> Self {
        let mut extractor = Self::new();

        if caps.supports(MediaType::Pdf) {
            extractor.add_extractor(Box::new(PdfExtractor::new()));
        }
        if caps.supports(MediaType::Docx) {
            extractor.add_extractor(Box::new(DocxExtractor::new()));
        }
        if let Some(binary) = caps.ocr_binary() {
            let mut ocr = OcrExtractor::new(binary);
            if let Some(lang) = ocr_language {
                ocr = ocr.with_language(lang);
            }
            extractor.add_extractor(Box::new(ocr));
        }

        extractor
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn add_extractor(&mut self, extractor: Box<dyn TextExtractor>) {
        self.extractors.push(extractor);
    }

    fn find_extractor(&self, media: MediaType) -> Option<&dyn TextExtractor> {
        self.extractors
            .iter()
            .find(|e| e.can_extract(media))
            .map(AsRef::as_ref)
    }

    /// Extract using a declared MIME string; unknown types yield empty text.
    pub async fn extract_declared(
        &self,
        path: &Path,
        declared_media_type: &str,
    ) -> ExtractionResult<ExtractedText> {
        match MediaType::from_mime(declared_media_type) {
            Some(media) => self.extract(path, media).await,
            None => {
                tracing::debug!("No extraction strategy for declared type '{}'", declared_media_type);
                Ok(ExtractedText::empty())
            }
        }
    }
}

impl Default for MediaTypeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextExtractor for MediaTypeExtractor {
    fn supported_types(&self) -> &[MediaType] {
        &MediaType::ALL
    }

    async fn extract(&self, path: &Path, media: MediaType) -> ExtractionResult<ExtractedText> {
        let Some(extractor) = self.find_extractor(media) else {
            tracing::warn!("Capability for {} unavailable, skipping text extraction", media);
            return Ok(ExtractedText::empty());
        };

        extractor.extract(path, media).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor(&'static str);

    #[async_trait::async_trait]
    impl TextExtractor for FixedExtractor {
        fn supported_types(&self) -> &[MediaType] {
            &[MediaType::Png]
        }

        async fn extract(&self, _path: &Path, _media: MediaType) -> ExtractionResult<ExtractedText> {
            Ok(ExtractedText::new(self.0.to_string(), 1))
        }
    }

    #[tokio::test]
    async fn test_missing_capability_yields_empty() {
        let extractor = MediaTypeExtractor::from_capabilities(&Capabilities::none(), None);

        for media in MediaType::ALL {
            let out = extractor
                .extract(Path::new("/nonexistent/upload"), media)
                .await
                .unwrap();
            assert_eq!(out, ExtractedText::empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_declared_type_yields_empty() {
        let extractor = MediaTypeExtractor::new().with_extractor(Box::new(FixedExtractor("x")));

        let out = extractor
            .extract_declared(Path::new("notes.txt"), "text/plain")
            .await
            .unwrap();

        assert_eq!(out.unit_count, 0);
        assert!(out.text.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_by_declared_type() {
        let extractor = MediaTypeExtractor::new().with_extractor(Box::new(FixedExtractor("scanned")));

        let out = extractor
            .extract_declared(Path::new("scan.png"), "image/png")
            .await
            .unwrap();
        assert_eq!(out.text, "scanned");
        assert_eq!(out.unit_count, 1);

        let out = extractor
            .extract_declared(Path::new("scan.jpg"), "image/jpeg")
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
