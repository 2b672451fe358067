use std::path::Path;

use super::{ExtractedText, ExtractionResult, TextExtractor};
use crate::media::MediaType;

/// Extracts text page by page; the unit count is the page count.
pub struct PdfExtractor;

impl PdfExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextExtractor for PdfExtractor {
    fn supported_types(&self) -> &[MediaType] {
        &[MediaType::Pdf]
    }

    #[cfg(feature = "pdf")]
    async fn extract(&self, path: &Path, _media: MediaType) -> ExtractionResult<ExtractedText> {
        tracing::debug!("Extracting PDF: {}", path.display());

        let bytes = tokio::fs::read(path).await?;

        tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| super::ExtractionError::Task(e.to_string()))?
    }

    #[cfg(not(feature = "pdf"))]
    async fn extract(&self, path: &Path, _media: MediaType) -> ExtractionResult<ExtractedText> {
        tracing::warn!("PDF support not compiled in, skipping {}", path.display());
        Ok(ExtractedText::empty())
    }
}

#[cfg(feature = "pdf")]
fn extract_pages(bytes: &[u8]) -> ExtractionResult<ExtractedText> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| super::ExtractionError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());

    for page_number in pages.keys() {
        let text = match doc.extract_text(&[*page_number]) {
            Ok(text) => text.trim_end_matches('\n').to_string(),
            Err(e) => {
                tracing::debug!("No text on page {}: {}", page_number, e);
                String::new()
            }
        };
        texts.push(text);
    }

    let unit_count = u32::try_from(pages.len()).unwrap_or(u32::MAX);
    Ok(ExtractedText::new(texts.join("\n"), unit_count))
}
