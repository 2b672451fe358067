use std::path::Path;

use super::{ExtractedText, ExtractionResult, TextExtractor};
use crate::media::MediaType;

/// Joins the body paragraphs of a word-processing document, one per line.
pub struct DocxExtractor;

impl DocxExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextExtractor for DocxExtractor {
    fn supported_types(&self) -> &[MediaType] {
        &[MediaType::Docx]
    }

    #[cfg(feature = "docx")]
    async fn extract(&self, path: &Path, _media: MediaType) -> ExtractionResult<ExtractedText> {
        tracing::debug!("Extracting DOCX: {}", path.display());

        let bytes = tokio::fs::read(path).await?;

        tokio::task::spawn_blocking(move || extract_paragraphs(&bytes))
            .await
            .map_err(|e| super::ExtractionError::Task(e.to_string()))?
    }

    #[cfg(not(feature = "docx"))]
    async fn extract(&self, path: &Path, _media: MediaType) -> ExtractionResult<ExtractedText> {
        tracing::warn!("DOCX support not compiled in, skipping {}", path.display());
        Ok(ExtractedText::empty())
    }
}

#[cfg(feature = "docx")]
fn extract_paragraphs(bytes: &[u8]) -> ExtractionResult<ExtractedText> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let doc = docx_rs::read_docx(bytes).map_err(|e| super::ExtractionError::Docx(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in doc.document.children {
        let DocumentChild::Paragraph(paragraph) = child else {
            continue;
        };

        let mut text = String::new();
        for child in paragraph.children {
            if let ParagraphChild::Run(run) = child {
                for child in run.children {
                    if let RunChild::Text(t) = child {
                        text.push_str(&t.text);
                    }
                }
            }
        }
        paragraphs.push(text);
    }

    Ok(ExtractedText::new(paragraphs.join("\n"), 1))
}
