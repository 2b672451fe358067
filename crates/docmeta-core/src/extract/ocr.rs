use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{ExtractedText, ExtractionError, ExtractionResult, TextExtractor};
use crate::media::MediaType;

/// Runs an external OCR engine (tesseract CLI) over an image.
pub struct OcrExtractor {
    binary: PathBuf,
    language: Option<String>,
}

impl OcrExtractor {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            language: None,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn build_command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(path).arg("stdout");
        if let Some(lang) = &self.language {
            cmd.arg("-l").arg(lang);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait::async_trait]
impl TextExtractor for OcrExtractor {
    fn supported_types(&self) -> &[MediaType] {
        &[MediaType::Jpeg, MediaType::Png]
    }

    async fn extract(&self, path: &Path, media: MediaType) -> ExtractionResult<ExtractedText> {
        tracing::debug!("Running OCR on {} ({})", path.display(), media);

        // The engine opens the image itself; surface a missing file as IO.
        tokio::fs::metadata(path).await?;

        let output = self.build_command(path).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(ExtractedText::new(text, 1))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::{write_failing_ocr, write_stub_ocr};

    #[tokio::test]
    async fn test_ocr_output_becomes_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let binary = write_stub_ocr(dir.path(), "INVOICE\nCall 9876543210");
        let image = dir.path().join("scan.png");
        std::fs::write(&image, b"png").unwrap();

        let out = OcrExtractor::new(binary)
            .with_language("eng")
            .extract(&image, MediaType::Png)
            .await
            .unwrap();

        assert_eq!(out.text, "INVOICE\nCall 9876543210");
        assert_eq!(out.unit_count, 1);
    }

    #[tokio::test]
    async fn test_missing_image_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let binary = write_stub_ocr(dir.path(), "unused");

        let err = OcrExtractor::new(binary)
            .extract(&dir.path().join("gone.jpg"), MediaType::Jpeg)
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[tokio::test]
    async fn test_engine_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let binary = write_failing_ocr(dir.path());
        let image = dir.path().join("scan.jpg");
        std::fs::write(&image, b"jpg").unwrap();

        let err = OcrExtractor::new(binary)
            .extract(&image, MediaType::Jpeg)
            .await
            .unwrap_err();

        match err {
            ExtractionError::Ocr(msg) => assert!(msg.contains("pixReadStream")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
