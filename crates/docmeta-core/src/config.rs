use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest upload accepted by [`crate::UploadPolicy`] unless overridden.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const DEFAULT_OCR_BINARY: &str = "tesseract";

/// Settings for capability probing and upload validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Gazetteer model file used for entity recognition
    #[serde(default)]
    pub ner_model_path: Option<PathBuf>,
    /// OCR executable name or path, resolved through `PATH`
    #[serde(default = "default_ocr_binary")]
    pub ocr_binary: String,
    /// Language passed to the OCR engine with `-l`
    #[serde(default)]
    pub ocr_language: Option<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_ocr_binary() -> String {
    DEFAULT_OCR_BINARY.to_string()
}

const fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ner_model_path: default_model_path(),
            ocr_binary: default_ocr_binary(),
            ocr_language: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ExtractionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            ner_model_path: std::env::var_os("DOCMETA_NER_MODEL")
                .map(PathBuf::from)
                .or(defaults.ner_model_path),
            ocr_binary: std::env::var("DOCMETA_TESSERACT")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.ocr_binary),
            ocr_language: std::env::var("DOCMETA_OCR_LANG")
                .ok()
                .filter(|v| !v.is_empty()),
            max_upload_bytes: std::env::var("DOCMETA_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }

    #[must_use]
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ner_model_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_ocr_binary(mut self, binary: impl Into<String>) -> Self {
        self.ocr_binary = binary.into();
        self
    }

    #[must_use]
    pub fn with_ocr_language(mut self, language: impl Into<String>) -> Self {
        self.ocr_language = Some(language.into());
        self
    }

    #[must_use]
    pub const fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

fn default_model_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("docmeta").join("ner-model.json"))
}
