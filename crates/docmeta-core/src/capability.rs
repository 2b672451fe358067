use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::ExtractionConfig;
use crate::media::MediaType;

/// An optional runtime dependency enabling one extraction or recognition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Pdf,
    Docx,
    Ocr,
    Ner,
}

impl Capability {
    pub const ALL: [Self; 4] = [Self::Pdf, Self::Docx, Self::Ocr, Self::Ner];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Ocr => "ocr",
            Self::Ner => "ner",
        }
    }

    /// Capability a declared media type depends on
    #[must_use]
    pub const fn for_media(media: MediaType) -> Self {
        match media {
            MediaType::Pdf => Self::Pdf,
            MediaType::Docx => Self::Docx,
            MediaType::Jpeg | MediaType::Png => Self::Ocr,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable set of capability flags, probed once at start.
///
/// Extractors and recognizers branch on these flags instead of attempting
/// to use a missing dependency and recovering from the failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pdf: bool,
    docx: bool,
    ocr_binary: Option<PathBuf>,
    ner_model: Option<PathBuf>,
}

impl Capabilities {
    pub fn probe(config: &ExtractionConfig) -> Self {
        let ocr_binary = match which::which(&config.ocr_binary) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("OCR binary '{}' not available: {}", config.ocr_binary, e);
                None
            }
        };

        let ner_model = config
            .ner_model_path
            .as_ref()
            .filter(|p| p.is_file())
            .cloned();
        if ner_model.is_none() {
            tracing::debug!("No entity model installed");
        }

        let caps = Self {
            pdf: cfg!(feature = "pdf"),
            docx: cfg!(feature = "docx"),
            ocr_binary,
            ner_model,
        };
        tracing::info!("Capabilities: {}", caps.summary());
        caps
    }

    /// No optional capability at all
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_pdf(mut self, enabled: bool) -> Self {
        self.pdf = enabled && cfg!(feature = "pdf");
        self
    }

    #[must_use]
    pub const fn with_docx(mut self, enabled: bool) -> Self {
        self.docx = enabled && cfg!(feature = "docx");
        self
    }

    #[must_use]
    pub fn with_ocr_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.ocr_binary = Some(binary.into());
        self
    }

    #[must_use]
    pub fn with_ner_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.ner_model = Some(path.into());
        self
    }

    #[must_use]
    pub const fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Pdf => self.pdf,
            Capability::Docx => self.docx,
            Capability::Ocr => self.ocr_binary.is_some(),
            Capability::Ner => self.ner_model.is_some(),
        }
    }

    #[must_use]
    pub const fn supports(&self, media: MediaType) -> bool {
        self.has(Capability::for_media(media))
    }

    pub fn ocr_binary(&self) -> Option<&Path> {
        self.ocr_binary.as_deref()
    }

    pub fn ner_model(&self) -> Option<&Path> {
        self.ner_model.as_deref()
    }

    pub fn available(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }

    fn summary(&self) -> String {
        let names: Vec<&str> = self.available().iter().map(Capability::as_str).collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }
}
