pub mod capabilities;
pub mod extract;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use docmeta_core::ExtractionConfig;

#[derive(Parser)]
#[command(
    name = "docmeta",
    about = "Extract contact details, dates and named entities from documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which optional extraction capabilities are available
    Capabilities {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Extract metadata from one or more uploaded files
    Extract {
        /// File path(s) to process
        #[arg(required = true)]
        paths: Vec<String>,
        /// Declared media type (guessed from the extension when omitted)
        #[arg(long = "type")]
        media_type: Option<String>,
        /// Pretty-print JSON reports
        #[arg(long)]
        pretty: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Overrides for settings otherwise read from the environment
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Entity model file (JSON gazetteer)
    #[arg(long = "model")]
    pub model: Option<PathBuf>,
    /// OCR executable
    #[arg(long = "ocr-binary")]
    pub ocr_binary: Option<String>,
    /// OCR language code
    #[arg(long = "ocr-lang")]
    pub ocr_lang: Option<String>,
    /// Maximum accepted file size in bytes
    #[arg(long = "max-size")]
    pub max_size: Option<u64>,
}

impl ConfigArgs {
    pub fn resolve(&self) -> ExtractionConfig {
        let mut config = ExtractionConfig::from_env();
        if let Some(model) = &self.model {
            config = config.with_model_path(model);
        }
        if let Some(binary) = &self.ocr_binary {
            config = config.with_ocr_binary(binary);
        }
        if let Some(lang) = &self.ocr_lang {
            config = config.with_ocr_language(lang);
        }
        if let Some(max) = self.max_size {
            config = config.with_max_upload_bytes(max);
        }
        config
    }
}
