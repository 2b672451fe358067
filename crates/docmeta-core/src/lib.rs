#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod capability;
pub mod config;
pub mod error;
pub mod extract;
pub mod media;
pub mod metadata;
pub mod pipeline;
pub mod recognize;
pub mod upload;

pub use capability::{Capabilities, Capability};
pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use extract::{
    DocxExtractor, ExtractedText, ExtractionError, ExtractionResult, MediaTypeExtractor,
    OcrExtractor, PdfExtractor, TextExtractor,
};
pub use media::MediaType;
pub use metadata::{ExtractionMetadata, ExtractionStats, MetadataFields};
pub use pipeline::{BatchReport, ExtractionPipeline, ExtractionReport, ProcessingError};
pub use recognize::{
    normalize_date, normalize_phone, EntityLabel, EntityMatches, EntityModel, EntityRecognizer,
    EntitySpan, GazetteerModel, ModelError, PatternMatches, PatternRecognizer,
};
pub use upload::{OwnerMetadata, UploadError, UploadPolicy, UploadRecord};

#[cfg(test)]
pub(crate) mod test_support;
