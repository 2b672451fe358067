use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::capability::Capabilities;
use crate::config::ExtractionConfig;
use crate::extract::{ExtractedText, ExtractionError, MediaTypeExtractor, TextExtractor};
use crate::metadata::{ExtractionMetadata, ExtractionStats};
use crate::recognize::{EntityRecognizer, PatternRecognizer};
use crate::upload::UploadRecord;

/// The single failure outcome of processing one upload
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Upload {upload_id}: file unreadable: {source}")]
    Io {
        upload_id: Uuid,
        #[source]
        source: std::io::Error,
    },
    #[error("Upload {upload_id}: processing failed: {cause}")]
    Failed { upload_id: Uuid, cause: String },
}

impl ProcessingError {
    fn from_extraction(upload_id: Uuid, err: ExtractionError) -> Self {
        match err {
            ExtractionError::Io(source) => Self::Io { upload_id, source },
            other => Self::Failed {
                upload_id,
                cause: other.to_string(),
            },
        }
    }

    fn from_join(upload_id: Uuid, err: JoinError) -> Self {
        let cause = if err.is_panic() {
            let payload = err.into_panic();
            payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "task panicked".to_string())
        } else {
            err.to_string()
        };
        Self::Failed { upload_id, cause }
    }

    pub const fn upload_id(&self) -> Uuid {
        match self {
            Self::Io { upload_id, .. } | Self::Failed { upload_id, .. } => *upload_id,
        }
    }

    /// Human-readable cause, without the upload prefix
    pub fn cause(&self) -> String {
        match self {
            Self::Io { source, .. } => source.to_string(),
            Self::Failed { cause, .. } => cause.clone(),
        }
    }

    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Metadata and stats for one upload, ready to hand to storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub upload_id: Uuid,
    pub metadata: ExtractionMetadata,
    pub stats: ExtractionStats,
}

pub struct ExtractionPipeline {
    extractor: Box<dyn TextExtractor>,
    patterns: Arc<PatternRecognizer>,
    entities: Arc<EntityRecognizer>,
    capabilities: Capabilities,
}

impl ExtractionPipeline {
    /// Probe capabilities and share the process-wide entity recognizer.
    pub fn new(config: &ExtractionConfig) -> crate::Result<Self> {
        let capabilities = Capabilities::probe(config);
        let entities = EntityRecognizer::process_wide(&capabilities);

        Ok(Self {
            extractor: Box::new(MediaTypeExtractor::from_capabilities(
                &capabilities,
                config.ocr_language.as_deref(),
            )),
            patterns: Arc::new(PatternRecognizer::new()?),
            entities,
            capabilities,
        })
    }

    /// Build a pipeline with its own entity recognizer for `capabilities`.
    pub fn from_capabilities(capabilities: Capabilities) -> crate::Result<Self> {
        Ok(Self {
            extractor: Box::new(MediaTypeExtractor::from_capabilities(&capabilities, None)),
            patterns: Arc::new(PatternRecognizer::new()?),
            entities: Arc::new(EntityRecognizer::from_capabilities(&capabilities)),
            capabilities,
        })
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_entity_recognizer(mut self, entities: Arc<EntityRecognizer>) -> Self {
        self.entities = entities;
        self
    }

    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub async fn process(&self, upload: &UploadRecord) -> Result<ExtractionReport, ProcessingError> {
        let start = Instant::now();

        let extracted = self
            .extract(upload)
            .await
            .map_err(|e| ProcessingError::from_extraction(upload.id, e))?;

        let metadata = self.recognize(upload.id, extracted.text).await?;
        let stats = ExtractionStats::from_elapsed(extracted.unit_count, start.elapsed());

        tracing::info!(
            "Processed upload {}: {} units, {} values in {}s",
            upload.id,
            stats.unit_count,
            metadata.value_count(),
            stats.elapsed_seconds
        );

        Ok(ExtractionReport {
            upload_id: upload.id,
            metadata,
            stats,
        })
    }

    async fn extract(&self, upload: &UploadRecord) -> Result<ExtractedText, ExtractionError> {
        let Some(media) = upload.media_type() else {
            tracing::debug!(
                "Upload {} has undeclared or unsupported type '{}'",
                upload.id,
                upload.declared_media_type
            );
            return Ok(ExtractedText::empty());
        };

        self.extractor.extract(&upload.stored_path, media).await
    }

    /// Run both recognizers over the same text and merge, entities last.
    async fn recognize(&self, upload_id: Uuid, text: String) -> Result<ExtractionMetadata, ProcessingError> {
        let patterns = Arc::clone(&self.patterns);
        let entities = Arc::clone(&self.entities);

        tokio::task::spawn_blocking(move || {
            let pattern_matches = patterns.recognize(&text);
            let entity_matches = entities.recognize(&text);

            ExtractionMetadata::new()
                .merged(pattern_matches)
                .merged(entity_matches)
        })
        .await
        .map_err(|e| ProcessingError::from_join(upload_id, e))
    }

    /// Process several uploads concurrently. A failure for one upload never
    /// affects the others.
    pub async fn process_batch(self: &Arc<Self>, uploads: Vec<UploadRecord>) -> BatchReport {
        let handles: Vec<_> = uploads
            .into_iter()
            .map(|upload| {
                let pipeline = Arc::clone(self);
                let upload_id = upload.id;
                let handle = tokio::spawn(async move { pipeline.process(&upload).await });
                (upload_id, handle)
            })
            .collect();

        let mut report = BatchReport::new();
        for (upload_id, handle) in handles {
            match handle.await {
                Ok(Ok(output)) => report.add_success(output),
                Ok(Err(e)) => report.add_failure(e),
                Err(e) => report.add_failure(ProcessingError::from_join(upload_id, e)),
            }
        }

        report
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub successful: Vec<ExtractionReport>,
    pub failed: Vec<ProcessingError>,
}

impl BatchReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add_success(&mut self, report: ExtractionReport) {
        self.successful.push(report);
    }

    fn add_failure(&mut self, error: ProcessingError) {
        tracing::warn!("{}", error);
        self.failed.push(error);
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total_units(&self) -> u64 {
        self.successful
            .iter()
            .map(|r| u64::from(r.stats.unit_count))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionResult;
    use crate::media::MediaType;
    use crate::recognize::{EntityModel, EntitySpan};
    use std::path::Path;

    const CATEGORIES: [&str; 6] = ["dates", "emails", "locations", "names", "organizations", "phones"];

    /// Treats every upload as a plain text file.
    struct PlainTextExtractor;

    #[async_trait::async_trait]
    impl TextExtractor for PlainTextExtractor {
        fn supported_types(&self) -> &[MediaType] {
            &MediaType::ALL
        }

        async fn extract(&self, path: &Path, _media: MediaType) -> ExtractionResult<ExtractedText> {
            let text = tokio::fs::read_to_string(path).await?;
            Ok(ExtractedText::new(text, 1))
        }
    }

    struct PanickingModel;

    impl EntityModel for PanickingModel {
        fn name(&self) -> &str {
            "panicking"
        }

        fn predict(&self, _text: &str) -> Vec<EntitySpan> {
            panic!("tagger exploded")
        }
    }

    fn bare_pipeline() -> ExtractionPipeline {
        ExtractionPipeline::from_capabilities(Capabilities::none()).unwrap()
    }

    fn assert_all_categories(metadata: &ExtractionMetadata) {
        let categories: Vec<&str> = metadata.categories().collect();
        assert_eq!(categories, CATEGORIES);
    }

    #[tokio::test]
    async fn test_missing_capability_degrades() {
        let pipeline = bare_pipeline();
        let upload = UploadRecord::new("/nonexistent/docmeta/scan.png", "image/png");

        let report = pipeline.process(&upload).await.unwrap();

        assert_eq!(report.upload_id, upload.id);
        assert_eq!(report.stats.unit_count, 0);
        assert!(report.metadata.is_empty());
        assert_all_categories(&report.metadata);
    }

    #[tokio::test]
    async fn test_unknown_type_yields_empty_metadata() {
        let pipeline = bare_pipeline();
        let upload = UploadRecord::new("/tmp/notes.txt", "text/plain");

        let report = pipeline.process(&upload).await.unwrap();

        assert_eq!(report.stats.unit_count, 0);
        assert_all_categories(&report.metadata);
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_unreadable_pdf_is_io_failure() {
        let pipeline = ExtractionPipeline::from_capabilities(Capabilities::none().with_pdf(true)).unwrap();
        let upload = UploadRecord::new("/nonexistent/docmeta/report.pdf", "application/pdf");

        let err = pipeline.process(&upload).await.unwrap_err();

        assert!(err.is_io());
        assert_eq!(err.upload_id(), upload.id);
        assert!(!err.cause().is_empty());
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_blank_pdf_reports_pages_without_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blank.pdf");
        crate::test_support::write_blank_pdf(&path, 2);

        let pipeline = ExtractionPipeline::from_capabilities(Capabilities::none().with_pdf(true)).unwrap();
        let report = pipeline
            .process(&UploadRecord::new(&path, "application/pdf"))
            .await
            .unwrap();

        assert_eq!(report.stats.unit_count, 2);
        assert!(report.metadata.is_empty());
        assert_all_categories(&report.metadata);
    }

    #[cfg(feature = "docx")]
    #[tokio::test]
    async fn test_docx_contact_details() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("contact.docx");
        crate::test_support::write_docx(
            &path,
            &["Contact John at john@example.com or 9876543210", "Joined on 25/12/2023"],
        );

        let pipeline = ExtractionPipeline::from_capabilities(Capabilities::none().with_docx(true)).unwrap();
        let report = pipeline
            .process(&UploadRecord::new(&path, crate::media::DOCX_MIME))
            .await
            .unwrap();

        assert_eq!(report.stats.unit_count, 1);
        assert!(report.metadata.contains("emails", "john@example.com"));
        assert!(report.metadata.contains("phones", "+91-9876543210"));
        assert!(report.metadata.contains("dates", "2023-12-25"));
    }

    #[tokio::test]
    async fn test_entities_merged_with_patterns() {
        let dir = tempfile::TempDir::new().unwrap();
        let text_path = dir.path().join("scan.png");
        std::fs::write(&text_path, "Priya Nair of Initech, Bengaluru. priya@initech.in").unwrap();
        let model_path = dir.path().join("model.json");
        std::fs::write(
            &model_path,
            r#"{"entities": {"PERSON": ["Priya Nair"], "ORG": ["Initech"], "GPE": ["Bengaluru"]}}"#,
        )
        .unwrap();

        let pipeline = ExtractionPipeline::from_capabilities(Capabilities::none().with_ner_model(&model_path))
            .unwrap()
            .with_extractor(Box::new(PlainTextExtractor));

        let report = pipeline
            .process(&UploadRecord::new(&text_path, "image/png"))
            .await
            .unwrap();

        assert!(report.metadata.contains("names", "Priya Nair"));
        assert!(report.metadata.contains("organizations", "Initech"));
        assert!(report.metadata.contains("locations", "Bengaluru"));
        assert!(report.metadata.contains("emails", "priya@initech.in"));
        assert_all_categories(&report.metadata);
    }

    #[tokio::test]
    async fn test_recognizer_panic_reported_as_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, "some text").unwrap();

        let entities = EntityRecognizer::with_loader(|| Ok(Arc::new(PanickingModel) as Arc<dyn EntityModel>));
        let pipeline = bare_pipeline()
            .with_extractor(Box::new(PlainTextExtractor))
            .with_entity_recognizer(Arc::new(entities));

        let err = pipeline
            .process(&UploadRecord::new(&path, "image/png"))
            .await
            .unwrap_err();

        assert!(!err.is_io());
        assert!(err.cause().contains("tagger exploded"));
    }

    #[tokio::test]
    async fn test_elapsed_has_two_decimals() {
        let pipeline = bare_pipeline();
        let report = pipeline
            .process(&UploadRecord::new("/tmp/x.jpg", "image/jpeg"))
            .await
            .unwrap();

        let (whole, fraction) = report.stats.elapsed_seconds.split_once('.').unwrap();
        assert!(whole.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(fraction.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_uploads_stay_separate() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut uploads = Vec::new();
        for i in 0..8 {
            let path = dir.path().join(format!("upload-{i}.png"));
            std::fs::write(&path, format!("Reach user{i}@example.com on {:02}/01/2024", i + 1)).unwrap();
            uploads.push(UploadRecord::new(&path, "image/png"));
        }
        uploads.push(UploadRecord::new(dir.path().join("missing.png"), "image/png"));
        let missing_id = uploads[8].id;

        let pipeline = Arc::new(bare_pipeline().with_extractor(Box::new(PlainTextExtractor)));
        let batch = pipeline.process_batch(uploads.clone()).await;

        assert_eq!(batch.success_count(), 8);
        assert_eq!(batch.failure_count(), 1);
        assert_eq!(batch.failed[0].upload_id(), missing_id);
        assert!(batch.failed[0].is_io());
        assert_eq!(batch.total_units(), 8);

        for (i, report) in batch.successful.iter().enumerate() {
            assert_eq!(report.upload_id, uploads[i].id);
            let emails = report.metadata.get("emails").unwrap();
            assert_eq!(emails.len(), 1);
            assert!(emails.contains(&format!("user{i}@example.com")));
            assert!(report.metadata.contains("dates", &format!("2024-01-{:02}", i + 1)));
        }
    }

    #[test]
    fn test_report_serialization() {
        let report = ExtractionReport {
            upload_id: Uuid::nil(),
            metadata: ExtractionMetadata::new(),
            stats: ExtractionStats::from_elapsed(1, std::time::Duration::from_millis(50)),
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["stats"]["unit_count"], 1);
        assert_eq!(json["stats"]["elapsed_seconds"], "0.05");
        assert!(json["metadata"].as_object().unwrap().is_empty());
    }
}
