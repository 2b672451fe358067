use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::Serialize;

use docmeta_core::{ExtractionConfig, ExtractionPipeline, ExtractionReport, MediaType, UploadPolicy};

#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a str,
    #[serde(flatten)]
    report: &'a ExtractionReport,
}

pub async fn run(
    paths: &[String],
    media_type: Option<&str>,
    pretty: bool,
    config: &ExtractionConfig,
) -> Result<()> {
    let policy = UploadPolicy::new(config.max_upload_bytes);

    let mut uploads = Vec::with_capacity(paths.len());
    let mut names = HashMap::new();
    for path_str in paths {
        let path = Path::new(path_str);
        let declared = declared_type(path, media_type)?;
        tracing::debug!("Validating {} as {}", path.display(), declared);

        let upload = match policy.inspect(path, &declared).await {
            Ok(upload) => upload,
            Err(e) => bail!("{}: {e}", path.display()),
        };
        names.insert(upload.id, path_str.as_str());
        uploads.push(upload);
    }

    let pipeline = Arc::new(ExtractionPipeline::new(config)?);
    let batch = pipeline.process_batch(uploads).await;

    for report in &batch.successful {
        let file = names.get(&report.upload_id).copied().unwrap_or_default();
        let out = FileReport { file, report };
        let json = if pretty {
            serde_json::to_string_pretty(&out)?
        } else {
            serde_json::to_string(&out)?
        };
        println!("{json}");
    }

    for failure in &batch.failed {
        let file = names.get(&failure.upload_id()).copied().unwrap_or_default();
        eprintln!("Failed: {file}: {}", failure.cause());
    }

    if batch.failure_count() > 0 {
        bail!(
            "{} of {} files failed",
            batch.failure_count(),
            batch.failure_count() + batch.success_count()
        );
    }

    Ok(())
}

fn declared_type(path: &Path, explicit: Option<&str>) -> Result<String> {
    if let Some(mime) = explicit {
        return Ok(mime.to_string());
    }

    let media = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(MediaType::from_extension);

    match media {
        Some(media) => Ok(media.as_mime().to_string()),
        None => bail!(
            "cannot determine the type of {}; pass --type",
            path.display()
        ),
    }
}
