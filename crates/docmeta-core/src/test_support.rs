use std::path::{Path, PathBuf};

/// Write a PDF with `pages` blank pages to `path`.
#[cfg(feature = "pdf")]
pub fn write_blank_pdf(path: &Path, pages: u32) {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::from(pages),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Write a DOCX whose body holds one paragraph per entry of `paragraphs`.
#[cfg(feature = "docx")]
pub fn write_docx(path: &Path, paragraphs: &[&str]) {
    use docx_rs::{Docx, Paragraph, Run};

    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });

    let file = std::fs::File::create(path).unwrap();
    docx.build().pack(file).unwrap();
}

/// Write an executable that ignores its arguments and prints `output`,
/// standing in for an OCR engine.
#[cfg(unix)]
pub fn write_stub_ocr(dir: &Path, output: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-tesseract");
    let script = format!("#!/bin/sh\ncat <<'OCR'\n{output}\nOCR\n");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Write an executable that fails the way an OCR engine does on a bad image.
#[cfg(unix)]
pub fn write_failing_ocr(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("broken-tesseract");
    std::fs::write(&path, "#!/bin/sh\necho 'Error in pixReadStream' >&2\nexit 1\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
