use std::path::{Path, PathBuf};

use paperzh_core::ExtractedDocument;
use paperzh_parsing::Segmenter;
use paperzh_parsing::markdown::render_document;

use crate::{Extraction, IngestError};

/// Files written by [`write_extraction`].
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub markdown: PathBuf,
    pub json: PathBuf,
    pub sections: usize,
    pub pages: usize,
}

/// Segment an extraction and write `<stem>_en.md` and `<stem>_en.json`
/// into `out_dir`.
pub fn write_extraction(
    pdf_path: &Path,
    out_dir: &Path,
    extraction: &Extraction,
    segmenter: &Segmenter,
) -> Result<ExtractionOutput, IngestError> {
    std::fs::create_dir_all(out_dir).map_err(IngestError::io(out_dir))?;

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let source_file = pdf_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let sections = segmenter.segment_extracted(&extraction.text);

    let markdown = out_dir.join(format!("{stem}_en.md"));
    std::fs::write(&markdown, render_document(&sections)).map_err(IngestError::io(&markdown))?;

    let doc = ExtractedDocument::new(source_file, extraction.backend, &extraction.text, &sections);
    let json = out_dir.join(format!("{stem}_en.json"));
    std::fs::write(&json, serde_json::to_string_pretty(&doc)?).map_err(IngestError::io(&json))?;

    tracing::info!(
        markdown = %markdown.display(),
        json = %json.display(),
        sections = sections.len(),
        "wrote extraction"
    );

    Ok(ExtractionOutput {
        markdown,
        json,
        sections: sections.len(),
        pages: extraction.text.page_count(),
    })
}
