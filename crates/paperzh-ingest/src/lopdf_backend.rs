use std::path::Path;

use lopdf::Document;

use paperzh_core::{BackendError, PdfBackend};

/// Pure-Rust [`PdfBackend`] built on `lopdf`.
///
/// Text comes straight from each page's content stream, without layout
/// analysis, so it is used as the fallback when MuPDF is unavailable or
/// rejects a file.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let doc = Document::load(path).map_err(|e| BackendError::OpenError(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(BackendError::Encrypted);
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(BackendError::ExtractionError("document has no pages".into()));
        }

        let mut texts = Vec::with_capacity(pages.len());
        for page_num in pages.keys() {
            let text = doc
                .extract_text(&[*page_num])
                .map_err(|e| BackendError::ExtractionError(format!("page {page_num}: {e}")))?;
            texts.push(text);
        }
        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_open_error() {
        let err = LopdfBackend::new()
            .extract_pages(Path::new("/no/such/file.pdf"))
            .unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }

    #[test]
    fn test_garbage_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        assert!(LopdfBackend::new().extract_pages(&path).is_err());
    }
}
