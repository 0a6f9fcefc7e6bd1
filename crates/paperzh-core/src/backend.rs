use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors return the raw text of every page in document order; the
/// fallback policy, text normalization and section detection live in
/// `paperzh_ingest` and `paperzh_parsing`.
pub trait PdfBackend: Send + Sync {
    /// Short identifier used in logs and in the extraction JSON.
    fn name(&self) -> &'static str;

    /// Extract the text of each page of a PDF file.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;
}
