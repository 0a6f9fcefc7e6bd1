use std::path::PathBuf;

use thiserror::Error;

pub mod docx;
pub mod export;
pub mod types;

pub use export::{ExportStats, export_document, render};
pub use types::{
    DEFAULT_SUBTITLE, DEFAULT_TITLE, ENGLISH_REFERENCE, ExportFormat, PENDING_NOTE,
    ReportDocument, ReportSection,
};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("section not found: {0}")]
    SectionNotFound(String),
    #[error("unsupported export format: {0} (expected docx, md, html, json or txt)")]
    UnsupportedFormat(String),
    #[error("failed to build DOCX: {0}")]
    Docx(String),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
