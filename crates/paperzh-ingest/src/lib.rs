use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

pub mod lopdf_backend;
pub mod normalize;
pub mod output;

pub use lopdf_backend::LopdfBackend;
pub use normalize::{expand_ligatures, fix_line_break_hyphenation, normalize_text};
pub use output::{ExtractionOutput, write_extraction};
// Re-export domain types for convenience
pub use paperzh_core::{BackendError, ExtractedText, PdfBackend};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("PDF not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("failed to extract text from {}: {reason}", .path.display())]
    ParseFailure { path: PathBuf, reason: String },
    #[error("unknown PDF backend: {0} (expected auto, mupdf or lopdf)")]
    UnsupportedBackend(String),
    #[cfg(not(feature = "pdf"))]
    #[error("MuPDF support not compiled in (enable the `pdf` feature of paperzh-ingest)")]
    NoPdfSupport,
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize extraction: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Which backend(s) to extract with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendChoice {
    /// MuPDF first, lopdf as fallback.
    #[default]
    Auto,
    Mupdf,
    Lopdf,
}

impl FromStr for BackendChoice {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "mupdf" => Ok(Self::Mupdf),
            "lopdf" => Ok(Self::Lopdf),
            other => Err(IngestError::UnsupportedBackend(other.to_string())),
        }
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Mupdf => "mupdf",
            Self::Lopdf => "lopdf",
        })
    }
}

/// Extraction settings, usually filled from the `[extract]` config section.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub backend: BackendChoice,
    /// MuPDF header band, as a fraction of page height.
    pub header_exclusion: Option<f32>,
    /// MuPDF footer band, as a fraction of page height.
    pub footer_exclusion: Option<f32>,
    /// Skip [`normalize_text`] and keep the backend's raw output.
    pub raw: bool,
}

/// Text extracted from one PDF, tagged with the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub backend: &'static str,
    pub text: ExtractedText,
}

impl Extraction {
    /// Apply [`normalize_text`] to every page. Page count is preserved.
    pub fn normalized(self) -> Self {
        let pages = self.text.pages.iter().map(|p| normalize_text(p)).collect();
        Self {
            backend: self.backend,
            text: ExtractedText::new(pages),
        }
    }
}

/// Runs a primary backend and, if it fails, one fallback backend.
///
/// A backend fails when it returns an error or produces no text at all.
/// The fallback result is returned unchanged; when both fail the error
/// is [`IngestError::ParseFailure`] naming both causes.
pub struct FallbackExtractor {
    primary: Box<dyn PdfBackend>,
    fallback: Option<Box<dyn PdfBackend>>,
}

impl FallbackExtractor {
    pub fn new(primary: Box<dyn PdfBackend>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn PdfBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Backend names in the order they are tried.
    pub fn backend_names(&self) -> Vec<&'static str> {
        std::iter::once(self.primary.name())
            .chain(self.fallback.as_ref().map(|b| b.name()))
            .collect()
    }

    pub fn extract(&self, path: &Path) -> Result<Extraction, IngestError> {
        if !path.is_file() {
            return Err(IngestError::InputNotFound(path.to_path_buf()));
        }

        let primary_err = match run_backend(self.primary.as_ref(), path) {
            Ok(extraction) => return Ok(extraction),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(IngestError::ParseFailure {
                path: path.to_path_buf(),
                reason: format!("{}: {}", self.primary.name(), primary_err),
            });
        };

        tracing::warn!(
            backend = self.primary.name(),
            fallback = fallback.name(),
            error = %primary_err,
            "primary backend failed, trying fallback"
        );

        run_backend(fallback.as_ref(), path).map_err(|fallback_err| IngestError::ParseFailure {
            path: path.to_path_buf(),
            reason: format!(
                "{}: {}; {}: {}",
                self.primary.name(),
                primary_err,
                fallback.name(),
                fallback_err
            ),
        })
    }
}

fn run_backend(backend: &dyn PdfBackend, path: &Path) -> Result<Extraction, BackendError> {
    let pages = backend.extract_pages(path)?;
    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(BackendError::ExtractionError("no text found".into()));
    }
    tracing::info!(backend = backend.name(), pages = pages.len(), "extracted text");
    Ok(Extraction {
        backend: backend.name(),
        text: ExtractedText::new(pages),
    })
}

#[cfg(feature = "pdf")]
fn mupdf_backend(options: &ExtractOptions) -> Result<Box<dyn PdfBackend>, IngestError> {
    let mut backend = paperzh_pdf_mupdf::MupdfBackend::default();
    if let Some(ratio) = options.header_exclusion {
        backend = backend.with_header_exclusion(ratio);
    }
    if let Some(ratio) = options.footer_exclusion {
        backend = backend.with_footer_exclusion(ratio);
    }
    Ok(Box::new(backend))
}

#[cfg(not(feature = "pdf"))]
fn mupdf_backend(_options: &ExtractOptions) -> Result<Box<dyn PdfBackend>, IngestError> {
    Err(IngestError::NoPdfSupport)
}

/// Build the extractor for `options.backend`.
///
/// `Auto` uses MuPDF with lopdf as fallback, or lopdf alone when the
/// `pdf` feature is disabled.
pub fn build_extractor(options: &ExtractOptions) -> Result<FallbackExtractor, IngestError> {
    match options.backend {
        BackendChoice::Lopdf => Ok(FallbackExtractor::new(Box::new(LopdfBackend::new()))),
        BackendChoice::Mupdf => Ok(FallbackExtractor::new(mupdf_backend(options)?)),
        BackendChoice::Auto => match mupdf_backend(options) {
            Ok(primary) => {
                Ok(FallbackExtractor::new(primary).with_fallback(Box::new(LopdfBackend::new())))
            }
            Err(_) => Ok(FallbackExtractor::new(Box::new(LopdfBackend::new()))),
        },
    }
}

/// Extract and normalize the text of a PDF.
pub fn extract_pdf(path: &Path, options: &ExtractOptions) -> Result<Extraction, IngestError> {
    let extraction = build_extractor(options)?.extract(path)?;
    if options.raw {
        Ok(extraction)
    } else {
        Ok(extraction.normalized())
    }
}
