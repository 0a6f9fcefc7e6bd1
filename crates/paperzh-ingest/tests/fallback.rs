use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use paperzh_ingest::{
    BackendError, ExtractedText, FallbackExtractor, IngestError, PdfBackend, write_extraction,
};
use paperzh_parsing::Segmenter;

/// Backend that always fails the way a corrupt PDF does.
struct CorruptBackend {
    calls: Arc<AtomicUsize>,
}

impl PdfBackend for CorruptBackend {
    fn name(&self) -> &'static str {
        "corrupt"
    }

    fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::OpenError("xref table damaged".into()))
    }
}

/// Backend that returns fixed pages.
struct FixedBackend {
    name: &'static str,
    pages: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl FixedBackend {
    fn new(name: &'static str, pages: &[&str]) -> Self {
        Self {
            name,
            pages: pages.iter().map(|p| p.to_string()).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PdfBackend for FixedBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.clone())
    }
}

fn dummy_pdf(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("paper.pdf");
    std::fs::write(&path, b"%PDF-1.7\n").unwrap();
    path
}

#[test]
fn fallback_result_matches_secondary_backend_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dummy_pdf(dir.path());

    let pages = ["Abstract\nWe present Dilithium.\n", "1 Introduction\nLattices.\n"];
    let expected = FixedBackend::new("b", &pages).extract_pages(&pdf).unwrap();

    let primary_calls = Arc::new(AtomicUsize::new(0));
    let extractor = FallbackExtractor::new(Box::new(CorruptBackend {
        calls: primary_calls.clone(),
    }))
    .with_fallback(Box::new(FixedBackend::new("b", &pages)));

    let extraction = extractor.extract(&pdf).unwrap();
    assert_eq!(extraction.backend, "b");
    assert_eq!(extraction.text, ExtractedText::new(expected));
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn primary_success_skips_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dummy_pdf(dir.path());

    let fallback = FixedBackend::new("b", &["fallback text"]);
    let fallback_calls = fallback.calls.clone();
    let extractor = FallbackExtractor::new(Box::new(FixedBackend::new("a", &["primary text"])))
        .with_fallback(Box::new(fallback));

    let extraction = extractor.extract(&pdf).unwrap();
    assert_eq!(extraction.backend, "a");
    assert_eq!(extraction.text.pages, vec!["primary text".to_string()]);
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_primary_output_triggers_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dummy_pdf(dir.path());

    let extractor = FallbackExtractor::new(Box::new(FixedBackend::new("a", &["  \n", ""])))
        .with_fallback(Box::new(FixedBackend::new("b", &["text"])));
    assert_eq!(extractor.extract(&pdf).unwrap().backend, "b");
}

#[test]
fn both_backends_failing_is_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dummy_pdf(dir.path());

    let extractor = FallbackExtractor::new(Box::new(CorruptBackend {
        calls: Arc::new(AtomicUsize::new(0)),
    }))
    .with_fallback(Box::new(FixedBackend::new("empty", &[])));

    match extractor.extract(&pdf).unwrap_err() {
        IngestError::ParseFailure { path, reason } => {
            assert_eq!(path, pdf);
            assert!(reason.contains("corrupt: failed to open PDF: xref table damaged"));
            assert!(reason.contains("empty: failed to extract text: no text found"));
        }
        other => panic!("expected ParseFailure, got {other:?}"),
    }
}

#[test]
fn missing_input_never_reaches_backends() {
    let calls = Arc::new(AtomicUsize::new(0));
    let extractor = FallbackExtractor::new(Box::new(CorruptBackend {
        calls: calls.clone(),
    }));
    let err = extractor.extract(Path::new("/no/such/paper.pdf")).unwrap_err();
    assert!(matches!(err, IngestError::InputNotFound(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn fallback_extraction_feeds_segmentation_output() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dummy_pdf(dir.path());

    let extractor = FallbackExtractor::new(Box::new(CorruptBackend {
        calls: Arc::new(AtomicUsize::new(0)),
    }))
    .with_fallback(Box::new(FixedBackend::new(
        "b",
        &["1. Abstract\nThis is a signature scheme.\n2. Introduction\nIt uses lattice problems."],
    )));
    let extraction = extractor.extract(&pdf).unwrap().normalized();

    let out_dir = dir.path().join("out");
    let out = write_extraction(&pdf, &out_dir, &extraction, &Segmenter::new()).unwrap();
    assert_eq!(out.sections, 2);

    let md = std::fs::read_to_string(out.markdown).unwrap();
    assert_eq!(
        md,
        "# Abstract\n\nThis is a signature scheme.\n\n# Introduction\n\nIt uses lattice problems.\n\n"
    );
}
