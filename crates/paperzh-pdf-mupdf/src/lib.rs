use std::path::Path;

use mupdf::{Document, TextPageFlags};

use paperzh_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// Lives in its own crate so that `paperzh-ingest` built without the `pdf`
/// feature does not link mupdf (AGPL-3.0).
///
/// Text blocks in the bottom 5% (footers) and top 4% (headers) of each page
/// are dropped by default, which keeps running heads and page numbers out of
/// paragraphs that continue across a page break. Pages are returned
/// separately; blocks are separated by a blank line.
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0 to 0.5).
    /// Default 0.05. `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0 to 0.5).
    /// Default 0.04. `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

fn band_ratio(ratio: f32) -> Option<f32> {
    (ratio > 0.0).then(|| ratio.min(0.5))
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            footer_exclusion_ratio: Some(0.05),
            header_exclusion_ratio: Some(0.04),
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio, capped at half the page. Pass `0.0`
    /// to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = band_ratio(ratio);
        self
    }

    /// Set the header exclusion ratio, capped at half the page. Pass `0.0`
    /// to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = band_ratio(ratio);
        self
    }
}

/// Vertical page bands whose text is dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bands {
    header_end: Option<f32>,
    footer_start: Option<f32>,
}

impl Bands {
    /// Blocks entirely inside the header band, or starting inside the
    /// footer band.
    fn excludes(&self, block_top: f32, block_bottom: f32) -> bool {
        if let Some(end) = self.header_end
            && block_bottom <= end
        {
            return true;
        }
        matches!(self.footer_start, Some(start) if block_top >= start)
    }
}

impl MupdfBackend {
    fn bands(&self, page_top: f32, page_bottom: f32) -> Bands {
        let height = page_bottom - page_top;
        Bands {
            header_end: self.header_exclusion_ratio.map(|r| page_top + height * r),
            footer_start: self.footer_exclusion_ratio.map(|r| page_bottom - height * r),
        }
    }
}

impl PdfBackend for MupdfBackend {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        if document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            return Err(BackendError::Encrypted);
        }

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let page_bounds = page
                .bounds()
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let bands = self.bands(page_bounds.y0, page_bounds.y1);

            let mut page_text = String::new();
            for block in text_page.blocks() {
                let block_bounds = block.bounds();
                if bands.excludes(block_bounds.y0, block_bounds.y1) {
                    continue;
                }

                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
                // Keep paragraph breaks between blocks
                page_text.push('\n');
            }
            pages_text.push(page_text);
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "mupdf extraction done");
        Ok(pages_text)
    }
}
