use std::fmt;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod document;

pub use backend::{BackendError, PdfBackend};
pub use document::{ExtractedDocument, ExtractedText, PAGE_SEPARATOR, PageText, SectionRecord};

/// Title shown for the untitled text that precedes the first heading.
pub const PREAMBLE_TITLE: &str = "Preface";

/// Inclusive, 1-based span of PDF pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "p. {}", self.start)
        } else {
            write!(f, "pp. {}-{}", self.start, self.end)
        }
    }
}

/// A titled contiguous span of document text.
///
/// `heading` holds the raw heading line (line terminator included) that
/// opened the section and is empty for a preamble or for sections read back
/// from Markdown. `heading + body` is the exact source text of the section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// 1-based position in document order.
    pub index: usize,
    /// Normalized title; empty for the preamble.
    pub title: String,
    pub heading: String,
    pub body: String,
    pub pages: Option<PageRange>,
}

impl Section {
    pub fn is_preamble(&self) -> bool {
        self.title.is_empty()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            PREAMBLE_TITLE
        } else {
            &self.title
        }
    }

    /// Body with surrounding whitespace removed.
    pub fn content(&self) -> &str {
        self.body.trim()
    }

    /// The exact input span this section was cut from.
    pub fn source_text(&self) -> String {
        format!("{}{}", self.heading, self.body)
    }
}

/// One English → Chinese terminology mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Where a section's Chinese text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Human,
    Placeholder,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved translation of a single section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub section_index: usize,
    pub title: String,
    pub text: String,
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, heading: &str, body: &str) -> Section {
        Section {
            index: 1,
            title: title.to_string(),
            heading: heading.to_string(),
            body: body.to_string(),
            pages: None,
        }
    }

    #[test]
    fn preamble_uses_placeholder_title() {
        let s = section("", "", "Some leading text.\n");
        assert!(s.is_preamble());
        assert_eq!(s.display_title(), "Preface");
        assert_eq!(s.content(), "Some leading text.");
    }

    #[test]
    fn source_text_joins_heading_and_body() {
        let s = section("Abstract", "1. Abstract\n", "Body.\n");
        assert_eq!(s.source_text(), "1. Abstract\nBody.\n");
        assert_eq!(s.display_title(), "Abstract");
    }

    #[test]
    fn page_range_display() {
        assert_eq!(PageRange { start: 3, end: 3 }.to_string(), "p. 3");
        assert_eq!(PageRange { start: 2, end: 5 }.to_string(), "pp. 2-5");
    }

    #[test]
    fn provenance_serializes_lowercase() {
        let json = serde_json::to_string(&Provenance::Placeholder).unwrap();
        assert_eq!(json, "\"placeholder\"");
        let back: Provenance = serde_json::from_str("\"human\"").unwrap();
        assert_eq!(back, Provenance::Human);
    }
}
