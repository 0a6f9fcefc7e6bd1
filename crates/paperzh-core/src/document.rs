use serde::{Deserialize, Serialize};

use crate::{PageRange, Section};

/// Separator inserted between pages when joining them into one text.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Page-tagged text produced by a PDF backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub pages: Vec<String>,
}

impl ExtractedText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages joined with [`PAGE_SEPARATOR`].
    pub fn text(&self) -> String {
        self.pages.join(PAGE_SEPARATOR)
    }

    /// Byte offset in [`text()`](Self::text) at which each page starts.
    pub fn page_boundaries(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.pages.len());
        let mut pos = 0;
        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                pos += PAGE_SEPARATOR.len();
            }
            offsets.push(pos);
            pos += page.len();
        }
        offsets
    }

    /// `(text, page_boundaries)` in one call.
    pub fn into_parts(self) -> (String, Vec<usize>) {
        let boundaries = self.page_boundaries();
        (self.text(), boundaries)
    }
}

/// 1-based page number containing byte `offset`, given page start offsets.
pub fn page_at(boundaries: &[usize], offset: usize) -> usize {
    boundaries.partition_point(|&b| b <= offset).max(1)
}

/// One page entry of the extraction JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub page: usize,
    pub text: String,
}

/// Serialized form of a [`Section`] in the extraction JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    #[serde(default)]
    pub index: usize,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<PageRange>,
}

impl From<&Section> for SectionRecord {
    fn from(section: &Section) -> Self {
        Self {
            index: section.index,
            title: section.display_title().to_string(),
            content: section.content().to_string(),
            pages: section.pages,
        }
    }
}

impl SectionRecord {
    /// Rebuild a [`Section`]; the heading line is not recoverable.
    pub fn into_section(self, index: usize) -> Section {
        Section {
            index,
            title: self.title.trim().to_string(),
            heading: String::new(),
            body: self.content,
            pages: self.pages,
        }
    }
}

/// Structured output of the `extract` step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub source_file: String,
    #[serde(default)]
    pub backend: String,
    pub total_pages: usize,
    pub pages: Vec<PageText>,
    pub sections: Vec<SectionRecord>,
}

impl ExtractedDocument {
    pub fn new(
        source_file: impl Into<String>,
        backend: impl Into<String>,
        text: &ExtractedText,
        sections: &[Section],
    ) -> Self {
        Self {
            source_file: source_file.into(),
            backend: backend.into(),
            total_pages: text.page_count(),
            pages: text
                .pages
                .iter()
                .enumerate()
                .map(|(i, t)| PageText {
                    page: i + 1,
                    text: t.clone(),
                })
                .collect(),
            sections: sections.iter().map(SectionRecord::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_account_for_separator() {
        let text = ExtractedText::new(vec!["abc".into(), "de".into(), "f".into()]);
        assert_eq!(text.text(), "abc\n\nde\n\nf");
        assert_eq!(text.page_boundaries(), vec![0, 5, 9]);
    }

    #[test]
    fn page_at_maps_offsets_to_pages() {
        let boundaries = vec![0, 5, 9];
        assert_eq!(page_at(&boundaries, 0), 1);
        assert_eq!(page_at(&boundaries, 4), 1);
        assert_eq!(page_at(&boundaries, 5), 2);
        assert_eq!(page_at(&boundaries, 100), 3);
        assert_eq!(page_at(&[], 7), 1);
    }

    #[test]
    fn empty_extraction_has_no_boundaries() {
        let (text, boundaries) = ExtractedText::default().into_parts();
        assert!(text.is_empty());
        assert!(boundaries.is_empty());
    }

    #[test]
    fn section_record_from_original_json_shape() {
        // Older outputs carry only title/content.
        let json = r#"{"title": "Abstract", "content": "We present..."}"#;
        let record: SectionRecord = serde_json::from_str(json).unwrap();
        let section = record.into_section(1);
        assert_eq!(section.title, "Abstract");
        assert_eq!(section.body, "We present...");
        assert!(section.heading.is_empty());
    }

    #[test]
    fn document_numbers_pages_from_one() {
        let text = ExtractedText::new(vec!["one".into(), "two".into()]);
        let doc = ExtractedDocument::new("paper.pdf", "mupdf", &text, &[]);
        assert_eq!(doc.total_pages, 2);
        assert_eq!(doc.pages[1].page, 2);
        assert_eq!(doc.pages[1].text, "two");
    }
}
