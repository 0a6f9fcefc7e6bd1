use paperzh_core::document::page_at;
use paperzh_core::{ExtractedText, PageRange, Section};

use crate::config::SegmenterConfig;
use crate::rules::{HeadingMatch, HeadingRule, default_rules};

/// Splits document text into [`Section`]s at recognized heading lines.
///
/// Segmentation is lossless: concatenating `heading + body` of every
/// returned section reproduces the input byte for byte. Heading lines are
/// never part of a body.
#[derive(Debug, Clone)]
pub struct Segmenter {
    rules: Vec<HeadingRule>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

struct OpenSection {
    title: String,
    heading: String,
    body: String,
    start: usize,
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    pub fn with_config(config: &SegmenterConfig) -> Self {
        Self {
            rules: config.resolved_rules(),
        }
    }

    pub fn rules(&self) -> &[HeadingRule] {
        &self.rules
    }

    /// The first rule (in priority order) that claims `line`, if any.
    pub fn classify(&self, line: &str) -> Option<HeadingMatch<'_>> {
        let line = line.trim_end_matches(['\n', '\r']);
        self.rules.iter().find_map(|rule| rule.apply(line))
    }

    /// Segment plain text; sections carry no page range.
    pub fn segment(&self, text: &str) -> Vec<Section> {
        self.segment_with_boundaries(text, &[])
    }

    /// Segment page-tagged text, recording the pages each section spans.
    pub fn segment_extracted(&self, extracted: &ExtractedText) -> Vec<Section> {
        let (text, boundaries) = extracted.clone().into_parts();
        self.segment_with_boundaries(&text, &boundaries)
    }

    /// Segment `text` whose pages start at the byte offsets in `boundaries`.
    pub fn segment_with_boundaries(&self, text: &str, boundaries: &[usize]) -> Vec<Section> {
        let mut sections = Vec::new();
        if text.is_empty() {
            return sections;
        }

        let mut current = OpenSection {
            title: String::new(),
            heading: String::new(),
            body: String::new(),
            start: 0,
        };
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            if let Some(heading) = self.classify(line) {
                tracing::debug!(rule = heading.rule, title = %heading.title, offset, "heading");
                let next = OpenSection {
                    title: heading.title,
                    heading: line.to_string(),
                    body: String::new(),
                    start: offset,
                };
                let done = std::mem::replace(&mut current, next);
                push_section(&mut sections, done, boundaries);
            } else {
                current.body.push_str(line);
            }
            offset += line.len();
        }
        push_section(&mut sections, current, boundaries);

        tracing::debug!(sections = sections.len(), "segmentation complete");
        sections
    }
}

fn push_section(sections: &mut Vec<Section>, open: OpenSection, boundaries: &[usize]) {
    // An empty preamble (text starts with a heading) produces nothing.
    if open.heading.is_empty() && open.body.is_empty() {
        return;
    }

    let pages = if boundaries.is_empty() {
        None
    } else {
        let source_len = open.heading.len() + open.body.len();
        let trailing_ws = open.body.len() - open.body.trim_end().len();
        let last = if source_len > trailing_ws {
            open.start + source_len - trailing_ws - 1
        } else {
            open.start
        };
        Some(PageRange {
            start: page_at(boundaries, open.start),
            end: page_at(boundaries, last),
        })
    };

    sections.push(Section {
        index: sections.len() + 1,
        title: open.title,
        heading: open.heading,
        body: open.body,
        pages,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegmenterConfigBuilder;

    fn rejoin(sections: &[Section]) -> String {
        sections.iter().map(Section::source_text).collect()
    }

    #[test]
    fn test_numbered_abstract_and_introduction() {
        let text =
            "1. Abstract\nThis is a signature scheme.\n2. Introduction\nIt uses lattice problems.";
        let sections = Segmenter::new().segment(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].index, 1);
        assert_eq!(sections[0].title, "Abstract");
        assert_eq!(sections[0].body, "This is a signature scheme.\n");
        assert_eq!(sections[1].index, 2);
        assert_eq!(sections[1].title, "Introduction");
        assert_eq!(sections[1].body, "It uses lattice problems.");
        assert_eq!(rejoin(&sections), text);
    }

    #[test]
    fn test_preamble_before_first_heading() {
        let text = "CRYSTALS-DILITHIUM\nAuthors et al.\n\nAbstract\nWe present Dilithium.\n";
        let sections = Segmenter::new().segment(text);
        assert_eq!(sections.len(), 2);
        // The all-caps title line is itself a heading
        assert_eq!(sections[0].title, "CRYSTALS-DILITHIUM");
        assert_eq!(sections[0].body, "Authors et al.\n\n");
        assert_eq!(sections[1].title, "Abstract");
        assert_eq!(rejoin(&sections), text);

        let text = "Lattice-based signatures\nwith short keys.\nAbstract\nBody.\n";
        let sections = Segmenter::new().segment(text);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].is_preamble());
        assert_eq!(sections[0].body, "Lattice-based signatures\nwith short keys.\n");
        assert_eq!(sections[1].index, 2);
        assert_eq!(rejoin(&sections), text);
    }

    #[test]
    fn test_no_heading_yields_single_section() {
        let text = "just some text\nwithout any headings at all.\n";
        let sections = Segmenter::new().segment(text);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_preamble());
        assert_eq!(sections[0].body, text);
    }

    #[test]
    fn test_empty_text_yields_no_sections() {
        assert!(Segmenter::new().segment("").is_empty());
    }

    #[test]
    fn test_whitespace_only_text_is_kept() {
        let sections = Segmenter::new().segment("\n\n  \n");
        assert_eq!(sections.len(), 1);
        assert_eq!(rejoin(&sections), "\n\n  \n");
    }

    #[test]
    fn test_consecutive_headings_produce_empty_bodies() {
        let text = "Abstract\n1 Introduction\nText.\r\nReferences\n";
        let sections = Segmenter::new().segment(text);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Abstract", "Introduction", "References"]);
        assert_eq!(sections[0].body, "");
        assert_eq!(sections[1].body, "Text.\r\n");
        assert_eq!(sections[2].heading, "References\n");
        assert_eq!(rejoin(&sections), text);
    }

    #[test]
    fn test_lossless_on_varied_inputs() {
        let inputs = [
            "no trailing newline",
            "Abstract",
            "\nAbstract\n\n\nIntroduction",
            "Preface text.\n\n3 Basic Operations\nx\n\nAPPENDIX\n\u{4e2d}\u{6587}\n",
            "1. Abstract\r\nCRLF body\r\n2. Introduction\r\n",
            "  Indented Abstract?\n   Abstract   \ntrailing   ",
        ];
        let segmenter = Segmenter::new();
        for input in inputs {
            let sections = segmenter.segment(input);
            assert_eq!(rejoin(&sections), input, "lossless for {input:?}");
            let indices: Vec<_> = sections.iter().map(|s| s.index).collect();
            let expected: Vec<_> = (1..=sections.len()).collect();
            assert_eq!(indices, expected);
        }
    }

    #[test]
    fn test_first_rule_in_priority_wins() {
        // "1 REFERENCES" matches the named, numbered and all-caps rules.
        let segmenter = Segmenter::new();
        let m = segmenter.classify("1 REFERENCES\n").unwrap();
        assert_eq!(m.rule, "references");
        assert_eq!(m.title, "REFERENCES");
    }

    #[test]
    fn test_custom_rules_extend_defaults() {
        let config = SegmenterConfigBuilder::new()
            .add_heading_pattern(r"(?i)^notation$".to_string())
            .build()
            .unwrap();
        let text = "Abstract\nA.\nNotation\nB.\n";
        let sections = Segmenter::with_config(&config).segment(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].title, "Notation");
        assert_eq!(Segmenter::new().segment(text).len(), 1);
    }

    #[test]
    fn test_page_ranges_from_extracted_text() {
        let extracted = ExtractedText::new(vec![
            "Abstract\nShort abstract.\n1 Introduction\nStarts here".to_string(),
            "and continues.\n".to_string(),
            "2 Preliminaries\nDefinitions.".to_string(),
        ]);
        let sections = Segmenter::new().segment_extracted(&extracted);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].pages, Some(PageRange { start: 1, end: 1 }));
        assert_eq!(sections[1].pages, Some(PageRange { start: 1, end: 2 }));
        assert_eq!(sections[2].pages, Some(PageRange { start: 3, end: 3 }));
        assert_eq!(rejoin(&sections), extracted.text());
    }
}
