use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use paperzh_core::{GlossaryEntry, PageRange, Provenance, Section, TranslationResult};

use crate::ExportError;

pub const DEFAULT_TITLE: &str = "Dilithium Digital Signature Scheme";
pub const DEFAULT_SUBTITLE: &str = "中文翻译版本 / Chinese Translation";

/// Note appended to sections that only have a placeholder translation.
pub const PENDING_NOTE: &str = "（待翻译 / Translation pending）";
/// Label above the English text of a human-translated section.
pub const ENGLISH_REFERENCE: &str = "English Reference:";
pub const GLOSSARY_HEADING: &str = "Glossary / 术语表";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Markdown,
    Html,
    Json,
    Text,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Docx,
            ExportFormat::Markdown,
            ExportFormat::Html,
            ExportFormat::Json,
            ExportFormat::Text,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Docx => "Word",
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
            Self::Json => "JSON",
            Self::Text => "Plain Text",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    /// Format implied by the output file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "docx" => Some(Self::Docx),
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docx" | "word" => Ok(Self::Docx),
            "md" | "markdown" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Text),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One section of the exported document.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub index: usize,
    pub title: String,
    pub translation: String,
    pub english: String,
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<PageRange>,
}

impl ReportSection {
    pub fn is_human(&self) -> bool {
        self.provenance == Provenance::Human
    }
}

/// Everything an exporter needs, already paired and ordered.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<ReportSection>,
    pub glossary: Vec<GlossaryEntry>,
}

impl ReportDocument {
    /// Pair sections with their translations by section index.
    ///
    /// Sections without a title or without English content are left out.
    /// An untitled section is dropped even though it displays as "Preface";
    /// a preamble written by `segment` carries that title on disk.
    /// A translation that refers to no section, or a kept section that has
    /// no translation, is [`ExportError::SectionNotFound`].
    pub fn assemble(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        sections: &[Section],
        translations: &[TranslationResult],
        glossary: &[GlossaryEntry],
    ) -> Result<Self, ExportError> {
        if let Some(orphan) = translations
            .iter()
            .find(|t| !sections.iter().any(|s| s.index == t.section_index))
        {
            return Err(ExportError::SectionNotFound(format!(
                "{} (section {})",
                orphan.title, orphan.section_index
            )));
        }

        let mut report_sections = Vec::with_capacity(sections.len());
        for section in sections {
            if section.title.trim().is_empty() || section.content().is_empty() {
                tracing::debug!(section = section.index, "skipping empty section");
                continue;
            }
            let translation = translations
                .iter()
                .find(|t| t.section_index == section.index)
                .ok_or_else(|| {
                    ExportError::SectionNotFound(format!(
                        "no translation for {} (section {})",
                        section.display_title(),
                        section.index
                    ))
                })?;
            report_sections.push(ReportSection {
                index: section.index,
                title: section.display_title().to_string(),
                translation: translation.text.clone(),
                english: section.content().to_string(),
                provenance: translation.provenance,
                pages: section.pages,
            });
        }

        Ok(Self {
            title: title.into(),
            subtitle: subtitle.into(),
            sections: report_sections,
            glossary: glossary.to_vec(),
        })
    }

    pub fn human_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_human()).count()
    }

    pub fn placeholder_count(&self) -> usize {
        self.sections.len() - self.human_count()
    }
}
