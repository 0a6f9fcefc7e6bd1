use std::path::{Path, PathBuf};

use paperzh_core::{Provenance, Section, TranslationResult};
use paperzh_parsing::SectionFile;

use crate::TranslateError;
use crate::glossary::Glossary;
use crate::substitute::TermMatcher;

/// Suffix of human translation files: `01_Abstract.md` → `01_Abstract.zh.md`.
pub const TRANSLATION_SUFFIX: &str = ".zh.md";

/// Picks the Chinese text for each section: a human `.zh.md` file when one
/// exists, otherwise the English body with glossary terms substituted.
#[derive(Debug, Clone)]
pub struct TranslationResolver {
    matcher: TermMatcher,
    translation_dir: Option<PathBuf>,
}

/// Drop a leading heading from a human translation.
///
/// The first non-blank line is removed when it is a Markdown `#` heading or
/// equals `title` ignoring case. A byte-order mark is ignored.
pub fn strip_heading(content: &str, title: &str) -> String {
    let content = content.trim_start_matches('\u{feff}').trim_start();
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    let first_trimmed = first.trim();

    let is_heading = first_trimmed.starts_with('#')
        || (!title.is_empty() && first_trimmed.to_lowercase() == title.trim().to_lowercase());
    if is_heading {
        rest.trim().to_string()
    } else {
        content.trim().to_string()
    }
}

impl TranslationResolver {
    pub fn new(glossary: &Glossary) -> Result<Self, TranslateError> {
        Ok(Self {
            matcher: TermMatcher::new(glossary)?,
            translation_dir: None,
        })
    }

    /// Look for `<stem>.zh.md` files in `dir`. A missing directory simply
    /// yields no human translations.
    pub fn with_translation_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.translation_dir = Some(dir.into());
        self
    }

    pub fn translation_dir(&self) -> Option<&Path> {
        self.translation_dir.as_deref()
    }

    pub fn matcher(&self) -> &TermMatcher {
        &self.matcher
    }

    /// Path of the human translation for a section stem, if it exists.
    pub fn translation_path(&self, stem: &str) -> Option<PathBuf> {
        let path = self
            .translation_dir
            .as_ref()?
            .join(format!("{stem}{TRANSLATION_SUFFIX}"));
        path.is_file().then_some(path)
    }

    /// The human translation for `stem`, with its heading stripped.
    ///
    /// Files that are empty after stripping count as absent.
    pub fn human_translation(
        &self,
        stem: &str,
        title: &str,
    ) -> Result<Option<String>, TranslateError> {
        let Some(path) = self.translation_path(stem) else {
            return Ok(None);
        };
        let content = std::fs::read_to_string(&path).map_err(|source| TranslateError::Io {
            path: path.clone(),
            source,
        })?;
        let text = strip_heading(&content, title);
        if text.is_empty() {
            tracing::warn!(path = %path.display(), "human translation is empty, using placeholder");
            return Ok(None);
        }
        Ok(Some(text))
    }

    /// Glossary-substituted English body of `section`.
    pub fn placeholder(&self, section: &Section) -> TranslationResult {
        let (text, replaced) = self.matcher.apply_counted(section.content());
        tracing::debug!(
            section = section.index,
            title = section.display_title(),
            replaced,
            "placeholder translation"
        );
        TranslationResult {
            section_index: section.index,
            title: section.display_title().to_string(),
            text,
            provenance: Provenance::Placeholder,
        }
    }

    /// Resolve one section whose files are named after `stem`.
    pub fn resolve(&self, stem: &str, section: &Section) -> Result<TranslationResult, TranslateError> {
        match self.human_translation(stem, section.display_title())? {
            Some(text) => {
                tracing::debug!(section = section.index, stem, "human translation");
                Ok(TranslationResult {
                    section_index: section.index,
                    title: section.display_title().to_string(),
                    text,
                    provenance: Provenance::Human,
                })
            }
            None => Ok(self.placeholder(section)),
        }
    }

    /// Resolve section files in order: exactly one result per file.
    ///
    /// Sections are numbered by position, starting at 1. `on_resolved` is
    /// called after each file.
    pub fn resolve_files(
        &self,
        files: &[SectionFile],
        mut on_resolved: impl FnMut(&SectionFile, &TranslationResult),
    ) -> Result<Vec<(Section, TranslationResult)>, TranslateError> {
        files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                let section = file.to_section(i + 1);
                let result = self.resolve(&file.stem, &section)?;
                on_resolved(file, &result);
                Ok((section, result))
            })
            .collect()
    }
}
