use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};
use thiserror::Error;

use paperzh_core::GlossaryEntry;

#[derive(Error, Debug)]
pub enum GlossaryError {
    #[error("glossary file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed glossary YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    #[error("invalid glossary entry {term:?}: {reason}")]
    InvalidEntry { term: String, reason: String },
    #[error("duplicate glossary term: {0:?}")]
    DuplicateTerm(String),
}

#[derive(Debug, Deserialize)]
struct GlossaryFile {
    #[serde(default)]
    terms: Option<Mapping>,
}

/// A `terms:` value: either the translation itself or a detailed record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TermValue {
    Plain(String),
    Detailed {
        #[serde(alias = "translation")]
        zh: String,
        #[serde(default)]
        notes: Option<String>,
    },
}

/// Lookup key for a term: lowercase with whitespace runs collapsed.
pub fn term_key(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Ordered, read-only English → Chinese terminology.
///
/// Terms are unique under [`term_key`]; file order is preserved.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
    index: HashMap<String, usize>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML glossary of the form
    ///
    /// ```yaml
    /// terms:
    ///   signature: 签名
    ///   public key:
    ///     zh: 公钥
    ///     notes: pk
    /// ```
    pub fn load(path: &Path) -> Result<Self, GlossaryError> {
        if !path.is_file() {
            return Err(GlossaryError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| GlossaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let glossary = Self::from_yaml_str(&content)?;
        tracing::info!(path = %path.display(), terms = glossary.len(), "loaded glossary");
        Ok(glossary)
    }

    /// Parse glossary YAML. An empty document is an empty glossary.
    pub fn from_yaml_str(content: &str) -> Result<Self, GlossaryError> {
        let blank = content.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(Self::new());
        }
        let file: Option<GlossaryFile> = serde_yaml_ng::from_str(content)?;
        let Some(terms) = file.and_then(|f| f.terms) else {
            return Ok(Self::new());
        };

        let mut glossary = Self::new();
        for (key, value) in terms {
            let term = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(GlossaryError::InvalidEntry {
                        term: format!("{other:?}"),
                        reason: "term must be a string".into(),
                    });
                }
            };
            let value: TermValue =
                serde_yaml_ng::from_value(value).map_err(|e| GlossaryError::InvalidEntry {
                    term: term.clone(),
                    reason: e.to_string(),
                })?;
            let (translation, notes) = match value {
                TermValue::Plain(zh) => (zh, None),
                TermValue::Detailed { zh, notes } => (zh, notes),
            };
            glossary.insert(GlossaryEntry {
                term,
                translation,
                notes,
            })?;
        }
        Ok(glossary)
    }

    /// Build from entries in order, rejecting duplicates.
    pub fn from_entries(
        entries: impl IntoIterator<Item = GlossaryEntry>,
    ) -> Result<Self, GlossaryError> {
        let mut glossary = Self::new();
        for entry in entries {
            glossary.insert(entry)?;
        }
        Ok(glossary)
    }

    /// Add an entry. Term and translation are trimmed and must be non-empty.
    pub fn insert(&mut self, entry: GlossaryEntry) -> Result<(), GlossaryError> {
        let term = entry.term.trim().to_string();
        let translation = entry.translation.trim().to_string();
        if term.is_empty() {
            return Err(GlossaryError::InvalidEntry {
                term,
                reason: "empty term".into(),
            });
        }
        if translation.is_empty() {
            return Err(GlossaryError::InvalidEntry {
                term,
                reason: "empty translation".into(),
            });
        }

        let key = term_key(&term);
        if self.index.contains_key(&key) {
            return Err(GlossaryError::DuplicateTerm(term));
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(GlossaryEntry {
            term,
            translation,
            notes: entry.notes.filter(|n| !n.trim().is_empty()),
        });
        Ok(())
    }

    /// Case-insensitive lookup.
    pub fn get(&self, term: &str) -> Option<&GlossaryEntry> {
        self.index.get(&term_key(term)).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlossaryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
