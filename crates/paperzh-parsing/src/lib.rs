use std::path::PathBuf;

use thiserror::Error;

pub mod config;
pub mod files;
pub mod markdown;
pub mod rules;
pub mod segmenter;

pub use config::{ListOverride, SegmenterConfig, SegmenterConfigBuilder};
pub use files::{
    MANIFEST_FILE, ManifestEntry, SectionFile, SectionManifest, load_sections,
    read_section_files, select_section_files, write_section_files,
};
pub use markdown::{sanitize_filename, section_file_name, section_stem};
pub use rules::{HeadingMatch, HeadingRule, default_rules, normalize_title};
pub use segmenter::Segmenter;
// Re-export domain types from core (canonical definitions live there)
pub use paperzh_core::{ExtractedText, PageRange, Section};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("unsupported file format: {0}. Use .json or .md")]
    UnsupportedFormat(String),
    #[error("section not found: {0}")]
    SectionNotFound(String),
    #[error("invalid heading pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ParsingError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
