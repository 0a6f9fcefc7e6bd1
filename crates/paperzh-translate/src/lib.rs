use std::path::PathBuf;

use thiserror::Error;

pub mod glossary;
pub mod resolver;
pub mod substitute;

pub use glossary::{Glossary, GlossaryError, term_key};
pub use resolver::{TRANSLATION_SUFFIX, TranslationResolver, strip_heading};
pub use substitute::TermMatcher;
// Re-export domain types for convenience
pub use paperzh_core::{GlossaryEntry, Provenance, TranslationResult};

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error(transparent)]
    Glossary(#[from] GlossaryError),
    #[error("failed to compile glossary terms: {0}")]
    InvalidTerm(#[from] regex::Error),
    #[error("failed to read translation {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
