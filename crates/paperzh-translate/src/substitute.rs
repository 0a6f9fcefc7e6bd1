use regex::{Captures, Regex};

use crate::glossary::Glossary;

/// Case-insensitive whole-term replacement of glossary terms.
///
/// All terms are compiled into one alternation ordered by descending term
/// length, so the scan is leftmost-longest: at each position the longest
/// term wins and a shorter term inside an already matched longer one is
/// never replaced. Replacement is a single pass, so translations are not
/// substituted again.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    regex: Option<Regex>,
    /// Translation for capture group `i + 1`.
    translations: Vec<String>,
}

/// Regex source for one term: inner whitespace matches any whitespace run,
/// and `\b` is added on sides where the term starts or ends with a word
/// character.
fn term_pattern(term: &str) -> String {
    let body = term
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let mut pattern = String::new();
    if term.chars().next().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&body);
    if term.chars().last().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern
}

impl TermMatcher {
    pub fn new(glossary: &Glossary) -> Result<Self, regex::Error> {
        let mut entries: Vec<_> = glossary.iter().collect();
        // Stable: equal lengths keep glossary order.
        entries.sort_by_key(|e| std::cmp::Reverse(e.term.chars().count()));

        if entries.is_empty() {
            return Ok(Self {
                regex: None,
                translations: Vec::new(),
            });
        }

        let alternation = entries
            .iter()
            .map(|e| format!("({})", term_pattern(&e.term)))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!("(?i){alternation}"))?;
        tracing::debug!(terms = entries.len(), "compiled term matcher");

        Ok(Self {
            regex: Some(regex),
            translations: entries.iter().map(|e| e.translation.clone()).collect(),
        })
    }

    /// Number of terms in the matcher.
    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Replace every glossary term in `text` with its translation.
    pub fn apply(&self, text: &str) -> String {
        self.apply_counted(text).0
    }

    /// Like [`apply`](Self::apply), also returning the number of replacements.
    pub fn apply_counted(&self, text: &str) -> (String, usize) {
        let Some(regex) = &self.regex else {
            return (text.to_string(), 0);
        };

        let mut count = 0;
        let replaced = regex.replace_all(text, |caps: &Captures| {
            count += 1;
            let group = (1..caps.len())
                .find(|&i| caps.get(i).is_some())
                .unwrap_or(1);
            self.translations[group - 1].clone()
        });
        (replaced.into_owned(), count)
    }
}
