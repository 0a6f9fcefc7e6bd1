use crate::rules::{CUSTOM_PRIORITY_BASE, HeadingRule, default_rules};

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the section segmenter.
///
/// Use [`SegmenterConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone, Default)]
pub struct SegmenterConfig {
    pub(crate) rules: ListOverride<HeadingRule>,
}

impl SegmenterConfig {
    /// The effective rule list, sorted by priority (stable for equal priorities).
    pub fn resolved_rules(&self) -> Vec<HeadingRule> {
        let mut rules = self.rules.resolve(&default_rules());
        rules.sort_by_key(|r| r.priority());
        rules
    }
}

/// Builder for [`SegmenterConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct SegmenterConfigBuilder {
    headings: ListOverrideBuilder,
}

#[derive(Debug, Clone, Default)]
enum ListOverrideBuilder {
    #[default]
    Default,
    Replace(Vec<String>),
    Extend(Vec<String>),
}

impl SegmenterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the built-in heading rules with these patterns.
    pub fn set_heading_patterns(mut self, patterns: Vec<String>) -> Self {
        self.headings = ListOverrideBuilder::Replace(patterns);
        self
    }

    /// Append a heading pattern tried after the built-in rules.
    pub fn add_heading_pattern(mut self, pattern: String) -> Self {
        match &mut self.headings {
            ListOverrideBuilder::Extend(v) | ListOverrideBuilder::Replace(v) => v.push(pattern),
            ListOverrideBuilder::Default => {
                self.headings = ListOverrideBuilder::Extend(vec![pattern])
            }
        }
        self
    }

    /// Compile all string patterns into heading rules and produce a [`SegmenterConfig`].
    pub fn build(self) -> Result<SegmenterConfig, regex::Error> {
        let compile = |patterns: Vec<String>, base: u32| -> Result<Vec<HeadingRule>, regex::Error> {
            patterns
                .iter()
                .enumerate()
                .map(|(i, p)| HeadingRule::new(format!("custom-{}", i + 1), p, base + i as u32))
                .collect()
        };

        let rules = match self.headings {
            ListOverrideBuilder::Default => ListOverride::Default,
            ListOverrideBuilder::Replace(patterns) => ListOverride::Replace(compile(patterns, 0)?),
            ListOverrideBuilder::Extend(patterns) => {
                ListOverride::Extend(compile(patterns, CUSTOM_PRIORITY_BASE)?)
            }
        };

        Ok(SegmenterConfig { rules })
    }
}
