use once_cell::sync::Lazy;
use regex::Regex;

/// Optional Arabic (`2`, `2.`, `3.1`) or Roman (`IV.`) section number.
const NUMBER_PREFIX: &str = r"(?:(?:\d{1,2}(?:\.\d{1,2})*\.?|[IVXLCDM]{1,6}\.)\s+)?";

/// Known academic section names, in priority order.
const NAMED_HEADINGS: &[(&str, &str)] = &[
    ("abstract", r"Abstract"),
    ("introduction", r"Introduction"),
    ("related-work", r"Related\s+Work"),
    ("preliminaries", r"Preliminaries"),
    ("construction", r"Construction"),
    ("security", r"Security(?:\s+Analysis)?"),
    ("implementation", r"Implementation"),
    ("performance", r"Performance"),
    ("evaluation", r"Evaluation"),
    ("conclusion", r"Conclusions?"),
    ("references", r"References"),
    ("bibliography", r"Bibliography"),
    ("acknowledgments", r"Acknowledge?ments?"),
    ("appendix", r"Appendix(?:\s+[A-Z])?"),
];

/// Priority of the first user-supplied rule appended after the defaults.
pub(crate) const CUSTOM_PRIORITY_BASE: u32 = 100;

/// A single heading matcher.
///
/// Rules are tried in ascending `priority`; the first rule whose pattern
/// matches the trimmed line claims it.
#[derive(Debug, Clone)]
pub struct HeadingRule {
    name: String,
    pattern: Regex,
    priority: u32,
    max_len: Option<usize>,
}

/// A line recognized as a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch<'r> {
    pub rule: &'r str,
    pub title: String,
}

impl HeadingRule {
    pub fn new(name: impl Into<String>, pattern: &str, priority: u32) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            priority,
            max_len: None,
        })
    }

    /// Only match lines shorter than `max_len` characters.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        if let Some(max) = self.max_len
            && line.chars().count() >= max
        {
            return false;
        }
        self.pattern.is_match(line)
    }

    /// Match `line` and produce its normalized title.
    pub fn apply(&self, line: &str) -> Option<HeadingMatch<'_>> {
        if !self.matches(line) {
            return None;
        }
        let title = normalize_title(line);
        if title.is_empty() {
            return None;
        }
        Some(HeadingMatch {
            rule: &self.name,
            title,
        })
    }
}

static DEFAULT_RULES: Lazy<Vec<HeadingRule>> = Lazy::new(|| {
    let mut rules: Vec<HeadingRule> = NAMED_HEADINGS
        .iter()
        .enumerate()
        .map(|(i, (name, words))| {
            let pattern = format!(r"(?i)^{NUMBER_PREFIX}{words}\s*$");
            HeadingRule::new(*name, &pattern, 10 + i as u32).unwrap()
        })
        .collect();

    // "3 Our Signature Scheme", "4.2 Rejection Sampling"; sentences ending
    // in punctuation are body text.
    rules.push(
        HeadingRule::new(
            "numbered",
            r"^\d{1,2}(?:\.\d{1,2})*\.?\s+[A-Z][^\n]*[^.,;:\s]$",
            50,
        )
        .unwrap()
        .with_max_len(50),
    );

    // Short lines without lowercase letters, e.g. "SECURITY PROOFS".
    rules.push(
        HeadingRule::new(
            "all-caps",
            r"^\P{Ll}*\p{Lu}\P{Ll}*\p{Lu}\P{Ll}*\p{Lu}\P{Ll}*$",
            60,
        )
        .unwrap()
        .with_max_len(50),
    );

    rules
});

/// The built-in heading rules, sorted by priority.
pub fn default_rules() -> Vec<HeadingRule> {
    DEFAULT_RULES.clone()
}

/// Trim a heading line, strip its section number and collapse whitespace.
///
/// `"  2.1   Related   Work "` → `"Related Work"`, `"IV. Security"` → `"Security"`.
pub fn normalize_title(line: &str) -> String {
    static NUMBERING: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:\d{1,2}(?:\.\d{1,2})*\.?|[IVXLCDM]{1,6}\.)\s+").unwrap()
    });
    static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let trimmed = line.trim();
    let stripped = NUMBERING.replace(trimmed, "");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> HeadingRule {
        default_rules()
            .into_iter()
            .find(|r| r.name() == name)
            .unwrap()
    }

    #[test]
    fn test_default_rules_sorted_by_priority() {
        let rules = default_rules();
        assert!(rules.windows(2).all(|w| w[0].priority() <= w[1].priority()));
        assert_eq!(rules.first().unwrap().name(), "abstract");
        assert_eq!(rules.last().unwrap().name(), "all-caps");
    }

    #[test]
    fn test_named_rule_accepts_optional_numbering() {
        let intro = rule("introduction");
        assert!(intro.matches("Introduction"));
        assert!(intro.matches("1 Introduction"));
        assert!(intro.matches("1. introduction"));
        assert!(intro.matches("I. INTRODUCTION"));
        assert!(intro.matches("  2.1 Introduction  "));
        assert!(!intro.matches("Introduction to lattices"));
        assert!(!intro.matches("An Introduction"));
    }

    #[test]
    fn test_named_rule_variants() {
        assert!(rule("security").matches("5 Security Analysis"));
        assert!(rule("security").matches("Security"));
        assert!(rule("conclusion").matches("7. Conclusions"));
        assert!(rule("acknowledgments").matches("Acknowledgements"));
        assert!(rule("acknowledgments").matches("Acknowledgment"));
        assert!(rule("appendix").matches("Appendix B"));
        assert!(rule("related-work").matches("2 Related   Work"));
    }

    #[test]
    fn test_numbered_rule() {
        let numbered = rule("numbered");
        assert!(numbered.matches("3 Basic Operations"));
        assert!(numbered.matches("4.2 Rejection Sampling"));
        assert!(!numbered.matches("3 Users sign messages with their secret key."));
        assert!(!numbered.matches("2017 Lyubashevsky proposed"));
        assert!(!numbered.matches("3 lowercase start"));
        assert!(!numbered.matches(
            "3 A Very Long Heading That Goes On And On Beyond The Fifty Character Limit"
        ));
    }

    #[test]
    fn test_all_caps_rule() {
        let caps = rule("all-caps");
        assert!(caps.matches("SECURITY PROOFS"));
        assert!(caps.matches("A. KEY GENERATION"));
        assert!(!caps.matches("Security Proofs"));
        assert!(!caps.matches("AB"));
        assert!(!caps.matches("12345"));
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  2.1   Related   Work "), "Related Work");
        assert_eq!(normalize_title("IV. Security"), "Security");
        assert_eq!(normalize_title("1. Abstract"), "Abstract");
        assert_eq!(normalize_title("Abstract"), "Abstract");
        assert_eq!(normalize_title("Appendix A"), "Appendix A");
        // Roman numerals need the trailing dot
        assert_eq!(normalize_title("MIX Networks"), "MIX Networks");
    }

    #[test]
    fn test_apply_reports_rule_and_title() {
        let abstract_rule = rule("abstract");
        let m = abstract_rule.apply("1. Abstract\n").unwrap();
        assert_eq!(m.rule, "abstract");
        assert_eq!(m.title, "Abstract");
        assert!(rule("abstract").apply("Abstracts are short.").is_none());
    }

    #[test]
    fn test_custom_rule_max_len() {
        let r = HeadingRule::new("custom", r"^Notation$", 1)
            .unwrap()
            .with_max_len(5);
        assert!(!r.matches("Notation"));
        assert!(HeadingRule::new("bad", r"[unclosed", 1).is_err());
    }
}
