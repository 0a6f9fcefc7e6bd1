use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Compound-word suffixes that keep their hyphen across a line break.
static COMPOUND_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "based",
        "driven",
        "aware",
        "oriented",
        "specific",
        "related",
        "dependent",
        "independent",
        "like",
        "free",
        "friendly",
        "resistant",
        "secure",
        "level",
        "order",
        "time",
        "wise",
        "size",
        "bit",
        "round",
        "key",
        "party",
        "quantum",
        "sensitive",
        "grained",
        "efficient",
    ]
    .into_iter()
    .collect()
});

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Join words split by a hyphen at the end of a line.
///
/// - `"signa-\nture"` → `"signature"`
/// - `"lattice-\nbased"` → `"lattice-based"` (compound word)
/// - `"SHA3-\n256"` → `"SHA3-256"` (digit before the hyphen)
pub fn fix_line_break_hyphenation(text: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)-[ \t]*\r?\n[ \t]*(\w+)").unwrap());

    RE.replace_all(text, |caps: &regex::Captures| {
        let before = &caps[1];
        let after = &caps[2];

        let keep_hyphen = before.chars().all(|c| c.is_ascii_digit())
            || after.chars().next().is_some_and(|c| c.is_ascii_digit())
            || COMPOUND_SUFFIXES.contains(after.to_lowercase().as_str());

        if keep_hyphen {
            format!("{before}-{after}")
        } else {
            format!("{before}{after}")
        }
    })
    .into_owned()
}

/// Clean raw backend text into readable paragraphs.
///
/// Applies NFC normalization, unifies line endings, expands ligatures,
/// rejoins hyphenated words, collapses runs of spaces and tabs, strips
/// trailing whitespace from every line, allows at most one blank line in a
/// row and trims the result.
pub fn normalize_text(text: &str) -> String {
    static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
    static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

    let text: String = text.nfc().collect();
    let text = text
        .replace("\r\n", "\n")
        .replace(['\r', '\u{0c}'], "\n");
    let text = expand_ligatures(&text);
    let text = fix_line_break_hyphenation(&text);
    let text = SPACES.replace_all(&text, " ");

    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let text = lines.join("\n");
    BLANK_LINES.replace_all(&text, "\n\n").trim().to_string()
}
