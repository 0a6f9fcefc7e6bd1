use once_cell::sync::Lazy;
use regex::Regex;

use paperzh_core::Section;

/// Render sections as one Markdown document with a `# Title` per section.
///
/// Blank preambles are dropped.
pub fn render_document(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        let content = section.content();
        if section.is_preamble() && content.is_empty() {
            continue;
        }
        out.push_str(&format!("# {}\n\n", section.display_title()));
        if !content.is_empty() {
            out.push_str(content);
            out.push_str("\n\n");
        }
    }
    out
}

/// Split a Markdown document on level-one `# ` headings.
///
/// Non-blank text before the first heading becomes an untitled preamble.
pub fn parse_document(content: &str) -> Vec<Section> {
    let mut parts: Vec<(String, String)> = Vec::new();
    let mut title = String::new();
    let mut body = String::new();

    for line in content.lines() {
        if let Some(heading) = line.strip_prefix("# ") {
            parts.push((std::mem::take(&mut title), std::mem::take(&mut body)));
            title = heading.trim().to_string();
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }
    parts.push((title, body));

    parts
        .into_iter()
        .filter(|(title, body)| !title.is_empty() || !body.trim().is_empty())
        .enumerate()
        .map(|(i, (title, body))| Section {
            index: i + 1,
            title,
            heading: String::new(),
            body: body.trim().to_string(),
            pages: None,
        })
        .collect()
}

/// Make a section title safe for use in a file name.
///
/// Punctuation is removed and whitespace runs become `_`.
pub fn sanitize_filename(title: &str) -> String {
    static UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
    static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let cleaned = UNSAFE.replace_all(title, "");
    let joined = SPACES.replace_all(&cleaned, "_");
    let safe = joined.trim_matches('_');
    if safe.is_empty() {
        "Section".to_string()
    } else {
        safe.to_string()
    }
}

/// `01_Abstract`: the name shared by a section file and its `.zh.md` translation.
pub fn section_stem(index: usize, title: &str) -> String {
    format!("{:02}_{}", index, sanitize_filename(title))
}

/// `01_Abstract.md`
pub fn section_file_name(index: usize, title: &str) -> String {
    format!("{}.md", section_stem(index, title))
}

/// Contents of a per-section Markdown file.
pub fn render_section_file(section: &Section) -> String {
    format!("# {}\n\n{}\n", section.display_title(), section.content())
}

/// Parse a per-section Markdown file into `(title, content)`.
///
/// The first line starting with `#` is the title; every other line is content.
pub fn parse_section_file(content: &str) -> (Option<String>, String) {
    let mut title = None;
    let mut lines = Vec::new();
    for line in content.lines() {
        if title.is_none() && line.starts_with('#') {
            title = Some(line.trim_start_matches('#').trim().to_string());
        } else {
            lines.push(line);
        }
    }
    (title, lines.join("\n").trim().to_string())
}
