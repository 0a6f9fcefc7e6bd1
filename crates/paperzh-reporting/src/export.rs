use std::path::Path;

use crate::docx::render_docx;
use crate::types::{
    ENGLISH_REFERENCE, ExportFormat, GLOSSARY_HEADING, PENDING_NOTE, ReportDocument,
};
use crate::ExportError;

/// Summary of a finished export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    pub sections: usize,
    pub human: usize,
    pub placeholder: usize,
    pub glossary_terms: usize,
    pub bytes: usize,
}

/// Render `doc` in `format` and write it to `path`, creating parent
/// directories as needed.
pub fn export_document(
    doc: &ReportDocument,
    format: ExportFormat,
    path: &Path,
) -> Result<ExportStats, ExportError> {
    let bytes = render(doc, format)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, &bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), format = %format, bytes = bytes.len(), "exported document");

    Ok(ExportStats {
        sections: doc.sections.len(),
        human: doc.human_count(),
        placeholder: doc.placeholder_count(),
        glossary_terms: doc.glossary.len(),
        bytes: bytes.len(),
    })
}

/// Render `doc` in memory.
pub fn render(doc: &ReportDocument, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Docx => render_docx(doc),
        ExportFormat::Markdown => Ok(export_markdown(doc).into_bytes()),
        ExportFormat::Html => Ok(export_html(doc).into_bytes()),
        ExportFormat::Json => Ok(export_json(doc)?.into_bytes()),
        ExportFormat::Text => Ok(export_text(doc).into_bytes()),
    }
}

pub fn export_json(doc: &ReportDocument) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

fn md_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn quote_block(text: &str) -> String {
    text.lines()
        .map(|l| if l.is_empty() { ">".to_string() } else { format!("> {l}") })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn export_markdown(doc: &ReportDocument) -> String {
    let mut out = format!("# {}\n\n*{}*\n\n", doc.title, doc.subtitle);

    for section in &doc.sections {
        out.push_str(&format!("## {}\n\n", section.title));
        out.push_str(section.translation.trim());
        out.push_str("\n\n");
        if section.is_human() {
            out.push_str(&format!("> *{}*\n>\n", ENGLISH_REFERENCE));
            out.push_str(&quote_block(&section.english));
            out.push_str("\n\n");
        } else {
            out.push_str(&format!("*{}*\n\n", PENDING_NOTE));
        }
    }

    if !doc.glossary.is_empty() {
        out.push_str(&format!("## {}\n\n", GLOSSARY_HEADING));
        out.push_str("| English | 中文 | Notes |\n|---|---|---|\n");
        for entry in &doc.glossary {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                md_cell(&entry.term),
                md_cell(&entry.translation),
                md_cell(entry.notes.as_deref().unwrap_or(""))
            ));
        }
    }

    out
}

pub fn export_text(doc: &ReportDocument) -> String {
    let mut out = format!("{}\n", doc.title);
    out.push_str(&"=".repeat(doc.title.chars().count().max(3)));
    out.push_str(&format!("\n{}\n", doc.subtitle));

    for section in &doc.sections {
        out.push_str(&format!("\n{}\n", section.title));
        out.push_str(&"-".repeat(section.title.chars().count().max(3)));
        out.push_str("\n\n");
        out.push_str(section.translation.trim());
        out.push_str("\n\n");
        if section.is_human() {
            out.push_str(ENGLISH_REFERENCE);
            out.push('\n');
            for line in section.english.lines() {
                out.push_str(&format!("    {line}\n"));
            }
        } else {
            out.push_str(PENDING_NOTE);
            out.push('\n');
        }
    }

    if !doc.glossary.is_empty() {
        out.push_str(&format!("\n{}\n", GLOSSARY_HEADING));
        out.push_str(&"-".repeat(GLOSSARY_HEADING.chars().count()));
        out.push('\n');
        for entry in &doc.glossary {
            match &entry.notes {
                Some(notes) => out.push_str(&format!(
                    "  {} = {} ({})\n",
                    entry.term, entry.translation, notes
                )),
                None => out.push_str(&format!("  {} = {}\n", entry.term, entry.translation)),
            }
        }
    }

    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Blank-line separated paragraphs as `<p>` elements, line breaks as `<br>`.
fn html_paragraphs(text: &str, class: Option<&str>) -> String {
    let open = match class {
        Some(c) => format!("<p class=\"{c}\">"),
        None => "<p>".to_string(),
    };
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("{open}{}</p>\n", html_escape(p).replace('\n', "<br>\n")))
        .collect()
}

pub fn export_html(doc: &ReportDocument) -> String {
    let mut out = String::with_capacity(8192);

    out.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="zh">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
body {{ font-family: "Noto Serif SC", "SimSun", serif; max-width: 52em; margin: 2em auto; padding: 0 1em; line-height: 1.7; color: #222; }}
h1, .subtitle {{ text-align: center; }}
.subtitle {{ color: #646464; font-size: 1.1em; }}
.ref-label {{ color: #969696; font-size: 0.75em; font-style: italic; margin-bottom: 0; }}
.ref {{ color: #969696; font-size: 0.75em; }}
.pending {{ color: #c86464; font-size: 0.75em; font-style: italic; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: 0.3em 0.6em; text-align: left; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p class="subtitle">{subtitle}</p>
"#,
        title = html_escape(&doc.title),
        subtitle = html_escape(&doc.subtitle),
    ));

    for section in &doc.sections {
        out.push_str(&format!(
            "<section id=\"section-{}\">\n<h2>{}</h2>\n",
            section.index,
            html_escape(&section.title)
        ));
        out.push_str(&html_paragraphs(&section.translation, None));
        if section.is_human() {
            out.push_str(&format!(
                "<p class=\"ref-label\">{}</p>\n",
                html_escape(ENGLISH_REFERENCE)
            ));
            out.push_str(&html_paragraphs(&section.english, Some("ref")));
        } else {
            out.push_str(&format!("<p class=\"pending\">{}</p>\n", html_escape(PENDING_NOTE)));
        }
        out.push_str("</section>\n");
    }

    if !doc.glossary.is_empty() {
        out.push_str(&format!("<h2>{}</h2>\n<table>\n", html_escape(GLOSSARY_HEADING)));
        out.push_str("<tr><th>English</th><th>中文</th><th>Notes</th></tr>\n");
        for entry in &doc.glossary {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&entry.term),
                html_escape(&entry.translation),
                html_escape(entry.notes.as_deref().unwrap_or(""))
            ));
        }
        out.push_str("</table>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}
