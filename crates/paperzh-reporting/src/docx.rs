use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph, Run, RunFonts, Style, StyleType, Table, TableCell,
    TableRow,
};

use crate::ExportError;
use crate::types::{ENGLISH_REFERENCE, GLOSSARY_HEADING, PENDING_NOTE, ReportDocument};

// Sizes are in half-points.
const SUBTITLE_SIZE: usize = 28;
const REFERENCE_SIZE: usize = 18;
const SUBTITLE_COLOR: &str = "646464";
const REFERENCE_COLOR: &str = "969696";
const PENDING_COLOR: &str = "C86464";
const CJK_FONT: &str = "SimSun";

fn run(text: &str) -> Run {
    Run::new()
        .add_text(text)
        .fonts(RunFonts::new().east_asia(CJK_FONT))
}

/// A paragraph whose line breaks become soft breaks; `style` is applied to
/// every run.
fn text_paragraph(text: &str, style: impl Fn(Run) -> Run) -> Paragraph {
    let mut paragraph = Paragraph::new();
    for (i, line) in text.lines().enumerate() {
        let mut r = Run::new();
        if i > 0 {
            r = r.add_break(BreakType::TextWrapping);
        }
        r = r.add_text(line).fonts(RunFonts::new().east_asia(CJK_FONT));
        paragraph = paragraph.add_run(style(r));
    }
    paragraph
}

/// One paragraph per blank-line separated block of `text`.
fn add_blocks(mut docx: Docx, text: &str, style: impl Fn(Run) -> Run + Copy) -> Docx {
    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        docx = docx.add_paragraph(text_paragraph(block, style));
    }
    docx
}

fn reference_style(r: Run) -> Run {
    r.size(REFERENCE_SIZE).color(REFERENCE_COLOR)
}

fn glossary_table(doc: &ReportDocument) -> Table {
    let cell = |text: &str, bold: bool| {
        let r = if bold { run(text).bold() } else { run(text) };
        TableCell::new().add_paragraph(Paragraph::new().add_run(r))
    };

    let mut rows = vec![TableRow::new(vec![
        cell("English", true),
        cell("中文", true),
        cell("Notes", true),
    ])];
    rows.extend(doc.glossary.iter().map(|entry| {
        TableRow::new(vec![
            cell(&entry.term, false),
            cell(&entry.translation, false),
            cell(entry.notes.as_deref().unwrap_or(""), false),
        ])
    }));
    Table::new(rows)
}

fn build(doc: &ReportDocument) -> Docx {
    let mut docx = Docx::new()
        .add_style(
            Style::new("Title", StyleType::Paragraph)
                .name("Title")
                .size(52)
                .bold(),
        )
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        );

    docx = docx
        .add_paragraph(
            Paragraph::new()
                .add_run(run(&doc.title))
                .style("Title")
                .align(AlignmentType::Center),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(run(&doc.subtitle).size(SUBTITLE_SIZE).color(SUBTITLE_COLOR))
                .align(AlignmentType::Center),
        )
        .add_paragraph(Paragraph::new());

    for section in &doc.sections {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(run(&section.title))
                .style("Heading1"),
        );
        docx = add_blocks(docx, &section.translation, |r| r);

        if section.is_human() {
            docx = docx.add_paragraph(Paragraph::new()).add_paragraph(
                Paragraph::new().add_run(reference_style(run(ENGLISH_REFERENCE)).italic()),
            );
            docx = add_blocks(docx, &section.english, reference_style);
        } else {
            docx = docx.add_paragraph(
                Paragraph::new().add_run(
                    run(PENDING_NOTE)
                        .size(REFERENCE_SIZE)
                        .color(PENDING_COLOR)
                        .italic(),
                ),
            );
        }
        docx = docx.add_paragraph(Paragraph::new());
    }

    if !doc.glossary.is_empty() {
        docx = docx
            .add_paragraph(
                Paragraph::new()
                    .add_run(run(GLOSSARY_HEADING))
                    .style("Heading1"),
            )
            .add_table(glossary_table(doc));
    }

    docx
}

/// Render the document as a `.docx` archive.
pub fn render_docx(doc: &ReportDocument) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    build(doc)
        .build()
        .pack(&mut cursor)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(cursor.into_inner())
}
