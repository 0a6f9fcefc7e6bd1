use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use paperzh_ingest::ExtractionOutput;
use paperzh_reporting::ExportStats;

use crate::verify::{Check, Outcome};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a pipeline step header, e.g. `Extracting text from paper.pdf...`.
pub fn print_step(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", message.bold())
    } else {
        writeln!(w, "{}", message)
    }
}

/// Print a success line with a check mark.
pub fn print_ok(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "  {} {}", "\u{2713}".green(), message)
    } else {
        writeln!(w, "  \u{2713} {}", message)
    }
}

/// Print a failure line with a cross.
pub fn print_fail(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "  {} {}", "\u{2717}".red(), message.red())
    } else {
        writeln!(w, "  \u{2717} {}", message)
    }
}

/// Print the files written by `extract`.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    backend: &str,
    output: &ExtractionOutput,
    color: ColorMode,
) -> std::io::Result<()> {
    print_ok(
        w,
        &format!(
            "{} pages, {} sections (backend: {})",
            output.pages, output.sections, backend
        ),
        color,
    )?;
    print_ok(w, &format!("{}", output.markdown.display()), color)?;
    print_ok(w, &format!("{}", output.json.display()), color)
}

/// Print the section files written by `segment`.
pub fn print_section_files(
    w: &mut dyn Write,
    files: &[std::path::PathBuf],
    dir: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        print_ok(w, &name, color)?;
    }
    writeln!(w)?;
    writeln!(w, "Wrote {} section files to {}", files.len(), dir.display())
}

/// Print the summary after `export`.
pub fn print_export_summary(
    w: &mut dyn Write,
    path: &Path,
    stats: &ExportStats,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    writeln!(w, "Exported {} ({} bytes)", path.display(), stats.bytes)?;
    if color.enabled() {
        writeln!(
            w,
            "  Sections:    {} ({} translated, {} pending)",
            stats.sections,
            stats.human.to_string().green(),
            stats.placeholder.to_string().yellow()
        )?;
    } else {
        writeln!(
            w,
            "  Sections:    {} ({} translated, {} pending)",
            stats.sections, stats.human, stats.placeholder
        )?;
    }
    writeln!(w, "  Glossary:    {} terms", stats.glossary_terms)
}

/// Print one verification check.
pub fn print_check(w: &mut dyn Write, check: &Check, color: ColorMode) -> std::io::Result<()> {
    match &check.outcome {
        Outcome::File(size) => print_ok(
            w,
            &format!("{}: {} ({} bytes)", check.label, check.path.display(), size),
            color,
        ),
        Outcome::Dir(count) => print_ok(
            w,
            &format!(
                "{}: {} ({} files)",
                check.label,
                check.path.display(),
                count
            ),
            color,
        ),
        Outcome::Missing(reason) => print_fail(w, &format!("{}: {}", check.label, reason), color),
    }
}
