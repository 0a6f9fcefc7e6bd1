use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use paperzh_core::config_file::ConfigFile;
use paperzh_reporting::{ExportFormat, ReportDocument};
use paperzh_translate::{Glossary, TranslationResolver};
use tracing_subscriber::EnvFilter;

mod output;
mod settings;
mod verify;

use output::ColorMode;

/// Academic PDF to Chinese translation pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Use this config file instead of the usual config locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from a PDF into Markdown and JSON
    Extract {
        /// Path to the PDF file
        pdf_file: PathBuf,

        /// Directory for `<stem>_en.md` and `<stem>_en.json` (default: docs/out)
        output_dir: Option<PathBuf>,

        /// Extraction backend: auto, mupdf or lopdf
        #[arg(long)]
        backend: Option<String>,

        /// Keep the backend's raw text without normalization
        #[arg(long)]
        raw: bool,
    },

    /// Split an extracted document into one Markdown file per section
    Segment {
        /// Extracted `.md` or `.json` file
        input_file: PathBuf,

        /// Directory for the section files (default: docs/out/sections)
        output_dir: Option<PathBuf>,
    },

    /// Build the translated document from section files and the glossary
    Export {
        /// Directory of section files (default: docs/out/sections)
        sections_dir: Option<PathBuf>,

        /// Output document; the extension picks the format (default: docs/out/paper_zh.docx)
        output_file: Option<PathBuf>,

        /// YAML glossary (default: config/terms_zh.yaml)
        glossary_file: Option<PathBuf>,

        /// Directory of `.zh.md` human translations (default: docs/translation/sections)
        translation_dir: Option<PathBuf>,

        /// Output format: docx, md, html, json or txt
        #[arg(long)]
        format: Option<String>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Document subtitle
        #[arg(long)]
        subtitle: Option<String>,

        /// Comma-separated section file stems to export (e.g. 01_Abstract)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// Check that the pipeline outputs exist
    Verify {
        /// Project root the pipeline paths are relative to (default: .)
        root: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color = ColorMode(!cli.no_color && std::io::stdout().is_terminal());
    let config = settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Extract {
            pdf_file,
            output_dir,
            backend,
            raw,
        } => extract(&config, &pdf_file, output_dir, backend.as_deref(), raw, color),
        Command::Segment {
            input_file,
            output_dir,
        } => segment(&config, &input_file, output_dir, color),
        Command::Export {
            sections_dir,
            output_file,
            glossary_file,
            translation_dir,
            format,
            title,
            subtitle,
            only,
        } => {
            let paths = settings::paths(&config);
            let (title, subtitle) = settings::titles(&config, title, subtitle);
            export(ExportArgs {
                sections_dir: sections_dir.unwrap_or(paths.sections_dir),
                output_file: output_file.unwrap_or(paths.output_file),
                glossary_file: glossary_file.unwrap_or(paths.glossary_file),
                translation_dir: translation_dir.unwrap_or(paths.translation_dir),
                format,
                title,
                subtitle,
                only,
                color,
            })
        }
        Command::Verify { root } => verify(&config, root, color),
    }
}

fn extract(
    config: &ConfigFile,
    pdf_file: &Path,
    output_dir: Option<PathBuf>,
    backend: Option<&str>,
    raw: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let options = settings::extract_options(config, backend, raw)?;
    let segmenter = settings::segmenter(config)?;
    let out_dir = output_dir.unwrap_or_else(|| settings::paths(config).out_dir);
    let mut stdout = std::io::stdout();

    let name = pdf_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| pdf_file.display().to_string());
    output::print_step(
        &mut stdout,
        &format!("Extracting text from {}...", name),
        color,
    )?;

    let extraction = paperzh_ingest::extract_pdf(pdf_file, &options)
        .with_context(|| format!("failed to extract {}", pdf_file.display()))?;
    let written = paperzh_ingest::write_extraction(pdf_file, &out_dir, &extraction, &segmenter)
        .context("failed to write extraction output")?;

    output::print_extraction_summary(&mut stdout, extraction.backend, &written, color)?;
    Ok(())
}

fn segment(
    config: &ConfigFile,
    input_file: &Path,
    output_dir: Option<PathBuf>,
    color: ColorMode,
) -> anyhow::Result<()> {
    let out_dir = output_dir.unwrap_or_else(|| settings::paths(config).sections_dir);
    let mut stdout = std::io::stdout();

    output::print_step(
        &mut stdout,
        &format!("Segmenting {}...", input_file.display()),
        color,
    )?;

    let sections = paperzh_parsing::load_sections(input_file)
        .with_context(|| format!("failed to read sections from {}", input_file.display()))?;
    let files = paperzh_parsing::write_section_files(&sections, &out_dir)
        .with_context(|| format!("failed to write section files to {}", out_dir.display()))?;

    output::print_section_files(&mut stdout, &files, &out_dir, color)?;
    Ok(())
}

struct ExportArgs {
    sections_dir: PathBuf,
    output_file: PathBuf,
    glossary_file: PathBuf,
    translation_dir: PathBuf,
    format: Option<String>,
    title: String,
    subtitle: String,
    only: Vec<String>,
    color: ColorMode,
}

fn export(args: ExportArgs) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let color = args.color;
    let mut stdout = std::io::stdout();

    // Resolve the format before doing any work
    let format = match args.format.as_deref() {
        Some(name) => name.parse::<ExportFormat>()?,
        None => match ExportFormat::from_path(&args.output_file) {
            Some(format) => format,
            None => anyhow::bail!(
                "cannot infer the export format from {}; pass --format",
                args.output_file.display()
            ),
        },
    };

    let glossary = Glossary::load(&args.glossary_file)
        .with_context(|| format!("failed to load glossary {}", args.glossary_file.display()))?;
    output::print_ok(
        &mut stdout,
        &format!(
            "Loaded {} glossary terms from {}",
            glossary.len(),
            args.glossary_file.display()
        ),
        color,
    )?;

    let files = paperzh_parsing::read_section_files(&args.sections_dir).with_context(|| {
        format!(
            "failed to read section files from {}",
            args.sections_dir.display()
        )
    })?;
    let files = paperzh_parsing::select_section_files(files, &args.only)?;

    let resolver = TranslationResolver::new(&glossary)?.with_translation_dir(&args.translation_dir);
    if !args.translation_dir.is_dir() {
        tracing::warn!(
            dir = %args.translation_dir.display(),
            "translation directory not found, every section will be a placeholder"
        );
    }

    output::print_step(
        &mut stdout,
        &format!("Translating {} sections...", files.len()),
        color,
    )?;

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{bar:40.green/dim}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );

    let resolved = resolver
        .resolve_files(&files, |file, _| {
            bar.set_message(file.stem.clone());
            bar.inc(1);
        })
        .context("failed to resolve translations")?;
    bar.finish_and_clear();
    let (sections, translations): (Vec<_>, Vec<_>) = resolved.into_iter().unzip();

    let doc = ReportDocument::assemble(
        args.title,
        args.subtitle,
        &sections,
        &translations,
        glossary.entries(),
    )?;
    let stats = paperzh_reporting::export_document(&doc, format, &args.output_file)
        .with_context(|| format!("failed to export {}", args.output_file.display()))?;

    output::print_export_summary(&mut stdout, &args.output_file, &stats, color)?;
    stdout.flush()?;
    Ok(())
}

fn verify(config: &ConfigFile, root: Option<PathBuf>, color: ColorMode) -> anyhow::Result<()> {
    let root = root.unwrap_or_else(|| PathBuf::from("."));
    let paths = settings::paths(config);
    let mut stdout = std::io::stdout();

    output::print_step(
        &mut stdout,
        &format!("Verifying pipeline outputs in {}...", root.display()),
        color,
    )?;

    let checks = verify::verify_pipeline(&root, &paths);
    for check in &checks {
        output::print_check(&mut stdout, check, color)?;
    }

    let missing: Vec<&str> = checks
        .iter()
        .filter(|c| !c.ok())
        .map(|c| c.label.as_str())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing pipeline outputs: {}", missing.join(", "));
    }
    writeln!(stdout, "All pipeline outputs present.")?;
    Ok(())
}
