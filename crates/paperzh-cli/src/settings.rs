use std::path::{Path, PathBuf};

use anyhow::Context;
use paperzh_core::config_file::{self, ConfigFile};
use paperzh_ingest::{BackendChoice, ExtractOptions};
use paperzh_parsing::{Segmenter, SegmenterConfigBuilder};
use paperzh_reporting::{DEFAULT_SUBTITLE, DEFAULT_TITLE};

pub const DEFAULT_OUT_DIR: &str = "docs/out";
pub const DEFAULT_SECTIONS_DIR: &str = "docs/out/sections";
pub const DEFAULT_OUTPUT_FILE: &str = "docs/out/paper_zh.docx";
pub const DEFAULT_GLOSSARY_FILE: &str = "config/terms_zh.yaml";
pub const DEFAULT_TRANSLATION_DIR: &str = "docs/translation/sections";

/// Effective pipeline paths after applying config and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub out_dir: PathBuf,
    pub sections_dir: PathBuf,
    pub output_file: PathBuf,
    pub glossary_file: PathBuf,
    pub translation_dir: PathBuf,
}

/// Load the config: the explicit `--config` file, or the usual cascade.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<ConfigFile> {
    match explicit {
        Some(path) => config_file::load_required(path).context("failed to load --config file"),
        None => Ok(config_file::load_config()),
    }
}

/// Resolve paths from the config. Unset `sections_dir` and `output_file`
/// live under `out_dir` when that is configured.
pub fn paths(config: &ConfigFile) -> Paths {
    let p = config.paths();
    let configured_out = p.out_dir.is_some();
    let out_dir = p
        .out_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

    let sections_dir = match p.sections_dir {
        Some(dir) => PathBuf::from(dir),
        None if configured_out => out_dir.join("sections"),
        None => PathBuf::from(DEFAULT_SECTIONS_DIR),
    };
    let output_file = match p.output_file {
        Some(file) => PathBuf::from(file),
        None if configured_out => out_dir.join("paper_zh.docx"),
        None => PathBuf::from(DEFAULT_OUTPUT_FILE),
    };

    Paths {
        out_dir,
        sections_dir,
        output_file,
        glossary_file: p
            .glossary_file
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GLOSSARY_FILE)),
        translation_dir: p
            .translation_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSLATION_DIR)),
    }
}

/// Document title and subtitle: CLI flag, then config, then default.
pub fn titles(
    config: &ConfigFile,
    title: Option<String>,
    subtitle: Option<String>,
) -> (String, String) {
    let doc = config.document();
    (
        title
            .or(doc.title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        subtitle
            .or(doc.subtitle)
            .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string()),
    )
}

/// Extraction options; `backend` from the CLI overrides `[extract] backend`.
pub fn extract_options(
    config: &ConfigFile,
    backend: Option<&str>,
    raw: bool,
) -> anyhow::Result<ExtractOptions> {
    let extract = config.extract();
    let backend = match backend.or(extract.backend.as_deref()) {
        Some(name) => name.parse::<BackendChoice>()?,
        None => BackendChoice::default(),
    };
    Ok(ExtractOptions {
        backend,
        header_exclusion: extract.header_exclusion,
        footer_exclusion: extract.footer_exclusion,
        raw,
    })
}

/// A segmenter using the `[segment]` heading rules.
pub fn segmenter(config: &ConfigFile) -> anyhow::Result<Segmenter> {
    let segment = config.segment();
    let mut builder = SegmenterConfigBuilder::new();
    if let Some(headings) = segment.headings {
        builder = builder.set_heading_patterns(headings);
    }
    for pattern in segment.extra_headings.unwrap_or_default() {
        builder = builder.add_heading_pattern(pattern);
    }
    let seg_config = builder
        .build()
        .context("invalid heading pattern in [segment] config")?;
    Ok(Segmenter::with_config(&seg_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperzh_core::config_file::{DocumentConfig, ExtractConfig, PathsConfig, SegmentConfig};

    #[test]
    fn test_default_paths() {
        let p = paths(&ConfigFile::default());
        assert_eq!(p.out_dir, PathBuf::from("docs/out"));
        assert_eq!(p.sections_dir, PathBuf::from("docs/out/sections"));
        assert_eq!(p.output_file, PathBuf::from("docs/out/paper_zh.docx"));
        assert_eq!(p.glossary_file, PathBuf::from("config/terms_zh.yaml"));
        assert_eq!(p.translation_dir, PathBuf::from("docs/translation/sections"));
    }

    #[test]
    fn test_out_dir_moves_derived_paths() {
        let config = ConfigFile {
            paths: Some(PathsConfig {
                out_dir: Some("build".into()),
                output_file: Some("dist/paper.md".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let p = paths(&config);
        assert_eq!(p.sections_dir, PathBuf::from("build/sections"));
        assert_eq!(p.output_file, PathBuf::from("dist/paper.md"));
    }

    #[test]
    fn test_titles_precedence() {
        let config = ConfigFile {
            document: Some(DocumentConfig {
                title: Some("From config".into()),
                subtitle: None,
            }),
            ..Default::default()
        };
        assert_eq!(titles(&config, None, None).0, "From config");
        assert_eq!(titles(&config, Some("From CLI".into()), None).0, "From CLI");
        assert_eq!(titles(&ConfigFile::default(), None, None).1, DEFAULT_SUBTITLE);
    }

    #[test]
    fn test_extract_options_precedence() {
        let config = ConfigFile {
            extract: Some(ExtractConfig {
                backend: Some("lopdf".into()),
                header_exclusion: Some(0.1),
                footer_exclusion: None,
            }),
            ..Default::default()
        };
        let opts = extract_options(&config, None, false).unwrap();
        assert_eq!(opts.backend, BackendChoice::Lopdf);
        assert_eq!(opts.header_exclusion, Some(0.1));
        let opts = extract_options(&config, Some("auto"), true).unwrap();
        assert_eq!(opts.backend, BackendChoice::Auto);
        assert!(opts.raw);
        assert!(extract_options(&config, Some("xpdf"), false).is_err());
    }

    #[test]
    fn test_segmenter_from_config() {
        let config = ConfigFile {
            segment: Some(SegmentConfig {
                headings: None,
                extra_headings: Some(vec![r"(?i)^notation$".into()]),
            }),
            ..Default::default()
        };
        let seg = segmenter(&config).unwrap();
        assert_eq!(seg.segment("Abstract\nA.\nNotation\nB.\n").len(), 2);

        let bad = ConfigFile {
            segment: Some(SegmentConfig {
                headings: Some(vec!["[".into()]),
                extra_headings: None,
            }),
            ..Default::default()
        };
        assert!(segmenter(&bad).is_err());
    }
}
