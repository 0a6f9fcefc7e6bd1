use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub paths: Option<PathsConfig>,
    pub document: Option<DocumentConfig>,
    pub extract: Option<ExtractConfig>,
    pub segment: Option<SegmentConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub out_dir: Option<String>,
    pub sections_dir: Option<String>,
    pub output_file: Option<String>,
    pub glossary_file: Option<String>,
    pub translation_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// `auto` (mupdf, then lopdf), `mupdf` or `lopdf`.
    pub backend: Option<String>,
    pub header_exclusion: Option<f32>,
    pub footer_exclusion: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Heading patterns replacing the built-in rules.
    pub headings: Option<Vec<String>>,
    /// Heading patterns tried after the built-in rules.
    pub extra_headings: Option<Vec<String>>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Platform config directory path: `<config_dir>/paperzh/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paperzh").join("config.toml"))
}

/// Load config by cascading CWD `.paperzh.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".paperzh.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Load an explicitly requested config file, reporting why it is unusable.
pub fn load_required(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn pick<T: Clone>(overlay: Option<&T>, base: Option<&T>) -> Option<T> {
    overlay.or(base).cloned()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bp, op) = (base.paths.unwrap_or_default(), overlay.paths.unwrap_or_default());
    let (bd, od) = (
        base.document.unwrap_or_default(),
        overlay.document.unwrap_or_default(),
    );
    let (be, oe) = (
        base.extract.unwrap_or_default(),
        overlay.extract.unwrap_or_default(),
    );
    let (bs, os) = (
        base.segment.unwrap_or_default(),
        overlay.segment.unwrap_or_default(),
    );

    ConfigFile {
        paths: Some(PathsConfig {
            out_dir: pick(op.out_dir.as_ref(), bp.out_dir.as_ref()),
            sections_dir: pick(op.sections_dir.as_ref(), bp.sections_dir.as_ref()),
            output_file: pick(op.output_file.as_ref(), bp.output_file.as_ref()),
            glossary_file: pick(op.glossary_file.as_ref(), bp.glossary_file.as_ref()),
            translation_dir: pick(op.translation_dir.as_ref(), bp.translation_dir.as_ref()),
        }),
        document: Some(DocumentConfig {
            title: pick(od.title.as_ref(), bd.title.as_ref()),
            subtitle: pick(od.subtitle.as_ref(), bd.subtitle.as_ref()),
        }),
        extract: Some(ExtractConfig {
            backend: pick(oe.backend.as_ref(), be.backend.as_ref()),
            header_exclusion: oe.header_exclusion.or(be.header_exclusion),
            footer_exclusion: oe.footer_exclusion.or(be.footer_exclusion),
        }),
        segment: Some(SegmentConfig {
            headings: pick(os.headings.as_ref(), bs.headings.as_ref()),
            extra_headings: pick(os.extra_headings.as_ref(), bs.extra_headings.as_ref()),
        }),
    }
}

impl ConfigFile {
    pub fn paths(&self) -> PathsConfig {
        self.paths.clone().unwrap_or_default()
    }

    pub fn document(&self) -> DocumentConfig {
        self.document.clone().unwrap_or_default()
    }

    pub fn extract(&self) -> ExtractConfig {
        self.extract.clone().unwrap_or_default()
    }

    pub fn segment(&self) -> SegmentConfig {
        self.segment.clone().unwrap_or_default()
    }
}
