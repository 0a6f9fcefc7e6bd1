use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use paperzh_core::{ExtractedDocument, PageRange, Section};

use crate::ParsingError;
use crate::markdown::{parse_document, parse_section_file, render_section_file, section_stem};

/// Name of the manifest written next to the section files.
pub const MANIFEST_FILE: &str = "sections.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub title: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<PageRange>,
}

/// Ordered list of section files produced by `segment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionManifest {
    pub sections: Vec<ManifestEntry>,
}

/// A section Markdown file read back from disk.
#[derive(Debug, Clone)]
pub struct SectionFile {
    pub path: PathBuf,
    /// File name without `.md`, e.g. `01_Abstract`.
    pub stem: String,
    pub title: Option<String>,
    pub content: String,
    pub pages: Option<PageRange>,
}

impl SectionFile {
    /// Convert to a [`Section`] at position `index`.
    pub fn to_section(&self, index: usize) -> Section {
        Section {
            index,
            title: self.title.clone().unwrap_or_default(),
            heading: String::new(),
            body: self.content.clone(),
            pages: self.pages,
        }
    }
}

/// Read sections from an extraction output: `.md` (split on `# ` headings)
/// or `.json` (the `sections` array of an extracted document).
pub fn load_sections(input: &Path) -> Result<Vec<Section>, ParsingError> {
    if !input.exists() {
        return Err(ParsingError::InputNotFound(input.to_path_buf()));
    }

    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let content = std::fs::read_to_string(input).map_err(ParsingError::io(input))?;
    match ext.as_str() {
        "md" => Ok(parse_document(&content)),
        "json" => {
            let doc: ExtractedDocument =
                serde_json::from_str(&content).map_err(|source| ParsingError::Json {
                    path: input.to_path_buf(),
                    source,
                })?;
            Ok(doc
                .sections
                .into_iter()
                .enumerate()
                .map(|(i, record)| record.into_section(i + 1))
                .collect())
        }
        other => Err(ParsingError::UnsupportedFormat(format!(".{other}"))),
    }
}

/// Write one `NN_Title.md` file per section plus a [`MANIFEST_FILE`].
///
/// Untitled sections with no content are skipped; numbering follows the
/// written files. Returns the paths of the section files in order.
pub fn write_section_files(sections: &[Section], dir: &Path) -> Result<Vec<PathBuf>, ParsingError> {
    std::fs::create_dir_all(dir).map_err(ParsingError::io(dir))?;

    let mut written = Vec::new();
    let mut manifest = SectionManifest::default();

    for section in sections {
        if section.is_preamble() && section.content().is_empty() {
            continue;
        }
        let index = written.len() + 1;
        let file = format!("{}.md", section_stem(index, section.display_title()));
        let path = dir.join(&file);
        std::fs::write(&path, render_section_file(section)).map_err(ParsingError::io(&path))?;
        tracing::debug!(file = %file, "wrote section file");

        manifest.sections.push(ManifestEntry {
            index,
            title: section.display_title().to_string(),
            file,
            pages: section.pages,
        });
        written.push(path);
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest).map_err(|source| ParsingError::Json {
        path: manifest_path.clone(),
        source,
    })?;
    std::fs::write(&manifest_path, json).map_err(ParsingError::io(&manifest_path))?;

    Ok(written)
}

fn read_manifest(path: &Path) -> Result<SectionManifest, ParsingError> {
    let content = std::fs::read_to_string(path).map_err(ParsingError::io(path))?;
    serde_json::from_str(&content).map_err(|source| ParsingError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_section_file(path: &Path, pages: Option<PageRange>) -> Result<SectionFile, ParsingError> {
    let content = std::fs::read_to_string(path).map_err(ParsingError::io(path))?;
    let (title, content) = parse_section_file(&content);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(SectionFile {
        path: path.to_path_buf(),
        stem,
        title,
        content,
        pages,
    })
}

/// Read the section files in `dir`.
///
/// With a manifest, its order is used and every listed file must exist
/// ([`ParsingError::SectionNotFound`] otherwise). Without one, all `*.md`
/// files except `*.zh.md` are read in file-name order.
pub fn read_section_files(dir: &Path) -> Result<Vec<SectionFile>, ParsingError> {
    if !dir.is_dir() {
        return Err(ParsingError::InputNotFound(dir.to_path_buf()));
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        let manifest = read_manifest(&manifest_path)?;
        return manifest
            .sections
            .iter()
            .map(|entry| {
                let path = dir.join(&entry.file);
                if !path.is_file() {
                    return Err(ParsingError::SectionNotFound(entry.file.clone()));
                }
                read_section_file(&path, entry.pages)
            })
            .collect();
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(ParsingError::io(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
            p.is_file() && name.ends_with(".md") && !name.ends_with(".zh.md")
        })
        .collect();
    paths.sort();

    paths.iter().map(|p| read_section_file(p, None)).collect()
}

/// Keep only the files whose stem is listed in `only`, in read order.
///
/// An empty `only` keeps everything. A stem that matches no file is
/// [`ParsingError::SectionNotFound`].
pub fn select_section_files(
    files: Vec<SectionFile>,
    only: &[String],
) -> Result<Vec<SectionFile>, ParsingError> {
    if only.is_empty() {
        return Ok(files);
    }
    if let Some(unknown) = only.iter().find(|stem| !files.iter().any(|f| &f.stem == *stem)) {
        return Err(ParsingError::SectionNotFound(unknown.clone()));
    }
    Ok(files
        .into_iter()
        .filter(|f| only.contains(&f.stem))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(index: usize, title: &str, body: &str) -> Section {
        Section {
            index,
            title: title.to_string(),
            heading: String::new(),
            body: body.to_string(),
            pages: Some(PageRange {
                start: index,
                end: index,
            }),
        }
    }

    #[test]
    fn test_write_and_read_section_files() {
        let dir = tempfile::tempdir().unwrap();
        let sections = vec![
            section(1, "", "  \n"),
            section(2, "Abstract", "We present Dilithium.\n"),
            section(3, "Related Work", "Prior schemes."),
        ];
        let written = write_section_files(&sections, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("01_Abstract.md").exists());
        assert!(dir.path().join("02_Related_Work.md").exists());
        assert!(dir.path().join(MANIFEST_FILE).exists());

        let files = read_section_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].stem, "01_Abstract");
        assert_eq!(files[0].title.as_deref(), Some("Abstract"));
        assert_eq!(files[0].content, "We present Dilithium.");
        assert_eq!(files[1].pages, Some(PageRange { start: 3, end: 3 }));
        assert_eq!(files[1].to_section(2).title, "Related Work");
    }

    #[test]
    fn test_manifest_entry_without_file_is_section_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_section_files(&[section(1, "Abstract", "A.")], dir.path()).unwrap();
        std::fs::remove_file(dir.path().join("01_Abstract.md")).unwrap();

        let err = read_section_files(dir.path()).unwrap_err();
        assert!(matches!(err, ParsingError::SectionNotFound(ref f) if f == "01_Abstract.md"));
    }

    #[test]
    fn test_read_without_manifest_sorts_and_skips_translations() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("02_Intro.md"), "# Intro\n\nB.\n").unwrap();
        std::fs::write(dir.path().join("01_Abstract.md"), "# Abstract\n\nA.\n").unwrap();
        std::fs::write(dir.path().join("01_Abstract.zh.md"), "# 摘要\n\n甲。\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = read_section_files(dir.path()).unwrap();
        let stems: Vec<_> = files.iter().map(|f| f.stem.as_str()).collect();
        assert_eq!(stems, vec!["01_Abstract", "02_Intro"]);
    }

    #[test]
    fn test_read_missing_dir() {
        let err = read_section_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, ParsingError::InputNotFound(_)));
    }

    #[test]
    fn test_load_sections_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let md = dir.path().join("paper_en.md");
        std::fs::write(&md, "# Abstract\n\nA.\n\n# Introduction\n\nB.\n").unwrap();
        let sections = load_sections(&md).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].title, "Introduction");

        let json = dir.path().join("paper_en.json");
        std::fs::write(
            &json,
            r#"{"source_file": "paper.pdf", "total_pages": 1,
                "pages": [{"page": 1, "text": "..."}],
                "sections": [{"title": "Abstract", "content": "A."},
                             {"title": "Conclusion", "content": "C.", "pages": {"start": 1, "end": 1}}]}"#,
        )
        .unwrap();
        let sections = load_sections(&json).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].index, 2);
        assert_eq!(sections[1].pages, Some(PageRange { start: 1, end: 1 }));

        let txt = dir.path().join("paper.txt");
        std::fs::write(&txt, "x").unwrap();
        assert!(matches!(
            load_sections(&txt),
            Err(ParsingError::UnsupportedFormat(ref e)) if e == ".txt"
        ));

        assert!(matches!(
            load_sections(&dir.path().join("missing.md")),
            Err(ParsingError::InputNotFound(_))
        ));
    }

    fn stem_file(stem: &str) -> SectionFile {
        SectionFile {
            path: PathBuf::from(format!("{stem}.md")),
            stem: stem.to_string(),
            title: Some(stem.to_string()),
            content: String::new(),
            pages: None,
        }
    }

    #[test]
    fn test_select_section_files_keeps_read_order() {
        let files = vec![
            stem_file("01_Abstract"),
            stem_file("02_Introduction"),
            stem_file("03_Preliminaries"),
        ];
        let only = vec!["03_Preliminaries".to_string(), "01_Abstract".to_string()];
        let selected = select_section_files(files.clone(), &only).unwrap();
        let stems: Vec<_> = selected.iter().map(|f| f.stem.as_str()).collect();
        assert_eq!(stems, vec!["01_Abstract", "03_Preliminaries"]);

        assert_eq!(select_section_files(files, &[]).unwrap().len(), 3);
    }

    #[test]
    fn test_select_unknown_stem_is_section_not_found() {
        let files = vec![stem_file("01_Abstract")];
        let only = vec!["01_Abstract".to_string(), "09_Appendix".to_string()];
        let err = select_section_files(files, &only).unwrap_err();
        assert!(matches!(err, ParsingError::SectionNotFound(ref s) if s == "09_Appendix"));
    }
}
