use std::path::{Path, PathBuf};

use crate::settings::Paths;

/// One checked pipeline artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub label: String,
    pub path: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// File present, with its size in bytes.
    File(u64),
    /// Directory present, with the number of section files in it.
    Dir(usize),
    Missing(String),
}

impl Check {
    pub fn ok(&self) -> bool {
        !matches!(self.outcome, Outcome::Missing(_))
    }
}

fn file_check(label: &str, path: PathBuf) -> Check {
    let outcome = match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Outcome::File(meta.len()),
        _ => Outcome::Missing(format!("missing {}", path.display())),
    };
    Check {
        label: label.to_string(),
        path,
        outcome,
    }
}

/// First file in `dir` whose name ends with `suffix`, in name order.
fn find_with_suffix(dir: &Path, suffix: &str) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(suffix))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

fn suffix_check(label: &str, dir: &Path, suffix: &str) -> Check {
    match find_with_suffix(dir, suffix) {
        Some(path) => file_check(label, path),
        None => Check {
            label: label.to_string(),
            path: dir.to_path_buf(),
            outcome: Outcome::Missing(format!("no *{suffix} in {}", dir.display())),
        },
    }
}

fn sections_check(dir: &Path) -> Check {
    let count = std::fs::read_dir(dir).ok().map(|entries| {
        entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "md")
                    && !p.to_string_lossy().ends_with(".zh.md")
            })
            .count()
    });
    let outcome = match count {
        None => Outcome::Missing(format!("missing sections directory {}", dir.display())),
        Some(0) => Outcome::Missing(format!("no section files in {}", dir.display())),
        Some(n) => Outcome::Dir(n),
    };
    Check {
        label: "section files".to_string(),
        path: dir.to_path_buf(),
        outcome,
    }
}

/// Check that every pipeline artifact exists under `root`.
pub fn verify_pipeline(root: &Path, paths: &Paths) -> Vec<Check> {
    let out_dir = root.join(&paths.out_dir);
    vec![
        suffix_check("extracted Markdown", &out_dir, "_en.md"),
        suffix_check("extracted JSON", &out_dir, "_en.json"),
        sections_check(&root.join(&paths.sections_dir)),
        file_check("exported document", root.join(&paths.output_file)),
        file_check("glossary", root.join(&paths.glossary_file)),
    ]
}
