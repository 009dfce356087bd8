//! Content source discovery.
//!
//! Each content type reads a flat directory of Markdown files:
//!
//! ```text
//! content/
//! ├── blog/
//! │   ├── blog_00001.md        # id = "blog_00001"
//! │   ├── blog_00002.md
//! │   ├── pagelist.json        # ignored (not .md)
//! │   └── drafts/              # ignored (subdirectories are not walked)
//! └── portfolio/
//!     └── work_01.md
//! ```
//!
//! The entry id is the filename without `.md`. Files are returned sorted by
//! name so builds are reproducible regardless of directory order. Hidden
//! files are skipped. A content directory that does not exist holds zero
//! sources, which still produces an (empty) index.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// One Markdown source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Filename stem, unique within its directory.
    pub id: String,
    pub path: PathBuf,
}

/// List the `*.md` files directly inside `dir`.
pub fn scan_sources(dir: &Path) -> Result<Vec<SourceFile>, ScanError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut sources = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        if let Some(id) = name.strip_suffix(".md") {
            if !id.is_empty() {
                sources.push(SourceFile {
                    id: id.to_string(),
                    path: entry.path().to_path_buf(),
                });
            }
        }
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    fn ids(sources: &[SourceFile]) -> Vec<&str> {
        sources.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let sources = scan_sources(&tmp.path().join("content/blog")).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn finds_markdown_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.md", "a.md", "c.markdown", "notes.txt", ".hidden.md"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        fs::create_dir(tmp.path().join("drafts")).unwrap();
        fs::write(tmp.path().join("drafts/d.md"), "x").unwrap();

        let sources = scan_sources(tmp.path()).unwrap();
        assert_eq!(ids(&sources), vec!["a", "b"]);
        assert_eq!(sources[0].path, tmp.path().join("a.md"));
    }

    #[test]
    fn fixture_blog_sources() {
        let tmp = setup_fixtures();
        let sources = scan_sources(&tmp.path().join("content/blog")).unwrap();
        assert_eq!(
            ids(&sources),
            vec!["blog_00001", "blog_00002", "blog_00003", "blog_00004"]
        );
    }
}
