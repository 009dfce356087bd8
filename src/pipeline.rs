//! Per-content-type build orchestration.
//!
//! ```text
//! content/<kind>/*.md ──scan──► sources
//!                                  │  (rayon, one task per file)
//!                                  ▼
//!              read → frontmatter → entry → thumbnail → markdown → page
//!                                  │                                 │
//!                                  │                     <output_dir>/<id>.html
//!                                  ▼
//!                 entries (source order) → sort by date ↓ → index JSON
//! ```
//!
//! Each file writes only its own page and thumbnail, so files are processed
//! in parallel on the global rayon pool. Results are collected in source
//! order and the index is written once, single-threaded, after every page
//! succeeded. Any hard error aborts the content type before its index is
//! touched.
//!
//! Two kinds of per-file trouble are recoverable and end up in
//! [`BuildReport::warnings`] instead of failing the build:
//!
//! - a data-URI thumbnail that will not decode (the field is left as-is)
//! - a frontmatter block that is not valid YAML, unless
//!   `build.strict_frontmatter` is set (the page is built without metadata)

use crate::config::SiteConfig;
use crate::entry::{ContentEntry, ContentKind};
use crate::frontmatter::{self, Document, FrontmatterError};
use crate::index::{self, IndexError};
use crate::markdown;
use crate::page::{PageContext, render_page};
use crate::scan::{self, ScanError, SourceFile};
use crate::thumbnail::{self, SavedThumbnail};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },
}

/// A recoverable per-file problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildWarning {
    pub id: String,
    pub message: String,
}

/// One generated page.
#[derive(Debug, Clone)]
pub struct BuiltPage {
    pub id: String,
    pub title: String,
    /// Site-relative output path, e.g. `blog/<id>.html`.
    pub output: String,
    pub source: PathBuf,
    pub thumbnail: Option<SavedThumbnail>,
}

/// Result of building one content type.
#[derive(Debug)]
pub struct BuildReport {
    pub kind: ContentKind,
    /// In source (filename) order.
    pub pages: Vec<BuiltPage>,
    /// In index order.
    pub entries: Vec<ContentEntry>,
    pub warnings: Vec<BuildWarning>,
    pub index_path: PathBuf,
}

/// Result of [`check_kind`]: what a build would produce, with nothing written.
#[derive(Debug)]
pub struct CheckReport {
    pub kind: ContentKind,
    pub entries: Vec<ContentEntry>,
    pub warnings: Vec<BuildWarning>,
}

/// Build every content type.
pub fn build_all(root: &Path, config: &SiteConfig) -> Result<Vec<BuildReport>, BuildError> {
    ContentKind::ALL
        .iter()
        .map(|&kind| build_kind(root, config, kind))
        .collect()
}

/// Build the pages and index of one content type under `root`.
pub fn build_kind(
    root: &Path,
    config: &SiteConfig,
    kind: ContentKind,
) -> Result<BuildReport, BuildError> {
    let section = config.section(kind);
    let sources = scan::scan_sources(&root.join(&section.content_dir))?;
    info!("{kind}: {} source files in {}", sources.len(), section.content_dir);

    let output_dir = root.join(&section.output_dir);
    fs::create_dir_all(&output_dir).map_err(|source| BuildError::Write {
        path: output_dir.clone(),
        source,
    })?;
    let ad_script = load_ad_script(root, section.ad_script.as_deref())?;

    let results = sources
        .par_iter()
        .map(|source| build_page(root, config, kind, source, ad_script.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut pages = Vec::with_capacity(results.len());
    let mut entries = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for (entry, page, file_warnings) in results {
        entries.push(entry);
        pages.push(page);
        warnings.extend(file_warnings);
    }

    index::sort_by_date_desc(&mut entries);
    let index_path = root.join(&section.index);
    index::write_index(&index_path, &entries)?;
    info!("{kind}: wrote {} entries to {}", entries.len(), section.index);

    Ok(BuildReport {
        kind,
        pages,
        entries,
        warnings,
        index_path,
    })
}

/// Parse every source of one content type without writing anything.
///
/// Data-URI thumbnails are decoded to catch bad payloads but not saved.
pub fn check_kind(
    root: &Path,
    config: &SiteConfig,
    kind: ContentKind,
) -> Result<CheckReport, BuildError> {
    let section = config.section(kind);
    let sources = scan::scan_sources(&root.join(&section.content_dir))?;

    let results = sources
        .par_iter()
        .map(|source| -> Result<_, BuildError> {
            let mut warnings = Vec::new();
            let raw = read_source(source)?;
            let doc = parse_document(&raw, source, config.build.strict_frontmatter, &mut warnings)?;
            let entry = ContentEntry::from_frontmatter(&source.id, &doc.meta, &section.output_dir);
            if thumbnail::is_data_uri(&entry.thumbnail) {
                if let Err(e) = thumbnail::decode_data_uri(&entry.thumbnail) {
                    warnings.push(BuildWarning {
                        id: source.id.clone(),
                        message: format!("thumbnail: {e}"),
                    });
                }
            }
            Ok((entry, warnings))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut entries = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for (entry, file_warnings) in results {
        entries.push(entry);
        warnings.extend(file_warnings);
    }
    index::sort_by_date_desc(&mut entries);
    Ok(CheckReport {
        kind,
        entries,
        warnings,
    })
}

fn build_page(
    root: &Path,
    config: &SiteConfig,
    kind: ContentKind,
    source: &SourceFile,
    ad_script: Option<&str>,
) -> Result<(ContentEntry, BuiltPage, Vec<BuildWarning>), BuildError> {
    let section = config.section(kind);
    let mut warnings = Vec::new();

    let raw = read_source(source)?;
    let doc = parse_document(&raw, source, config.build.strict_frontmatter, &mut warnings)?;
    let mut entry = ContentEntry::from_frontmatter(&source.id, &doc.meta, &section.output_dir);

    let saved = match thumbnail::persist_data_uri(
        root,
        &config.assets.thumbnails_dir,
        &source.id,
        &entry.thumbnail,
    ) {
        Ok(Some(saved)) => {
            debug!("{}: saved thumbnail {}", source.id, saved.path);
            entry.thumbnail = saved.path.clone();
            Some(saved)
        }
        Ok(None) => None,
        Err(e) => {
            warn!("{}: failed to process thumbnail: {e}", source.id);
            warnings.push(BuildWarning {
                id: source.id.clone(),
                message: format!("thumbnail: {e}"),
            });
            None
        }
    };

    let rendered = markdown::render(&doc.body);
    let toc = if section.toc {
        markdown::toc(&rendered.headings)
    } else {
        None
    };
    let html = render_page(&PageContext {
        kind,
        entry: &entry,
        body_html: &rendered.html,
        toc,
        ad_script,
        config,
    });

    let output = entry.content_path.clone();
    let out_path = root.join(&output);
    fs::write(&out_path, html.into_string()).map_err(|source| BuildError::Write {
        path: out_path.clone(),
        source,
    })?;
    debug!("generated {output}");

    let page = BuiltPage {
        id: source.id.clone(),
        title: entry.title.clone(),
        output,
        source: source.path.clone(),
        thumbnail: saved,
    };
    Ok((entry, page, warnings))
}

fn read_source(source: &SourceFile) -> Result<String, BuildError> {
    fs::read_to_string(&source.path).map_err(|e| BuildError::Read {
        path: source.path.clone(),
        source: e,
    })
}

/// Parse frontmatter, degrading to "no metadata" on malformed blocks
/// unless `strict` is set.
fn parse_document(
    raw: &str,
    source: &SourceFile,
    strict: bool,
    warnings: &mut Vec<BuildWarning>,
) -> Result<Document, BuildError> {
    match frontmatter::parse(raw) {
        Ok(doc) => Ok(doc),
        Err(e) if strict => Err(BuildError::Frontmatter {
            path: source.path.clone(),
            source: e,
        }),
        Err(e) => {
            warn!(
                "{}: {e}; building without metadata",
                source.path.display()
            );
            warnings.push(BuildWarning {
                id: source.id.clone(),
                message: format!("frontmatter: {e}"),
            });
            Ok(Document::without_meta(raw))
        }
    }
}

/// Read the ad-script partial. A configured but missing file is skipped.
fn load_ad_script(root: &Path, partial: Option<&str>) -> Result<Option<String>, BuildError> {
    let Some(partial) = partial else {
        return Ok(None);
    };
    let path = root.join(partial);
    if !path.is_file() {
        debug!("no ad script at {}", path.display());
        return Ok(None);
    }
    fs::read_to_string(&path)
        .map(Some)
        .map_err(|source| BuildError::Read { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn config() -> SiteConfig {
        SiteConfig::default()
    }

    #[test]
    fn empty_content_dir_writes_empty_index() {
        let tmp = TempDir::new().unwrap();
        let report = build_kind(tmp.path(), &config(), ContentKind::Blog).unwrap();
        assert!(report.pages.is_empty());
        let json = fs::read_to_string(tmp.path().join("assets/data/blogList.json")).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn builds_fixture_blog() {
        let tmp = setup_fixtures();
        let config = crate::config::load_config(tmp.path()).unwrap();
        let report = build_kind(tmp.path(), &config, ContentKind::Blog).unwrap();

        assert_eq!(report.pages.len(), 4);
        assert_eq!(
            entry_ids(&report.entries),
            vec!["blog_00002", "blog_00003", "blog_00001", "blog_00004"]
        );
        for page in &report.pages {
            assert!(tmp.path().join(&page.output).is_file(), "{}", page.output);
        }
    }

    #[test]
    fn data_uri_thumbnail_is_saved_and_rewritten() {
        let tmp = setup_fixtures();
        let config = crate::config::load_config(tmp.path()).unwrap();
        let report = build_kind(tmp.path(), &config, ContentKind::Blog).unwrap();

        let entry = find_entry(&report.entries, "blog_00001");
        assert_eq!(entry.thumbnail, "assets/img/thumbnails/blog_00001.png");
        let bytes = fs::read(tmp.path().join(&entry.thumbnail)).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

        let page = report.pages.iter().find(|p| p.id == "blog_00001").unwrap();
        assert!(page.thumbnail.is_some());
    }

    #[test]
    fn malformed_frontmatter_warns_and_continues() {
        let tmp = setup_fixtures();
        let config = crate::config::load_config(tmp.path()).unwrap();
        let report = build_kind(tmp.path(), &config, ContentKind::Blog).unwrap();

        let broken = find_entry(&report.entries, "blog_00004");
        assert_eq!(broken.title, "blog_00004");
        assert!(report.warnings.iter().any(|w| w.id == "blog_00004"));
        let html = fs::read_to_string(tmp.path().join("blog/blog_00004.html")).unwrap();
        assert!(html.contains("still gets a page"));
        assert!(!html.contains("title: [broken"));
    }

    #[test]
    fn strict_frontmatter_fails_the_build() {
        let tmp = setup_fixtures();
        let mut config = crate::config::load_config(tmp.path()).unwrap();
        config.build.strict_frontmatter = true;
        let result = build_kind(tmp.path(), &config, ContentKind::Blog);
        assert!(matches!(result, Err(BuildError::Frontmatter { .. })));
        // The index is only written after every page succeeded
        assert!(!tmp.path().join("assets/data/blogList.json").exists());
    }

    #[test]
    fn bad_thumbnail_is_a_warning() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("content/blog");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("x.md"),
            "---\ntitle: X\nthumbnail: data:image/png;base64,aGVsbG8=\n---\nBody",
        )
        .unwrap();

        let report = build_kind(tmp.path(), &config(), ContentKind::Blog).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.starts_with("thumbnail"));
        assert!(report.entries[0].thumbnail.starts_with("data:image/png"));
    }

    #[test]
    fn ad_script_only_on_blog_pages() {
        let tmp = setup_fixtures();
        let config = crate::config::load_config(tmp.path()).unwrap();
        build_all(tmp.path(), &config).unwrap();

        let blog = fs::read_to_string(tmp.path().join("blog/blog_00002.html")).unwrap();
        let work = fs::read_to_string(tmp.path().join("portfolio/work_01.html")).unwrap();
        assert!(blog.contains("ads.example.com"));
        assert!(!work.contains("ads.example.com"));
    }

    #[test]
    fn toc_rendered_for_blog_with_headings() {
        let tmp = setup_fixtures();
        let config = crate::config::load_config(tmp.path()).unwrap();
        build_kind(tmp.path(), &config, ContentKind::Blog).unwrap();

        let html = fs::read_to_string(tmp.path().join("blog/blog_00002.html")).unwrap();
        assert!(html.contains(r#"<nav class="toc""#));
        assert!(html.contains(r##"href="#vertex-shader""##));
    }

    #[test]
    fn check_writes_nothing() {
        let tmp = setup_fixtures();
        let config = crate::config::load_config(tmp.path()).unwrap();
        let report = check_kind(tmp.path(), &config, ContentKind::Blog).unwrap();

        assert_eq!(report.entries.len(), 4);
        assert!(report.warnings.iter().any(|w| w.id == "blog_00004"));
        assert!(!tmp.path().join("blog").exists());
        assert!(!tmp.path().join("assets/img/thumbnails").exists());
    }
}
