//! Source-level page lists (`content/<kind>/pagelist.json`).
//!
//! Unlike the published indices, a page list points at the Markdown sources
//! themselves (`contentPath = content/blog/<file>.md`). Clients that render
//! Markdown on their own read it instead of the generated pages. Nothing is
//! rendered and thumbnails are passed through untouched.
//!
//! Ordering differs per type: blog posts newest first, portfolio works by
//! title. Portfolio links additionally pick up the legacy top-level keys
//! `storepage`, `GameCreatorsCamp`, `X` and `Youtube`, labelled by key.

use crate::config::SiteConfig;
use crate::entry::{ContentEntry, ContentKind};
use crate::frontmatter::{self, Document, Link};
use crate::index;
use crate::pipeline::BuildError;
use crate::scan;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level frontmatter keys treated as portfolio links.
pub const LEGACY_LINK_KEYS: &[&str] = &["storepage", "GameCreatorsCamp", "X", "Youtube"];

/// Summary of one written page list.
#[derive(Debug)]
pub struct PagelistReport {
    pub kind: ContentKind,
    pub path: PathBuf,
    pub count: usize,
}

/// Page list entries for one content type, in output order.
pub fn collect(
    root: &Path,
    config: &SiteConfig,
    kind: ContentKind,
) -> Result<Vec<ContentEntry>, BuildError> {
    let content_dir = config.section(kind).content_dir.trim_end_matches('/');
    let sources = scan::scan_sources(&root.join(content_dir))?;

    let mut entries = Vec::with_capacity(sources.len());
    for source in &sources {
        let raw = fs::read_to_string(&source.path).map_err(|e| BuildError::Read {
            path: source.path.clone(),
            source: e,
        })?;
        let doc = frontmatter::parse(&raw).unwrap_or_else(|e| {
            warn!("{}: {e}", source.path.display());
            Document::without_meta(&raw)
        });
        let mut entry = ContentEntry::from_frontmatter(&source.id, &doc.meta, content_dir);
        entry.content_path = format!("{content_dir}/{}.md", source.id);
        if kind == ContentKind::Portfolio {
            entry.links.extend(LEGACY_LINK_KEYS.iter().filter_map(|&key| {
                doc.meta.text(key).map(|url| Link {
                    label: key.to_string(),
                    url,
                })
            }));
        }
        entries.push(entry);
    }

    match kind {
        ContentKind::Blog => index::sort_by_date_desc(&mut entries),
        ContentKind::Portfolio => entries.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title))
        }),
    }
    Ok(entries)
}

/// Write `<content_dir>/pagelist.json` for one content type.
pub fn generate(
    root: &Path,
    config: &SiteConfig,
    kind: ContentKind,
) -> Result<PagelistReport, BuildError> {
    let entries = collect(root, config, kind)?;
    let path = root
        .join(&config.section(kind).content_dir)
        .join("pagelist.json");
    index::write_index(&path, &entries)?;
    Ok(PagelistReport {
        kind,
        path,
        count: entries.len(),
    })
}
