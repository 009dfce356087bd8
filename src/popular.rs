//! Popular posts (`assets/data/popular.json`).
//!
//! The input is a saved search-analytics query response with one row per
//! page URL:
//!
//! ```json
//! { "rows": [ { "keys": ["https://example.github.io/WebSite/blog/blog_00002.html"], "clicks": 31 } ] }
//! ```
//!
//! Rows are ranked by clicks, post ids are pulled out of `/<blog dir>/<id>.html`
//! URLs, and the first ten distinct ids are written as a JSON array. The
//! home page and recommendation widgets read that array.
//!
//! Fetching the data needs API credentials and happens outside this tool.
//! When no export is available an empty list is written, so stale rankings
//! never linger.

use crate::config::SiteConfig;
use crate::index::{self, IndexError};
use log::warn;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How many ids `popular.json` holds.
pub const POPULAR_LIMIT: usize = 10;

#[derive(Error, Debug)]
pub enum PopularError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid analytics export: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// One analytics row. `keys[0]` is the page URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Response {
        #[serde(default)]
        rows: Vec<Row>,
    },
    Rows(Vec<Row>),
}

/// Outcome of [`update_popular`].
#[derive(Debug)]
pub struct PopularReport {
    pub path: PathBuf,
    pub ids: Vec<String>,
    /// False when the export file was missing and `[]` was written.
    pub from_export: bool,
}

/// Parse an export: either the full response object or a bare row array.
pub fn parse_rows(json: &str) -> Result<Vec<Row>, PopularError> {
    Ok(match serde_json::from_str::<Export>(json)? {
        Export::Response { rows } => rows,
        Export::Rows(rows) => rows,
    })
}

/// Rank blog post ids by clicks.
pub fn popular_ids(mut rows: Vec<Row>, blog_dir: &str, limit: usize) -> Result<Vec<String>, PopularError> {
    let pattern = Regex::new(&format!(
        r"/{}/([A-Za-z0-9_-]+)\.html",
        regex::escape(blog_dir.trim_matches('/'))
    ))?;
    rows.sort_by(|a, b| b.clicks.total_cmp(&a.clicks));

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for row in &rows {
        let Some(url) = row.keys.first() else {
            continue;
        };
        if let Some(caps) = pattern.captures(url) {
            let id = caps[1].to_string();
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        if ids.len() >= limit {
            break;
        }
    }
    Ok(ids)
}

/// Rebuild `popular.json` from an analytics export.
///
/// A missing export writes `[]` with a warning and still succeeds.
pub fn update_popular(
    root: &Path,
    config: &SiteConfig,
    export: &Path,
) -> Result<PopularReport, PopularError> {
    let path = root.join(&config.assets.popular);
    if !export.is_file() {
        warn!(
            "analytics export not found at {}; writing empty popular list",
            export.display()
        );
        index::write_index::<String>(&path, &[])?;
        return Ok(PopularReport {
            path,
            ids: Vec::new(),
            from_export: false,
        });
    }

    let rows = parse_rows(&fs::read_to_string(export)?)?;
    let ids = popular_ids(rows, &config.blog.output_dir, POPULAR_LIMIT)?;
    index::write_index(&path, &ids)?;
    Ok(PopularReport {
        path,
        ids,
        from_export: true,
    })
}

/// Read `popular.json`. A missing file is an empty list.
pub fn load_popular(root: &Path, config: &SiteConfig) -> Result<Vec<String>, PopularError> {
    let path = root.join(&config.assets.popular);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    Ok(index::read_index(&path)?)
}
