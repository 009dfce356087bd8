//! CLI output formatting for every command.
//!
//! Output is information-first: each entity leads with its positional index
//! and title, and filesystem paths follow as indented context lines.
//!
//! ## Build
//!
//! ```text
//! Blog → assets/data/blogList.json (4 entries)
//! 001 Getting started with Unity → blog/blog_00001.html
//!     Source: content/blog/blog_00001.md
//!     Thumbnail: assets/img/thumbnails/blog_00001.png (67 bytes)
//! 002 Shader notes → blog/blog_00002.html
//!     Source: content/blog/blog_00002.md
//! Warnings
//!     blog_00004: frontmatter: malformed frontmatter: ...
//! ```
//!
//! ## Check
//!
//! ```text
//! Blog (4 entries, 1 warning)
//! 001 Shader notes (2024/03/01, Tech)
//! ...
//! ```
//!
//! ## Search
//!
//! ```text
//! Blog: 2 of 4 match q=unity (page 1/1)
//! 001 Shader notes
//!     blog_00002
//! ```
//!
//! Each command has a `format_*` function returning `Vec<String>` and a
//! `print_*` wrapper that writes to stdout. The format functions do no I/O.

use crate::dates::format_date;
use crate::entry::ContentEntry;
use crate::pagelist::PagelistReport;
use crate::pipeline::{BuildReport, BuildWarning, CheckReport};
use crate::popular::PopularReport;
use crate::views::{ListState, Listing};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `root` when it lives under it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn entries(n: usize) -> String {
    plural(n, "entry", "entries")
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn warning_lines(warnings: &[BuildWarning]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Warnings".to_string()];
    for w in warnings {
        lines.push(format!("{}{}: {}", indent(1), w.id, w.message));
    }
    lines
}

/// `2024/03/01, Tech` style detail; empty parts are dropped.
fn entry_detail(entry: &ContentEntry) -> String {
    [format_date(&entry.date), entry.category.clone()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Build
// ============================================================================

/// Generated pages of one content type, in source order.
pub fn format_build_output(report: &BuildReport, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {} ({})",
        title_case(report.kind.name()),
        relative(&report.index_path, root),
        entries(report.entries.len())
    )];
    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!("{} {} → {}", format_index(i + 1), page.title, page.output));
        lines.push(format!("{}Source: {}", indent(1), relative(&page.source, root)));
        if let Some(thumb) = &page.thumbnail {
            lines.push(format!(
                "{}Thumbnail: {} ({} bytes)",
                indent(1),
                thumb.path,
                thumb.bytes
            ));
        }
    }
    lines.extend(warning_lines(&report.warnings));
    lines
}

pub fn print_build_output(report: &BuildReport, root: &Path) {
    for line in format_build_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Parsed entries of one content type, in index order.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}, {})",
        title_case(report.kind.name()),
        entries(report.entries.len()),
        plural(report.warnings.len(), "warning", "warnings")
    )];
    for (i, entry) in report.entries.iter().enumerate() {
        let detail = entry_detail(entry);
        if detail.is_empty() {
            lines.push(format!("{} {}", format_index(i + 1), entry.title));
        } else {
            lines.push(format!("{} {} ({})", format_index(i + 1), entry.title, detail));
        }
    }
    lines.extend(warning_lines(&report.warnings));
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Page lists and popular posts
// ============================================================================

pub fn format_pagelist_output(report: &PagelistReport, root: &Path) -> Vec<String> {
    vec![format!(
        "{} page list → {} ({})",
        title_case(report.kind.name()),
        relative(&report.path, root),
        entries(report.count)
    )]
}

pub fn print_pagelist_output(report: &PagelistReport, root: &Path) {
    for line in format_pagelist_output(report, root) {
        println!("{}", line);
    }
}

pub fn format_popular_output(report: &PopularReport, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Popular → {} ({})",
        relative(&report.path, root),
        plural(report.ids.len(), "post", "posts")
    )];
    if !report.from_export {
        lines.push(format!("{}no analytics export; list cleared", indent(1)));
    }
    for (i, id) in report.ids.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), id));
    }
    lines
}

pub fn print_popular_output(report: &PopularReport, root: &Path) {
    for line in format_popular_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Search and related
// ============================================================================

/// The current page of a list view as text.
pub fn format_search_output<T: Listing>(state: &ListState<T>) -> Vec<String> {
    let page = state.current_page();
    let query = state.query_string();
    let mut header = format!(
        "{}: {} of {} match",
        title_case(state.kind.name()),
        page.total_items,
        state.items.len()
    );
    if !query.is_empty() {
        header.push(' ');
        header.push_str(&query);
    }
    header.push_str(&format!(" (page {}/{})", page.page, page.total_pages));

    let mut lines = vec![header];
    let offset = (page.page - 1).saturating_mul(state.per_page);
    for (i, item) in page.items.iter().enumerate() {
        lines.push(format!("{} {}", format_index(offset + i + 1), item.title()));
        lines.push(format!("{}{}", indent(1), item.id()));
    }
    if page.items.is_empty() {
        lines.push(format!("{}{}", indent(1), state.kind.empty_message()));
    }
    lines
}

pub fn print_search_output<T: Listing>(state: &ListState<T>) {
    for line in format_search_output(state) {
        println!("{}", line);
    }
}

/// Related and recommended posts for one article.
pub fn format_related_output(
    current: &str,
    related: &[&ContentEntry],
    recommended: &[&ContentEntry],
) -> Vec<String> {
    let mut lines = Vec::new();
    for (title, posts) in [("Related", related), ("Recommended", recommended)] {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{title} to {current}"));
        if posts.is_empty() {
            lines.push(format!("{}(none)", indent(1)));
        }
        for (i, post) in posts.iter().enumerate() {
            lines.push(format!("{} {} → {}", format_index(i + 1), post.title, post.content_path));
        }
    }
    lines
}

pub fn print_related_output(current: &str, related: &[&ContentEntry], recommended: &[&ContentEntry]) {
    for line in format_related_output(current, related, recommended) {
        println!("{}", line);
    }
}
