//! Shared test utilities for the foliogen test suite.
//!
//! The fixture site under `fixtures/site/` holds four blog posts (one with a
//! data-URI thumbnail, one with malformed frontmatter), two portfolio works,
//! a products list, an ad-script partial and an analytics export.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let config = load_config(tmp.path()).unwrap();
//! let report = build_kind(tmp.path(), &config, ContentKind::Blog).unwrap();
//!
//! let post = find_entry(&report.entries, "blog_00002");
//! assert_eq!(post.title, "Shader notes");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::entry::ContentEntry;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can build into without affecting other
/// tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Entry lookups: panic with a clear message on miss
// =========================================================================

/// Find an entry by id. Panics if not found.
pub fn find_entry<'a>(entries: &'a [ContentEntry], id: &str) -> &'a ContentEntry {
    entries.iter().find(|e| e.id == id).unwrap_or_else(|| {
        let ids = entry_ids(entries);
        panic!("entry '{id}' not found. Available: {ids:?}")
    })
}

/// All entry ids in order.
pub fn entry_ids(entries: &[ContentEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}
