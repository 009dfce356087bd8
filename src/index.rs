//! JSON index files.
//!
//! Each content type has one index (`assets/data/blogList.json`,
//! `assets/data/portfolioList.json`) that the list pages fetch. It is fully
//! recomputed on every build and overwritten, never merged.
//!
//! The index is written only after every page of its type was generated. A
//! failure part way through leaves the pages written so far next to the
//! previous run's index; the next successful build brings them back in line.

use crate::dates::newest_first;
use crate::entry::ContentEntry;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sort newest first. Stable, so entries with equal or unparseable dates
/// keep their relative order.
pub fn sort_by_date_desc(entries: &mut [ContentEntry]) {
    entries.sort_by(|a, b| newest_first(&a.date, &b.date));
}

/// Write `items` as pretty-printed JSON, creating parent directories.
pub fn write_index<T: Serialize>(path: &Path, items: &[T]) -> Result<(), IndexError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read an index back.
pub fn read_index<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IndexError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
