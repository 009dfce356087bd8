//! Thumbnail normalisation.
//!
//! Authors sometimes paste an image straight into frontmatter as a data URI:
//!
//! ```text
//! thumbnail: data:image/png;base64,iVBORw0KGgo...
//! ```
//!
//! Shipping that inline would bloat both the page and the JSON index, so the
//! build decodes it once, writes `<thumbnails_dir>/<id>.<ext>`, and replaces
//! the field with that relative path. `jpeg` is written as `.jpg`.
//!
//! Social cards need absolute URLs, which [`absolute_image_url`] derives from
//! whatever the field holds after that rewrite.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("not a base64 image data URI")]
    Malformed,
    #[error("decoded payload is not a recognised image")]
    NotAnImage,
}

static DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^data:image/([a-zA-Z0-9]+);base64,(.+)$").expect("valid data URI pattern")
});

/// A thumbnail decoded and written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedThumbnail {
    /// Site-relative path stored back into the entry.
    pub path: String,
    /// Where the bytes were written.
    pub file: PathBuf,
    pub bytes: usize,
}

pub fn is_data_uri(value: &str) -> bool {
    value.starts_with("data:image")
}

/// File extension for a data URI image subtype.
pub fn extension_for(format: &str) -> String {
    let format = format.to_ascii_lowercase();
    if format == "jpeg" {
        "jpg".to_string()
    } else {
        format
    }
}

/// Decode a `data:image/<fmt>;base64,<data>` value into its extension and bytes.
pub fn decode_data_uri(value: &str) -> Result<(String, Vec<u8>), ThumbnailError> {
    let caps = DATA_URI.captures(value).ok_or(ThumbnailError::Malformed)?;
    let payload: String = caps[2].chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(payload)?;
    if image::guess_format(&bytes).is_err() {
        return Err(ThumbnailError::NotAnImage);
    }
    Ok((extension_for(&caps[1]), bytes))
}

/// Persist a data-URI thumbnail for entry `id`.
///
/// `rel_dir` is the thumbnails directory relative to `root`. Returns
/// `Ok(None)` when `value` is not a data URI and needs no rewriting.
pub fn persist_data_uri(
    root: &Path,
    rel_dir: &str,
    id: &str,
    value: &str,
) -> Result<Option<SavedThumbnail>, ThumbnailError> {
    if !is_data_uri(value) {
        return Ok(None);
    }
    let (ext, bytes) = decode_data_uri(value)?;
    let rel_dir = rel_dir.trim_end_matches('/');
    let filename = format!("{id}.{ext}");
    let dir = root.join(rel_dir);
    fs::create_dir_all(&dir)?;
    let file = dir.join(&filename);
    fs::write(&file, &bytes)?;
    Ok(Some(SavedThumbnail {
        path: format!("{rel_dir}/{filename}"),
        file,
        bytes: bytes.len(),
    }))
}

/// Absolute image URL for Open Graph and JSON-LD.
///
/// - empty → `<base_url>/<default_image>`
/// - starts with `http` → unchanged
/// - otherwise leading `../` and `/` are stripped and the rest joined to `base_url`
pub fn absolute_image_url(thumbnail: &str, base_url: &str, default_image: &str) -> String {
    let path = if thumbnail.is_empty() {
        default_image
    } else if thumbnail.starts_with("http") {
        return thumbnail.to_string();
    } else {
        thumbnail
    };
    let mut clean = path;
    while let Some(rest) = clean.strip_prefix("../") {
        clean = rest;
    }
    format!("{}/{}", base_url, clean.trim_start_matches('/'))
}
