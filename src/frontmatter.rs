//! YAML frontmatter splitting and typed field access.
//!
//! A content file optionally starts with a metadata block fenced by `---`
//! lines:
//!
//! ```text
//! ---
//! title: Unity で作るシェーダー入門
//! date: 2024-03-01
//! tags: unity, shader
//! ---
//!
//! # Body starts here
//! ```
//!
//! [`split`] finds the fences, [`parse`] turns the block into a [`Frontmatter`]
//! map. A file without an opening fence (or without a closing one) has no
//! metadata and its whole text is the body.
//!
//! Field values stay as raw YAML until a caller asks for them through one of
//! the typed accessors, which apply the loose conventions content authors
//! rely on: numbers as text, `"a, b"` as a list, links as either URLs or
//! `{label, url}` mappings.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("malformed frontmatter: {0}")]
    Malformed(#[from] serde_yaml::Error),
    #[error("frontmatter must be a key/value mapping")]
    NotAMapping,
}

/// A named hyperlink attached to an entry (store page, video, repository).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub label: String,
    pub url: String,
}

/// The metadata block of one content file.
///
/// Holds exactly the keys the author declared, in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    fields: BTreeMap<String, Value>,
}

/// A content file split into metadata and Markdown body.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub meta: Frontmatter,
    pub body: String,
}

impl Document {
    /// The document with its metadata block discarded.
    ///
    /// Used to keep building when the block fails to parse.
    pub fn without_meta(raw: &str) -> Self {
        let body = split(raw).map(|(_, body)| body).unwrap_or(raw);
        Self {
            meta: Frontmatter::default(),
            body: body.to_string(),
        }
    }
}

/// Split raw file text into the YAML block and the body.
///
/// Returns `None` when the text does not open with a `---` line or the block
/// is never closed. The body is everything after the closing fence with
/// leading whitespace trimmed. A UTF-8 BOM and CRLF line endings are accepted.
pub fn split(raw: &str) -> Option<(&str, &str)> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let (first, after_open) = next_line(text);
    if !is_fence(first) {
        return None;
    }

    let mut rest = after_open;
    let mut yaml_len = 0;
    while !rest.is_empty() {
        let (line, next) = next_line(rest);
        if is_fence(line) {
            return Some((&after_open[..yaml_len], next.trim_start()));
        }
        yaml_len += rest.len() - next.len();
        rest = next;
    }
    None
}

/// Parse raw file text into a [`Document`].
///
/// No fenced block is not an error: the metadata is empty and the body is
/// the original text.
pub fn parse(raw: &str) -> Result<Document, FrontmatterError> {
    match split(raw) {
        Some((yaml, body)) => Ok(Document {
            meta: Frontmatter::from_yaml(yaml)?,
            body: body.to_string(),
        }),
        None => Ok(Document {
            meta: Frontmatter::default(),
            body: raw.to_string(),
        }),
    }
}

fn next_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

impl Frontmatter {
    /// Parse a YAML block. An empty or `null` block yields no fields.
    pub fn from_yaml(yaml: &str) -> Result<Self, FrontmatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => Ok(Self::default()),
            Value::Mapping(map) => {
                let mut fields = BTreeMap::new();
                for (key, value) in map {
                    let key = scalar_text(&key).ok_or(FrontmatterError::NotAMapping)?;
                    fields.insert(key, value);
                }
                Ok(Self { fields })
            }
            _ => Err(FrontmatterError::NotAMapping),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A scalar field as trimmed text. Empty strings and non-scalars are `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(scalar_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// A boolean field. Accepts YAML booleans and the string `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// A list field, normalised to trimmed non-empty strings.
    ///
    /// A comma-joined string is split on `,`. List items that are numbers
    /// or booleans are stringified; nested structures are skipped.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(scalar_text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(value) => scalar_text(value)
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// A links field.
    ///
    /// ```yaml
    /// links:                          # list of mappings
    ///   - { label: Steam, url: https://... }
    /// links:                          # list of bare URLs (label = URL)
    ///   - https://...
    /// links:                          # label → URL mapping
    ///   Steam: https://...
    /// ```
    pub fn links(&self, key: &str) -> Vec<Link> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(link_from_item).collect(),
            Some(Value::Mapping(map)) => map
                .iter()
                .filter_map(|(label, url)| {
                    let url = scalar_text(url)?.trim().to_string();
                    let label = scalar_text(label)?.trim().to_string();
                    (!url.is_empty()).then_some(Link { label, url })
                })
                .collect(),
            Some(value) => scalar_text(value)
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .map(|url| {
                    vec![Link {
                        label: url.clone(),
                        url,
                    }]
                })
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

/// Split a comma-joined string into trimmed non-empty items.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn link_from_item(item: &Value) -> Option<Link> {
    match item {
        Value::Mapping(map) => {
            let field = |name: &str| {
                map.get(name)
                    .and_then(scalar_text)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            };
            let url = field("url").or_else(|| field("href"))?;
            let label = field("label")
                .or_else(|| field("name"))
                .or_else(|| field("title"))
                .unwrap_or_else(|| url.clone());
            Some(Link { label, url })
        }
        other => {
            let url = scalar_text(other)?.trim().to_string();
            (!url.is_empty()).then(|| Link {
                label: url.clone(),
                url,
            })
        }
    }
}

/// Text form of a YAML scalar. `null` and collections have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}
