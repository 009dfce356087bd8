//! Content entries: the records written to the JSON indices.
//!
//! One [`ContentEntry`] is derived from each Markdown source. Its JSON shape
//! is the contract with the browser-side list views, so keys are camelCase
//! and every optional field has an explicit default when read back. Older
//! indices stored `tags` as a comma-joined string; both forms deserialize to
//! the same normalised list.
//!
//! [`Product`] is the hand-maintained counterpart for the products page. It
//! is never generated, only read.

use crate::frontmatter::{Frontmatter, Link, split_list};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The two generated content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Blog,
    Portfolio,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Blog, ContentKind::Portfolio];

    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Blog => "blog",
            ContentKind::Portfolio => "portfolio",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One blog post or portfolio work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    /// Source filename without `.md`.
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tech: String,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub platform: Vec<String>,
    /// Relative asset path, absolute URL, or (before the build rewrites
    /// it) a `data:image/...` URI. Empty when the entry has none.
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    /// Site-relative URL of the generated page, e.g. `blog/<id>.html`.
    #[serde(default)]
    pub content_path: String,
    #[serde(default)]
    pub recommended: bool,
}

impl ContentEntry {
    /// Build an entry from parsed frontmatter.
    ///
    /// `output_dir` is the directory the page is written to, which is also
    /// the first segment of `contentPath`.
    pub fn from_frontmatter(id: &str, meta: &Frontmatter, output_dir: &str) -> Self {
        let text = |key: &str| meta.text(key).unwrap_or_default();
        Self {
            id: id.to_string(),
            title: meta.text("title").unwrap_or_else(|| id.to_string()),
            date: text("date"),
            category: text("category"),
            role: text("role"),
            description: text("description"),
            tech: text("tech"),
            tags: meta.list("tags"),
            platform: meta.list("platform"),
            thumbnail: text("thumbnail"),
            links: meta.links("links"),
            content_path: format!("{output_dir}/{id}.html"),
            recommended: meta.flag("recommended"),
        }
    }
}

/// One item on the products page (`assets/data/products.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Product type (app, tool, asset…), the products page facet.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "string_list")]
    pub platform: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub store_links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub download_links: Vec<Link>,
}

// =============================================================================
// Lenient list deserialization
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum ListField {
    Joined(String),
    Items(Vec<ListItem>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListItem {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Other(serde::de::IgnoredAny),
}

impl ListItem {
    fn into_text(self) -> Option<String> {
        match self {
            ListItem::Text(s) => Some(s),
            ListItem::Int(n) => Some(n.to_string()),
            ListItem::Float(n) => Some(n.to_string()),
            ListItem::Bool(b) => Some(b.to_string()),
            ListItem::Other(_) => None,
        }
    }
}

/// Accepts `"a, b"`, `["a", "b"]`, or `null`, yielding trimmed non-empty items.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ListField>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ListField::Joined(s)) => split_list(&s),
        Some(ListField::Items(items)) => items
            .into_iter()
            .filter_map(ListItem::into_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}
