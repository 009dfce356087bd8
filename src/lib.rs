//! # Foliogen
//!
//! The content build for a personal blog and portfolio site. Posts and works
//! are Markdown files with YAML frontmatter; the build turns each one into a
//! standalone HTML page and writes a JSON index per content type that the
//! site's list pages, search box and recommendation widgets read.
//!
//! # Architecture: One Pass Per Content Type
//!
//! ```text
//! content/blog/*.md ──┐                            ┌── blog/<id>.html
//!                     ├─ scan → parse → render ────┤
//! content/portfolio/ ─┘      (rayon, per file)     └── assets/data/<kind>List.json
//!                                                        (sorted, written last)
//! ```
//!
//! Every file is independent: it is parsed, its data-URI thumbnail (if any)
//! is written out as an image file, and its page is rendered and saved. Only
//! after every file of a type succeeded is the index sorted newest-first and
//! written, so a failed run never leaves a half-written index behind.
//!
//! The list pages are static HTML shells; filtering, pagination and
//! recommendations run over the published indices. Those rules live in
//! [`views`] and [`recommend`] as pure functions over loaded entries, so the
//! same behaviour can be exercised from the CLI (`foliogen search`,
//! `foliogen related`) and from tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Finds the Markdown sources of a content type |
//! | [`frontmatter`] | Splits `---` YAML blocks from bodies; lenient typed accessors |
//! | [`entry`] | `ContentEntry` and `Product`, the JSON records of the indices |
//! | [`markdown`] | Markdown to HTML with heading anchors and a table of contents |
//! | [`thumbnail`] | Decodes `data:image/...;base64` thumbnails into files |
//! | [`page`] | Maud template for article and work pages (SEO, JSON-LD, share links) |
//! | [`pipeline`] | Per-type build and dry-run check, parallel over files |
//! | [`index`] | Canonical date sort and JSON index read/write |
//! | [`views`] | List-page filtering, facets, pagination, query-string state |
//! | [`recommend`] | Related, recommended and home-page post picks |
//! | [`pagelist`] | Source-level `pagelist.json` for Markdown-rendering clients |
//! | [`popular`] | `popular.json` from a search-analytics export |
//! | [`config`] | Optional `site.toml`, merged over stock defaults and validated |
//! | [`dates`] | Lenient date parsing and `YYYY/MM/DD` display |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Lenient Frontmatter
//!
//! Posts are hand-edited. A broken YAML block should not take the whole site
//! down, so by default the file is built without metadata (title falls back to
//! the id) and the problem is reported as a warning. `build.strict_frontmatter`
//! turns it into a hard error for CI.
//!
//! ## Maud For Pages
//!
//! Pages are generated with [Maud](https://maud.lambda.xyz/), so every
//! interpolated title, description and tag is escaped at compile-time-checked
//! call sites. The only raw HTML is the rendered Markdown body and the
//! configured ad-script partial.

pub mod config;
pub mod dates;
pub mod entry;
pub mod frontmatter;
pub mod index;
pub mod markdown;
pub mod output;
pub mod page;
pub mod pagelist;
pub mod pipeline;
pub mod popular;
pub mod recommend;
pub mod scan;
pub mod thumbnail;
pub mod views;

#[cfg(test)]
pub(crate) mod test_helpers;
