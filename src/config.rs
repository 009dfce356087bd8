//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! overridden by a sparse user file at the site root, so a site only needs to
//! state the values that differ from the defaults.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── site.toml                # Optional, overrides stock defaults
//! ├── content/
//! │   ├── blog/*.md
//! │   └── portfolio/*.md
//! ├── partials/ad-script.html  # Optional, inserted into every blog <head>
//! └── assets/data/             # Generated JSON indices
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! base_url = "https://example.github.io/WebSite"   # No trailing slash
//! site_name = "PanKUN"
//! lang = "ja"
//!
//! [author]
//! name = "PanKUN"
//! email = ""
//!
//! [blog]
//! content_dir = "content/blog"
//! output_dir = "blog"
//! index = "assets/data/blogList.json"
//! list_page = "blog.html"
//! title_suffix = "Blog"
//! toc = true
//! share_buttons = true
//! page_size = 10          # Omit for a single page
//! ad_script = "partials/ad-script.html"
//!
//! [portfolio]
//! # same keys as [blog]
//!
//! [assets]
//! thumbnails_dir = "assets/img/thumbnails"
//! default_image = "assets/img/ogp.png"
//! logo = "assets/img/favicon-192.png"
//! popular = "assets/data/popular.json"
//! products = "assets/data/products.json"
//!
//! [build]
//! strict_frontmatter = false
//! max_processes = 4         # Omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::entry::ContentKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up at the site root.
pub const CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have defaults matching the layout the browser-side scripts
/// expect. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute site URL used for canonical links and Open Graph images.
    pub base_url: String,
    /// Site name shown in page titles and structured data.
    pub site_name: String,
    /// Document language (`<html lang>`).
    pub lang: String,
    pub author: AuthorConfig,
    pub blog: SectionConfig,
    pub portfolio: SectionConfig,
    pub assets: AssetsConfig,
    pub build: BuildConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://breadmotion.github.io/WebSite".to_string(),
            site_name: "PanKUN".to_string(),
            lang: "ja".to_string(),
            author: AuthorConfig::default(),
            blog: SectionConfig::default_blog(),
            portfolio: SectionConfig::default_portfolio(),
            assets: AssetsConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Section settings for one content type.
    pub fn section(&self, kind: ContentKind) -> &SectionConfig {
        match kind {
            ContentKind::Blog => &self.blog,
            ContentKind::Portfolio => &self.portfolio,
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_url must not end with '/'".into(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "base_url must be an http(s) URL".into(),
            ));
        }
        for (name, section) in [("blog", &self.blog), ("portfolio", &self.portfolio)] {
            if section.output_dir.is_empty() || section.output_dir.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "{name}.output_dir must be a single directory name"
                )));
            }
            if section.page_size == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "{name}.page_size must be at least 1"
                )));
            }
        }
        if self.blog.output_dir == self.portfolio.output_dir {
            return Err(ConfigError::Validation(
                "blog and portfolio must use different output_dir values".into(),
            ));
        }
        Ok(())
    }
}

/// Author identity used in JSON-LD and Open Graph tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub name: String,
    /// Published as `og:email` when non-empty.
    pub email: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "PanKUN".to_string(),
            email: String::new(),
        }
    }
}

/// Per-content-type settings (`[blog]` and `[portfolio]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionConfig {
    /// Directory of Markdown sources, relative to the site root.
    pub content_dir: String,
    /// Directory generated pages are written to; also their URL segment.
    pub output_dir: String,
    /// JSON index path, relative to the site root.
    pub index: String,
    /// List page the tag links point back to.
    pub list_page: String,
    /// Appended to the entry title in `<title>` (`"<title> | <site> <suffix>"`).
    pub title_suffix: String,
    /// Render a table of contents from h2/h3 headings.
    pub toc: bool,
    /// Render share buttons under the article.
    pub share_buttons: bool,
    /// Cards per page in the list view; absent means a single page.
    pub page_size: Option<usize>,
    /// Optional partial inserted verbatim into `<head>`.
    pub ad_script: Option<String>,
}

impl SectionConfig {
    pub fn default_blog() -> Self {
        Self {
            content_dir: "content/blog".to_string(),
            output_dir: "blog".to_string(),
            index: "assets/data/blogList.json".to_string(),
            list_page: "blog.html".to_string(),
            title_suffix: "Blog".to_string(),
            toc: true,
            share_buttons: true,
            page_size: Some(10),
            ad_script: Some("partials/ad-script.html".to_string()),
        }
    }

    pub fn default_portfolio() -> Self {
        Self {
            content_dir: "content/portfolio".to_string(),
            output_dir: "portfolio".to_string(),
            index: "assets/data/portfolioList.json".to_string(),
            list_page: "portfolio.html".to_string(),
            title_suffix: "Portfolio".to_string(),
            toc: false,
            share_buttons: false,
            page_size: None,
            ad_script: None,
        }
    }
}

impl Default for SectionConfig {
    /// Fills keys missing from a sparse table. The optional keys stay unset
    /// so `[portfolio]` never inherits the blog's pagination or ad script.
    fn default() -> Self {
        Self {
            page_size: None,
            ad_script: None,
            ..Self::default_blog()
        }
    }
}

/// Shared asset locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Where decoded data-URI thumbnails are written.
    pub thumbnails_dir: String,
    /// Open Graph image used when an entry has no thumbnail.
    pub default_image: String,
    /// Publisher logo for JSON-LD.
    pub logo: String,
    pub popular: String,
    pub products: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            thumbnails_dir: "assets/img/thumbnails".to_string(),
            default_image: "assets/img/ogp.png".to_string(),
            logo: "assets/img/favicon-192.png".to_string(),
            popular: "assets/data/popular.json".to_string(),
            products: "assets/data/products.json".to_string(),
        }
    }
}

/// Build behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Fail the build on a malformed frontmatter block instead of warning.
    pub strict_frontmatter: bool,
    /// Maximum number of parallel page workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &BuildConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Load `site.toml` from the site root, falling back to the stock defaults.
///
/// The file is sparse: any key it sets replaces the default, everything
/// else keeps its stock value. Unknown keys and invalid values are errors.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let mut merged = stock_defaults_value();
    if let Some(site) = read_site_toml(root)? {
        overlay_toml(&mut merged, site);
    }
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// The stock defaults as a TOML table, the base every `site.toml` lands on.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

fn read_site_toml(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = root.join(CONFIG_FILENAME);
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(toml::from_str(&fs::read_to_string(&path)?)?))
}

/// Lay `site` over `defaults` in place. Sections merge per key; a scalar or
/// array from `site` replaces the default outright.
fn overlay_toml(defaults: &mut toml::Value, site: toml::Value) {
    match (defaults, site) {
        (toml::Value::Table(into), toml::Value::Table(from)) => {
            for (key, value) in from {
                match into.get_mut(&key) {
                    Some(slot) => overlay_toml(slot, value),
                    None => {
                        into.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# foliogen configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Absolute site URL, no trailing slash. Used for canonical links,
# Open Graph images and JSON-LD.
base_url = "https://breadmotion.github.io/WebSite"
site_name = "PanKUN"
lang = "ja"

[author]
name = "PanKUN"
# Published as og:email when set.
email = ""

# ---------------------------------------------------------------------------
# Blog posts: content/blog/*.md -> blog/<id>.html + blogList.json
# ---------------------------------------------------------------------------
[blog]
content_dir = "content/blog"
output_dir = "blog"
index = "assets/data/blogList.json"
list_page = "blog.html"
title_suffix = "Blog"
toc = true
share_buttons = true
page_size = 10
# Inserted verbatim into <head> when the file exists.
ad_script = "partials/ad-script.html"

# ---------------------------------------------------------------------------
# Portfolio works: content/portfolio/*.md -> portfolio/<id>.html
# ---------------------------------------------------------------------------
[portfolio]
content_dir = "content/portfolio"
output_dir = "portfolio"
index = "assets/data/portfolioList.json"
list_page = "portfolio.html"
title_suffix = "Portfolio"
toc = false
share_buttons = false
# Omit to show every work on one page.
# page_size = 12

# ---------------------------------------------------------------------------
# Assets
# ---------------------------------------------------------------------------
[assets]
# Decoded data-URI thumbnails land here as <id>.<ext>.
thumbnails_dir = "assets/img/thumbnails"
default_image = "assets/img/ogp.png"
logo = "assets/img/favicon-192.png"
popular = "assets/data/popular.json"
products = "assets/data/products.json"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Fail instead of warning when a frontmatter block is not valid YAML.
strict_frontmatter = false
# Omit to use every CPU core.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_site_layout() {
        let config = SiteConfig::default();
        assert_eq!(config.blog.output_dir, "blog");
        assert_eq!(config.blog.index, "assets/data/blogList.json");
        assert_eq!(config.portfolio.index, "assets/data/portfolioList.json");
        assert_eq!(config.blog.page_size, Some(10));
        assert_eq!(config.portfolio.page_size, None);
        assert_eq!(config.assets.thumbnails_dir, "assets/img/thumbnails");
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn section_lookup_by_kind() {
        let config = SiteConfig::default();
        assert_eq!(config.section(ContentKind::Blog).output_dir, "blog");
        assert_eq!(
            config.section(ContentKind::Portfolio).output_dir,
            "portfolio"
        );
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
site_name = "Example"

[blog]
page_size = 5
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site_name, "Example");
        assert_eq!(config.blog.page_size, Some(5));
        // Untouched keys in the same table come from the field-level default
        assert_eq!(config.blog.output_dir, "blog");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_name, "PanKUN");
        assert_eq!(config.portfolio.output_dir, "portfolio");
        assert_eq!(config.portfolio.page_size, None);
        assert_eq!(config.portfolio.ad_script, None);
        assert_eq!(config.blog.ad_script.as_deref(), Some("partials/ad-script.html"));
    }

    #[test]
    fn load_config_merges_portfolio_overrides_onto_portfolio_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[portfolio]
toc = true
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert!(config.portfolio.toc);
        // Merging against stock defaults keeps portfolio-specific values
        assert_eq!(config.portfolio.output_dir, "portfolio");
        assert_eq!(config.portfolio.title_suffix, "Portfolio");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "not valid [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[blog]\npage_sise = 3\n",
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn trailing_slash_base_url_rejected() {
        let mut config = SiteConfig::default();
        config.base_url = "https://example.com/".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut config = SiteConfig::default();
        config.blog.page_size = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn shared_output_dir_rejected() {
        let mut config = SiteConfig::default();
        config.portfolio.output_dir = "blog".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlay_keeps_unset_section_keys() {
        let mut base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let site: toml::Value = toml::from_str("[a]\ny = 3\nz = [1]\n").unwrap();
        overlay_toml(&mut base, site);
        assert_eq!(base["a"]["x"].as_integer(), Some(1));
        assert_eq!(base["a"]["y"].as_integer(), Some(3));
        assert_eq!(base["a"]["z"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.base_url, defaults.base_url);
        assert_eq!(config.blog.index, defaults.blog.index);
        assert_eq!(config.portfolio.toc, defaults.portfolio.toc);
        assert_eq!(config.build.max_processes, None);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = BuildConfig {
            strict_frontmatter: false,
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = BuildConfig {
            strict_frontmatter: false,
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
