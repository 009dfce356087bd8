//! Full HTML documents for blog posts and portfolio works.
//!
//! ## Document Structure
//!
//! ```text
//! <head>
//!   title, description, canonical
//!   ad-script partial (blog, verbatim)
//!   JSON-LD  (BlogPosting | CreativeWork)
//!   Open Graph + Twitter Card
//!   base.css, layout.css, <kind>.css
//! <body data-page="<kind>">
//!   article.post-detail | article.work-detail
//!     header: meta line, h1, description, tech, tag links
//!     nav.toc                (when enabled and headings exist)
//!     section.markdown-body  (rendered Markdown, inserted as-is)
//!     share buttons          (when enabled)
//!     related + recommend    (blog only, filled by recommend.js)
//!   layout.js, ui.js, toc.js, recommend.js
//! ```
//!
//! Pages live one directory below the site root (`blog/<id>.html`), so all
//! asset and list-page links are `../`-relative.
//!
//! Every interpolated value goes through maud's escaping (`& < > "`). The
//! two exceptions are the rendered body and the ad-script partial, which are
//! trusted HTML. JSON-LD is emitted raw inside its `<script>` with `<`
//! written as `\u003c`, so no value can close the element early.

use crate::config::SiteConfig;
use crate::dates::format_date;
use crate::entry::{ContentEntry, ContentKind};
use crate::thumbnail::{absolute_image_url, is_data_uri};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde_json::json;

/// Everything needed to render one page.
pub struct PageContext<'a> {
    pub kind: ContentKind,
    pub entry: &'a ContentEntry,
    /// Rendered Markdown body.
    pub body_html: &'a str,
    pub toc: Option<Markup>,
    /// Contents of the ad-script partial, inserted verbatim into `<head>`.
    pub ad_script: Option<&'a str>,
    pub config: &'a SiteConfig,
}

impl PageContext<'_> {
    /// `<base_url>/<output_dir>/<id>.html`
    pub fn canonical_url(&self) -> String {
        format!(
            "{}/{}/{}.html",
            self.config.base_url,
            self.config.section(self.kind).output_dir,
            self.entry.id
        )
    }

    /// `<title> | <site_name> <suffix>`
    pub fn page_title(&self) -> String {
        format!(
            "{} | {} {}",
            self.entry.title,
            self.config.site_name,
            self.config.section(self.kind).title_suffix
        )
    }

    /// Absolute Open Graph image URL.
    ///
    /// A thumbnail that is still a data URI (its decode failed) is not a
    /// usable URL, so the default image is used instead.
    pub fn image_url(&self) -> String {
        let thumbnail = if is_data_uri(&self.entry.thumbnail) {
            ""
        } else {
            self.entry.thumbnail.as_str()
        };
        absolute_image_url(
            thumbnail,
            &self.config.base_url,
            &self.config.assets.default_image,
        )
    }
}

/// CSS class prefix of the article block.
fn block_class(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Blog => "post-detail",
        ContentKind::Portfolio => "work-detail",
    }
}

/// Render the complete document.
pub fn render_page(ctx: &PageContext) -> Markup {
    let entry = ctx.entry;
    let config = ctx.config;
    let section = config.section(ctx.kind);
    let block = block_class(ctx.kind);
    let title = ctx.page_title();
    let canonical = ctx.canonical_url();
    let image = ctx.image_url();
    let has_toc = ctx.toc.is_some();

    html! {
        (DOCTYPE)
        html lang=(config.lang) {
            head prefix="og: https://ogp.me/ns#" {
                meta charset="UTF-8";
                title { (title) }
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="description" content=(entry.description);
                link rel="canonical" href=(canonical);
                @if let Some(ad) = ctx.ad_script {
                    (PreEscaped(ad))
                }
                script type="application/ld+json" {
                    (PreEscaped(json_ld(ctx, &canonical, &image)))
                }
                meta property="og:title" content=(title);
                meta property="og:description" content=(entry.description);
                meta property="og:type" content="article";
                meta property="og:url" content=(canonical);
                meta property="og:image" content=(image);
                meta property="og:site_name" content=(config.site_name);
                @if !config.author.email.is_empty() {
                    meta property="og:email" content=(config.author.email);
                }
                meta name="twitter:card" content="summary_large_image";
                meta name="twitter:title" content=(entry.title);
                meta name="twitter:description" content=(entry.description);
                meta name="twitter:image" content=(image);
                link rel="stylesheet" href="../assets/css/base.css";
                link rel="stylesheet" href="../assets/css/layout.css";
                link rel="stylesheet" href={ "../assets/css/" (ctx.kind.name()) ".css" };
            }
            body data-page=(ctx.kind.name()) {
                div.page-shell {
                    main.main-container {
                        article class={ (block) " reveal-on-scroll" } {
                            (article_header(ctx, block, &section.list_page))
                            @if let Some(toc) = &ctx.toc {
                                (toc)
                            }
                            section class={ (block) "__body markdown-body" } {
                                (PreEscaped(ctx.body_html))
                            }
                            @if section.share_buttons {
                                (share_buttons(&canonical, &entry.title))
                            }
                            @if ctx.kind == ContentKind::Blog {
                                section.section.section--related {
                                    h2.section__title { "関連記事" }
                                    div #relatedList .recommend-grid {}
                                }
                                section.section.section--recommend {
                                    h2.section__title { "おすすめ記事" }
                                    div #recommendList .recommend-grid {}
                                }
                            }
                        }
                    }
                }
                script src="../assets/js/layout.js" defer {}
                script src="../assets/js/ui.js" {}
                @if has_toc {
                    script src="../assets/js/toc.js" defer {}
                }
                @if ctx.kind == ContentKind::Blog {
                    script src="../assets/js/recommend.js" defer {}
                }
            }
        }
    }
}

/// Header line under the article title.
///
/// Blog: `2024/03/01 / Tech`. Portfolio adds `Role: …`.
pub fn meta_line(kind: ContentKind, entry: &ContentEntry) -> String {
    let mut parts = vec![format_date(&entry.date), entry.category.clone()];
    if kind == ContentKind::Portfolio && !entry.role.is_empty() {
        parts.push(format!("Role: {}", entry.role));
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" / ")
}

/// `../<list_page>?tag=<tag>` with the tag percent-encoded.
pub fn tag_href(list_page: &str, tag: &str) -> String {
    format!("../{}?tag={}", list_page, urlencoding::encode(tag))
}

fn article_header(ctx: &PageContext, block: &str, list_page: &str) -> Markup {
    let entry = ctx.entry;
    html! {
        header class={ (block) "__header" } {
            p class={ (block) "__meta" } { (meta_line(ctx.kind, entry)) }
            h1 class={ (block) "__title" } { (entry.title) }
            @if !entry.description.is_empty() {
                p class={ (block) "__description" } { (entry.description) }
            }
            @if ctx.kind == ContentKind::Portfolio && !entry.tech.is_empty() {
                p class={ (block) "__meta" } { "Tech: " (entry.tech) }
            }
            @if !entry.tags.is_empty() {
                p class={ (block) "__tags" } {
                    @for (i, tag) in entry.tags.iter().enumerate() {
                        @if i > 0 { " " }
                        a.tag href=(tag_href(list_page, tag)) { (tag) }
                    }
                }
            }
        }
    }
}

/// X, Facebook and Hatena Bookmark share links for a page.
pub fn share_buttons(url: &str, title: &str) -> Markup {
    let url_enc = urlencoding::encode(url);
    let title_enc = urlencoding::encode(title);
    html! {
        div.share-buttons {
            p.share-buttons__label { "Share" }
            a.share-buttons__item.share-buttons__item--x
                href={ "https://twitter.com/intent/tweet?url=" (url_enc) "&text=" (title_enc) }
                target="_blank" rel="noopener noreferrer" { "X" }
            a.share-buttons__item.share-buttons__item--facebook
                href={ "https://www.facebook.com/sharer/sharer.php?u=" (url_enc) }
                target="_blank" rel="noopener noreferrer" { "Facebook" }
            a.share-buttons__item.share-buttons__item--hatena
                href={ "https://b.hatena.ne.jp/add?mode=confirm&url=" (url_enc) "&title=" (title_enc) }
                target="_blank" rel="noopener noreferrer" { "Hatena" }
        }
    }
}

/// Structured data for the page, safe to place inside `<script>`.
fn json_ld(ctx: &PageContext, canonical: &str, image: &str) -> String {
    let entry = ctx.entry;
    let config = ctx.config;
    let schema_type = match ctx.kind {
        ContentKind::Blog => "BlogPosting",
        ContentKind::Portfolio => "CreativeWork",
    };
    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": schema_type,
        "mainEntityOfPage": { "@type": "WebPage", "@id": canonical },
        "headline": entry.title,
        "description": entry.description,
        "image": [image],
        "author": {
            "@type": "Person",
            "name": config.author.name,
            "url": config.base_url,
        },
        "publisher": {
            "@type": "Organization",
            "name": config.site_name,
            "logo": {
                "@type": "ImageObject",
                "url": format!("{}/{}", config.base_url, config.assets.logo),
            },
        },
    });
    if !entry.date.is_empty() {
        ld["datePublished"] = json!(entry.date);
        ld["dateModified"] = json!(entry.date);
    }
    if !entry.tags.is_empty() {
        ld["keywords"] = json!(entry.tags.join(", "));
    }
    format!("{ld:#}").replace('<', "\\u003c")
}
