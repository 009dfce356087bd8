//! Markdown to HTML with heading anchors and a table of contents.
//!
//! Rendering runs pulldown-cmark with the GitHub-flavoured extensions posts
//! are written against (tables, strikethrough, footnotes, task lists) plus
//! `{#id}` heading attributes. The event stream is rewritten so every
//! heading carries an `id`:
//!
//! ```text
//! ## Getting Started        →  <h2 id="getting-started">
//! ## Getting Started        →  <h2 id="getting-started-1">
//! ### 手順 {#steps}          →  <h3 id="steps">
//! ```
//!
//! The headings are collected in document order while rendering, and
//! [`toc`] turns the level 2 and 3 ones into a nested list whose links
//! `toc.js` picks up on the page.

use maud::{Markup, html};
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html};
use std::collections::HashSet;

/// A heading found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 1 through 6.
    pub level: u8,
    /// Plain text content, inline markup stripped.
    pub text: String,
    /// The `id` attribute written on the heading element.
    pub anchor: String,
}

/// Output of [`render`].
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub html: String,
    pub headings: Vec<Heading>,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Heading start tag buffered until its text is known.
struct OpenHeading<'a> {
    level: HeadingLevel,
    id: Option<CowStr<'a>>,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    inner: Vec<Event<'a>>,
    text: String,
}

/// Render a Markdown body to an HTML fragment.
pub fn render(body: &str) -> Rendered {
    let mut anchors = AnchorSet::default();
    let mut headings = Vec::new();
    let mut events = Vec::new();
    let mut open: Option<OpenHeading> = None;

    for event in Parser::new_ext(body, options()) {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                open = Some(OpenHeading {
                    level,
                    id,
                    classes,
                    attrs,
                    inner: Vec::new(),
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Heading(end_level)) => {
                let Some(heading) = open.take() else {
                    events.push(Event::End(TagEnd::Heading(end_level)));
                    continue;
                };
                let text = heading.text.trim().to_string();
                let anchor = match heading.id {
                    Some(explicit) => anchors.claim_exact(explicit.to_string()),
                    None => anchors.claim(slugify(&text)),
                };
                headings.push(Heading {
                    level: heading.level as u8,
                    text,
                    anchor: anchor.clone(),
                });
                events.push(Event::Start(Tag::Heading {
                    level: heading.level,
                    id: Some(CowStr::from(anchor)),
                    classes: heading.classes,
                    attrs: heading.attrs,
                }));
                events.extend(heading.inner);
                events.push(Event::End(TagEnd::Heading(end_level)));
            }
            other => match open.as_mut() {
                Some(heading) => {
                    if let Event::Text(t) | Event::Code(t) = &other {
                        heading.text.push_str(t);
                    }
                    heading.inner.push(other);
                }
                None => events.push(other),
            },
        }
    }

    let mut html = String::new();
    md_html::push_html(&mut html, events.into_iter());
    Rendered { html, headings }
}

/// Anchor slug for a heading.
///
/// Letters and digits (any script) are kept and lower-cased; runs of
/// whitespace, `-` and `_` become one `-`; other punctuation is dropped.
/// Text with nothing left becomes `section`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

/// Anchors already used in one document.
#[derive(Default)]
struct AnchorSet {
    used: HashSet<String>,
}

impl AnchorSet {
    /// Reserve `base`, or `base-1`, `base-2`, … if taken.
    fn claim(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 0;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.used.insert(candidate.clone());
        candidate
    }

    /// Explicit `{#id}` anchors are kept as written.
    fn claim_exact(&mut self, id: String) -> String {
        self.used.insert(id.clone());
        id
    }
}

/// Table of contents from level 2 and 3 headings.
///
/// Level 3 headings nest under the preceding level 2; any that come before
/// the first level 2 are listed at the top level. Returns `None` when there
/// is nothing to list.
pub fn toc(headings: &[Heading]) -> Option<Markup> {
    let mut sections: Vec<(&Heading, Vec<&Heading>)> = Vec::new();
    for heading in headings.iter().filter(|h| h.level == 2 || h.level == 3) {
        if heading.level == 3 {
            if let Some((_, children)) = sections.last_mut() {
                children.push(heading);
                continue;
            }
        }
        sections.push((heading, Vec::new()));
    }
    if sections.is_empty() {
        return None;
    }

    Some(html! {
        nav.toc aria-label="目次" {
            p.toc__title { "目次" }
            ul.toc__list {
                @for (section, children) in &sections {
                    li.toc__item {
                        a href={ "#" (section.anchor) } { (section.text) }
                        @if !children.is_empty() {
                            ul.toc__list.toc__list--nested {
                                @for child in children {
                                    li.toc__item {
                                        a href={ "#" (child.anchor) } { (child.text) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}
