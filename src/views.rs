//! List views: the blog, portfolio and products pages.
//!
//! Each list page loads its JSON index, narrows it with a free-text keyword
//! and one exact-match facet, paginates, and renders cards. The state lives
//! in the page URL so a filtered view can be bookmarked:
//!
//! ```text
//! blog.html?q=unity&category=Tech&page=2
//! blog.html?tag=Unity                 (tag links from article pages; wins over q)
//! ```
//!
//! Here that logic is a set of pure functions over a [`ListState`], which
//! holds the loaded items and the current [`ListQuery`]. [`render_list`]
//! turns the state into the markup the page shows.
//!
//! Filtering is a linear scan of the whole list, fine for personal-site
//! sizes.

use crate::dates::format_date;
use crate::entry::{ContentEntry, Product};
use maud::{Markup, html};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Blog list page size.
pub const POSTS_PER_PAGE: usize = 10;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which list page is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListKind {
    Blog,
    Portfolio,
    Products,
}

impl ListKind {
    pub fn name(self) -> &'static str {
        match self {
            ListKind::Blog => "blog",
            ListKind::Portfolio => "portfolio",
            ListKind::Products => "products",
        }
    }

    /// Query-string key of the facet filter.
    pub fn facet_param(self) -> &'static str {
        match self {
            ListKind::Blog | ListKind::Portfolio => "category",
            ListKind::Products => "type",
        }
    }

    fn card_class(self) -> &'static str {
        match self {
            ListKind::Blog => "blog-card",
            ListKind::Portfolio => "portfolio-card",
            ListKind::Products => "product-card",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            ListKind::Blog => "該当する記事が見つかりませんでした。",
            ListKind::Portfolio => "該当する作品が見つかりませんでした。",
            ListKind::Products => "該当するプロダクトが見つかりませんでした。",
        }
    }

    pub fn load_error_message(self) -> &'static str {
        match self {
            ListKind::Blog => "記事一覧の読み込みに失敗しました。",
            ListKind::Portfolio => "作品一覧の読み込みに失敗しました。",
            ListKind::Products => "プロダクト一覧の読み込みに失敗しました。",
        }
    }
}

// ============================================================================
// Listing: what a list item exposes to search and facets
// ============================================================================

/// An item that can appear on a list page.
pub trait Listing {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    /// Text the keyword is matched against, in order.
    fn search_fields(&self) -> Vec<&str>;
    /// Value of the exact-match filter (category or type).
    fn facet(&self) -> &str;
    fn card(&self, kind: ListKind) -> Markup;
}

impl Listing for ContentEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.role.as_str(),
            self.tech.as_str(),
        ];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn facet(&self) -> &str {
        &self.category
    }

    fn card(&self, kind: ListKind) -> Markup {
        let meta: Vec<String> = [format_date(&self.date), self.category.clone()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        html! {
            article class={ "card card--clickable " (kind.card_class()) } data-href=(self.content_path) {
                @if !self.thumbnail.is_empty() {
                    div.card__thumb {
                        img src=(self.thumbnail) alt=(self.title) loading="lazy";
                    }
                }
                div.card__body {
                    p.card__meta { (meta.join(" / ")) }
                    h3.card__title {
                        a href=(self.content_path) { (self.title) }
                    }
                    @if !self.role.is_empty() {
                        p.card__meta.card__meta--role { "Role: " (self.role) }
                    }
                    @if !self.description.is_empty() {
                        p.card__description { (self.description) }
                    }
                    (tag_row(&self.tags))
                    @if !self.links.is_empty() {
                        div.card__actions {
                            @for link in &self.links {
                                a href=(link.url) target="_blank" rel="noopener noreferrer" {
                                    @if link.label.is_empty() { "Link" } @else { (link.label) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Listing for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.kind.as_str(),
        ];
        fields.extend(self.platform.iter().map(String::as_str));
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn facet(&self) -> &str {
        &self.kind
    }

    fn card(&self, kind: ListKind) -> Markup {
        html! {
            article class={ "card card--clickable " (kind.card_class()) } {
                @if !self.thumbnail.is_empty() {
                    div.card__thumb {
                        img src=(self.thumbnail) alt=(self.title) loading="lazy";
                    }
                }
                div.card__body {
                    div.card__title-row {
                        @if !self.kind.is_empty() {
                            span.pill.pill--accent { (self.kind) }
                        }
                        h3.card__title { (self.title) }
                    }
                    @if !self.platform.is_empty() {
                        p.card__meta { "Platform: " (self.platform.join(", ")) }
                    }
                    @if !self.description.is_empty() {
                        p.card__description { (self.description) }
                    }
                    (tag_row(&self.tags))
                    @if !self.store_links.is_empty() || !self.download_links.is_empty() || !self.url.is_empty() {
                        div.card__actions {
                            @if !self.url.is_empty() {
                                a.btn.btn--sm.btn--outline href=(self.url) target="_blank" rel="noopener noreferrer" { "Details" }
                            }
                            @for link in &self.store_links {
                                a.btn.btn--sm.btn--outline href=(link.url) target="_blank" rel="noopener noreferrer" {
                                    @if link.label.is_empty() { "Store" } @else { (link.label) }
                                }
                            }
                            @for link in &self.download_links {
                                a.btn.btn--sm.btn--primary href=(link.url) {
                                    @if link.label.is_empty() { "Download" } @else { (link.label) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn tag_row(tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            div.card__tags {
                @for tag in tags {
                    span.tag { (tag) }
                }
            }
        }
    }
}

// ============================================================================
// Query state
// ============================================================================

/// Filter and page selection of one list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub keyword: String,
    pub facet: String,
    /// 1-based; clamped when the list is paginated.
    pub page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            facet: String::new(),
            page: 1,
        }
    }
}

impl ListQuery {
    /// Read `tag` (preferred) or `q`, the facet parameter, and `page`.
    ///
    /// A leading `?` is accepted. Unparseable or zero pages read as 1.
    pub fn from_query_string(query: &str, facet_param: &str) -> Self {
        let mut tag = None;
        let mut q = None;
        let mut facet = None;
        let mut page = None;
        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(value);
            match key {
                "tag" => tag = tag.or(Some(value)),
                "q" => q = q.or(Some(value)),
                "page" => page = page.or(value.trim().parse::<usize>().ok()),
                k if k == facet_param => facet = facet.or(Some(value)),
                _ => {}
            }
        }
        let keyword = tag.filter(|t| !t.is_empty()).or(q).unwrap_or_default();
        Self {
            keyword,
            facet: facet.unwrap_or_default(),
            page: page.unwrap_or(1).max(1),
        }
    }

    /// Serialise back to a query string without the leading `?`.
    ///
    /// Empty values and `page <= 1` are omitted; a tag always comes back as
    /// `q`.
    pub fn to_query_string(&self, facet_param: &str) -> String {
        let mut parts = Vec::new();
        let keyword = self.keyword.trim();
        if !keyword.is_empty() {
            parts.push(format!("q={}", urlencoding::encode(keyword)));
        }
        let facet = self.facet.trim();
        if !facet.is_empty() {
            parts.push(format!("{facet_param}={}", urlencoding::encode(facet)));
        }
        if self.page > 1 {
            parts.push(format!("page={}", self.page));
        }
        parts.join("&")
    }

    /// Keyword (case-insensitive substring) and facet (exact) match.
    pub fn matches<T: Listing>(&self, item: &T) -> bool {
        let facet = self.facet.trim();
        if !facet.is_empty() && item.facet() != facet {
            return false;
        }
        let keyword = self.keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }
        item.search_fields().join(" ").to_lowercase().contains(&keyword)
    }
}

/// Percent-decode a query component, treating `+` as a space.
fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

// ============================================================================
// Filtering and pagination
// ============================================================================

/// Items matching `query`, in list order.
pub fn filter<'a, T: Listing>(items: &'a [T], query: &ListQuery) -> Vec<&'a T> {
    items.iter().filter(|item| query.matches(*item)).collect()
}

/// One page of a filtered list.
#[derive(Debug)]
pub struct PageSlice<'a, T> {
    pub items: Vec<&'a T>,
    /// The page actually shown, after clamping.
    pub page: usize,
    /// At least 1, even for an empty list.
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out `page`, clamped into `1..=total_pages`.
pub fn paginate<'a, T>(filtered: Vec<&'a T>, page: usize, per_page: usize) -> PageSlice<'a, T> {
    let per_page = per_page.max(1);
    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let items = filtered
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    PageSlice {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// Distinct non-empty facet values, sorted, for the filter dropdown.
pub fn facets<T: Listing>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.facet())
        .filter(|f| !f.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

// ============================================================================
// State and rendering
// ============================================================================

/// Loaded items plus the current query of one list page.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub kind: ListKind,
    pub items: Vec<T>,
    pub query: ListQuery,
    pub per_page: usize,
}

impl<T: Listing> ListState<T> {
    /// A state with the default page size for `kind`: 10 for the blog,
    /// everything on one page otherwise.
    pub fn new(kind: ListKind, items: Vec<T>) -> Self {
        let per_page = match kind {
            ListKind::Blog => POSTS_PER_PAGE,
            ListKind::Portfolio | ListKind::Products => usize::MAX,
        };
        Self {
            kind,
            items,
            query: ListQuery::default(),
            per_page,
        }
    }

    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_page_size(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// The current page of matching items.
    pub fn current_page(&self) -> PageSlice<'_, T> {
        paginate(filter(&self.items, &self.query), self.query.page, self.per_page)
    }

    /// The URL query string for what is shown, with the page clamped.
    pub fn query_string(&self) -> String {
        let page = self.current_page();
        let shown = ListQuery {
            page: page.page,
            ..self.query.clone()
        };
        shown.to_query_string(self.kind.facet_param())
    }
}

/// Render cards, pagination, and the empty-state message for a list.
pub fn render_list<T: Listing>(state: &ListState<T>) -> Markup {
    let kind = state.kind;
    let page = state.current_page();
    html! {
        div.list-view data-list=(kind.name()) {
            @if page.items.is_empty() {
                p.list-empty id={ (kind.name()) "EmptyMessage" } { (kind.empty_message()) }
            } @else {
                div.card-list {
                    @for item in &page.items {
                        (item.card(kind))
                    }
                }
                @if page.total_pages > 1 {
                    (pagination(page.page, page.total_pages))
                }
            }
        }
    }
}

/// Prev / numbered / next buttons. Button `data-page` carries the target.
fn pagination(current: usize, total: usize) -> Markup {
    html! {
        nav.pagination aria-label="Pagination" {
            button.pagination__item.pagination__item--prev type="button"
                data-page=(current.saturating_sub(1)) disabled[current == 1] { "‹" }
            @for n in 1..=total {
                button.pagination__item.is-active[n == current] type="button" data-page=(n)
                    aria-current=[(n == current).then_some("page")] { (n) }
            }
            button.pagination__item.pagination__item--next type="button"
                data-page=(current + 1) disabled[current == total] { "›" }
        }
    }
}

/// The message shown in place of a list whose index failed to load.
pub fn render_load_error(kind: ListKind) -> Markup {
    html! {
        div.list-view data-list=(kind.name()) {
            p.list-empty.list-empty--error id={ (kind.name()) "EmptyMessage" } role="alert" {
                (kind.load_error_message())
            }
        }
    }
}

/// Load a JSON index for a list page.
pub fn load_index<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ViewError> {
    let content = fs::read_to_string(path).map_err(|source| ViewError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ViewError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and render a list page, falling back to the load-error message.
pub fn render_from_index<T: Listing + DeserializeOwned>(
    kind: ListKind,
    path: &Path,
    query: ListQuery,
) -> Markup {
    match load_index::<T>(path) {
        Ok(items) => render_list(&ListState::new(kind, items).with_query(query)),
        Err(e) => {
            log::warn!("{e}");
            render_load_error(kind)
        }
    }
}
