//! End-to-end run over the fixture site: build both content types, then read
//! the published indices back the way the list pages and widgets do.
//!
//! Run with: cargo test --test build_pipeline

use foliogen::config::load_config;
use foliogen::entry::{ContentEntry, ContentKind, Product};
use foliogen::views::{self, ListKind, ListQuery, ListState};
use foliogen::{pagelist, pipeline, popular, recommend};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixture_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir(&fixtures, tmp.path());
    tmp
}

fn copy_dir(src: &Path, dst: &Path) {
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            fs::create_dir_all(&target).unwrap();
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

fn ids(entries: &[&ContentEntry]) -> Vec<String> {
    entries.iter().map(|e| e.id.clone()).collect()
}

#[test]
fn full_build_publishes_pages_and_indices() {
    let site = fixture_site();
    let root = site.path();
    let config = load_config(root).unwrap();

    let reports = pipeline::build_all(root, &config).unwrap();
    assert_eq!(reports.len(), 2);

    let blog: Vec<ContentEntry> =
        views::load_index(&root.join("assets/data/blogList.json")).unwrap();
    let order: Vec<&str> = blog.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(order, vec!["blog_00002", "blog_00003", "blog_00001", "blog_00004"]);

    let works: Vec<ContentEntry> =
        views::load_index(&root.join("assets/data/portfolioList.json")).unwrap();
    assert_eq!(works[0].id, "work_01");
    assert_eq!(works[0].platform, vec!["Windows", "Switch"]);
    assert_eq!(works[1].links[0].label, "GitHub");

    for id in ["blog_00001", "blog_00002", "blog_00003", "blog_00004"] {
        assert!(root.join(format!("blog/{id}.html")).is_file(), "{id}");
    }
    assert!(root.join("portfolio/work_02.html").is_file());
}

#[test]
fn pages_use_configured_base_url() {
    let site = fixture_site();
    let root = site.path();
    let config = load_config(root).unwrap();
    pipeline::build_kind(root, &config, ContentKind::Blog).unwrap();

    let html = fs::read_to_string(root.join("blog/blog_00001.html")).unwrap();
    assert!(html.contains(
        r#"<link rel="canonical" href="https://example.github.io/WebSite/blog/blog_00001.html">"#
    ));
    assert!(html.contains(
        "https://example.github.io/WebSite/assets/img/thumbnails/blog_00001.png"
    ));
    assert!(html.contains(r#"href="../blog.html?tag=C%23""#));
}

#[test]
fn keyword_search_over_published_blog_index() {
    let site = fixture_site();
    let root = site.path();
    let config = load_config(root).unwrap();
    pipeline::build_kind(root, &config, ContentKind::Blog).unwrap();

    let posts: Vec<ContentEntry> =
        views::load_index(&root.join(&config.blog.index)).unwrap();
    let state = ListState::new(ListKind::Blog, posts)
        .with_query(ListQuery::from_query_string("?tag=unity", "category"));
    let page = state.current_page();
    let mut found: Vec<&str> = page.items.iter().map(|e| e.id.as_str()).collect();
    found.sort();
    assert_eq!(found, vec!["blog_00001", "blog_00002"]);

    let html = views::render_list(&state).into_string();
    assert_eq!(html.matches("blog-card").count(), 2);
}

#[test]
fn products_filter_by_type() {
    let site = fixture_site();
    let root = site.path();
    let config = load_config(root).unwrap();

    let products: Vec<Product> = views::load_index(&root.join(&config.assets.products)).unwrap();
    assert_eq!(views::facets(&products), vec!["Asset", "Game", "Tool"]);

    let query = ListQuery::from_query_string("type=Tool", "type");
    let matches = views::filter(&products, &query);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].platform, vec!["Windows", "macOS", "Linux"]);

    let html = views::render_list(&ListState::new(ListKind::Products, products)).into_string();
    assert!(html.contains("btn--primary"));
    assert!(html.contains(">Download<"));
    assert!(html.contains(">Steam<"));
}

#[test]
fn popular_feeds_home_picks() {
    let site = fixture_site();
    let root = site.path();
    let config = load_config(root).unwrap();
    pipeline::build_kind(root, &config, ContentKind::Blog).unwrap();
    popular::update_popular(root, &config, &root.join("gsc-rows.json")).unwrap();

    let posts: Vec<ContentEntry> = views::load_index(&root.join(&config.blog.index)).unwrap();
    let popular_ids = popular::load_popular(root, &config).unwrap();
    let picks = recommend::home_picks(&posts, &popular_ids, recommend::DEFAULT_LIMIT);
    assert_eq!(
        ids(&picks),
        vec!["blog_00003", "blog_00002", "blog_00001", "blog_00004"]
    );

    let (related, recommended) = recommend::article_picks(&posts, "blog_00002", 6);
    assert_eq!(ids(&related), vec!["blog_00001"]);
    assert_eq!(ids(&recommended), vec!["blog_00003"]);
}

#[test]
fn pagelists_point_at_sources() {
    let site = fixture_site();
    let root = site.path();
    let config = load_config(root).unwrap();

    let report = pagelist::generate(root, &config, ContentKind::Portfolio).unwrap();
    let entries: Vec<ContentEntry> = views::load_index(&report.path).unwrap();
    assert_eq!(entries[0].content_path, "content/portfolio/work_02.md");
    assert!(entries[1].links.iter().any(|l| l.label == "storepage"));
}

#[test]
fn article_cards_link_back_from_post_directory() {
    let site = fixture_site();
    let root = site.path();
    let config = load_config(root).unwrap();
    pipeline::build_kind(root, &config, ContentKind::Blog).unwrap();

    let posts: Vec<ContentEntry> = views::load_index(&root.join(&config.blog.index)).unwrap();
    let (related, _) = recommend::article_picks(&posts, "blog_00002", recommend::DEFAULT_LIMIT);
    let html =
        recommend::render_cards(&related, "../", &config.assets.default_image).into_string();
    assert_eq!(html.matches(r#"<a class="card card--recommend""#).count(), 1);
    assert!(html.contains(r#"href="../blog/blog_00001.html""#));
    assert!(html.contains("../assets/img/thumbnails/blog_00001.png"));
}
