//! Post recommendations for article pages and the home page.
//!
//! ```text
//! article page:  related (shared tags, same category)  →  recommended
//! home page:     popular.json ids  →  recommended  →  latest
//! ```
//!
//! Everything here works on the loaded blog index and never touches disk.
//! Each list excludes posts an earlier list already showed.

use crate::dates::{format_date, newest_first};
use crate::entry::ContentEntry;
use maud::{Markup, html};
use std::collections::HashSet;

/// Cards per recommendation block.
pub const DEFAULT_LIMIT: usize = 6;

/// Posts sharing tags or category with `current_id`, best match first.
///
/// Each shared tag scores 1, the same category 0.5. Ties go to the newer
/// post. An unknown `current_id` has no related posts.
pub fn related<'a>(posts: &'a [ContentEntry], current_id: &str, limit: usize) -> Vec<&'a ContentEntry> {
    let Some(current) = posts.iter().find(|p| p.id == current_id) else {
        return Vec::new();
    };
    let current_tags: HashSet<&str> = current.tags.iter().map(String::as_str).collect();

    let mut scored: Vec<(f64, &ContentEntry)> = posts
        .iter()
        .filter(|p| p.id != current_id)
        .filter_map(|p| {
            let shared = p
                .tags
                .iter()
                .map(String::as_str)
                .collect::<HashSet<_>>()
                .intersection(&current_tags)
                .count();
            let mut score = shared as f64;
            if !current.category.is_empty() && p.category == current.category {
                score += 0.5;
            }
            (score > 0.0).then_some((score, p))
        })
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| sb.total_cmp(sa).then_with(|| newest_first(&a.date, &b.date)));
    scored.into_iter().take(limit).map(|(_, p)| p).collect()
}

/// Posts flagged `recommended`, newest first, skipping `exclude`.
pub fn recommended<'a>(
    posts: &'a [ContentEntry],
    exclude: &HashSet<&str>,
    limit: usize,
) -> Vec<&'a ContentEntry> {
    let mut picks: Vec<&ContentEntry> = posts
        .iter()
        .filter(|p| p.recommended && !exclude.contains(p.id.as_str()))
        .collect();
    picks.sort_by(|a, b| newest_first(&a.date, &b.date));
    picks.truncate(limit);
    picks
}

/// The newest `n` posts whose ids are not in `exclude`.
pub fn latest<'a>(
    posts: &'a [ContentEntry],
    exclude: &HashSet<&str>,
    n: usize,
) -> Vec<&'a ContentEntry> {
    let mut rest: Vec<&ContentEntry> = posts
        .iter()
        .filter(|p| !exclude.contains(p.id.as_str()))
        .collect();
    rest.sort_by(|a, b| newest_first(&a.date, &b.date));
    rest.truncate(n);
    rest
}

/// Related posts for an article, then recommended posts not already shown.
pub fn article_picks<'a>(
    posts: &'a [ContentEntry],
    current_id: &str,
    limit: usize,
) -> (Vec<&'a ContentEntry>, Vec<&'a ContentEntry>) {
    let related = related(posts, current_id, limit);
    let mut shown: HashSet<&str> = related.iter().map(|p| p.id.as_str()).collect();
    shown.insert(current_id);
    let recommended = recommended(posts, &shown, limit);
    (related, recommended)
}

/// The home page block: popular ids in order, topped up with recommended
/// and then latest posts, without duplicates.
///
/// Popular ids missing from `posts` are skipped.
pub fn home_picks<'a>(
    posts: &'a [ContentEntry],
    popular_ids: &[String],
    limit: usize,
) -> Vec<&'a ContentEntry> {
    let mut picks: Vec<&ContentEntry> = Vec::with_capacity(limit);
    let mut shown: HashSet<&str> = HashSet::new();

    for id in popular_ids {
        if picks.len() >= limit {
            return picks;
        }
        if let Some(post) = posts.iter().find(|p| &p.id == id) {
            if shown.insert(post.id.as_str()) {
                picks.push(post);
            }
        }
    }

    let needed = limit - picks.len();
    for post in recommended(posts, &shown, needed) {
        shown.insert(post.id.as_str());
        picks.push(post);
    }

    let needed = limit - picks.len();
    picks.extend(latest(posts, &shown, needed));
    picks
}

/// Compact cards for a recommendation block.
///
/// `base_path` is prepended to relative links and images (`../` on article
/// pages, empty on the home page).
pub fn render_cards(posts: &[&ContentEntry], base_path: &str, default_image: &str) -> Markup {
    let resolve = |path: &str| {
        if path.starts_with("http") || path.starts_with("data:") {
            path.to_string()
        } else {
            format!("{base_path}{path}")
        }
    };
    html! {
        @for post in posts {
            @let image = if post.thumbnail.is_empty() { default_image } else { post.thumbnail.as_str() };
            a.card."card--recommend" href=(resolve(&post.content_path)) {
                img."card--recommend__thumb" src=(resolve(image)) alt=(post.title) loading="lazy";
                div."card--recommend__content" {
                    h3."card--recommend__title" { (post.title) }
                    p."card--recommend__desc" { (post.description) }
                    div."card--recommend__meta" {
                        span { (format_date(&post.date)) }
                        @if !post.category.is_empty() {
                            span."card--recommend__tag" { (post.category) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, date: &str, category: &str, tags: &[&str], recommended: bool) -> ContentEntry {
        ContentEntry {
            id: id.to_string(),
            title: id.to_uppercase(),
            date: date.to_string(),
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            content_path: format!("blog/{id}.html"),
            recommended,
            ..Default::default()
        }
    }

    fn ids(posts: &[&ContentEntry]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    fn corpus() -> Vec<ContentEntry> {
        vec![
            post("cur", "2024-05-01", "Tech", &["unity", "shader"], false),
            post("two_tags", "2023-01-01", "Life", &["unity", "shader"], false),
            post("tag_cat_old", "2023-06-01", "Tech", &["unity"], true),
            post("tag_cat_new", "2024-02-01", "Tech", &["shader"], false),
            post("cat_only", "2024-04-01", "Tech", &[], true),
            post("none", "2024-04-15", "Life", &["travel"], true),
        ]
    }

    #[test]
    fn related_scores_tags_then_category_then_date() {
        let posts = corpus();
        let got = related(&posts, "cur", DEFAULT_LIMIT);
        assert_eq!(
            ids(&got),
            vec!["two_tags", "tag_cat_new", "tag_cat_old", "cat_only"]
        );
    }

    #[test]
    fn related_respects_limit_and_unknown_id() {
        let posts = corpus();
        assert_eq!(related(&posts, "cur", 2).len(), 2);
        assert!(related(&posts, "missing", DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn recommended_excludes_and_sorts() {
        let posts = corpus();
        let exclude: HashSet<&str> = ["cat_only"].into_iter().collect();
        let got = recommended(&posts, &exclude, DEFAULT_LIMIT);
        assert_eq!(ids(&got), vec!["none", "tag_cat_old"]);
    }

    #[test]
    fn article_picks_do_not_repeat_related() {
        let posts = corpus();
        let (related, recommended) = article_picks(&posts, "cur", DEFAULT_LIMIT);
        assert_eq!(related.len(), 4);
        assert_eq!(ids(&recommended), vec!["none"]);
    }

    #[test]
    fn latest_is_newest_first() {
        let posts = corpus();
        assert_eq!(ids(&latest(&posts, &HashSet::new(), 2)), vec!["cur", "none"]);
        let exclude: HashSet<&str> = ["cur"].into_iter().collect();
        assert_eq!(ids(&latest(&posts, &exclude, 2)), vec!["none", "cat_only"]);
    }

    #[test]
    fn home_picks_popular_then_recommended_then_latest() {
        let posts = corpus();
        let popular = vec![
            "two_tags".to_string(),
            "ghost".to_string(),
            "two_tags".to_string(),
        ];
        let got = home_picks(&posts, &popular, 5);
        assert_eq!(
            ids(&got),
            vec!["two_tags", "none", "cat_only", "tag_cat_old", "cur"]
        );
    }

    #[test]
    fn home_picks_without_popular_data() {
        let posts = corpus();
        let got = home_picks(&posts, &[], DEFAULT_LIMIT);
        assert_eq!(got.len(), 6);
        assert_eq!(ids(&got[..3]), vec!["none", "cat_only", "tag_cat_old"]);
    }

    #[test]
    fn home_picks_popular_fills_limit() {
        let posts = corpus();
        let popular: Vec<String> = ["none", "cur", "cat_only"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids(&home_picks(&posts, &popular, 2)), vec!["none", "cur"]);
    }

    #[test]
    fn cards_resolve_relative_paths() {
        let posts = corpus();
        let picks: Vec<&ContentEntry> = posts.iter().take(1).collect();
        let html = render_cards(&picks, "../", "assets/img/ogp.png").into_string();
        assert!(html.contains(r#"href="../blog/cur.html""#));
        assert!(html.contains(r#"src="../assets/img/ogp.png""#));
        assert!(html.contains("2024/05/01"));
    }
}
