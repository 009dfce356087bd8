use clap::{Parser, Subcommand};
use foliogen::entry::{ContentEntry, ContentKind, Product};
use foliogen::views::{self, ListKind, ListQuery, ListState, Listing};
use foliogen::{config, output, pagelist, pipeline, popular, recommend};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "foliogen")]
#[command(about = "Build pages and JSON indices for a blog and portfolio site")]
#[command(long_about = "\
Build pages and JSON indices for a blog and portfolio site

Every Markdown file under content/blog and content/portfolio becomes a
standalone HTML page, and each content type gets a JSON index for the
list pages.

Site layout:

  <root>/
  ├── site.toml                      # Optional, see 'foliogen gen-config'
  ├── content/
  │   ├── blog/blog_00001.md         # → blog/blog_00001.html
  │   └── portfolio/work_01.md       # → portfolio/work_01.html
  ├── partials/ad-script.html        # Inserted into blog pages when present
  └── assets/
      ├── data/blogList.json         # Written by the build
      ├── data/portfolioList.json
      ├── data/popular.json          # Written by 'foliogen popular'
      ├── data/products.json         # Hand-maintained
      └── img/thumbnails/            # Decoded data-URI thumbnails

Frontmatter (YAML between --- lines):
  title, date, category, description, tags, thumbnail, recommended
  portfolio also: role, tech, platform, links")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log progress (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build blog and portfolio pages and indices
    Build,
    /// Build only the blog
    Blog,
    /// Build only the portfolio
    Portfolio,
    /// Parse every source and report problems without writing anything
    Check,
    /// Write content/<kind>/pagelist.json for both content types
    Pagelist,
    /// Rebuild assets/data/popular.json from a search-analytics export
    Popular {
        /// Exported query response (JSON)
        #[arg(long, env = "GSC_ROWS_FILE", default_value = "gsc-rows.json")]
        rows: PathBuf,
    },
    /// Filter a list page's index the way the page does
    Search {
        #[arg(value_enum)]
        list: ListKind,
        /// Keyword (case-insensitive, matched against text fields and tags)
        #[arg(long, default_value = "")]
        q: String,
        /// Exact category (product type for products)
        #[arg(long, alias = "type", default_value = "")]
        category: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Print the rendered list markup instead of a summary
        #[arg(long)]
        html: bool,
    },
    /// Show related and recommended posts for a blog post
    Related {
        /// Post id, e.g. blog_00002
        id: String,
        /// Print the article page's recommendation cards instead of a summary
        #[arg(long)]
        html: bool,
    },
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let root = cli.root.as_path();
    let site = config::load_config(root)?;
    init_thread_pool(&site.build);

    match cli.command {
        Command::Build => {
            for report in pipeline::build_all(root, &site)? {
                output::print_build_output(&report, root);
            }
            println!("==> Build complete: {}", root.display());
        }
        Command::Blog => build_one(root, &site, ContentKind::Blog)?,
        Command::Portfolio => build_one(root, &site, ContentKind::Portfolio)?,
        Command::Check => {
            println!("==> Checking {}", root.display());
            let mut warnings = 0;
            for kind in ContentKind::ALL {
                let report = pipeline::check_kind(root, &site, kind)?;
                warnings += report.warnings.len();
                output::print_check_output(&report);
            }
            if warnings == 0 {
                println!("==> Content is valid");
            } else {
                println!("==> Content built with {warnings} warning(s)");
            }
        }
        Command::Pagelist => {
            for kind in ContentKind::ALL {
                let report = pagelist::generate(root, &site, kind)?;
                output::print_pagelist_output(&report, root);
            }
        }
        Command::Popular { rows } => {
            let report = popular::update_popular(root, &site, &root.join(rows))?;
            output::print_popular_output(&report, root);
        }
        Command::Search {
            list,
            q,
            category,
            page,
            html,
        } => {
            let query = ListQuery {
                keyword: q,
                facet: category,
                page,
            };
            match list {
                ListKind::Blog | ListKind::Portfolio => {
                    let kind = if list == ListKind::Blog {
                        ContentKind::Blog
                    } else {
                        ContentKind::Portfolio
                    };
                    let section = site.section(kind);
                    let path = root.join(&section.index);
                    let state = load_list::<ContentEntry>(list, &path, query, html)?;
                    if let Some(state) = state {
                        let page_size = section.page_size.unwrap_or(usize::MAX);
                        show_list(state.with_page_size(page_size), html);
                    }
                }
                ListKind::Products => {
                    let path = root.join(&site.assets.products);
                    if let Some(state) = load_list::<Product>(list, &path, query, html)? {
                        show_list(state, html);
                    }
                }
            }
        }
        Command::Related { id, html } => {
            let posts: Vec<ContentEntry> = views::load_index(&root.join(&site.blog.index))?;
            if !posts.iter().any(|p| p.id == id) {
                return Err(format!("no post with id '{id}' in {}", site.blog.index).into());
            }
            let (related, recommended) =
                recommend::article_picks(&posts, &id, recommend::DEFAULT_LIMIT);
            if html {
                let image = &site.assets.default_image;
                println!("{}", recommend::render_cards(&related, "../", image).into_string());
                println!("{}", recommend::render_cards(&recommended, "../", image).into_string());
            } else {
                output::print_related_output(&id, &related, &recommended);
            }
        }
        Command::GenConfig => unreachable!("handled before loading config"),
    }

    Ok(())
}

fn build_one(
    root: &Path,
    site: &config::SiteConfig,
    kind: ContentKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = pipeline::build_kind(root, site, kind)?;
    output::print_build_output(&report, root);
    Ok(())
}

/// Load a list index. With `--html` a load failure prints the page's error
/// message instead of failing the command.
fn load_list<T: Listing + DeserializeOwned>(
    kind: ListKind,
    path: &Path,
    query: ListQuery,
    html: bool,
) -> Result<Option<ListState<T>>, views::ViewError> {
    match views::load_index::<T>(path) {
        Ok(items) => Ok(Some(ListState::new(kind, items).with_query(query))),
        Err(e) if html => {
            log::warn!("{e}");
            println!("{}", views::render_load_error(kind).into_string());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn show_list<T: Listing>(state: ListState<T>, html: bool) {
    if html {
        println!("{}", views::render_list(&state).into_string());
    } else {
        output::print_search_output(&state);
    }
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool from the build config.
///
/// Caps at the number of available CPU cores; the config can constrain down,
/// not up.
fn init_thread_pool(build: &config::BuildConfig) {
    let threads = config::effective_threads(build);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
