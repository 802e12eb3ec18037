//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the site: parsing the posts ([`crate::post`]), rendering
//! each one to its own page ([`crate::markdown`], [`crate::templates`]), and
//! patching the home page and the articles index, which are maintained by
//! hand except for the regions between their marker comments.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::html::{self, Region};
use crate::markdown;
use crate::post::{self, Post};
use crate::templates::{self, ArticlePage, Card, ListItem, NavLink};

/// The number of posts shown in the home page's "latest articles" grid.
pub const LATEST_POSTS: usize = 3;

/// What a build did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// The number of posts rendered.
    pub posts: usize,

    /// Whether the home page existed and had its grid markers.
    pub home_page_patched: bool,

    /// Whether the articles index existed and had its list markers.
    pub articles_index_patched: bool,
}

/// Builds the site described by `config`:
///
/// 1. Reads and sorts all posts (see [`post::parse_posts`]).
/// 2. Writes `{articles_output_directory}/{slug}.html` for each post,
///    overwriting whatever is there.
/// 3. Replaces the [`Region::ARTICLES_GRID`] region of the home page with
///    cards for the [`LATEST_POSTS`] most recent posts.
/// 4. Replaces the [`Region::ARTICLES_LIST`] region of the articles index
///    with every post, newest first.
///
/// Aggregate pages that don't exist, or that lack their markers, are left
/// untouched.
pub fn build_site(config: &Config) -> Result<Report> {
    std::fs::create_dir_all(&config.articles_output_directory).map_err(|err| Error::Write {
        path: config.articles_output_directory.clone(),
        err,
    })?;

    let posts = post::parse_posts(&config.posts_source_directory)?;
    write_articles(&posts, &config.articles_output_directory)?;

    let cards: Vec<Card> = posts.iter().take(LATEST_POSTS).map(Card::from).collect();
    let home_page_patched = patch_file(
        &config.home_page,
        Region::ARTICLES_GRID,
        &templates::home_cards(&cards),
    )?;

    let items: Vec<ListItem> = posts.iter().map(ListItem::from).collect();
    let articles_index_patched = patch_file(
        &config.articles_index,
        Region::ARTICLES_LIST,
        &templates::articles_index(&items),
    )?;

    tracing::info!(posts = posts.len(), "build done");
    Ok(Report {
        posts: posts.len(),
        home_page_patched,
        articles_index_patched,
    })
}

/// Returns the `(prev, next)` navigation links for the post at `index` in a
/// newest-first slice: `prev` is the next-older post (`index + 1`) and
/// `next` the next-newer one (`index - 1`).
pub fn neighbors(posts: &[Post], index: usize) -> (Option<NavLink>, Option<NavLink>) {
    let prev = posts.get(index + 1).map(NavLink::from);
    let next = index
        .checked_sub(1)
        .and_then(|i| posts.get(i))
        .map(NavLink::from);
    (prev, next)
}

/// Renders and writes one page per post. Posts sharing a slug overwrite each
/// other in order, so the last one in `posts` wins; each collision is logged.
fn write_articles(posts: &[Post], output_directory: &Path) -> Result<()> {
    let mut written: HashMap<&str, &Path> = HashMap::new();
    for (i, post) in posts.iter().enumerate() {
        if let Some(earlier) = written.insert(&post.slug, &post.source) {
            tracing::warn!(
                slug = %post.slug,
                overwritten = %earlier.display(),
                by = %post.source.display(),
                "duplicate slug"
            );
        }

        let rendered = markdown::render(&post.body);
        let (prev, next) = neighbors(posts, i);
        let page = templates::article(&ArticlePage {
            post,
            body_html: &rendered.html,
            references_html: &rendered.references.to_html(),
            prev,
            next,
        });

        let path = output_directory.join(post.file_name());
        write(&path, &page)?;
        tracing::debug!(path = %path.display(), "wrote post page");
    }
    Ok(())
}

/// Replaces `region` in the file at `path` with `fragment`. Returns whether
/// the file was rewritten; a missing file or missing markers is not an error.
fn patch_file(path: &Path, region: Region, fragment: &str) -> Result<bool> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "not found, skipping");
        return Ok(false);
    }

    let document = std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })?;
    match html::patch_region(&document, region, &format!("\n{}\n", fragment)) {
        Some(patched) => {
            write(path, &patched)?;
            tracing::debug!(path = %path.display(), marker = region.start, "patched");
            Ok(true)
        }
        None => {
            tracing::debug!(
                path = %path.display(),
                marker = region.start,
                "markers not found, leaving file untouched"
            );
            Ok(false)
        }
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::Write {
        path: path.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors reading or parsing posts.
    #[error(transparent)]
    Parse(#[from] post::Error),

    /// Returned for I/O problems reading an aggregate page.
    #[error("reading `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for I/O problems writing output files or directories.
    #[error("writing `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
}
