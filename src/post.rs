//! Defines the [`Post`] type and the logic for reading posts from the file
//! system into memory: splitting the YAML frontmatter from the Markdown body,
//! deriving slugs, and ordering posts newest-first.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use walkdir::WalkDir;

pub const MARKDOWN_EXTENSION: &str = ".md";
pub const HTML_EXTENSION: &str = ".html";

/// The category shown for posts that don't declare one.
pub const DEFAULT_CATEGORY: &str = "文章";

/// A single post, parsed from a Markdown source file. Posts are read fresh on
/// every build and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// The file the post was read from.
    pub source: PathBuf,

    /// The output file stem. Either the `slug` frontmatter field verbatim or
    /// derived from the source file name (see [`slug_from_file_name`]).
    pub slug: String,

    pub title: String,

    /// Free-form, but only zero-padded ISO dates (`YYYY-MM-DD`) sort
    /// correctly. Empty when the frontmatter has no `date`.
    pub date: String,

    pub category: String,
    pub description: String,
    pub read_time: String,
    pub hero_style: Option<HeroStyle>,

    /// The raw Markdown following the frontmatter.
    pub body: String,
}

impl Post {
    /// Parses a post from the contents of its source file. See
    /// [`parse_posts`] for the expected file layout.
    pub fn parse(source: &Path, input: &str) -> Result<Post> {
        let (yaml, body) = split_frontmatter(input);
        let frontmatter = match yaml {
            Some(yaml) => Frontmatter::from_yaml(yaml)?,
            None => Frontmatter::default(),
        };

        let slug = match frontmatter.slug.is_empty() {
            false => frontmatter.slug,
            true => slug_from_file_name(
                &source
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .unwrap_or_default(),
            ),
        };

        let hero_style = match frontmatter.hero_style.as_str() {
            "" => None,
            tag => {
                let style = HeroStyle::from_tag(tag);
                if style.is_none() {
                    tracing::debug!(post = %source.display(), tag, "ignoring unknown heroStyle");
                }
                style
            }
        };

        Ok(Post {
            source: source.to_owned(),
            slug,
            title: frontmatter.title,
            date: frontmatter.date,
            category: frontmatter.category,
            description: frontmatter.description,
            read_time: frontmatter.read_time,
            hero_style,
            body: body.to_owned(),
        })
    }

    /// The post page's file name, relative to the articles directory.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.slug, HTML_EXTENSION)
    }

    /// The post's category, or [`DEFAULT_CATEGORY`] when it has none.
    pub fn category_label(&self) -> &str {
        match self.category.is_empty() {
            true => DEFAULT_CATEGORY,
            false => &self.category,
        }
    }
}

/// Selects which visual header variant a post page renders above its body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeroStyle {
    /// The gradient-and-grid banner, requested with `heroStyle: clawdbot-hero`.
    Clawdbot,
}

impl HeroStyle {
    /// Maps a `heroStyle` frontmatter tag to a [`HeroStyle`]. Unknown tags
    /// yield `None`, i.e. no hero block.
    pub fn from_tag(tag: &str) -> Option<HeroStyle> {
        match tag.trim() {
            "clawdbot-hero" => Some(HeroStyle::Clawdbot),
            _ => None,
        }
    }
}

/// Derives a slug from a post's file name: drops the `.md` extension and a
/// leading `YYYY-MM-DD-` date, lowercases, turns whitespace runs into `-`,
/// and removes every character outside `[a-z0-9-]`.
///
/// ```
/// assert_eq!("my-post", blogsmith::post::slug_from_file_name("2024-01-02-My Post.md"));
/// ```
pub fn slug_from_file_name(file_name: &str) -> String {
    static DATE_PREFIX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}-(.+)$").expect("valid regex"));

    let stem = file_name
        .strip_suffix(MARKDOWN_EXTENSION)
        .unwrap_or(file_name);
    let stem = DATE_PREFIX
        .captures(stem)
        .and_then(|captures| captures.get(1))
        .map_or(stem, |m| m.as_str());

    stem.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Reads every post directly inside `source_directory` and returns them
/// sorted by date, most recent first. A missing directory has no posts. Each
/// post file may begin with a YAML frontmatter block:
///
/// ```md
/// ---
/// title: Hello, world!
/// date: 2024-04-16
/// category: 自动化测试
/// description: A short excerpt.
/// readTime: 5 分钟
/// slug: hello
/// heroStyle: clawdbot-hero
/// ---
/// # Hello
///
/// World
/// ```
///
/// Every field is optional. Only files ending in `.md` are read; the
/// directory is not searched recursively.
pub fn parse_posts(source_directory: &Path) -> Result<Vec<Post>> {
    if !source_directory.is_dir() {
        tracing::debug!(
            directory = %source_directory.display(),
            "posts directory not found, building without posts"
        );
        return Ok(Vec::new());
    }

    let mut posts = Vec::new();
    for result in WalkDir::new(source_directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = result?;
        let is_markdown = entry.file_name().to_string_lossy().ends_with(MARKDOWN_EXTENSION);
        if entry.file_type().is_file() && is_markdown {
            posts.push(read_post(entry.path())?);
        }
    }

    sort_posts(&mut posts);
    for post in &posts {
        if !post.date.is_empty() && !is_iso_date(&post.date) {
            tracing::warn!(
                post = %post.source.display(),
                date = %post.date,
                "date is not zero-padded ISO (YYYY-MM-DD); ordering may be wrong"
            );
        }
    }
    Ok(posts)
}

/// Orders posts by `date`, newest first, comparing dates as plain strings.
/// The sort is stable, so posts with equal dates keep their relative order;
/// empty dates end up last.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

fn is_iso_date(date: &str) -> bool {
    static ISO_DATE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid regex"));
    ISO_DATE.is_match(date)
}

fn read_post(path: &Path) -> Result<Post> {
    std::fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|contents| Post::parse(path, &contents))
        .map_err(|err| Error::Annotated {
            path: path.to_owned(),
            source: Box::new(err),
        })
}

/// Splits `input` into its YAML frontmatter (if any) and body. Frontmatter
/// is present only when the first line is exactly `---`, and then runs until
/// the next `---` line. Without a closing fence, the rest of the file is
/// frontmatter and the body is empty.
fn split_frontmatter(input: &str) -> (Option<&str>, &str) {
    const FENCE: &str = "---";

    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == FENCE => {
            let yaml_start = first.len();
            let mut offset = yaml_start;
            for line in lines {
                if line.trim_end() == FENCE {
                    return (
                        Some(&input[yaml_start..offset]),
                        &input[offset + line.len()..],
                    );
                }
                offset += line.len();
            }
            (Some(&input[yaml_start..]), "")
        }
        _ => (None, input),
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Frontmatter {
    #[serde(deserialize_with = "scalar")]
    slug: String,

    #[serde(deserialize_with = "scalar")]
    title: String,

    #[serde(deserialize_with = "scalar")]
    date: String,

    #[serde(deserialize_with = "scalar")]
    description: String,

    #[serde(rename = "readTime", deserialize_with = "scalar")]
    read_time: String,

    #[serde(deserialize_with = "scalar")]
    category: String,

    #[serde(rename = "heroStyle", deserialize_with = "scalar")]
    hero_style: String,
}

impl Frontmatter {
    /// Frontmatter that is empty or isn't a mapping (a bare scalar or a
    /// list) carries no fields.
    fn from_yaml(yaml: &str) -> Result<Frontmatter> {
        if yaml.trim().is_empty() {
            return Ok(Frontmatter::default());
        }
        match serde_yaml::from_str::<Value>(yaml)? {
            value @ Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
            _ => Ok(Frontmatter::default()),
        }
    }
}

/// Accepts any YAML scalar as text, so `readTime: 5` or an unquoted date
/// work as well as strings do. `null` becomes the empty string.
fn scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, found {:?}",
            other
        ))),
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading or parsing a [`Post`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the frontmatter isn't valid YAML or has the wrong shape.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned for I/O errors reading a post file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for errors listing the posts directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with the path of the post that caused it.
    #[error("parsing post `{}`", path.display())]
    Annotated {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}
