//! Converts a post's Markdown body to HTML. Before conversion, a trailing
//! `## 参考链接` (or `## 参考文献`) section is pulled out of the body and
//! turned into a [`References`] block, which the post template renders as a
//! card of its own instead of an ordinary list.

use std::fmt::Write;
use std::sync::LazyLock;

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

use crate::html::Escape;

/// The heading text the references card is rendered under.
const REFERENCES_TITLE: &str = "参考链接";

/// The result of rendering a post body.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    /// The body HTML, without the references section.
    pub html: String,

    /// The references extracted from the body (possibly empty).
    pub references: References,
}

/// Renders a post body: extracts the references section, strips it from the
/// Markdown, and converts the rest to HTML.
pub fn render(markdown: &str) -> Rendered {
    Rendered {
        html: to_html(&strip_references(markdown)),
        references: References::extract(markdown),
    }
}

/// Converts Markdown to HTML with the GitHub-flavoured extensions (tables,
/// strikethrough, task lists) enabled.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

/// One entry of a references section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub label: String,

    /// The link target, if the bullet carried one as `<url>`.
    pub url: Option<String>,
}

/// The bullets of a post's references section, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct References(pub Vec<Reference>);

impl References {
    /// Collects the `- ` bullets following the first `## 参考链接` or
    /// `## 参考文献` heading, up to the next `## ` heading. A bullet of the
    /// form `label: <url>` becomes a linked entry; anything else is kept as
    /// a plain label.
    pub fn extract(markdown: &str) -> References {
        static BULLET: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^-\s+(.+)$").expect("valid regex"));

        let lines: Vec<&str> = markdown.lines().collect();
        let Some(section) = ReferenceSection::find(&lines) else {
            return References::default();
        };

        References(
            lines[section.start + 1..section.end]
                .iter()
                .filter_map(|line| BULLET.captures(line.trim()))
                .filter_map(|captures| captures.get(1))
                .map(|item| Reference::parse(item.as_str()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the references card. Empty references render as an empty
    /// string so the template can drop the block entirely.
    pub fn to_html(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut items = String::new();
        for reference in &self.0 {
            // writing into a String never fails
            let _ = match &reference.url {
                Some(url) => write!(
                    items,
                    r#"<li>{}： <a href="{}" target="_blank" rel="noreferrer">{}</a></li>"#,
                    Escape(&reference.label),
                    Escape(url),
                    Escape(url),
                ),
                None => write!(items, "<li>{}</li>", Escape(&reference.label)),
            };
        }

        format!(
            r#"
    <h2 id="references">{}</h2>
    <div class="references">
      <ul>{}</ul>
    </div>
"#,
            REFERENCES_TITLE, items
        )
    }
}

impl Reference {
    fn parse(item: &str) -> Reference {
        static ANGLE_URL: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"<([^>]+)>").expect("valid regex"));

        let Some(captures) = ANGLE_URL.captures(item) else {
            return Reference {
                label: item.to_owned(),
                url: None,
            };
        };
        let url = &captures[1];
        let without_url = item.replacen(&captures[0], "", 1);
        let label = without_url.trim();
        let label = label
            .strip_suffix(':')
            .or_else(|| label.strip_suffix('：'))
            .unwrap_or(label);

        Reference {
            label: match label.is_empty() {
                true => url.to_owned(),
                false => label.to_owned(),
            },
            url: Some(url.to_owned()),
        }
    }
}

/// Removes the references section (heading and everything up to the next
/// `## ` heading) from `markdown`. The result is trimmed and ends with a
/// single line feed. Markdown without a references section is returned
/// unchanged.
pub fn strip_references(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let Some(section) = ReferenceSection::find(&lines) else {
        return markdown.to_owned();
    };

    let kept: Vec<&str> = lines[..section.start]
        .iter()
        .chain(&lines[section.end..])
        .copied()
        .collect();
    let mut out = kept.join("\n").trim().to_owned();
    out.push('\n');
    out
}

/// Line range of a references section: `start` is the heading line, `end`
/// the first line of the following section (or the line count).
struct ReferenceSection {
    start: usize,
    end: usize,
}

impl ReferenceSection {
    fn find(lines: &[&str]) -> Option<ReferenceSection> {
        static HEADING: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^##\s+(参考链接|参考文献)\s*$").expect("valid regex")
        });

        let start = lines.iter().position(|line| HEADING.is_match(line.trim()))?;
        let end = lines[start + 1..]
            .iter()
            .position(|line| line.trim().starts_with("## "))
            .map_or(lines.len(), |offset| start + 1 + offset);
        Some(ReferenceSection { start, end })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn linked(label: &str, url: &str) -> Reference {
        Reference {
            label: label.to_owned(),
            url: Some(url.to_owned()),
        }
    }

    #[test]
    fn test_extract_references() {
        let markdown = "# Post\n\nText.\n\n## 参考链接\n\n- Example <https://example.com>\n";
        assert_eq!(
            References(vec![linked("Example", "https://example.com")]),
            References::extract(markdown)
        );

        let stripped = strip_references(markdown);
        assert_eq!("# Post\n\nText.\n", stripped);
        assert!(!stripped.contains("参考链接"));
        assert!(!stripped.contains("example.com"));
    }

    #[test]
    fn test_extract_references_alternate_heading_and_labels() {
        let markdown = "## 参考文献\n- 官方文档： <https://a.example>\n- Docs: <https://b.example>\n- <https://c.example>\n- 一本书\n* not a dash bullet\n-no-space\n";
        assert_eq!(
            References(vec![
                linked("官方文档", "https://a.example"),
                linked("Docs", "https://b.example"),
                linked("https://c.example", "https://c.example"),
                Reference {
                    label: String::from("一本书"),
                    url: None,
                },
            ]),
            References::extract(markdown)
        );
    }

    #[test]
    fn test_extract_stops_at_next_section() {
        let markdown = "intro\n## 参考链接\n- A <https://a.example>\n## 后记\n- B <https://b.example>\n";
        assert_eq!(
            References(vec![linked("A", "https://a.example")]),
            References::extract(markdown)
        );
        assert_eq!(
            "intro\n## 后记\n- B <https://b.example>\n",
            strip_references(markdown)
        );
    }

    #[test]
    fn test_heading_must_match_exactly() {
        let markdown = "## 参考链接 and more\n- A <https://a.example>\n### 参考链接\n- B\n";
        assert!(References::extract(markdown).is_empty());
        assert_eq!(markdown, strip_references(markdown));
    }

    #[test]
    fn test_heading_tolerates_surrounding_whitespace() {
        let markdown = "  ##   参考链接  \n- A <https://a.example>\n";
        assert_eq!(
            References(vec![linked("A", "https://a.example")]),
            References::extract(markdown)
        );
    }

    #[test]
    fn test_section_without_bullets() {
        let markdown = "body\n\n## 参考链接\n\nnothing listed\n";
        let references = References::extract(markdown);
        assert!(references.is_empty());
        assert_eq!("", references.to_html());
        assert_eq!("body\n", strip_references(markdown));
    }

    #[test]
    fn test_malformed_url_is_plain_text() {
        let markdown = "## 参考链接\n- Broken <https://example.com\n- Empty <>\n";
        assert_eq!(
            References(vec![
                Reference {
                    label: String::from("Broken <https://example.com"),
                    url: None,
                },
                Reference {
                    label: String::from("Empty <>"),
                    url: None,
                },
            ]),
            References::extract(markdown)
        );
    }

    #[test]
    fn test_references_to_html_escapes() {
        let references = References(vec![
            linked("A & B", "https://example.com/?a=1&b=\"2\""),
            Reference {
                label: String::from("<b>plain</b>"),
                url: None,
            },
        ]);
        let html = references.to_html();
        assert!(html.contains(r#"<h2 id="references">参考链接</h2>"#));
        assert!(html.contains(
            r#"<li>A &amp; B： <a href="https://example.com/?a=1&amp;b=&quot;2&quot;" target="_blank" rel="noreferrer">https://example.com/?a=1&amp;b=&quot;2&quot;</a></li>"#
        ));
        assert!(html.contains("<li>&lt;b&gt;plain&lt;/b&gt;</li>"));
    }

    #[test]
    fn test_to_html() {
        assert_eq!(
            "<h1>Title</h1>\n<p>Some <em>text</em> and <del>old</del>.</p>\n",
            to_html("# Title\n\nSome *text* and ~~old~~.")
        );
        assert!(to_html("| a | b |\n|---|---|\n| 1 | 2 |\n").contains("<table>"));
        assert!(to_html("```rust\nfn main() {}\n```\n")
            .contains(r#"<pre><code class="language-rust">fn main() {}"#));
    }

    #[test]
    fn test_render() {
        let rendered = render("Hello\n\n## 参考链接\n- Rust <https://www.rust-lang.org>\n");
        assert_eq!("<p>Hello</p>\n", rendered.html);
        assert_eq!(
            References(vec![linked("Rust", "https://www.rust-lang.org")]),
            rendered.references
        );
    }
}
