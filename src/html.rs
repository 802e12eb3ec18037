//! HTML helpers shared by the templates and the site assembler: the
//! [`Escape`] wrapper applied to every piece of free text that ends up in a
//! page, and [`patch_region`], which swaps out the content between a pair of
//! marker comments in an existing document.

use std::fmt::{self, Display};

/// Escapes `&`, `<`, `>`, `"`, and `'` when displayed. Wrap any value that
/// didn't originate as trusted HTML in this before interpolating it.
pub struct Escape<'a>(pub &'a str);

impl Display for Escape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(i) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..i])?;
            f.write_str(match rest.as_bytes()[i] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            })?;
            rest = &rest[i + 1..];
        }
        f.write_str(rest)
    }
}

/// A named span of an HTML document delimited by two sentinel comments. The
/// build owns whatever sits strictly between `start` and `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub start: &'static str,
    pub end: &'static str,
}

impl Region {
    /// The "latest articles" grid on the home page.
    pub const ARTICLES_GRID: Region = Region {
        start: "<!-- AUTO:ARTICLES_GRID_START -->",
        end: "<!-- AUTO:ARTICLES_GRID_END -->",
    };

    /// The full article list on the articles index page.
    pub const ARTICLES_LIST: Region = Region {
        start: "<!-- AUTO:ARTICLES_LIST_START -->",
        end: "<!-- AUTO:ARTICLES_LIST_END -->",
    };
}

/// Replaces the content between `region`'s markers in `document` with
/// `replacement`. The markers themselves and everything outside them are
/// kept. Returns `None` if either marker is missing or the first end marker
/// begins before the first start marker ends; callers leave the document as
/// it was in that case.
pub fn patch_region(document: &str, region: Region, replacement: &str) -> Option<String> {
    let head_end = document.find(region.start)? + region.start.len();
    let tail_start = document.find(region.end)?;
    if tail_start < head_end {
        return None;
    }

    let mut out = String::with_capacity(head_end + replacement.len() + document.len() - tail_start);
    out.push_str(&document[..head_end]);
    out.push_str(replacement);
    out.push_str(&document[tail_start..]);
    Some(out)
}
