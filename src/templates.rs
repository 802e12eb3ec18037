//! Page templates. Each page type is a pure function from a typed model to
//! an HTML string, assembled from small named sections. Every piece of free
//! text goes through [`Escape`] on its way in; only HTML produced by this
//! crate (rendered Markdown, the references card, other sections) is
//! inserted verbatim.

use std::fmt::Write;

use crate::html::Escape;
use crate::post::{HeroStyle, Post};

/// The site name, appended to every page title.
pub const SITE_NAME: &str = "壹零壹玖";

/// A link to a neighboring post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    /// Relative to the articles directory, i.e. `{slug}.html`.
    pub href: String,
    pub title: String,
}

impl From<&Post> for NavLink {
    fn from(post: &Post) -> NavLink {
        NavLink {
            href: post.file_name(),
            title: post.title.clone(),
        }
    }
}

/// Everything a post page needs.
pub struct ArticlePage<'a> {
    pub post: &'a Post,

    /// The rendered Markdown body.
    pub body_html: &'a str,

    /// The rendered references card, or empty.
    pub references_html: &'a str,

    /// The chronologically older post.
    pub prev: Option<NavLink>,

    /// The chronologically newer post.
    pub next: Option<NavLink>,
}

/// Renders a complete post page.
pub fn article(page: &ArticlePage) -> String {
    let post = page.post;
    let content = format!(
        r#"
  <section class="article-page">
    <div class="container">
      <div class="article-layout">
{toc}
        <main class="article-main">
{header}
          <article class="article-content">
            {hero}
            {body}
            {references}
          </article>
{navigation}
        </main>
      </div>
    </div>
  </section>

  <a href="index.html" class="back-to-articles"><i class="fas fa-arrow-left"></i> 返回目录</a>
"#,
        toc = TOC,
        header = header(post),
        hero = hero(post.hero_style),
        body = page.body_html,
        references = page.references_html,
        navigation = navigation(page.prev.as_ref(), page.next.as_ref()),
    );

    layout(&post.title, &content, HERO_CSS, TOC_SCRIPT)
}

/// The article header: title, category badge, date, optional read time and
/// optional description excerpt.
fn header(post: &Post) -> String {
    let mut meta = format!(
        r#"<span class="article-category">{}</span>
              <span class="article-date">{}</span>"#,
        Escape(post.category_label()),
        Escape(&post.date),
    );
    if !post.read_time.is_empty() {
        let _ = write!(
            meta,
            r#"
              <span class="article-date">{}</span>"#,
            Escape(&post.read_time)
        );
    }

    let excerpt = match post.description.is_empty() {
        true => String::new(),
        false => format!(
            r#"<p class="article-excerpt">{}</p>"#,
            Escape(&post.description)
        ),
    };

    format!(
        r#"          <header class="article-header">
            <h1 class="article-title">{}</h1>
            <div class="article-meta">
              {}
            </div>
            {}
          </header>"#,
        Escape(&post.title),
        meta,
        excerpt,
    )
}

fn hero(style: Option<HeroStyle>) -> &'static str {
    match style {
        Some(HeroStyle::Clawdbot) => {
            r#"<div class="image-placeholder clawdbot-hero-bg" style="min-height: 280px; margin: 0 auto 2.2rem;"></div>"#
        }
        None => "",
    }
}

/// Previous/next links. A missing neighbor leaves an empty `<span>` so the
/// remaining link keeps its side of the flex row.
fn navigation(prev: Option<&NavLink>, next: Option<&NavLink>) -> String {
    let prev = match prev {
        Some(link) => format!(
            r#"<a class="nav-link" href="{}">← 上一篇：{}</a>"#,
            Escape(&link.href),
            Escape(&link.title)
        ),
        None => String::from("<span></span>"),
    };
    let next = match next {
        Some(link) => format!(
            r#"<a class="nav-link" href="{}">下一篇：{} →</a>"#,
            Escape(&link.href),
            Escape(&link.title)
        ),
        None => String::from("<span></span>"),
    };

    format!(
        r#"          <div class="article-navigation">
            {}
            {}
          </div>"#,
        prev, next
    )
}

/// The document shell shared by post pages: head, navigation bar, and the
/// menu toggle script.
fn layout(title: &str, content: &str, extra_css: &str, extra_script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title} - {site}</title>
  <link rel="stylesheet" href="../styles.css" />
  <link href="https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap" rel="stylesheet" />
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css" />
  <link rel="stylesheet" href="article-common.css" />
  <style>{extra_css}</style>
</head>
<body>
  <div class="container">
    <nav class="navbar">
      <div class="container">
        <div class="nav-brand"><i class="fas fa-bug"></i><span>{site}</span></div>
        <ul class="nav-menu">
          <li><a href="../index.html#home" class="nav-link">首页</a></li>
          <li><a href="../index.html#articles" class="nav-link">文章</a></li>
          <li><a href="../index.html#about" class="nav-link">关于</a></li>
          <li><a href="../index.html#contact" class="nav-link">联系</a></li>
        </ul>
        <div class="hamburger"><span class="bar"></span><span class="bar"></span><span class="bar"></span></div>
      </div>
    </nav>
{content}
  </div>

  <script>{menu_script}{extra_script}</script>
</body>
</html>
"#,
        title = Escape(title),
        site = SITE_NAME,
        extra_css = extra_css,
        content = content,
        menu_script = MENU_SCRIPT,
        extra_script = extra_script,
    )
}

const TOC: &str = r#"        <aside class="article-toc">
          <div class="toc-header"><h3>目录</h3></div>
          <nav class="toc-nav"><ul id="toc-list"></ul></nav>
        </aside>"#;

const MENU_SCRIPT: &str = r#"
    const hamburger = document.querySelector('.hamburger');
    const navMenu = document.querySelector('.nav-menu');
    if (hamburger && navMenu) {
      hamburger.addEventListener('click', () => {
        hamburger.classList.toggle('active');
        navMenu.classList.toggle('active');
      });
      document.querySelectorAll('.nav-link').forEach(n => n.addEventListener('click', () => {
        hamburger.classList.remove('active');
        navMenu.classList.remove('active');
      }));
    }
"#;

// Fills #toc-list from the rendered h2/h3 headings and highlights the entry
// for the section currently in view.
const TOC_SCRIPT: &str = r#"
    const tocList = document.getElementById('toc-list');
    const headings = document.querySelectorAll('.article-content h2, .article-content h3');
    const tocLinks = [];
    headings.forEach((h, i) => {
      if (!h.id) h.id = 'section-' + i;
      const li = document.createElement('li');
      const a = document.createElement('a');
      a.href = '#' + h.id;
      a.textContent = h.textContent;
      a.className = (h.tagName.toLowerCase() === 'h3') ? 'toc-h3' : '';
      li.appendChild(a);
      tocList.appendChild(li);
      tocLinks.push(a);
    });
    window.addEventListener('scroll', () => {
      let current = -1;
      headings.forEach((h, i) => {
        if (h.getBoundingClientRect().top <= 120) current = i;
      });
      tocLinks.forEach((a, i) => a.classList.toggle('active', i === current));
    });
"#;

const HERO_CSS: &str = r#"
    .clawdbot-hero-bg {
      background: linear-gradient(135deg, #4facfe 0%, #00f2fe 100%);
      border-radius: 12px;
      position: relative;
      overflow: hidden;
      box-shadow: 0 10px 30px rgba(0, 0, 0, 0.3);
    }
    .clawdbot-hero-bg::before {
      content: '';
      position: absolute;
      inset: 0;
      background: url('data:image/svg+xml,<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 120 120"><defs><pattern id="grid" width="16" height="16" patternUnits="userSpaceOnUse"><path d="M 16 0 L 0 0 0 16" fill="none" stroke="rgba(255,255,255,0.12)" stroke-width="1"/></pattern></defs><rect width="120" height="120" fill="url(%23grid)"/><path d="M20 78 C40 40, 70 110, 100 60" fill="none" stroke="rgba(255,255,255,0.22)" stroke-width="3"/></svg>');
      opacity: 0.9;
    }
"#;

/// The placeholder artwork behind a home page card, picked from the post's
/// category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardTheme {
    Ai,
    Automation,
    Performance,
    Security,
    Api,
    Testing,
}

impl CardTheme {
    /// First matching keyword wins; anything else gets [`CardTheme::Ai`].
    pub fn from_category(category: &str) -> CardTheme {
        const KEYWORDS: [(&str, CardTheme); 6] = [
            ("AI", CardTheme::Ai),
            ("自动化", CardTheme::Automation),
            ("性能", CardTheme::Performance),
            ("安全", CardTheme::Security),
            ("API", CardTheme::Api),
            ("测试设计", CardTheme::Testing),
        ];
        KEYWORDS
            .iter()
            .find(|(keyword, _)| category.contains(keyword))
            .map_or(CardTheme::Ai, |(_, theme)| *theme)
    }

    pub fn class(self) -> &'static str {
        match self {
            CardTheme::Ai => "ai-bg",
            CardTheme::Automation => "automation-bg",
            CardTheme::Performance => "performance-bg",
            CardTheme::Security => "security-bg",
            CardTheme::Api => "api-bg",
            CardTheme::Testing => "testing-bg",
        }
    }
}

/// A "latest articles" card on the home page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// Relative to the site root, i.e. `articles/{slug}.html`.
    pub href: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
    pub theme: CardTheme,
}

impl From<&Post> for Card {
    fn from(post: &Post) -> Card {
        Card {
            href: format!("articles/{}", post.file_name()),
            title: post.title.clone(),
            description: post.description.clone(),
            date: post.date.clone(),
            read_time: post.read_time.clone(),
            category: post.category_label().to_owned(),
            theme: CardTheme::from_category(&post.category),
        }
    }
}

/// Renders the home page cards, one `<article>` per card.
pub fn home_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| {
            format!(
                r#"
    <article class="article-card">
      <a href="{href}" class="article-link">
        <div class="article-image">
          <div class="image-placeholder {theme}"></div>
          <div class="article-category">{category}</div>
        </div>
        <div class="article-content">
          <h3>{title}</h3>
          <p>{description}</p>
          <div class="article-meta">
            <span class="date">{date}</span>
            <span class="read-time">{read_time}</span>
          </div>
        </div>
      </a>
    </article>"#,
                href = Escape(&card.href),
                theme = card.theme.class(),
                category = Escape(&card.category),
                title = Escape(&card.title),
                description = Escape(&card.description),
                date = Escape(&card.date),
                read_time = Escape(&card.read_time),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// An entry of the full article list on the articles index page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    /// Relative to the articles directory, i.e. `{slug}.html`.
    pub href: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub category: String,
}

impl From<&Post> for ListItem {
    fn from(post: &Post) -> ListItem {
        ListItem {
            href: post.file_name(),
            title: post.title.clone(),
            description: post.description.clone(),
            date: post.date.clone(),
            category: post.category_label().to_owned(),
        }
    }
}

/// Renders the article list, one `<article>` per item. The
/// `data-category` attribute drives the index page's category filter.
pub fn articles_index(items: &[ListItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                r#"
    <article class="article-item" data-category="{category}">
      <div class="article-meta">
        <div class="article-category">{category}</div>
        <div class="article-date">{date}</div>
      </div>
      <div class="article-content">
        <h3 class="article-title">{title}</h3>
        <p class="article-excerpt">{description}</p>
        <a href="{href}" class="article-read-more">阅读全文 →</a>
      </div>
    </article>"#,
                category = Escape(&item.category),
                date = Escape(&item.date),
                title = Escape(&item.title),
                description = Escape(&item.description),
                href = Escape(&item.href),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn post(slug: &str, title: &str, category: &str) -> Post {
        Post {
            source: PathBuf::from(format!("{}.md", slug)),
            slug: slug.to_owned(),
            title: title.to_owned(),
            date: String::from("2024-03-01"),
            category: category.to_owned(),
            description: String::new(),
            read_time: String::new(),
            hero_style: None,
            body: String::new(),
        }
    }

    fn link(slug: &str, title: &str) -> NavLink {
        NavLink {
            href: format!("{}.html", slug),
            title: title.to_owned(),
        }
    }

    #[test]
    fn test_article_escapes_title() {
        let post = post("xss", "<script>alert(1)</script>", "");
        let html = article(&ArticlePage {
            post: &post,
            body_html: "<p>body</p>",
            references_html: "",
            prev: None,
            next: None,
        });

        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("<title>&lt;script&gt;alert(1)&lt;/script&gt; - 壹零壹玖</title>"));
        assert!(html.contains(
            r#"<h1 class="article-title">&lt;script&gt;alert(1)&lt;/script&gt;</h1>"#
        ));
        // trusted body HTML is inserted verbatim
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_article_header() {
        let mut post = post("p", "Title", "");
        post.read_time = String::from("5 分钟");
        post.description = String::from("Tom & Jerry");
        let html = header(&post);

        assert!(html.contains(r#"<span class="article-category">文章</span>"#));
        assert!(html.contains(r#"<span class="article-date">2024-03-01</span>"#));
        assert!(html.contains(r#"<span class="article-date">5 分钟</span>"#));
        assert!(html.contains(r#"<p class="article-excerpt">Tom &amp; Jerry</p>"#));

        let bare = header(&self::post("p", "Title", "性能"));
        assert!(bare.contains(r#"<span class="article-category">性能</span>"#));
        assert!(!bare.contains("article-excerpt"));
        assert_eq!(1, bare.matches("article-date").count());
    }

    #[test]
    fn test_article_hero_and_references() {
        let mut post = post("p", "Title", "");
        let page = |post: &Post| {
            article(&ArticlePage {
                post,
                body_html: "",
                references_html: "<div class=\"references\"></div>",
                prev: None,
                next: None,
            })
        };

        assert!(!page(&post).contains("clawdbot-hero-bg\" style"));
        post.hero_style = Some(HeroStyle::Clawdbot);
        let html = page(&post);
        assert!(html.contains("image-placeholder clawdbot-hero-bg"));
        assert!(html.contains("<div class=\"references\"></div>"));
    }

    #[test]
    fn test_navigation() {
        let html = navigation(
            Some(&link("older", "Older")),
            Some(&link("newer", "<Newer>")),
        );
        assert!(html.contains(r#"<a class="nav-link" href="older.html">← 上一篇：Older</a>"#));
        assert!(html.contains(r#"<a class="nav-link" href="newer.html">下一篇：&lt;Newer&gt; →</a>"#));

        let html = navigation(None, Some(&link("newer", "Newer")));
        assert!(html.contains("<span></span>"));
        assert!(!html.contains("上一篇"));

        let html = navigation(None, None);
        assert_eq!(2, html.matches("<span></span>").count());
    }

    #[test]
    fn test_card_theme_from_category() {
        assert_eq!(CardTheme::Ai, CardTheme::from_category(""));
        assert_eq!(CardTheme::Ai, CardTheme::from_category("AI 与测试"));
        assert_eq!(CardTheme::Automation, CardTheme::from_category("自动化测试"));
        assert_eq!(CardTheme::Performance, CardTheme::from_category("性能测试"));
        assert_eq!(CardTheme::Security, CardTheme::from_category("安全测试"));
        assert_eq!(CardTheme::Api, CardTheme::from_category("API 测试"));
        assert_eq!(CardTheme::Testing, CardTheme::from_category("测试设计"));
        assert_eq!(CardTheme::Ai, CardTheme::from_category("随笔"));
        assert_eq!("automation-bg", CardTheme::Automation.class());
    }

    #[test]
    fn test_home_cards() {
        let mut first = post("first", "First", "");
        first.read_time = String::from("3 min");
        let cards: Vec<Card> = [first, post("second", "Second \"quoted\"", "安全")]
            .iter()
            .map(Card::from)
            .collect();
        let html = home_cards(&cards);

        assert_eq!(2, html.matches("<article class=\"article-card\">").count());
        assert!(html.contains(r#"<a href="articles/first.html" class="article-link">"#));
        assert!(html.contains(r#"<div class="image-placeholder ai-bg"></div>"#));
        assert!(html.contains(r#"<div class="article-category">文章</div>"#));
        assert!(html.contains(r#"<span class="read-time">3 min</span>"#));
        assert!(html.contains(r#"<div class="image-placeholder security-bg"></div>"#));
        assert!(html.contains("<h3>Second &quot;quoted&quot;</h3>"));
        assert_eq!("", home_cards(&[]));
    }

    #[test]
    fn test_articles_index() {
        let items: Vec<ListItem> = [post("a", "A", "API 测试"), post("b", "B", "")]
            .iter()
            .map(ListItem::from)
            .collect();
        let html = articles_index(&items);

        assert!(html.contains(r#"<article class="article-item" data-category="API 测试">"#));
        assert!(html.contains(r#"<article class="article-item" data-category="文章">"#));
        assert!(html.contains(r#"<a href="a.html" class="article-read-more">阅读全文 →</a>"#));
        assert!(html.find("a.html") < html.find("b.html"));
    }
}
