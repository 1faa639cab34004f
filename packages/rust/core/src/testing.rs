//! HTML fixtures shaped like archive pages, served from memory.

use scraper::Html;
use url::Url;

use ao3recs_archive::{Archive, MemoryFetcher, Query, TagDirectory};
use ao3recs_shared::TagCategory;

pub const BASE: &str = "https://archive.test";

/// An in-memory archive under construction.
pub struct Site {
    fetcher: MemoryFetcher,
    base: Url,
}

impl Site {
    pub fn new() -> Self {
        Self {
            fetcher: MemoryFetcher::new(),
            base: Url::parse(BASE).unwrap(),
        }
    }

    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }

    pub fn serve(&mut self, url: &Url, body: impl Into<String>) {
        self.fetcher.insert(url, body);
    }

    fn scheme(&self) -> Archive<MemoryFetcher> {
        Archive::new(MemoryFetcher::new(), self.base.clone())
    }

    pub fn works_url(&self, query: &Query) -> Url {
        self.scheme().works_url(query)
    }

    pub fn bookmarks_url(&self, query: &Query) -> Url {
        self.scheme().bookmarks_url(query)
    }

    /// Serve a filterable tag page and return the link a work page uses for it.
    pub fn tag(&mut self, category: TagCategory, name: &str, filter_id: &str) -> String {
        let href = format!("/tags/{}/works", name.replace('/', "*s*"));
        let url = self.url(&href);
        self.serve(&url, tag_page(category, name, filter_id));
        href
    }

    pub fn archive(self) -> Archive<MemoryFetcher> {
        Archive::new(self.fetcher, self.base)
    }
}

/// Resolve tag links the way the extractor would, registering their filter IDs.
pub async fn directory(
    archive: &Archive<MemoryFetcher>,
    links: &[(TagCategory, &str)],
) -> TagDirectory {
    let mut tags = TagDirectory::new();
    for (category, href) in links {
        let url = archive.join(href).unwrap();
        tags.resolve(archive, &url, *category).await.unwrap();
    }
    tags
}

pub fn tag_page(category: TagCategory, name: &str, filter_id: &str) -> String {
    format!(
        r#"<html><body><div id="main">
  <h2 class="heading">1 - 20 of 1,000 Works in <a class="tag" href="/tags/x">{name}</a></h2>
  <form id="work-filters"><dl>
    <dd id="include_{category}_tags"><ul>
      <li><label for="include_work_search_{category}_ids_{filter_id}"><span>{name} (1000)</span></label></li>
    </ul></dd>
  </dl></form>
</div></body></html>"#
    )
}

/// A work page with the given byline markup and `<dt>/<dd>` metadata markup.
pub fn work_page(title: &str, byline: &str, meta: &str) -> String {
    format!(
        r#"<html><body><div id="main">
  <div class="wrapper"><dl class="work meta group">
    {meta}
    <dt class="language">Language:</dt><dd class="language">English</dd>
    <dt class="stats">Stats:</dt>
    <dd class="stats"><dl class="stats"><dt class="words">Words:</dt><dd class="words">1,000</dd></dl></dd>
  </dl></div>
  <div id="workskin"><div class="preface group">
    <h2 class="title heading">
      {title}
    </h2>
    <h3 class="byline heading">{byline}</h3>
  </div></div>
</div></body></html>"#
    )
}

/// `<dt>/<dd>` pair whose values link to tag pages.
pub fn linked_meta(class: &str, links: &[(&str, &str)]) -> String {
    let items: String = links
        .iter()
        .map(|(name, href)| format!(r#"<li><a class="tag" href="{href}">{name}</a></li>"#))
        .collect();
    format!(
        r#"<dt class="{class} tags">{class}:</dt><dd class="{class} tags"><ul class="commas">{items}</ul></dd>"#
    )
}

pub fn author_link(user: &str, pseud: &str) -> String {
    format!(r#"<a rel="author" href="/users/{user}/pseuds/{pseud}">{pseud}</a>"#)
}

/// A listing entry for one work.
pub fn work_blurb(
    id: &str,
    title: &str,
    authors: &[&str],
    fandoms: &[&str],
    summary: &[&str],
) -> String {
    let authors: String = authors
        .iter()
        .map(|a| format!(" by {}", author_link(a, a)))
        .collect();
    let fandoms: String = fandoms
        .iter()
        .map(|f| format!(r#" <a class="tag" href="/tags/{f}/works">{f}</a>"#))
        .collect();
    let summary = if summary.is_empty() {
        String::new()
    } else {
        let paragraphs: String = summary.iter().map(|p| format!("<p>{p}</p>\n")).collect();
        format!(r#"<blockquote class="userstuff summary">{paragraphs}</blockquote>"#)
    };

    format!(
        r#"<li id="work_{id}" class="work blurb group" role="article">
  <div class="header module">
    <h4 class="heading"><a href="/works/{id}">{title}</a>{authors}</h4>
    <h5 class="fandoms heading"><span class="landmark">Fandoms:</span>{fandoms}</h5>
  </div>
  {summary}
</li>"#
    )
}

/// A listing entry for a series.
pub fn series_blurb(id: &str, title: &str) -> String {
    format!(
        r#"<li class="series blurb group" role="article">
  <div class="header module"><h4 class="heading"><a href="/series/{id}">{title}</a></h4></div>
</li>"#
    )
}

pub fn series_page(entries: &[String]) -> String {
    format!(
        r#"<html><body><div id="main">
  <h2 class="heading">A Series</h2>
  <ul class="series work index group">{}</ul>
</div></body></html>"#,
        entries.concat()
    )
}

/// The list of users who bookmarked a work.
pub fn bookmarkers_page(users: &[(&str, &str)], next: Option<&str>) -> String {
    let items: String = users
        .iter()
        .map(|(user, pseud)| {
            format!(
                r#"<li class="user short blurb group" role="article">
  <h5 class="byline heading"><a href="/users/{user}/pseuds/{pseud}">{pseud}</a></h5>
</li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="main">
  <h2 class="heading">Bookmarks for Seed</h2>
  <ol class="bookmark index group">{items}</ol>
  {}
</div></body></html>"#,
        pagination(next)
    )
}

fn pagination(next: Option<&str>) -> String {
    match next {
        Some(href) => format!(
            r#"<ol class="pagination actions" role="navigation" title="pagination">
  <li class="next" title="next"><a rel="next" href="{href}">Next</a></li>
</ol>"#
        ),
        None => String::new(),
    }
}

/// A work or bookmark listing page.
pub struct Listing {
    heading: String,
    class: &'static str,
    entries: Vec<String>,
    next: Option<String>,
    dashboard: Option<String>,
}

impl Listing {
    pub fn works(total: u64) -> Self {
        Self {
            heading: format!("1 - 20 of {total} Works in Listing"),
            class: "work index group",
            entries: Vec::new(),
            next: None,
            dashboard: None,
        }
    }

    pub fn bookmarks(total: u64) -> Self {
        Self {
            heading: format!("1 - 20 of {total} Bookmarks by someone"),
            class: "bookmark index group",
            entries: Vec::new(),
            next: None,
            dashboard: None,
        }
    }

    pub fn entry(mut self, entry: String) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn next(mut self, href: &str) -> Self {
        self.next = Some(href.to_string());
        self
    }

    pub fn dashboard(mut self, user: &str, pseud: &str, bookmarks: u64) -> Self {
        self.dashboard = Some(format!(
            r#"<div id="dashboard"><ul>
  <li><a href="/users/{user}/pseuds/{pseud}/works">Works (2)</a></li>
  <li><a href="/users/{user}/pseuds/{pseud}/bookmarks">Bookmarks ({bookmarks})</a></li>
</ul></div>"#
        ));
        self
    }

    pub fn render(&self) -> String {
        format!(
            r#"<html><body>
{}
<div id="main">
  <h2 class="heading">{}</h2>
  <ol class="{}">{}</ol>
  {}
</div></body></html>"#,
            self.dashboard.as_deref().unwrap_or_default(),
            self.heading,
            self.class,
            self.entries.concat(),
            pagination(self.next.as_deref()),
        )
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.render())
    }
}
