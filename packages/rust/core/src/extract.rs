//! Work descriptor extraction from a work's page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, instrument};

use ao3recs_archive::page::{element_text, parse_profile_href};
use ao3recs_archive::{Archive, PageFetcher, TagDirectory};
use ao3recs_shared::{
    Author, AuthorRef, MetaSection, RecsError, Result, TagCategory, TagSection, WorkDescriptor,
};

/// Account that orphaned works are transferred to.
const ORPHAN_ACCOUNT: &str = "orphan_account";

/// Byline text of works posted anonymously.
const ANONYMOUS_BYLINE: &str = "Anonymous";

/// First metadata class after the tag categories.
const END_OF_TAGS: &str = "language";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".title.heading"));
static BYLINE: LazyLock<Selector> = LazyLock::new(|| selector(".byline.heading"));
static META_ENTRIES: LazyLock<Selector> = LazyLock::new(|| selector("dl.work.meta.group > dd"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Metadata as read from the page, before tag links are resolved.
enum RawSection {
    Links(Vec<String>),
    Text(String),
}

/// Fetch a work page and describe it.
///
/// Linked tags are resolved through `tags`, which registers their filter IDs
/// for the strategies that run afterwards.
#[instrument(skip_all, fields(url = %work_url))]
pub async fn extract_work<F: PageFetcher>(
    archive: &Archive<F>,
    tags: &mut TagDirectory,
    work_url: &str,
) -> Result<WorkDescriptor> {
    let (url, id) = archive.work_root(work_url)?;

    let (title, authors, raw_sections) = {
        let doc = archive.page(&url).await?;
        let title = doc
            .select(&TITLE)
            .next()
            .map(element_text)
            .ok_or_else(|| RecsError::parse(format!("work {id} has no title")))?;
        (title, parse_byline(archive, &doc)?, parse_meta(&doc))
    };

    let mut sections = Vec::with_capacity(raw_sections.len());
    for (category, raw) in raw_sections {
        let values = match raw {
            RawSection::Text(text) => TagSection::PlainText(text),
            RawSection::Links(hrefs) => {
                let mut names = Vec::with_capacity(hrefs.len());
                for href in hrefs {
                    let tag_url = archive.join(&href)?;
                    names.push(tags.resolve(archive, &tag_url, category).await?.name);
                }
                TagSection::Linked(names)
            }
        };
        sections.push(MetaSection { category, values });
    }

    debug!(%id, %title, authors = authors.len(), sections = sections.len(), "work described");

    Ok(WorkDescriptor {
        url,
        id,
        title,
        authors,
        sections,
    })
}

/// Byline entries in page order. Orphaned and anonymous entries become
/// [`AuthorRef::Anonymous`]; separators are dropped.
fn parse_byline<F: PageFetcher>(archive: &Archive<F>, doc: &Html) -> Result<Vec<AuthorRef>> {
    let byline = doc
        .select(&BYLINE)
        .next()
        .ok_or_else(|| RecsError::parse("work page has no byline"))?;

    let mut authors = Vec::new();
    for child in byline.children() {
        match child.value() {
            Node::Element(_) => {
                let Some(link) = ElementRef::wrap(child).filter(|el| el.value().name() == "a")
                else {
                    continue;
                };
                let href = link
                    .value()
                    .attr("href")
                    .ok_or_else(|| RecsError::parse("byline link without href"))?;
                let (user_id, pseud_id) = parse_profile_href(href).ok_or_else(|| {
                    RecsError::parse(format!("byline link '{href}' is not a pseud"))
                })?;

                if user_id == ORPHAN_ACCOUNT {
                    authors.push(AuthorRef::Anonymous);
                } else {
                    let profile = archive.join(href)?;
                    authors.push(AuthorRef::Known(Author::new(
                        element_text(link),
                        profile,
                        pseud_id,
                        user_id,
                    )));
                }
            }
            Node::Text(text) => {
                let anonymous = text
                    .split(',')
                    .filter(|token| token.trim() == ANONYMOUS_BYLINE)
                    .count();
                authors.extend(std::iter::repeat_n(AuthorRef::Anonymous, anonymous));
            }
            _ => {}
        }
    }

    Ok(authors)
}

/// Tag categories of the metadata block, up to the language entry.
fn parse_meta(doc: &Html) -> Vec<(TagCategory, RawSection)> {
    let mut sections = Vec::new();

    for dd in doc.select(&META_ENTRIES) {
        let Some(class) = dd
            .value()
            .attr("class")
            .and_then(|c| c.split_whitespace().next())
        else {
            continue;
        };
        if class == END_OF_TAGS {
            break;
        }
        let Some(category) = TagCategory::from_meta_class(class) else {
            debug!(class, "skipping unknown metadata entry");
            continue;
        };

        let hrefs: Vec<String> = dd
            .select(&LINK)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect();

        let raw = if hrefs.is_empty() {
            RawSection::Text(element_text(dd))
        } else {
            RawSection::Links(hrefs)
        };
        sections.push((category, raw));
    }

    sections
}
