//! Listing walker: finds the first not-yet-seen work in a paginated listing.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use ao3recs_archive::page::{
    element_text, is_series_href, next_page_href, stripped_strings, work_id_from_path,
};
use ao3recs_archive::{Archive, PageFetcher};
use ao3recs_shared::{RecsError, Result, SeenSet, WorkSummary};

/// Characters that attach to the previous summary fragment without a space.
const PUNCTUATION: [char; 6] = [',', '.', '?', '!', '\'', '"'];

/// Placeholder for works without a summary.
pub const NO_SUMMARY: &str = "N/A";

/// Byline shown when a listing entry names no author.
pub const ANONYMOUS: &str = "Anonymous";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static WORK_LISTING: LazyLock<Selector> = LazyLock::new(|| selector("#main .work.index.group"));
static BOOKMARK_LISTING: LazyLock<Selector> =
    LazyLock::new(|| selector("#main .bookmark.index.group"));
static SERIES_LISTING: LazyLock<Selector> = LazyLock::new(|| selector(".series.work.index.group"));
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"[role="article"]"#));
static HEADER: LazyLock<Selector> = LazyLock::new(|| selector(".header.module"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static AUTHOR_LINK: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[rel="author"]"#));
static FANDOM_LINK: LazyLock<Selector> = LazyLock::new(|| selector(".fandoms.heading a"));
static SUMMARY: LazyLock<Selector> = LazyLock::new(|| selector(".userstuff.summary"));

/// Which index a listing page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Works,
    Bookmarks,
}

impl ListingKind {
    fn container(self) -> &'static Selector {
        match self {
            Self::Works => &WORK_LISTING,
            Self::Bookmarks => &BOOKMARK_LISTING,
        }
    }
}

/// Find the first entry of `listing` whose work is not in `seen`, following
/// pagination until one is found or the pages run out.
///
/// Series entries stand for their first installment. The returned work's ID
/// is added to `seen`; when nothing qualifies `seen` is left unchanged.
pub async fn find_next<F: PageFetcher>(
    archive: &Archive<F>,
    listing: &Html,
    kind: ListingKind,
    seen: &mut SeenSet,
) -> Result<Option<WorkSummary>> {
    let mut fetched: Option<Html> = None;

    loop {
        let doc = fetched.as_ref().unwrap_or(listing);

        if let Some(work) = scan_page(archive, doc, kind, seen).await? {
            return Ok(Some(work));
        }

        let Some(href) = next_page_href(doc) else {
            debug!("listing exhausted");
            return Ok(None);
        };
        let next = archive.join(href)?;
        debug!(url = %next, "no unseen work on page, following pagination");
        fetched = Some(archive.page(&next).await?);
    }
}

async fn scan_page<F: PageFetcher>(
    archive: &Archive<F>,
    doc: &Html,
    kind: ListingKind,
    seen: &mut SeenSet,
) -> Result<Option<WorkSummary>> {
    let Some(container) = doc.select(kind.container()).next() else {
        debug!(?kind, "page has no listing");
        return Ok(None);
    };

    for entry in container.select(&ARTICLE) {
        let Some(href) = header_link(entry).and_then(|a| a.value().attr("href")) else {
            // Deleted works stay in bookmark listings without a link.
            debug!("listing entry without a work link");
            continue;
        };

        let claimed = if is_series_href(href) {
            let series = archive.page(&archive.join(href)?).await?;
            let first = series
                .select(&SERIES_LISTING)
                .next()
                .and_then(|list| list.select(&ARTICLE).next())
                .ok_or_else(|| RecsError::parse(format!("series {href} lists no works")))?;
            claim(archive, first, seen)?
        } else {
            claim(archive, entry, seen)?
        };

        if claimed.is_some() {
            return Ok(claimed);
        }
    }

    Ok(None)
}

fn header_link(entry: ElementRef<'_>) -> Option<ElementRef<'_>> {
    entry
        .select(&HEADER)
        .next()
        .and_then(|header| header.select(&LINK).next())
}

/// Summarize a work entry and mark it seen, unless it already was.
fn claim<F: PageFetcher>(
    archive: &Archive<F>,
    entry: ElementRef<'_>,
    seen: &mut SeenSet,
) -> Result<Option<WorkSummary>> {
    let Some(link) = header_link(entry) else {
        debug!("work entry has no header link");
        return Ok(None);
    };
    let href = link.value().attr("href").unwrap_or_default();
    // Bookmarked external works have no archive ID.
    let Some(id) = work_id_from_path(href) else {
        debug!(%href, "entry is not a work");
        return Ok(None);
    };

    if seen.contains(&id) {
        debug!(%id, "already seen");
        return Ok(None);
    }

    let mut authors: Vec<String> = entry
        .select(&HEADER)
        .flat_map(|header| header.select(&AUTHOR_LINK))
        .map(element_text)
        .collect();
    if authors.is_empty() {
        authors.push(ANONYMOUS.to_string());
    }

    let summary = entry
        .select(&SUMMARY)
        .next()
        .map(|s| join_fragments(stripped_strings(s)))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_SUMMARY.to_string());

    let work = WorkSummary {
        url: archive.work_url(&id).to_string(),
        title: element_text(link),
        authors,
        fandoms: entry.select(&FANDOM_LINK).map(element_text).collect(),
        summary,
        id,
    };

    seen.insert(work.id.clone());
    Ok(Some(work))
}

/// Join text fragments with single spaces, except before fragments that start
/// with punctuation.
pub fn join_fragments<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for fragment in fragments {
        let attaches = fragment.starts_with(PUNCTUATION);
        if !joined.is_empty() && !attaches {
            joined.push(' ');
        }
        joined.push_str(fragment);
    }
    joined
}
