//! Structural helpers over parsed archive pages.
//!
//! The archive renders listings, dashboards and work pages with stable CSS
//! classes; everything here reads those classes and nothing else.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use ao3recs_shared::{RecsError, Result, TagCategory};

// ---------------------------------------------------------------------------
// Selectors and patterns (compiled once)
// ---------------------------------------------------------------------------

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Heading of the main content area (listing totals, tag names).
pub static MAIN_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("#main h2"));

/// Link inside the main heading, present on filterable tag pages.
pub static MAIN_HEADING_LINK: LazyLock<Selector> = LazyLock::new(|| selector("#main h2 a"));

/// "Next" link of a pagination bar.
static NEXT_PAGE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"ol[title="pagination"] li.next a[href]"#));

/// Links on a user's dashboard sidebar.
static DASHBOARD_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("#dashboard a[href]"));

/// `1,234 Works`, `1 Bookmark`, `12 Bookmarked Items`.
static LISTING_TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(\d[\d,]*)\s+(?:Works?|Bookmarks?|Bookmarked Items?)\b")
        .expect("listing total regex")
});

/// Trailing `(12)` count on dashboard links.
static TRAILING_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d[\d,]*)\)\s*$").expect("trailing count regex"));

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Text nodes of an element, trimmed, without empty ones.
pub fn stripped_strings<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    el.text().map(str::trim).filter(|s| !s.is_empty())
}

/// All text of an element with runs of whitespace collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_count(digits: &str) -> Result<u64> {
    digits
        .replace(',', "")
        .parse()
        .map_err(|e| RecsError::parse(format!("bad count '{digits}': {e}")))
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Total number of works or bookmarks a listing reports in its heading.
///
/// Reads headings such as `1 - 20 of 1,234 Works in Fandom` or
/// `3 Bookmarks by user`.
pub fn listing_total(doc: &Html) -> Result<u64> {
    let heading = doc
        .select(&MAIN_HEADING)
        .next()
        .ok_or_else(|| RecsError::parse("listing has no main heading"))?;
    let text = element_text(heading);

    let caps = LISTING_TOTAL_RE
        .captures(&text)
        .ok_or_else(|| RecsError::parse(format!("no listing total in heading '{text}'")))?;
    parse_count(&caps[1])
}

/// The `href` of the pagination bar's "next" link, if there is a next page.
pub fn next_page_href(doc: &Html) -> Option<&str> {
    doc.select(&NEXT_PAGE)
        .next()
        .and_then(|a| a.value().attr("href"))
}

/// Number of bookmarks shown on the dashboard of the given pseud.
///
/// `None` when the dashboard or its bookmarks link is absent.
pub fn dashboard_bookmark_count(doc: &Html, user_id: &str, pseud_id: &str) -> Option<u64> {
    let path = pseud_bookmarks_path(user_id, pseud_id);
    let link = doc
        .select(&DASHBOARD_LINKS)
        .find(|a| a.value().attr("href").is_some_and(|h| h.ends_with(&path)))?;

    let text = element_text(link);
    let caps = TRAILING_COUNT_RE.captures(&text)?;
    parse_count(&caps[1]).ok()
}

/// Filter ID the listing sidebar assigns to a tag.
///
/// Sidebar labels read `Tag Name (count)` and point at an input whose ID ends
/// with `_<filter id>`.
pub fn sidebar_filter_id(
    doc: &Html,
    category: TagCategory,
    tag_name: &str,
) -> Result<Option<String>> {
    let labels = Selector::parse(&format!("#include_{category}_tags label"))
        .map_err(|e| RecsError::parse(format!("sidebar selector for {category}: {e}")))?;

    for label in doc.select(&labels) {
        let text = element_text(label);
        let name = match text.rsplit_once(' ') {
            Some((name, _count)) => name,
            None => continue,
        };
        if name == tag_name {
            return Ok(label
                .value()
                .attr("for")
                .and_then(|f| f.rsplit('_').next())
                .map(str::to_string));
        }
    }

    Ok(None)
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Path of a pseud's bookmark listing.
pub fn pseud_bookmarks_path(user_id: &str, pseud_id: &str) -> String {
    format!("/users/{user_id}/pseuds/{pseud_id}/bookmarks")
}

/// Split a `/users/<user>/pseuds/<pseud>` link into `(user_id, pseud_id)`.
pub fn parse_profile_href(href: &str) -> Option<(String, String)> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let users = segments.iter().position(|s| *s == "users")?;

    match segments.get(users + 1..users + 4)? {
        [user, "pseuds", pseud] => Some((user.to_string(), pseud.to_string())),
        _ => None,
    }
}

/// Numeric work ID from a path or URL containing `/works/<id>`.
pub fn work_id_from_path(path: &str) -> Option<String> {
    let mut segments = path.split(['/', '?', '#']);
    segments.find(|s| *s == "works")?;
    let id: String = segments
        .next()?
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    (!id.is_empty()).then_some(id)
}

/// Whether a listing entry links to a series rather than a work.
pub fn is_series_href(href: &str) -> bool {
    href.split(['?', '#'])
        .next()
        .is_some_and(|p| p.split('/').any(|s| s == "series"))
}
