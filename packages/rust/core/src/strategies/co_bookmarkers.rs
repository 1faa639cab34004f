//! Works bookmarked by other readers who bookmarked the seed.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use ao3recs_archive::page::{listing_total, next_page_href, parse_profile_href};
use ao3recs_archive::{Archive, PageFetcher, Query};
use ao3recs_shared::{Result, Strategy, TagCategory, WorkDescriptor};

use super::Run;
use crate::sink::RecommendationSink;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static BOOKMARKERS: LazyLock<Selector> =
    LazyLock::new(|| selector("#main .bookmark.index.group > li.user"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// A reader who bookmarked the seed work.
struct Bookmarker {
    user_id: String,
    pseud_id: String,
    profile: Url,
}

/// Walk the seed's bookmarkers page by page and search each one's bookmarks
/// for the seed's relationships, then its fandoms. Stops once the configured
/// cap of recommendations is reached.
#[instrument(skip_all, fields(work = %work.id))]
pub async fn run<F: PageFetcher, S: RecommendationSink>(
    run: &mut Run<'_, F, S>,
    work: &WorkDescriptor,
) -> Result<usize> {
    run.begin(Strategy::CoBookmarkers);
    let cap = run.config.co_bookmarker_cap;
    if cap == 0 {
        return Ok(0);
    }

    let archive = run.archive;
    let mut url = archive.work_bookmarks_url(&work.id);
    let mut found = 0;

    loop {
        let (bookmarkers, next) = {
            let page = archive.page(&url).await?;
            (parse_bookmarkers(archive, &page)?, next_page_href(&page).map(str::to_string))
        };
        debug!(%url, count = bookmarkers.len(), "bookmarkers page");

        for bookmarker in &bookmarkers {
            found += from_bookmarker(run, work, bookmarker).await?;
            if found >= cap {
                info!(found, cap, "co-bookmarker cap reached");
                return Ok(found);
            }
        }

        let Some(href) = next else {
            return Ok(found);
        };
        url = archive.join(&href)?;
    }
}

fn parse_bookmarkers<F: PageFetcher>(archive: &Archive<F>, page: &Html) -> Result<Vec<Bookmarker>> {
    let mut found = Vec::new();
    for entry in page.select(&BOOKMARKERS) {
        let Some((href, (user_id, pseud_id))) = entry
            .select(&LINK)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| parse_profile_href(href).map(|ids| (href, ids)))
        else {
            debug!("bookmarker entry without a profile link");
            continue;
        };
        found.push(Bookmarker {
            user_id,
            pseud_id,
            profile: archive.join(href)?,
        });
    }
    Ok(found)
}

async fn from_bookmarker<F: PageFetcher, S: RecommendationSink>(
    run: &mut Run<'_, F, S>,
    work: &WorkDescriptor,
    bookmarker: &Bookmarker,
) -> Result<usize> {
    let archive = run.archive;
    let own = archive.profile_bookmarks_url(&bookmarker.profile);
    let total = listing_total(&archive.page(&own).await?)?;

    // The seed itself is one of them.
    if total <= 1 {
        debug!(user = %bookmarker.user_id, total, "no other bookmarks");
        return Ok(0);
    }

    let base = Query::new().for_pseud(&bookmarker.pseud_id, &bookmarker.user_id);
    let found = run
        .filter_bookmarks(work, TagCategory::Relationship, &base, 1)
        .await?;
    if found > 0 {
        return Ok(found);
    }
    run.filter_bookmarks(work, TagCategory::Fandom, &base, 1).await
}
