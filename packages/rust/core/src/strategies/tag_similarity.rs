//! Popular works sharing as many of the seed's tags as possible.

use tracing::{debug, instrument};

use ao3recs_archive::page::listing_total;
use ao3recs_archive::{PageFetcher, Query};
use ao3recs_shared::{Result, Strategy, TagCategory, WorkDescriptor};

use super::Run;
use crate::sink::RecommendationSink;
use crate::walker::ListingKind;

/// Search the seed's first fandom, sorted by kudos, requiring every
/// filterable seed tag. While the quota is unmet, drop the most recently
/// added tag and search again, down to the fandom listing itself.
#[instrument(skip_all, fields(work = %work.id))]
pub async fn run<F: PageFetcher, S: RecommendationSink>(
    run: &mut Run<'_, F, S>,
    work: &WorkDescriptor,
) -> Result<usize> {
    run.begin(Strategy::TagSimilarity);
    let quota = run.config.tag_search_quota;
    let Some(first_fandom) = work.tags(TagCategory::Fandom).first() else {
        debug!("seed has no fandom");
        return Ok(0);
    };

    let mut query = Query::new().tagged(first_fandom).sorted_by_kudos();
    for (category, names) in work.linked_sections() {
        for name in names {
            if let Some(id) = run.filter_id(category, name) {
                query = query.include_work_tag(category, id);
            }
        }
    }

    let archive = run.archive;
    let mut found = 0;

    while found < quota {
        let page = archive.page(&archive.works_url(&query)).await?;
        let total = listing_total(&page)?;
        let attempts = (quota - found).min(total.saturating_sub(1) as usize);
        debug!(filters = query.filter_count(), total, attempts, "similar works");

        for _ in 0..attempts {
            if !run.recommend_from(&page, ListingKind::Works).await? {
                break;
            }
            found += 1;
        }

        if found >= quota {
            break;
        }
        let Some(next) = query.relaxed() else {
            break;
        };
        query = next;
    }

    Ok(found)
}
