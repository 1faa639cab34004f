//! Works the seed's authors have bookmarked.

use tracing::{debug, instrument};

use ao3recs_archive::{PageFetcher, Query};
use ao3recs_shared::{Result, Strategy, TagCategory, WorkDescriptor};

use super::Run;
use crate::sink::RecommendationSink;

/// Search each author's bookmarks by the seed's relationships, falling back
/// to its fandoms when no relationship produced anything.
///
/// Only authors already known to have bookmarks are searched, so this must
/// run after the same-author strategy.
#[instrument(skip_all, fields(work = %work.id))]
pub async fn run<F: PageFetcher, S: RecommendationSink>(
    run: &mut Run<'_, F, S>,
    work: &WorkDescriptor,
) -> Result<usize> {
    run.begin(Strategy::AuthorBookmarks);
    let mut found = 0;

    for author in work.known_authors() {
        if author.has_bookmarks() != Some(true) {
            debug!(user = %author.user_id, "no bookmarks to search");
            continue;
        }

        let base = Query::new().for_pseud(&author.pseud_id, &author.user_id);
        let mut by_author = run
            .filter_bookmarks(work, TagCategory::Relationship, &base, 0)
            .await?;
        if by_author == 0 {
            by_author = run.filter_bookmarks(work, TagCategory::Fandom, &base, 0).await?;
        }
        found += by_author;
    }

    Ok(found)
}
