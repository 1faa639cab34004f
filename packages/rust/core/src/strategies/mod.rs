//! Recommendation strategies and the per-run state they share.
//!
//! Every strategy reads listings through the [`walker`](crate::walker), so a
//! work is recommended at most once per run no matter which strategy meets it.

pub mod author_bookmarks;
pub mod co_bookmarkers;
pub mod same_author;
pub mod tag_similarity;

use scraper::Html;
use tracing::{debug, info};

use ao3recs_archive::page::listing_total;
use ao3recs_archive::{Archive, PageFetcher, Query, TagDirectory};
use ao3recs_shared::{
    RecommendConfig, Recommendation, Result, SeenSet, Strategy, TagCategory, WorkDescriptor,
};

use crate::sink::RecommendationSink;
use crate::walker::{self, ListingKind};

/// State threaded through every strategy of one run.
pub struct Run<'a, F, S> {
    pub(crate) archive: &'a Archive<F>,
    pub(crate) tags: &'a TagDirectory,
    pub(crate) config: RecommendConfig,
    seen: SeenSet,
    sink: &'a mut S,
    strategy: Strategy,
}

impl<'a, F: PageFetcher, S: RecommendationSink> Run<'a, F, S> {
    pub fn new(
        archive: &'a Archive<F>,
        tags: &'a TagDirectory,
        config: RecommendConfig,
        seen: SeenSet,
        sink: &'a mut S,
    ) -> Self {
        Self {
            archive,
            tags,
            config,
            seen,
            sink,
            strategy: Strategy::SameAuthor,
        }
    }

    /// Label subsequent recommendations with `strategy`.
    pub(crate) fn begin(&mut self, strategy: Strategy) {
        debug!(%strategy, seen = self.seen.len(), "starting strategy");
        self.strategy = strategy;
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Recommend the first unseen work of a listing. Returns whether one was found.
    pub(crate) async fn recommend_from(
        &mut self,
        listing: &Html,
        kind: ListingKind,
    ) -> Result<bool> {
        let found = walker::find_next(self.archive, listing, kind, &mut self.seen).await?;
        let Some(work) = found else {
            return Ok(false);
        };

        info!(strategy = %self.strategy, id = %work.id, title = %work.title, "recommended work");
        self.sink.emit(Recommendation {
            strategy: self.strategy,
            work,
        });
        Ok(true)
    }

    /// Filter ID of a seed tag, or `None` (logged) when the tag cannot be filtered on.
    pub(crate) fn filter_id(&self, category: TagCategory, name: &str) -> Option<&'a str> {
        let tags: &'a TagDirectory = self.tags;
        match tags.filter_id(category, name) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(error = %e, "skipping tag");
                None
            }
        }
    }

    /// Search a user's bookmarks once per seed tag of `category`.
    ///
    /// `base` must already name the user. A tag only yields a recommendation
    /// when its filtered listing holds more than `min_count` bookmarks.
    /// Returns the number of works recommended.
    pub(crate) async fn filter_bookmarks(
        &mut self,
        work: &WorkDescriptor,
        category: TagCategory,
        base: &Query,
        min_count: u64,
    ) -> Result<usize> {
        let archive = self.archive;
        let mut found = 0;

        for tag in work.tags(category) {
            let Some(filter_id) = self.filter_id(category, tag) else {
                continue;
            };

            let url = archive.bookmarks_url(&base.include_bookmark_tag(category, filter_id));
            let page = archive.page(&url).await?;
            let total = listing_total(&page)?;

            if total <= min_count {
                debug!(%tag, total, min_count, "too few matching bookmarks");
                continue;
            }
            if self.recommend_from(&page, ListingKind::Bookmarks).await? {
                found += 1;
            }
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Listing, Site, directory, work_blurb};
    use ao3recs_shared::{AuthorRef, MetaSection, TagSection};
    use url::Url;

    fn seed(relationships: &[&str]) -> WorkDescriptor {
        WorkDescriptor {
            url: Url::parse("https://archive.test/works/1?view_adult=true").unwrap(),
            id: "1".into(),
            title: "Seed".into(),
            authors: vec![AuthorRef::Anonymous],
            sections: vec![MetaSection {
                category: TagCategory::Relationship,
                values: TagSection::Linked(relationships.iter().map(|s| s.to_string()).collect()),
            }],
        }
    }

    #[tokio::test]
    async fn filter_requires_more_than_min_count() {
        let mut site = Site::new();
        let ship = site.tag(TagCategory::Relationship, "A/B", "20");
        let base = Query::new().for_pseud("p", "u");
        let filtered = base.include_bookmark_tag(TagCategory::Relationship, "20");
        site.serve(
            &site.bookmarks_url(&filtered),
            Listing::bookmarks(0)
                .entry(work_blurb("9", "Stray", &["x"], &["F"], &[]))
                .render(),
        );
        let archive = site.archive();
        let tags = directory(&archive, &[(TagCategory::Relationship, &ship)]).await;
        let mut sink: Vec<Recommendation> = Vec::new();
        let mut run = Run::new(
            &archive,
            &tags,
            RecommendConfig::default(),
            SeenSet::seeded("1"),
            &mut sink,
        );

        let found = run
            .filter_bookmarks(&seed(&["A/B"]), TagCategory::Relationship, &base, 1)
            .await
            .unwrap();

        assert_eq!(found, 0);
        assert_eq!(run.seen(), &SeenSet::seeded("1"));
        drop(run);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn filter_recommends_one_work_per_tag() {
        let mut site = Site::new();
        let ab = site.tag(TagCategory::Relationship, "A/B", "20");
        let cd = site.tag(TagCategory::Relationship, "C/D", "21");
        let base = Query::new().for_pseud("p", "u");
        for (id, work) in [("20", "5"), ("21", "6")] {
            let filtered = base.include_bookmark_tag(TagCategory::Relationship, id);
            site.serve(
                &site.bookmarks_url(&filtered),
                Listing::bookmarks(2)
                    .entry(work_blurb("1", "Seed", &["x"], &["F"], &[]))
                    .entry(work_blurb(work, "Other", &["x"], &["F"], &[]))
                    .render(),
            );
        }
        let archive = site.archive();
        let tags = directory(
            &archive,
            &[(TagCategory::Relationship, &ab), (TagCategory::Relationship, &cd)],
        )
        .await;
        let mut sink: Vec<Recommendation> = Vec::new();
        let mut run = Run::new(
            &archive,
            &tags,
            RecommendConfig::default(),
            SeenSet::seeded("1"),
            &mut sink,
        );
        run.begin(Strategy::AuthorBookmarks);

        let found = run
            .filter_bookmarks(
                &seed(&["A/B", "Unwrangled", "C/D"]),
                TagCategory::Relationship,
                &base,
                0,
            )
            .await
            .unwrap();

        assert_eq!(found, 2);
        drop(run);
        let ids: Vec<&str> = sink.iter().map(|r| r.work.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "6"]);
        assert!(sink.iter().all(|r| r.strategy == Strategy::AuthorBookmarks));
    }
}
