//! Runs every strategy, in order, for one seed work.

use std::collections::BTreeMap;

use tracing::{info, instrument};

use ao3recs_archive::{Archive, PageFetcher, TagDirectory};
use ao3recs_shared::{RecommendConfig, Result, SeenSet, Strategy};

use crate::extract::extract_work;
use crate::sink::RecommendationSink;
use crate::strategies::{self, Run};

/// Outcome of one run, for reporting. The recommendations themselves go to
/// the sink as they are found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub seed_id: String,
    pub seed_title: String,
    pub counts: BTreeMap<Strategy, usize>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Owns the archive client and the tag directory for the life of the process.
pub struct Recommender<F> {
    archive: Archive<F>,
    tags: TagDirectory,
    config: RecommendConfig,
}

impl<F: PageFetcher> Recommender<F> {
    pub fn new(archive: Archive<F>, config: RecommendConfig) -> Self {
        Self {
            archive,
            tags: TagDirectory::new(),
            config,
        }
    }

    pub fn archive(&self) -> &Archive<F> {
        &self.archive
    }

    pub fn tags(&self) -> &TagDirectory {
        &self.tags
    }

    /// Recommend works similar to the one at `seed_url`.
    ///
    /// Strategies run as same-author, author-bookmarks, co-bookmarkers, then
    /// tag-similarity, sharing one seen-set seeded with the seed's own ID. The
    /// first error aborts the run; recommendations already emitted stay emitted.
    #[instrument(skip_all, fields(seed = %seed_url))]
    pub async fn recommend<S: RecommendationSink>(
        &mut self,
        seed_url: &str,
        sink: &mut S,
    ) -> Result<RunReport> {
        let work = extract_work(&self.archive, &mut self.tags, seed_url).await?;
        info!(id = %work.id, title = %work.title, "seed work described");

        let mut report = RunReport {
            seed_id: work.id.clone(),
            seed_title: work.title.clone(),
            counts: BTreeMap::new(),
        };
        let mut run = Run::new(
            &self.archive,
            &self.tags,
            self.config,
            SeenSet::seeded(work.id.as_str()),
            sink,
        );

        let found = strategies::same_author::run(&mut run, &work).await?;
        report.counts.insert(Strategy::SameAuthor, found);
        let found = strategies::author_bookmarks::run(&mut run, &work).await?;
        report.counts.insert(Strategy::AuthorBookmarks, found);
        let found = strategies::co_bookmarkers::run(&mut run, &work).await?;
        report.counts.insert(Strategy::CoBookmarkers, found);
        let found = strategies::tag_similarity::run(&mut run, &work).await?;
        report.counts.insert(Strategy::TagSimilarity, found);

        info!(
            total = report.total(),
            seen = run.seen().len(),
            tags = self.tags.len(),
            "run complete"
        );
        Ok(report)
    }
}
