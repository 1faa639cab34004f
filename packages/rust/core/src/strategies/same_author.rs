//! Other works by the seed's authors in the seed's fandoms.

use tracing::{debug, instrument};

use ao3recs_archive::page::{dashboard_bookmark_count, listing_total};
use ao3recs_archive::{PageFetcher, Query};
use ao3recs_shared::{Author, Result, Strategy, TagCategory, WorkDescriptor};

use super::Run;
use crate::sink::RecommendationSink;
use crate::walker::ListingKind;

/// For each known author and each seed fandom, recommend one of the author's
/// works, preferring ones that share a relationship with the seed.
///
/// Also records on each author whether they have bookmarked anything, which
/// the author-bookmarks strategy relies on.
#[instrument(skip_all, fields(work = %work.id))]
pub async fn run<F: PageFetcher, S: RecommendationSink>(
    run: &mut Run<'_, F, S>,
    work: &WorkDescriptor,
) -> Result<usize> {
    run.begin(Strategy::SameAuthor);
    let mut found = 0;

    for author in work.known_authors() {
        let base = Query::new()
            .sorted_by_kudos()
            .for_pseud(&author.pseud_id, &author.user_id);

        for fandom in work.tags(TagCategory::Fandom) {
            let Some(fandom_id) = run.filter_id(TagCategory::Fandom, fandom) else {
                continue;
            };
            found += in_fandom(run, work, author, &base.in_fandom(fandom_id)).await?;
        }
    }

    Ok(found)
}

async fn in_fandom<F: PageFetcher, S: RecommendationSink>(
    run: &mut Run<'_, F, S>,
    work: &WorkDescriptor,
    author: &Author,
    query: &Query,
) -> Result<usize> {
    let archive = run.archive;
    let page = archive.page(&archive.works_url(query)).await?;

    if author.has_bookmarks().is_none() {
        let count = dashboard_bookmark_count(&page, &author.user_id, &author.pseud_id).unwrap_or(0);
        author.record_has_bookmarks(count > 0);
        debug!(user = %author.user_id, bookmarks = count, "author bookmark count");
    }

    let total = listing_total(&page)?;
    if total <= 1 {
        debug!(user = %author.user_id, total, "no other works in fandom");
        return Ok(0);
    }

    let mut found = 0;
    for ship in work.tags(TagCategory::Relationship) {
        let Some(ship_id) = run.filter_id(TagCategory::Relationship, ship) else {
            continue;
        };
        let ship_query = query.include_work_tag(TagCategory::Relationship, ship_id);
        let ship_page = archive.page(&archive.works_url(&ship_query)).await?;

        if listing_total(&ship_page)? > 1
            && run.recommend_from(&ship_page, ListingKind::Works).await?
        {
            found += 1;
        }
    }

    if found == 0 && run.recommend_from(&page, ListingKind::Works).await? {
        found += 1;
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Listing, Site, directory, work_blurb};
    use ao3recs_shared::{
        AuthorRef, MetaSection, RecommendConfig, Recommendation, SeenSet, TagSection,
    };
    use url::Url;

    fn seed(fandoms: &[&str], ships: &[&str]) -> WorkDescriptor {
        let linked =
            |names: &[&str]| TagSection::Linked(names.iter().map(|s| s.to_string()).collect());
        WorkDescriptor {
            url: Url::parse("https://archive.test/works/1?view_adult=true").unwrap(),
            id: "1".into(),
            title: "Seed".into(),
            authors: vec![
                AuthorRef::Known(Author::new(
                    "ally",
                    Url::parse("https://archive.test/users/alice/pseuds/ally").unwrap(),
                    "ally",
                    "alice",
                )),
                AuthorRef::Anonymous,
            ],
            sections: vec![
                MetaSection {
                    category: TagCategory::Fandom,
                    values: linked(fandoms),
                },
                MetaSection {
                    category: TagCategory::Relationship,
                    values: linked(ships),
                },
            ],
        }
    }

    fn fandom_query() -> Query {
        Query::new()
            .sorted_by_kudos()
            .for_pseud("ally", "alice")
            .in_fandom("100")
    }

    #[tokio::test]
    async fn prefers_shared_relationship() {
        let mut site = Site::new();
        let fandom = site.tag(TagCategory::Fandom, "F", "100");
        let ship = site.tag(TagCategory::Relationship, "A/B", "200");
        site.serve(
            &site.works_url(&fandom_query()),
            Listing::works(3)
                .dashboard("alice", "ally", 4)
                .entry(work_blurb("1", "Seed", &["alice"], &["F"], &[]))
                .entry(work_blurb("2", "Fandom Pick", &["alice"], &["F"], &[]))
                .render(),
        );
        site.serve(
            &site.works_url(&fandom_query().include_work_tag(TagCategory::Relationship, "200")),
            Listing::works(2)
                .entry(work_blurb("1", "Seed", &["alice"], &["F"], &[]))
                .entry(work_blurb("3", "Ship Pick", &["alice"], &["F"], &[]))
                .render(),
        );
        let archive = site.archive();
        let tags = directory(
            &archive,
            &[(TagCategory::Fandom, &fandom), (TagCategory::Relationship, &ship)],
        )
        .await;
        let work = seed(&["F"], &["A/B"]);
        let mut sink: Vec<Recommendation> = Vec::new();
        let mut state = Run::new(
            &archive,
            &tags,
            RecommendConfig::default(),
            SeenSet::seeded("1"),
            &mut sink,
        );

        let found = run(&mut state, &work).await.unwrap();

        assert_eq!(found, 1);
        drop(state);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].work.id, "3");
        assert_eq!(sink[0].strategy, Strategy::SameAuthor);
        assert_eq!(work.authors[0].known().unwrap().has_bookmarks(), Some(true));
    }

    #[tokio::test]
    async fn falls_back_to_fandom_listing() {
        let mut site = Site::new();
        let fandom = site.tag(TagCategory::Fandom, "F", "100");
        let ship = site.tag(TagCategory::Relationship, "A/B", "200");
        site.serve(
            &site.works_url(&fandom_query()),
            Listing::works(2)
                .entry(work_blurb("1", "Seed", &["alice"], &["F"], &[]))
                .entry(work_blurb("2", "Fandom Pick", &["alice"], &["F"], &[]))
                .render(),
        );
        site.serve(
            &site.works_url(&fandom_query().include_work_tag(TagCategory::Relationship, "200")),
            Listing::works(1)
                .entry(work_blurb("1", "Seed", &["alice"], &["F"], &[]))
                .render(),
        );
        let archive = site.archive();
        let tags = directory(
            &archive,
            &[(TagCategory::Fandom, &fandom), (TagCategory::Relationship, &ship)],
        )
        .await;
        let work = seed(&["F"], &["A/B"]);
        let mut sink: Vec<Recommendation> = Vec::new();
        let mut state = Run::new(
            &archive,
            &tags,
            RecommendConfig::default(),
            SeenSet::seeded("1"),
            &mut sink,
        );

        let found = run(&mut state, &work).await.unwrap();

        assert_eq!(found, 1);
        drop(state);
        assert_eq!(sink[0].work.id, "2");
        // No dashboard on the page: treated as no bookmarks.
        assert_eq!(work.authors[0].known().unwrap().has_bookmarks(), Some(false));
    }

    #[tokio::test]
    async fn single_work_in_fandom_yields_nothing() {
        let mut site = Site::new();
        let fandom = site.tag(TagCategory::Fandom, "F", "100");
        site.serve(
            &site.works_url(&fandom_query()),
            Listing::works(1)
                .dashboard("alice", "ally", 0)
                .entry(work_blurb("1", "Seed", &["alice"], &["F"], &[]))
                .render(),
        );
        let archive = site.archive();
        let tags = directory(&archive, &[(TagCategory::Fandom, &fandom)]).await;
        let work = seed(&["F"], &[]);
        let mut sink: Vec<Recommendation> = Vec::new();
        let mut state = Run::new(
            &archive,
            &tags,
            RecommendConfig::default(),
            SeenSet::seeded("1"),
            &mut sink,
        );

        assert_eq!(run(&mut state, &work).await.unwrap(), 0);
        assert_eq!(state.seen().len(), 1);
        drop(state);
        assert!(sink.is_empty());
        assert_eq!(work.authors[0].known().unwrap().has_bookmarks(), Some(false));
    }
}
