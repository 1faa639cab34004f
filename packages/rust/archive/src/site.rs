//! The archive's URL scheme bound to a page fetcher.

use scraper::Html;
use tracing::debug;
use url::Url;

use ao3recs_shared::{ArchiveConfig, RecsError, Result};

use crate::fetcher::PageFetcher;
use crate::page::work_id_from_path;
use crate::query::Query;

/// Pair sent with every filtered listing request, as the archive's own form does.
const COMMIT_PAIR: (&str, &str) = ("commit", "Sort and Filter");

/// Query parameter that skips the adult-content interstitial.
const VIEW_ADULT_PARAM: &str = "view_adult";

/// A fetcher bound to one archive site.
#[derive(Debug, Clone)]
pub struct Archive<F> {
    fetcher: F,
    base_url: Url,
    view_adult: bool,
}

impl<F: PageFetcher> Archive<F> {
    pub fn new(fetcher: F, base_url: Url) -> Self {
        Self {
            fetcher,
            base_url,
            view_adult: true,
        }
    }

    /// Build from runtime configuration.
    pub fn from_config(fetcher: F, config: &ArchiveConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.clone(),
            view_adult: config.view_adult,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch and parse a page.
    pub async fn page(&self, url: &Url) -> Result<Html> {
        let body = self.fetcher.fetch(url).await?;
        debug!(%url, bytes = body.len(), "page fetched");
        Ok(Html::parse_document(&body))
    }

    /// Resolve a link found on an archive page.
    pub fn join(&self, href: &str) -> Result<Url> {
        self.base_url
            .join(href)
            .map_err(|e| RecsError::parse(format!("bad link '{href}': {e}")))
    }

    /// Filtered work listing, e.g. an author's works in one fandom.
    pub fn works_url(&self, query: &Query) -> Url {
        self.listing_url("/works", query)
    }

    /// Filtered bookmark listing.
    pub fn bookmarks_url(&self, query: &Query) -> Url {
        self.listing_url("/bookmarks", query)
    }

    fn listing_url(&self, path: &str, query: &Query) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.query_pairs_mut()
            .clear()
            .append_pair(COMMIT_PAIR.0, COMMIT_PAIR.1)
            .extend_pairs(query.pairs());
        url
    }

    /// Canonical link to a work, as shown to the reader.
    pub fn work_url(&self, work_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/works/{work_id}"));
        url.set_query(None);
        url
    }

    /// Users who bookmarked a work.
    pub fn work_bookmarks_url(&self, work_id: &str) -> Url {
        let mut url = self.work_url(work_id);
        url.set_path(&format!("/works/{work_id}/bookmarks"));
        url
    }

    /// A pseud's own bookmark listing, from their dashboard URL.
    pub fn profile_bookmarks_url(&self, profile_url: &Url) -> Url {
        let mut url = profile_url.clone();
        let path = format!("{}/bookmarks", profile_url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_query(None);
        url
    }

    /// Normalize a user-supplied work link to the work's root page.
    ///
    /// Drops chapter segments, query and fragment, and sets the adult-content
    /// flag when configured. Returns the URL and the numeric work ID.
    pub fn work_root(&self, raw: &str) -> Result<(Url, String)> {
        let parsed = self
            .base_url
            .join(raw.trim())
            .map_err(|e| RecsError::validation(format!("invalid work URL '{raw}': {e}")))?;

        let id = work_id_from_path(parsed.path()).ok_or_else(|| {
            RecsError::validation(format!("'{raw}' does not link to a work"))
        })?;

        let mut url = parsed;
        url.set_path(&format!("/works/{id}"));
        url.set_query(None);
        url.set_fragment(None);
        if self.view_adult {
            url.query_pairs_mut().append_pair(VIEW_ADULT_PARAM, "true");
        }

        Ok((url, id))
    }
}
