//! Tag name and filter ID lookup, memoized for the life of the directory.

use std::collections::HashMap;

use tracing::{debug, instrument};
use url::Url;

use ao3recs_shared::{RecsError, Result, TagCategory};

use crate::fetcher::PageFetcher;
use crate::page::{MAIN_HEADING, MAIN_HEADING_LINK, element_text, listing_total, sidebar_filter_id};
use crate::site::Archive;

/// What the archive knows about one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Canonical tag name.
    pub name: String,
    /// Internal ID used by listing filters, when the sidebar exposes one.
    pub filter_id: Option<String>,
    /// Works carrying the tag; `None` when the tag cannot be filtered on.
    pub work_count: Option<u64>,
}

/// Resolves tag pages to canonical names and filter IDs.
///
/// One directory is created per recommender and shared by every component
/// that needs tag resolution.
#[derive(Debug, Default)]
pub struct TagDirectory {
    by_url: HashMap<String, TagEntry>,
    filter_ids: HashMap<TagCategory, HashMap<String, String>>,
}

impl TagDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the tag page at `url`, fetching it only on first use.
    ///
    /// A heading that links to the tag marks a filterable tag; its filter ID is
    /// read from the listing sidebar and registered under `category`.
    #[instrument(skip_all, fields(url = %url, category = %category))]
    pub async fn resolve<F: PageFetcher>(
        &mut self,
        archive: &Archive<F>,
        url: &Url,
        category: TagCategory,
    ) -> Result<TagEntry> {
        if let Some(entry) = self.by_url.get(url.as_str()) {
            debug!(name = %entry.name, "tag resolved from cache");
            return Ok(entry.clone());
        }

        let doc = archive.page(url).await?;

        let entry = match doc.select(&MAIN_HEADING_LINK).next() {
            Some(link) => {
                let name = element_text(link);
                let work_count = listing_total(&doc)?;
                let filter_id = sidebar_filter_id(&doc, category, &name)?;
                TagEntry {
                    name,
                    filter_id,
                    work_count: Some(work_count),
                }
            }
            None => {
                let heading = doc
                    .select(&MAIN_HEADING)
                    .next()
                    .ok_or_else(|| RecsError::parse(format!("tag page {url} has no heading")))?;
                TagEntry {
                    name: element_text(heading),
                    filter_id: None,
                    work_count: None,
                }
            }
        };

        if let Some(id) = &entry.filter_id {
            self.filter_ids
                .entry(category)
                .or_default()
                .insert(entry.name.clone(), id.clone());
        }

        debug!(
            name = %entry.name,
            filter_id = ?entry.filter_id,
            work_count = ?entry.work_count,
            "tag resolved"
        );
        self.by_url.insert(url.as_str().to_string(), entry.clone());

        Ok(entry)
    }

    /// Filter ID registered for a tag.
    pub fn filter_id(&self, category: TagCategory, name: &str) -> Result<&str> {
        self.filter_ids
            .get(&category)
            .and_then(|ids| ids.get(name))
            .map(String::as_str)
            .ok_or_else(|| RecsError::NotFilterableTag {
                category,
                name: name.to_string(),
            })
    }

    /// Number of tag pages resolved so far.
    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}
