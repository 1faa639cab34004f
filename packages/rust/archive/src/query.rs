//! Immutable filter queries for archive listings.
//!
//! A [`Query`] is an ordered list of key/value pairs made of mandatory base
//! terms followed by optional filters. Each builder call returns a new value,
//! so a narrowed query never leaks its extra filters back to the caller's copy.

use ao3recs_shared::TagCategory;

/// Sort column used for every work listing the strategies read.
const SORT_BY_KUDOS: &str = "kudos_count";

/// Ordered listing filter: base terms first, then optional filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
    base_len: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mandatory term. Base terms always precede optional filters and
    /// are never dropped by [`Query::relaxed`].
    pub fn base(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.pairs.insert(next.base_len, (key.into(), value.into()));
        next.base_len += 1;
        next
    }

    /// Add an optional filter after everything already present.
    pub fn filter(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.pairs.push((key.into(), value.into()));
        next
    }

    /// Sort results by kudos, highest first.
    pub fn sorted_by_kudos(&self) -> Self {
        self.base("work_search[sort_column]", SORT_BY_KUDOS)
    }

    /// Restrict to one pseud of one user.
    pub fn for_pseud(&self, pseud_id: &str, user_id: &str) -> Self {
        self.base("pseud_id", pseud_id).base("user_id", user_id)
    }

    /// Restrict works to a tag given by name.
    pub fn tagged(&self, tag_name: &str) -> Self {
        self.base("tag_id", tag_name)
    }

    /// Restrict a user's works to one fandom.
    pub fn in_fandom(&self, fandom_id: &str) -> Self {
        self.filter("fandom_id", fandom_id)
    }

    /// Require a tag on listed works.
    pub fn include_work_tag(&self, category: TagCategory, filter_id: &str) -> Self {
        self.filter(format!("include_work_search[{category}_ids][]"), filter_id)
    }

    /// Require a tag on listed bookmarks.
    pub fn include_bookmark_tag(&self, category: TagCategory, filter_id: &str) -> Self {
        self.filter(format!("include_bookmark_search[{category}_ids][]"), filter_id)
    }

    /// Drop the most recently added optional filter.
    ///
    /// Returns `None` once only base terms remain.
    pub fn relaxed(&self) -> Option<Self> {
        if self.pairs.len() <= self.base_len {
            return None;
        }
        let mut next = self.clone();
        next.pairs.pop();
        Some(next)
    }

    /// Total number of terms, base and optional.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of optional filters.
    pub fn filter_count(&self) -> usize {
        self.pairs.len() - self.base_len
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
