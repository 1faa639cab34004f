//! Core domain types: works, authors, tags and recommendations.

use std::cell::OnceCell;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// TagCategory
// ---------------------------------------------------------------------------

/// The tag categories a work's metadata block declares, in archive order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    Rating,
    ArchiveWarning,
    Category,
    Fandom,
    Relationship,
    Character,
    Freeform,
}

impl TagCategory {
    /// All categories in the order the archive lists them.
    pub const ALL: [TagCategory; 7] = [
        TagCategory::Rating,
        TagCategory::ArchiveWarning,
        TagCategory::Category,
        TagCategory::Fandom,
        TagCategory::Relationship,
        TagCategory::Character,
        TagCategory::Freeform,
    ];

    /// Name used in filter parameters and sidebar element IDs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::ArchiveWarning => "archive_warning",
            Self::Category => "category",
            Self::Fandom => "fandom",
            Self::Relationship => "relationship",
            Self::Character => "character",
            Self::Freeform => "freeform",
        }
    }

    /// Map the CSS class of a work's `<dd>` metadata entry to a category.
    ///
    /// The work page calls warnings `warning`; everywhere else they are
    /// `archive_warning`.
    pub fn from_meta_class(class: &str) -> Option<Self> {
        match class {
            "warning" => Some(Self::ArchiveWarning),
            other => Self::ALL.into_iter().find(|c| c.as_str() == other),
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TagSection
// ---------------------------------------------------------------------------

/// Values of one metadata category, resolved once when the work page is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSection {
    /// Every value links to a tag page; holds canonical tag names in page order.
    Linked(Vec<String>),
    /// Unlinked text, stored verbatim.
    PlainText(String),
}

/// A category together with its parsed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaSection {
    pub category: TagCategory,
    pub values: TagSection,
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

/// One entry of a work's byline.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorRef {
    /// Anonymous or orphaned: nothing about this author can be queried.
    Anonymous,
    Known(Author),
}

impl AuthorRef {
    /// The queryable author, if any.
    pub fn known(&self) -> Option<&Author> {
        match self {
            Self::Known(author) => Some(author),
            Self::Anonymous => None,
        }
    }
}

/// A byline entry that resolved to a real account.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    /// Display text of the byline link.
    pub byline: String,
    /// Absolute URL of the pseud's dashboard.
    pub profile_url: Url,
    pub pseud_id: String,
    pub user_id: String,
    /// Filled in the first time one of this author's listings is fetched.
    has_bookmarks: OnceCell<bool>,
}

impl Author {
    pub fn new(
        byline: impl Into<String>,
        profile_url: Url,
        pseud_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            byline: byline.into(),
            profile_url,
            pseud_id: pseud_id.into(),
            user_id: user_id.into(),
            has_bookmarks: OnceCell::new(),
        }
    }

    /// Whether the author has bookmarked at least one work, if known yet.
    pub fn has_bookmarks(&self) -> Option<bool> {
        self.has_bookmarks.get().copied()
    }

    /// Record the bookmark flag. Later calls keep the first value.
    pub fn record_has_bookmarks(&self, value: bool) -> bool {
        *self.has_bookmarks.get_or_init(|| value)
    }
}

// ---------------------------------------------------------------------------
// WorkDescriptor
// ---------------------------------------------------------------------------

/// Everything the strategies need to know about the seed work.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkDescriptor {
    /// Root work URL with the adult-content flag set.
    pub url: Url,
    /// Numeric work ID.
    pub id: String,
    pub title: String,
    pub authors: Vec<AuthorRef>,
    /// Metadata categories in page order.
    pub sections: Vec<MetaSection>,
}

impl WorkDescriptor {
    /// Linked tag names of a category, empty when absent or plain text.
    pub fn tags(&self, category: TagCategory) -> &[String] {
        self.sections
            .iter()
            .find(|s| s.category == category)
            .and_then(|s| match &s.values {
                TagSection::Linked(names) => Some(names.as_slice()),
                TagSection::PlainText(_) => None,
            })
            .unwrap_or(&[])
    }

    /// The unlinked text of a category, if it was rendered that way.
    pub fn plain_text(&self, category: TagCategory) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.category == category)
            .and_then(|s| match &s.values {
                TagSection::PlainText(text) => Some(text.as_str()),
                TagSection::Linked(_) => None,
            })
    }

    /// Linked sections in page order.
    pub fn linked_sections(&self) -> impl Iterator<Item = (TagCategory, &[String])> {
        self.sections.iter().filter_map(|s| match &s.values {
            TagSection::Linked(names) => Some((s.category, names.as_slice())),
            TagSection::PlainText(_) => None,
        })
    }

    /// Authors that can be queried further.
    pub fn known_authors(&self) -> impl Iterator<Item = &Author> {
        self.authors.iter().filter_map(AuthorRef::known)
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Lightweight view of a listed work, enough to present it to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    pub url: String,
    pub id: String,
    pub title: String,
    /// Byline names; `["Anonymous"]` when the listing shows none.
    pub authors: Vec<String>,
    pub fandoms: Vec<String>,
    /// Summary text, or `N/A` when the work has none.
    pub summary: String,
}

/// The heuristic that produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    SameAuthor,
    AuthorBookmarks,
    CoBookmarkers,
    TagSimilarity,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SameAuthor => "same_author",
            Self::AuthorBookmarks => "author_bookmarks",
            Self::CoBookmarkers => "co_bookmarkers",
            Self::TagSimilarity => "tag_similarity",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recommended work and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub strategy: Strategy,
    pub work: WorkSummary,
}

// ---------------------------------------------------------------------------
// SeenSet
// ---------------------------------------------------------------------------

/// Work IDs already recommended (or the seed itself) during one run.
///
/// Only grows: there is no way to remove an ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet(HashSet<String>);

impl SeenSet {
    /// A set holding only the seed work's ID.
    pub fn seeded(seed_id: impl Into<String>) -> Self {
        let mut set = Self::default();
        set.insert(seed_id);
        set
    }

    /// Returns `true` if the ID was not present before.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
