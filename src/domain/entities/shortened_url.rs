//! Shortened URL entity and the transient requests that create or delete it.

use chrono::{DateTime, Utc};
use url::Url;

/// A stored short link.
///
/// Records are never physically removed. Deletion flips `deleted` to `true`
/// so the identifier stays stable and cannot be reissued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedUrl {
    pub id: i64,
    pub owner_id: i64,
    pub original_url: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl ShortenedUrl {
    /// Creates a new ShortenedUrl instance.
    pub fn new(
        id: i64,
        owner_id: i64,
        original_url: String,
        deleted: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            original_url,
            deleted,
            created_at,
        }
    }

    /// Returns true if the record belongs to `owner_id`.
    pub fn is_owned_by(&self, owner_id: i64) -> bool {
        self.owner_id == owner_id
    }
}

/// Input for creating a short link.
///
/// Holds an already parsed [`Url`], so anything reaching the store is an
/// absolute URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlToShorten {
    pub original_url: Url,
    pub owner_id: i64,
}

impl UrlToShorten {
    pub fn new(original_url: Url, owner_id: i64) -> Self {
        Self {
            original_url,
            owner_id,
        }
    }
}

/// A deletion request for one record.
///
/// The `(id, owner_id)` pair is matched as a whole: a request whose owner
/// differs from the record's owner has no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UrlToDelete {
    pub id: i64,
    pub owner_id: i64,
}

impl UrlToDelete {
    pub fn new(id: i64, owner_id: i64) -> Self {
        Self { id, owner_id }
    }
}
