//! Repository traits for short link storage.

use crate::domain::entities::{ShortenedUrl, UrlToDelete, UrlToShorten};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage contract for shortened URLs.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - Process-local store
/// - Test mocks available with `cfg(test)`
///
/// Implementations own their concurrency control. In particular two concurrent
/// [`create`](UrlRepository::create) calls for the same URL must result in one
/// record and one [`AppError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Stores a new short link and assigns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the original URL is already shortened.
    /// Returns [`AppError::Unavailable`] if the backend cannot be reached.
    async fn create(&self, new_url: UrlToShorten) -> Result<ShortenedUrl, AppError>;

    /// Finds a record by id, including soft-deleted ones.
    async fn find_by_id(&self, id: i64) -> Result<Option<ShortenedUrl>, AppError>;

    /// Finds a record by its original URL.
    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError>;

    /// Lists the records of an owner, ordered by id. Deleted records are excluded.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ShortenedUrl>, AppError>;

    /// Marks every record of the batch deleted when both id and owner match.
    ///
    /// Items are processed independently: a mismatched owner is skipped silently,
    /// and a failure on one item is logged without aborting the others.
    ///
    /// Returns the number of records that were newly marked deleted. The count
    /// is informational only.
    async fn delete_batch(&self, batch: Vec<UrlToDelete>) -> u64;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Whole-store transfer used by snapshots and the admin tool.
#[async_trait]
pub trait BulkUrlRepository: UrlRepository {
    /// Returns every record, deleted ones included, ordered by id.
    async fn export_all(&self) -> Result<Vec<ShortenedUrl>, AppError>;

    /// Loads records keeping their ids and deleted flags.
    ///
    /// Existing records with the same id are replaced. Ids generated after the
    /// import continue above the highest imported id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if an imported URL is already stored
    /// under another id.
    async fn import_all(&self, urls: Vec<ShortenedUrl>) -> Result<usize, AppError>;
}
