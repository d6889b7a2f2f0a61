//! URL shortening service and owner of the deletion worker.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::deletion_worker::{DeletionBatchConfig, run_deletion_worker};
use crate::domain::entities::{ShortenedUrl, UrlToDelete, UrlToShorten};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Service for creating, resolving, listing and deleting short links.
///
/// Construction spawns exactly one deletion worker; [`Self::shutdown`] stops it
/// after a final flush. Reads and inserts go straight to the repository, while
/// deletions are queued and applied asynchronously in batches.
pub struct ShortenerService {
    repository: Arc<dyn UrlRepository>,
    base_url: Url,
    deletion_tx: RwLock<Option<mpsc::Sender<UrlToDelete>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ShortenerService {
    /// Creates the service and starts its deletion worker.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] if `base_url` is not an absolute URL
    /// that relative paths can be resolved against.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        base_url: &str,
        deletion: DeletionBatchConfig,
    ) -> Result<Self, AppError> {
        let base_url = parse_base_url(base_url)?;

        let (deletion_tx, deletion_rx) = mpsc::channel(deletion.queue_capacity.max(1));
        let worker = tokio::spawn(run_deletion_worker(
            deletion_rx,
            repository.clone(),
            deletion,
        ));

        Ok(Self {
            repository,
            base_url,
            deletion_tx: RwLock::new(Some(deletion_tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Stores a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the URL is already shortened. The
    /// existing record is not returned here; callers that want it use
    /// [`Self::lookup_by_original_url`].
    pub async fn shorten_url(&self, request: UrlToShorten) -> Result<ShortenedUrl, AppError> {
        match self.repository.create(request).await {
            Ok(url) => {
                debug!(id = url.id, owner_id = url.owner_id, "Shortened URL");
                Ok(url)
            }
            Err(e) => {
                if matches!(e, AppError::Conflict { .. }) {
                    debug!(error = %e, "URL already shortened");
                }
                Err(e)
            }
        }
    }

    /// Retrieves a record by id. Deleted records are returned as well.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this id.
    pub async fn get_by_id(&self, id: i64) -> Result<ShortenedUrl, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "id": id })))
    }

    /// Retrieves the record of an original URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the URL was never shortened.
    pub async fn lookup_by_original_url(&self, original_url: &Url) -> Result<ShortenedUrl, AppError> {
        self.repository
            .find_by_original_url(original_url.as_str())
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Original URL not found",
                    json!({ "original_url": original_url.as_str() }),
                )
            })
    }

    /// Lists the non-deleted records of an owner.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ShortenedUrl>, AppError> {
        self.repository.list_by_owner(owner_id).await
    }

    /// Queues a deletion request and returns without waiting for it to apply.
    ///
    /// Waits only when the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] once the service has been shut down.
    pub async fn schedule_deletion(&self, request: UrlToDelete) -> Result<(), AppError> {
        let sender = self.deletion_tx.read().await.clone().ok_or_else(queue_closed)?;

        sender.send(request).await.map_err(|_| queue_closed())
    }

    /// Queues deletion of `ids` on behalf of `owner_id`, preserving their order.
    ///
    /// Returns the number of queued requests.
    pub async fn schedule_deletions(&self, owner_id: i64, ids: &[i64]) -> Result<usize, AppError> {
        let sender = self.deletion_tx.read().await.clone().ok_or_else(queue_closed)?;

        for &id in ids {
            sender
                .send(UrlToDelete::new(id, owner_id))
                .await
                .map_err(|_| queue_closed())?;
        }

        debug!(owner_id, count = ids.len(), "Scheduled URLs for deletion");
        Ok(ids.len())
    }

    /// Builds the public short URL of a record by resolving its id against the
    /// base URL.
    pub fn resolve_absolute_url(&self, url: &ShortenedUrl) -> Result<Url, AppError> {
        self.base_url.join(&url.id.to_string()).map_err(|e| {
            AppError::configuration(
                "Cannot build absolute short URL",
                json!({ "id": url.id, "reason": e.to_string() }),
            )
        })
    }

    /// Checks that the repository is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Closes the deletion queue and waits for the worker's final flush.
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) {
        if self.deletion_tx.write().await.take().is_none() {
            return;
        }

        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };

        match worker.await {
            Ok(()) => info!("Deletion queue drained"),
            Err(e) => warn!(error = %e, "Deletion worker terminated abnormally"),
        }
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, AppError> {
    let parsed = Url::parse(base_url).map_err(|e| {
        AppError::configuration(
            "Invalid base URL",
            json!({ "base_url": base_url, "reason": e.to_string() }),
        )
    })?;

    if parsed.cannot_be_a_base() {
        return Err(AppError::configuration(
            "Base URL cannot have relative paths resolved against it",
            json!({ "base_url": base_url }),
        ));
    }

    Ok(parsed)
}

fn queue_closed() -> AppError {
    AppError::unavailable("Deletion queue is closed", json!({}))
}
