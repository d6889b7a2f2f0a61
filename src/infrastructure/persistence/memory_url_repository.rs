//! In-process implementation of the URL repository.
//!
//! Content lives only as long as the process. Pair it with
//! [`crate::infrastructure::snapshot::FileSnapshot`] to keep records across restarts.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{ShortenedUrl, UrlToDelete, UrlToShorten};
use crate::domain::repositories::{BulkUrlRepository, UrlRepository};
use crate::error::AppError;

#[derive(Debug, Clone)]
struct MemoryState {
    next_id: i64,
    urls: BTreeMap<i64, ShortenedUrl>,
    ids_by_original_url: HashMap<String, i64>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            next_id: 1,
            urls: BTreeMap::new(),
            ids_by_original_url: HashMap::new(),
        }
    }
}

/// Repository keeping every record in memory behind a single lock.
///
/// Writes take the lock exclusively, which makes the uniqueness check and the
/// insert of [`UrlRepository::create`] atomic.
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, deleted ones included.
    pub async fn len(&self) -> usize {
        self.state.read().await.urls.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.urls.is_empty()
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn create(&self, new_url: UrlToShorten) -> Result<ShortenedUrl, AppError> {
        let original_url = new_url.original_url.to_string();
        let mut state = self.state.write().await;

        if let Some(existing_id) = state.ids_by_original_url.get(&original_url) {
            return Err(AppError::conflict(
                "URL is already shortened",
                json!({ "original_url": original_url, "id": existing_id }),
            ));
        }

        let id = state.next_id;
        state.next_id += 1;

        let url = ShortenedUrl::new(id, new_url.owner_id, original_url, false, Utc::now());
        state.ids_by_original_url.insert(url.original_url.clone(), id);
        state.urls.insert(id, url.clone());

        Ok(url)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortenedUrl>, AppError> {
        Ok(self.state.read().await.urls.get(&id).cloned())
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError> {
        let state = self.state.read().await;

        Ok(state
            .ids_by_original_url
            .get(original_url)
            .and_then(|id| state.urls.get(id))
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ShortenedUrl>, AppError> {
        let state = self.state.read().await;

        Ok(state
            .urls
            .values()
            .filter(|u| u.owner_id == owner_id && !u.deleted)
            .cloned()
            .collect())
    }

    async fn delete_batch(&self, batch: Vec<UrlToDelete>) -> u64 {
        let mut state = self.state.write().await;
        let mut deleted = 0;

        for request in batch {
            match state.urls.get_mut(&request.id) {
                Some(url) if url.is_owned_by(request.owner_id) && !url.deleted => {
                    url.deleted = true;
                    deleted += 1;
                }
                _ => {}
            }
        }

        deleted
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl BulkUrlRepository for InMemoryUrlRepository {
    async fn export_all(&self) -> Result<Vec<ShortenedUrl>, AppError> {
        Ok(self.state.read().await.urls.values().cloned().collect())
    }

    /// Imports all records or none: a conflict leaves the store untouched.
    async fn import_all(&self, urls: Vec<ShortenedUrl>) -> Result<usize, AppError> {
        let mut guard = self.state.write().await;
        let mut staged = guard.clone();
        let state = &mut staged;
        let count = urls.len();

        for url in urls {
            if let Some(&other_id) = state.ids_by_original_url.get(&url.original_url)
                && other_id != url.id
            {
                return Err(AppError::conflict(
                    "Imported URL is already stored under another id",
                    json!({ "original_url": url.original_url, "id": url.id, "existing_id": other_id }),
                ));
            }

            if let Some(replaced) = state.urls.get(&url.id) {
                state.ids_by_original_url.remove(&replaced.original_url);
            }

            state.next_id = state.next_id.max(url.id + 1);
            state.ids_by_original_url.insert(url.original_url.clone(), url.id);
            state.urls.insert(url.id, url);
        }

        *guard = staged;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn to_shorten(url: &str, owner_id: i64) -> UrlToShorten {
        UrlToShorten::new(Url::parse(url).unwrap(), owner_id)
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = InMemoryUrlRepository::new();

        let first = repo.create(to_shorten("https://a.example/", 1)).await.unwrap();
        let second = repo.create(to_shorten("https://b.example/", 1)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_creates_of_same_url_yield_one_record() {
        let repo = std::sync::Arc::new(InMemoryUrlRepository::new());

        let mut handles = Vec::new();
        for owner in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(to_shorten("https://race.example/", owner)).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::Conflict { .. }) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_batch_counts_only_newly_deleted() {
        let repo = InMemoryUrlRepository::new();
        let url = repo.create(to_shorten("https://a.example/", 1)).await.unwrap();

        let batch = vec![UrlToDelete::new(url.id, 1), UrlToDelete::new(url.id, 1)];
        assert_eq!(repo.delete_batch(batch).await, 1);
        assert_eq!(repo.delete_batch(vec![UrlToDelete::new(url.id, 1)]).await, 0);
    }

    #[tokio::test]
    async fn test_import_replaces_record_with_same_id() {
        let repo = InMemoryUrlRepository::new();
        repo.create(to_shorten("https://old.example/", 1)).await.unwrap();

        let replacement = ShortenedUrl::new(1, 2, "https://new.example/".into(), true, Utc::now());
        repo.import_all(vec![replacement.clone()]).await.unwrap();

        assert_eq!(repo.find_by_id(1).await.unwrap(), Some(replacement));
        assert!(
            repo.find_by_original_url("https://old.example/")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_import_rejects_url_stored_under_other_id() {
        let repo = InMemoryUrlRepository::new();
        repo.create(to_shorten("https://dup.example/", 1)).await.unwrap();

        let clashing = ShortenedUrl::new(5, 1, "https://dup.example/".into(), false, Utc::now());
        let result = repo.import_all(vec![clashing]).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_failed_import_leaves_store_unchanged() {
        let repo = InMemoryUrlRepository::new();
        repo.create(to_shorten("https://dup.example/", 1)).await.unwrap();

        let batch = vec![
            ShortenedUrl::new(40, 1, "https://fresh.example/".into(), false, Utc::now()),
            ShortenedUrl::new(50, 1, "https://dup.example/".into(), false, Utc::now()),
        ];
        let result = repo.import_all(batch).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
        assert_eq!(repo.len().await, 1);
        assert!(repo.find_by_id(40).await.unwrap().is_none());
        assert!(
            repo.find_by_original_url("https://fresh.example/")
                .await
                .unwrap()
                .is_none()
        );

        let next = repo.create(to_shorten("https://next.example/", 1)).await.unwrap();
        assert_eq!(next.id, 2);
    }
}
