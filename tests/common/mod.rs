#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use url_shortener::application::services::ShortenerService;
use url_shortener::domain::deletion_worker::DeletionBatchConfig;
use url_shortener::domain::entities::{ShortenedUrl, UrlToShorten};
use url_shortener::domain::repositories::{BulkUrlRepository, UrlRepository};
use url_shortener::infrastructure::persistence::InMemoryUrlRepository;
use url_shortener::routes::app_router;
use url_shortener::state::AppState;

pub const BASE_URL: &str = "http://localhost:8080/";

/// Batching settings that flush quickly enough for tests to poll.
pub fn fast_deletion_config() -> DeletionBatchConfig {
    DeletionBatchConfig {
        batch_capacity: 100,
        flush_interval: Duration::from_millis(20),
        queue_capacity: 1000,
    }
}

pub fn create_test_service(repository: Arc<InMemoryUrlRepository>) -> Arc<ShortenerService> {
    Arc::new(ShortenerService::new(repository, BASE_URL, fast_deletion_config()).unwrap())
}

pub fn create_test_state() -> (AppState, Arc<InMemoryUrlRepository>) {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let state = AppState::new(create_test_service(repository.clone()));
    (state, repository)
}

pub fn create_test_server() -> (TestServer, AppState, Arc<InMemoryUrlRepository>) {
    let (state, repository) = create_test_state();
    let server = TestServer::new(app_router(state.clone())).unwrap();
    (server, state, repository)
}

pub fn owner_header(owner_id: i64) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_str(&owner_id.to_string()).unwrap(),
    )
}

pub async fn create_test_url(repository: &InMemoryUrlRepository, url: &str, owner_id: i64) -> i64 {
    repository
        .create(UrlToShorten::new(Url::parse(url).unwrap(), owner_id))
        .await
        .unwrap()
        .id
}

pub async fn create_deleted_url(
    repository: &InMemoryUrlRepository,
    id: i64,
    url: &str,
    owner_id: i64,
) {
    repository
        .import_all(vec![ShortenedUrl::new(
            id,
            owner_id,
            url.to_string(),
            true,
            Utc::now(),
        )])
        .await
        .unwrap();
}

/// Polls until `id` is marked deleted or the timeout passes.
pub async fn wait_until_deleted(repository: &InMemoryUrlRepository, id: i64) -> bool {
    for _ in 0..100 {
        if let Some(url) = repository.find_by_id(id).await.unwrap()
            && url.deleted
        {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
