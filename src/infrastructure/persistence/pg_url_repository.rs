//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::{ShortenedUrl, UrlToDelete, UrlToShorten};
use crate::domain::repositories::{BulkUrlRepository, UrlRepository};
use crate::error::AppError;

const SELECT_COLUMNS: &str = "SELECT id, owner_id, original_url, deleted, created_at FROM urls";

#[derive(Debug, sqlx::FromRow)]
struct UrlRow {
    id: i64,
    owner_id: i64,
    original_url: String,
    deleted: bool,
    created_at: DateTime<Utc>,
}

impl From<UrlRow> for ShortenedUrl {
    fn from(row: UrlRow) -> Self {
        ShortenedUrl::new(
            row.id,
            row.owner_id,
            row.original_url,
            row.deleted,
            row.created_at,
        )
    }
}

/// Runs `delete_one` for every request in order and sums the affected rows.
///
/// A failing request is logged and skipped; the rest of the batch still runs.
async fn delete_each<F, Fut>(batch: Vec<UrlToDelete>, mut delete_one: F) -> u64
where
    F: FnMut(UrlToDelete) -> Fut,
    Fut: Future<Output = Result<u64, sqlx::Error>>,
{
    let mut deleted = 0;

    for request in batch {
        match delete_one(request).await {
            Ok(affected) => deleted += affected,
            Err(e) => warn!(
                error = %e,
                id = request.id,
                owner_id = request.owner_id,
                "Failed to delete URL, skipping"
            ),
        }
    }

    deleted
}

/// PostgreSQL repository for short links.
///
/// Uniqueness of `original_url` is enforced by the `urls_original_url_key`
/// constraint, so concurrent inserts of one URL produce a single row.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Total number of rows, deleted ones included.
    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn create(&self, new_url: UrlToShorten) -> Result<ShortenedUrl, AppError> {
        let result = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (original_url, owner_id)
            VALUES ($1, $2)
            RETURNING id, owner_id, original_url, deleted, created_at
            "#,
        )
        .bind(new_url.original_url.as_str())
        .bind(new_url.owner_id)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e) => match AppError::from(e) {
                AppError::Conflict { .. } => Err(AppError::conflict(
                    "URL is already shortened",
                    json!({ "original_url": new_url.original_url.as_str() }),
                )),
                other => Err(other),
            },
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortenedUrl>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError> {
        let row =
            sqlx::query_as::<_, UrlRow>(&format!("{SELECT_COLUMNS} WHERE original_url = $1"))
                .bind(original_url)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ShortenedUrl>, AppError> {
        let rows = sqlx::query_as::<_, UrlRow>(&format!(
            "{SELECT_COLUMNS} WHERE owner_id = $1 AND deleted = FALSE ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_batch(&self, batch: Vec<UrlToDelete>) -> u64 {
        let pool = self.pool.as_ref();

        delete_each(batch, |request| async move {
            sqlx::query(
                "UPDATE urls SET deleted = TRUE WHERE id = $1 AND owner_id = $2 AND deleted = FALSE",
            )
            .bind(request.id)
            .bind(request.owner_id)
            .execute(pool)
            .await
            .map(|done| done.rows_affected())
        })
        .await
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}

#[async_trait]
impl BulkUrlRepository for PgUrlRepository {
    async fn export_all(&self) -> Result<Vec<ShortenedUrl>, AppError> {
        let rows = sqlx::query_as::<_, UrlRow>(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn import_all(&self, urls: Vec<ShortenedUrl>) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        for url in &urls {
            sqlx::query(
                r#"
                INSERT INTO urls (id, owner_id, original_url, deleted, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE
                SET owner_id = EXCLUDED.owner_id,
                    original_url = EXCLUDED.original_url,
                    deleted = EXCLUDED.deleted,
                    created_at = EXCLUDED.created_at
                "#,
            )
            .bind(url.id)
            .bind(url.owner_id)
            .bind(&url.original_url)
            .bind(url.deleted)
            .bind(url.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('urls', 'id'), COALESCE(MAX(id), 0) + 1, false) FROM urls",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(urls.len())
    }
}
