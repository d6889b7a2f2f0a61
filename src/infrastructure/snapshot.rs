//! File snapshots of a whole repository.
//!
//! The in-memory store loses everything on exit. A [`FileSnapshot`] restores
//! it at startup and dumps it again at graceful shutdown.
//!
//! # Format
//!
//! JSON Lines: one [`SnapshotRecord`] per line. Saving writes a sibling
//! `.tmp` file first and renames it over the target, so an interrupted save
//! leaves the previous snapshot intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;

use crate::domain::entities::ShortenedUrl;
use crate::domain::repositories::BulkUrlRepository;
use crate::error::AppError;

/// Errors raised while reading or writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot access snapshot file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot file {path} at line {line}: {source}")]
    Format {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot transfer snapshot records: {0}")]
    Store(#[from] AppError),
}

/// A single persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: i64,
    pub owner_id: i64,
    #[serde(deserialize_with = "absolute_url")]
    pub original_url: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Accepts only absolute URLs, stored in their normalized form.
fn absolute_url<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Url::parse(&raw)
        .map(String::from)
        .map_err(|e| serde::de::Error::custom(format!("invalid original_url '{raw}': {e}")))
}

impl From<ShortenedUrl> for SnapshotRecord {
    fn from(url: ShortenedUrl) -> Self {
        Self {
            id: url.id,
            owner_id: url.owner_id,
            original_url: url.original_url,
            deleted: url.deleted,
            created_at: url.created_at,
        }
    }
}

impl From<SnapshotRecord> for ShortenedUrl {
    fn from(record: SnapshotRecord) -> Self {
        ShortenedUrl::new(
            record.id,
            record.owner_id,
            record.original_url,
            record.deleted,
            record.created_at,
        )
    }
}

/// Snapshot stored in a local file.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record of the file.
    ///
    /// A missing file reads as an empty snapshot. Blank lines are ignored.
    pub async fn read_records(&self) -> Result<Vec<SnapshotRecord>, SnapshotError> {
        match self.read_content().await? {
            Some(content) => self.parse(&content),
            None => Ok(Vec::new()),
        }
    }

    /// Loads the snapshot into `repository`.
    ///
    /// Returns the number of restored records. A missing file restores nothing;
    /// any other failure must abort startup.
    pub async fn restore_into<R>(&self, repository: &R) -> Result<usize, SnapshotError>
    where
        R: BulkUrlRepository + ?Sized,
    {
        let Some(content) = self.read_content().await? else {
            warn!(path = %self.path.display(), "Snapshot file not found, starting empty");
            return Ok(0);
        };

        let records = self.parse(&content)?;
        let restored = repository
            .import_all(records.into_iter().map(Into::into).collect())
            .await?;

        info!(path = %self.path.display(), restored, "Snapshot restored");
        Ok(restored)
    }

    /// Writes every record of `repository` to the file.
    ///
    /// Returns the number of saved records.
    pub async fn save_from<R>(&self, repository: &R) -> Result<usize, SnapshotError>
    where
        R: BulkUrlRepository + ?Sized,
    {
        let urls = repository.export_all().await?;
        let saved = self
            .write_records(urls.into_iter().map(Into::into).collect())
            .await?;

        info!(path = %self.path.display(), saved, "Snapshot saved");
        Ok(saved)
    }

    /// Replaces the file content with `records`.
    pub async fn write_records(&self, records: Vec<SnapshotRecord>) -> Result<usize, SnapshotError> {
        let mut buffer = Vec::new();
        for (index, record) in records.iter().enumerate() {
            serde_json::to_writer(&mut buffer, record).map_err(|source| {
                SnapshotError::Format {
                    path: self.path.clone(),
                    line: index + 1,
                    source,
                }
            })?;
            buffer.push(b'\n');
        }

        let tmp_path = self.tmp_path();
        let io_error = |source| SnapshotError::Io {
            path: tmp_path.clone(),
            source,
        };

        let mut file = fs::File::create(&tmp_path).await.map_err(io_error)?;
        file.write_all(&buffer).await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: self.path.clone(),
                source,
            })?;

        Ok(records.len())
    }

    async fn read_content(&self) -> Result<Option<String>, SnapshotError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SnapshotError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn parse(&self, content: &str) -> Result<Vec<SnapshotRecord>, SnapshotError> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|source| SnapshotError::Format {
                    path: self.path.clone(),
                    line: index + 1,
                    source,
                })
            })
            .collect()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
