//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, snapshot restore, the deletion worker and the
//! Axum server lifecycle.

use crate::application::services::ShortenerService;
use crate::config::{Config, StorageConfig, mask_connection_string};
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::{InMemoryUrlRepository, PgUrlRepository};
use crate::infrastructure::snapshot::FileSnapshot;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Storage chosen at startup together with what it needs at shutdown.
enum Backend {
    Postgres {
        pool: PgPool,
        repository: Arc<PgUrlRepository>,
    },
    Memory {
        repository: Arc<InMemoryUrlRepository>,
        snapshot: Option<FileSnapshot>,
    },
}

impl Backend {
    async fn open(config: &Config) -> Result<Self> {
        match config.storage() {
            StorageConfig::Postgres { database_url } => {
                let pool = connect_pool(config, &database_url).await?;
                tracing::info!("Connected to database");

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to apply migrations")?;

                let repository = Arc::new(PgUrlRepository::new(Arc::new(pool.clone())));
                Ok(Self::Postgres { pool, repository })
            }
            StorageConfig::Memory { snapshot_path } => {
                let repository = Arc::new(InMemoryUrlRepository::new());
                let snapshot = snapshot_path.map(FileSnapshot::new);

                if let Some(snapshot) = &snapshot {
                    snapshot
                        .restore_into(repository.as_ref())
                        .await
                        .context("Failed to restore snapshot")?;
                } else {
                    tracing::warn!("No snapshot file configured, data will not survive restarts");
                }

                Ok(Self::Memory {
                    repository,
                    snapshot,
                })
            }
        }
    }

    fn repository(&self) -> Arc<dyn UrlRepository> {
        match self {
            Self::Postgres { repository, .. } => repository.clone() as Arc<dyn UrlRepository>,
            Self::Memory { repository, .. } => repository.clone() as Arc<dyn UrlRepository>,
        }
    }

    /// Releases the storage. For the in-memory store this writes the snapshot.
    async fn close(self) -> Result<()> {
        match self {
            Self::Postgres { pool, .. } => {
                pool.close().await;
                Ok(())
            }
            Self::Memory {
                repository,
                snapshot: Some(snapshot),
            } => {
                snapshot
                    .save_from(repository.as_ref())
                    .await
                    .with_context(|| {
                        format!("Failed to save snapshot to {}", snapshot.path().display())
                    })?;
                Ok(())
            }
            Self::Memory { snapshot: None, .. } => Ok(()),
        }
    }
}

/// Connects to PostgreSQL, retrying with jittered exponential backoff.
async fn connect_pool(config: &Config, database_url: &str) -> Result<PgPool> {
    let strategy = ExponentialBackoff::from_millis(100)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(config.db_connect_retries.saturating_sub(1));

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout));

    Retry::start(strategy, || {
        let options = options.clone();
        async move {
            options.connect(database_url).await.inspect_err(|e| {
                tracing::warn!(error = %e, "Database connection attempt failed");
            })
        }
    })
    .await
    .with_context(|| {
        format!(
            "Failed to connect to database {}",
            mask_connection_string(database_url)
        )
    })
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL pool and migrations, or the in-memory store and its snapshot
/// - The shortening service with its deletion worker
/// - Axum HTTP server with graceful shutdown on SIGINT/SIGTERM
///
/// After the server stops, pending deletions are flushed before the storage
/// is closed. A snapshot that cannot be saved does not hold shutdown back; it
/// is logged and reported through the returned error.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Snapshot restore fails
/// - Server bind fails
/// - Server runtime error occurs
/// - Snapshot save fails
pub async fn run(config: Config) -> Result<()> {
    let backend = Backend::open(&config).await?;

    let shortener = Arc::new(ShortenerService::new(
        backend.repository(),
        &config.base_url,
        config.deletion_batch_config(),
    )?);

    let app = app_router(AppState::new(shortener.clone()));

    let listener = tokio::net::TcpListener::bind(&config.server_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_address))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    shortener.shutdown().await;

    let closed = backend.close().await;
    if let Err(e) = &closed {
        tracing::error!("Storage was not closed cleanly: {e:#}");
    }

    served.context("Server error")?;
    closed?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
