//! Background worker that applies deletion requests in batches.
//!
//! Requests arrive through a bounded channel and are accumulated in memory.
//! A batch is flushed to the repository when it reaches
//! [`DeletionBatchConfig::batch_capacity`] or when the flush interval elapses,
//! whichever comes first. Closing the channel flushes what is left and stops
//! the worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::entities::UrlToDelete;
use crate::domain::repositories::UrlRepository;

/// Default number of requests that triggers an immediate flush.
pub const DEFAULT_BATCH_CAPACITY: usize = 1000;

/// Default maximum time a request waits before being flushed.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Default size of the inbound request buffer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Tuning of the deletion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionBatchConfig {
    pub batch_capacity: usize,
    pub flush_interval: Duration,
    /// Capacity of the channel feeding the worker. Submitters wait when it is full.
    pub queue_capacity: usize,
}

impl Default for DeletionBatchConfig {
    fn default() -> Self {
        Self {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushTrigger {
    Capacity,
    Interval,
    Shutdown,
}

impl FlushTrigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::Interval => "interval",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Runs until every sender of `rx` is dropped.
///
/// Each flush is attempted once. Per-item failures are handled by the
/// repository, so a flush never fails as a whole.
pub async fn run_deletion_worker(
    mut rx: mpsc::Receiver<UrlToDelete>,
    repository: Arc<dyn UrlRepository>,
    config: DeletionBatchConfig,
) {
    let capacity = config.batch_capacity.max(1);
    let period = config.flush_interval.max(Duration::from_millis(1));

    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut batch: Vec<UrlToDelete> = Vec::with_capacity(capacity);

    info!(
        batch_capacity = capacity,
        flush_interval_ms = period.as_millis() as u64,
        "Deletion worker started"
    );

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(request) => {
                    batch.push(request);
                    if batch.len() >= capacity {
                        flush(repository.as_ref(), &mut batch, capacity, FlushTrigger::Capacity).await;
                    }
                }
                None => {
                    if !batch.is_empty() {
                        flush(repository.as_ref(), &mut batch, capacity, FlushTrigger::Shutdown).await;
                    }
                    break;
                }
            },
            _ = ticker.tick() => {
                if !batch.is_empty() {
                    flush(repository.as_ref(), &mut batch, capacity, FlushTrigger::Interval).await;
                }
            }
        }
    }

    info!("Deletion worker stopped");
}

async fn flush(
    repository: &dyn UrlRepository,
    batch: &mut Vec<UrlToDelete>,
    capacity: usize,
    trigger: FlushTrigger,
) {
    let requests = std::mem::replace(batch, Vec::with_capacity(capacity));
    let size = requests.len();

    let deleted = repository.delete_batch(requests).await;

    metrics::counter!("shortener_deletion_flushes_total", "trigger" => trigger.as_str())
        .increment(1);
    metrics::counter!("shortener_deletion_records_deleted_total").increment(deleted);

    debug!(
        trigger = trigger.as_str(),
        size, deleted, "Flushed deletion batch"
    );
}
