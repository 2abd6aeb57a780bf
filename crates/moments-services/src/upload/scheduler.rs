//! Upload scheduler: bounded worker pool with per-file retry and progress.
//!
//! A fixed pool of workers pulls file indices from a shared queue; each worker
//! handles one file fully (upload, then placeholder generation) before pulling
//! the next. Workers report results to a single aggregator over a channel, so
//! the completed set is accumulated in one place rather than behind scattered
//! locks.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use moments_core::models::{UploadTaskState, UploadedAsset};
use moments_processing::{is_video_filename, PlaceholderGenerator};
use moments_storage::{ObjectStore, ProgressFn};
use tokio::sync::mpsc;

use super::types::LocalFile;

/// Observer for per-file upload state transitions (drives the upload UI).
pub trait UploadObserver: Send + Sync {
    fn on_state(&self, index: usize, state: &UploadTaskState);
}

/// Observer that discards all updates.
pub struct NoopUploadObserver;

impl UploadObserver for NoopUploadObserver {
    fn on_state(&self, _index: usize, _state: &UploadTaskState) {}
}

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Number of concurrent upload workers.
    pub concurrency: usize,
    /// Attempts per file before it is marked failed for this run.
    pub max_attempts: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_attempts: 3,
        }
    }
}

/// Result of uploading one batch.
#[derive(Debug, Default)]
pub struct UploadBatchOutcome {
    /// Successfully uploaded files, keyed by their index in the input batch.
    pub completed: BTreeMap<usize, UploadedAsset>,
    /// Indices that exhausted every attempt.
    pub failed: BTreeSet<usize>,
}

impl UploadBatchOutcome {
    /// Completed assets in input order, ready for the finalizer.
    pub fn completed_assets(&self) -> Vec<UploadedAsset> {
        self.completed.values().cloned().collect()
    }
}

/// Outcome of a single file upload.
#[derive(Debug)]
pub enum UploadFileResult {
    Completed(UploadedAsset),
    Failed { attempts: u32 },
}

enum WorkerEvent {
    Completed { index: usize, asset: UploadedAsset },
    Failed { index: usize },
}

pub struct UploadScheduler {
    store: Arc<dyn ObjectStore>,
    config: SchedulerConfig,
}

impl UploadScheduler {
    pub fn new(store: Arc<dyn ObjectStore>, config: SchedulerConfig) -> Self {
        Self { store, config }
    }

    /// Upload every file in the batch, driving `observer` with per-file state.
    ///
    /// Completion order across files is unspecified; only the identity of the
    /// completed and failed sets is. Dropping the returned future abandons
    /// in-flight transfers without compensation.
    pub async fn run(
        &self,
        files: Vec<LocalFile>,
        observer: Arc<dyn UploadObserver>,
    ) -> UploadBatchOutcome {
        let mut outcome = UploadBatchOutcome::default();
        if files.is_empty() {
            return outcome;
        }

        let total = files.len();
        let files = Arc::new(files);
        let queue: Arc<Mutex<VecDeque<usize>>> = Arc::new(Mutex::new((0..total).collect()));
        let (tx, mut rx) = mpsc::channel::<WorkerEvent>(total);

        let worker_count = self.config.concurrency.min(total);
        tracing::debug!(
            file_count = total,
            workers = worker_count,
            max_attempts = self.config.max_attempts,
            "Starting upload batch"
        );

        for _ in 0..worker_count {
            let store = self.store.clone();
            let files = files.clone();
            let queue = queue.clone();
            let observer = observer.clone();
            let tx = tx.clone();
            let max_attempts = self.config.max_attempts;

            tokio::spawn(async move {
                loop {
                    let index = {
                        let mut queue = queue.lock().expect("lock poisoned");
                        queue.pop_front()
                    };
                    let Some(index) = index else { break };

                    let event = match upload_one(
                        store.clone(),
                        &files[index],
                        index,
                        max_attempts,
                        observer.clone(),
                    )
                    .await
                    {
                        UploadFileResult::Completed(asset) => {
                            WorkerEvent::Completed { index, asset }
                        }
                        UploadFileResult::Failed { .. } => WorkerEvent::Failed { index },
                    };

                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        // Single aggregator: workers never touch the outcome maps directly.
        while let Some(event) = rx.recv().await {
            match event {
                WorkerEvent::Completed { index, asset } => {
                    outcome.completed.insert(index, asset);
                }
                WorkerEvent::Failed { index } => {
                    outcome.failed.insert(index);
                }
            }
        }

        tracing::info!(
            completed = outcome.completed.len(),
            failed = outcome.failed.len(),
            "Upload batch finished"
        );

        outcome
    }

    /// Manually retry a single file that previously failed, reusing the
    /// per-file retry logic.
    pub async fn retry_single(
        &self,
        file: &LocalFile,
        index: usize,
        observer: Arc<dyn UploadObserver>,
    ) -> UploadFileResult {
        upload_one(
            self.store.clone(),
            file,
            index,
            self.config.max_attempts,
            observer,
        )
        .await
    }
}

/// Map cumulative bytes to a 0-100 percentage. Zero-byte files report 100 the
/// instant the platform reports anything at all.
fn progress_percent(bytes: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (bytes.saturating_mul(100) + total / 2) / total;
    pct.min(100) as u8
}

/// Upload one file with up to `max_attempts` attempts. Progress resets to 0
/// at the start of each attempt; there is no byte-range resume, a retry
/// restarts from the first byte.
async fn upload_one(
    store: Arc<dyn ObjectStore>,
    file: &LocalFile,
    index: usize,
    max_attempts: u32,
    observer: Arc<dyn UploadObserver>,
) -> UploadFileResult {
    let is_video = is_video_filename(&file.name);

    for attempt in 1..=max_attempts {
        observer.on_state(
            index,
            &UploadTaskState::Uploading {
                attempt,
                progress: 0,
            },
        );

        // Local read errors are permanent: the bytes are gone, retrying
        // cannot help.
        let data = match file.source.read().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    file = %file.name,
                    error = %e,
                    "Local file unreadable, failing without retry"
                );
                observer.on_state(index, &UploadTaskState::Failed { attempts: attempt });
                return UploadFileResult::Failed { attempts: attempt };
            }
        };

        let total = data.len() as u64;
        let progress: ProgressFn = {
            let observer = observer.clone();
            Arc::new(move |bytes: u64| {
                observer.on_state(
                    index,
                    &UploadTaskState::Uploading {
                        attempt,
                        progress: progress_percent(bytes, total),
                    },
                );
            })
        };

        match store
            .put(&file.name, &file.content_type, data.clone(), Some(progress))
            .await
        {
            Ok(object_id) => {
                observer.on_state(
                    index,
                    &UploadTaskState::Uploading {
                        attempt,
                        progress: 100,
                    },
                );

                // Placeholder generation never fails the upload: any error
                // inside collapses to the fallback hash.
                let placeholder = PlaceholderGenerator::generate(&data, is_video).await;
                let asset = UploadedAsset::new(object_id.clone(), &placeholder);

                observer.on_state(index, &UploadTaskState::Done { object_id });
                return UploadFileResult::Completed(asset);
            }
            Err(e) => {
                tracing::warn!(
                    file = %file.name,
                    attempt,
                    max_attempts,
                    error = %e,
                    "Upload attempt failed"
                );
                // Next loop iteration resets progress to 0; the partial
                // transfer is discarded.
            }
        }
    }

    observer.on_state(
        index,
        &UploadTaskState::Failed {
            attempts: max_attempts,
        },
    );
    UploadFileResult::Failed {
        attempts: max_attempts,
    }
}
