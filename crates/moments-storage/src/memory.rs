//! In-memory object storage backend.
//!
//! Used by tests and local development. Supports failure injection (always
//! fail uploads whose filename matches a pattern, fail the next N uploads for
//! a name, fail downloads for specific ids) and tracks the peak number of
//! concurrent uploads so tests can assert the scheduler's concurrency bound.

use crate::traits::{ObjectMetadata, ObjectStore, ProgressFn, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    filename: Option<String>,
    content_type: String,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_uploads_matching: Mutex<Vec<String>>,
    fail_next_uploads: Mutex<HashMap<String, u32>>,
    fail_downloads: Mutex<HashSet<String>>,
    upload_delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    put_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload whose filename contains `pattern` fails.
    pub fn fail_uploads_matching(&self, pattern: impl Into<String>) {
        self.fail_uploads_matching
            .lock()
            .expect("lock poisoned")
            .push(pattern.into());
    }

    /// The next `count` uploads of `filename` fail, then uploads succeed.
    pub fn fail_next_uploads(&self, filename: impl Into<String>, count: u32) {
        self.fail_next_uploads
            .lock()
            .expect("lock poisoned")
            .insert(filename.into(), count);
    }

    /// Downloads of `object_id` fail with a transient error.
    pub fn fail_downloads_for(&self, object_id: impl Into<String>) {
        self.fail_downloads
            .lock()
            .expect("lock poisoned")
            .insert(object_id.into());
    }

    /// Delay every upload, so concurrent puts overlap in tests.
    pub fn set_upload_delay(&self, delay: Duration) {
        *self.upload_delay.lock().expect("lock poisoned") = Some(delay);
    }

    /// Drop the advertised filename for an object (platform returned no
    /// content-disposition).
    pub fn hide_filename(&self, object_id: &str) {
        if let Some(obj) = self
            .objects
            .lock()
            .expect("lock poisoned")
            .get_mut(object_id)
        {
            obj.filename = None;
        }
    }

    /// Peak number of uploads that were in flight simultaneously.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Total number of put calls, including failed ones.
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("lock poisoned").len()
    }

    fn should_fail_upload(&self, filename: &str) -> bool {
        if self
            .fail_uploads_matching
            .lock()
            .expect("lock poisoned")
            .iter()
            .any(|p| filename.contains(p.as_str()))
        {
            return true;
        }
        let mut next = self.fail_next_uploads.lock().expect("lock poisoned");
        if let Some(remaining) = next.get_mut(filename) {
            if *remaining > 0 {
                *remaining -= 1;
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
        progress: Option<ProgressFn>,
    ) -> StorageResult<String> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.upload_delay.lock().expect("lock poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.should_fail_upload(filename) {
            Err(StorageError::UploadFailed(format!(
                "injected failure for {}",
                filename
            )))
        } else {
            let total = data.len() as u64;
            if let Some(ref progress) = progress {
                if total > 0 {
                    progress(total / 2);
                }
                progress(total);
            }
            let object_id = Uuid::new_v4().to_string();
            self.objects.lock().expect("lock poisoned").insert(
                object_id.clone(),
                StoredObject {
                    data,
                    filename: Some(filename.to_string()),
                    content_type: content_type.to_string(),
                },
            );
            Ok(object_id)
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn get(&self, object_id: &str) -> StorageResult<Bytes> {
        if self
            .fail_downloads
            .lock()
            .expect("lock poisoned")
            .contains(object_id)
        {
            return Err(StorageError::DownloadFailed(format!(
                "injected failure for {}",
                object_id
            )));
        }
        self.objects
            .lock()
            .expect("lock poisoned")
            .get(object_id)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(object_id.to_string()))
    }

    async fn metadata(&self, object_id: &str) -> StorageResult<ObjectMetadata> {
        self.objects
            .lock()
            .expect("lock poisoned")
            .get(object_id)
            .map(|o| ObjectMetadata {
                filename: o.filename.clone(),
                content_type: Some(o.content_type.clone()),
                content_length: o.data.len() as u64,
            })
            .ok_or_else(|| StorageError::NotFound(object_id.to_string()))
    }

    async fn exists(&self, object_id: &str) -> StorageResult<bool> {
        Ok(self
            .objects
            .lock()
            .expect("lock poisoned")
            .contains_key(object_id))
    }

    async fn delete(&self, object_id: &str) -> StorageResult<()> {
        self.objects
            .lock()
            .expect("lock poisoned")
            .remove(object_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(object_id.to_string()))
    }
}
