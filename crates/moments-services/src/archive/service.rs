//! Archive assembly: fetch every asset concurrently and build one ZIP.
//!
//! Fetch workers run under a semaphore and ship entries over a channel to a
//! single aggregator that deduplicates filenames and writes the archive.
//! Individual fetch failures are logged and swallowed during fan-out so the
//! completeness gate can produce one aggregate error instead of aborting
//! mid-stream: an archive with fewer entries than expected is never returned
//! as success.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use moments_core::models::AssetRecord;
use moments_core::AppError;
use moments_storage::ObjectStore;
use tokio::sync::{mpsc, Semaphore};

/// Observer for archive build progress (`files_added` out of `expected`).
pub trait ArchiveObserver: Send + Sync {
    fn on_progress(&self, added: usize, expected: usize);
}

/// Observer that discards all updates.
pub struct NoopArchiveObserver;

impl ArchiveObserver for NoopArchiveObserver {
    fn on_progress(&self, _added: usize, _expected: usize) {}
}

#[derive(Clone, Debug)]
pub struct ArchiveConfig {
    /// Concurrent asset fetches. Higher than the upload pool since downloads
    /// are cheaper than uploads.
    pub fetch_concurrency: usize,
    /// Maximum length of the generated archive name (before ".zip").
    pub name_max_len: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 15,
            name_max_len: 100,
        }
    }
}

/// A finished archive ready for download.
#[derive(Debug)]
pub struct ArchiveBundle {
    /// Download filename, `<sanitized-gallery-name>.zip`.
    pub filename: String,
    pub data: Vec<u8>,
    pub files_added: usize,
}

struct FetchedEntry {
    object_id: String,
    filename: Option<String>,
    data: Bytes,
}

pub struct ArchiveService {
    objects: Arc<dyn ObjectStore>,
    config: ArchiveConfig,
}

impl ArchiveService {
    pub fn new(objects: Arc<dyn ObjectStore>, config: ArchiveConfig) -> Self {
        Self { objects, config }
    }

    /// Build a ZIP of every record's current bytes.
    ///
    /// Returns `Ok(None)` for an empty record list (no archive, not an
    /// error). Returns `PartialArchive` when any asset could not be fetched;
    /// no archive is offered in that case.
    #[tracing::instrument(skip(self, records, observer), fields(expected = records.len()))]
    pub async fn build(
        &self,
        gallery_name: &str,
        records: &[AssetRecord],
        observer: Arc<dyn ArchiveObserver>,
    ) -> Result<Option<ArchiveBundle>, AppError> {
        let expected = records.len();
        if expected == 0 {
            return Ok(None);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.fetch_concurrency));
        let (tx, mut rx) = mpsc::channel::<FetchedEntry>(expected);

        for record in records {
            let objects = self.objects.clone();
            let object_id = record.object_id.clone();
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("semaphore closed");
            let tx = tx.clone();

            tokio::spawn(async move {
                let result = fetch_entry(objects.as_ref(), &object_id).await;
                drop(permit);

                match result {
                    Ok(entry) => {
                        let _ = tx.send(entry).await;
                    }
                    Err(e) => {
                        // Swallowed on purpose; the completeness gate below
                        // reports the aggregate count.
                        tracing::warn!(
                            object_id = %object_id,
                            error = %e,
                            "Failed to fetch asset for archive"
                        );
                    }
                }
            });
        }
        drop(tx);

        // Single aggregator: the ZIP writer and the dedup set are only ever
        // touched here.
        let mut buffer = Vec::new();
        let mut files_added = 0usize;
        {
            use zip::write::{FileOptions, ZipWriter};
            use zip::CompressionMethod;

            let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);

            let mut seen: HashSet<String> = HashSet::new();

            while let Some(entry) = rx.recv().await {
                let resolved = entry
                    .filename
                    .as_deref()
                    .unwrap_or(entry.object_id.as_str());
                let safe = sanitize_archive_filename(resolved, &entry.object_id);
                let unique = dedupe_filename(&safe, &mut seen);

                zip.start_file(&unique, options)
                    .map_err(|e| AppError::Internal(format!("Failed to add file to ZIP: {}", e)))?;
                zip.write_all(&entry.data)
                    .map_err(|e| AppError::Internal(format!("Failed to write ZIP entry: {}", e)))?;

                files_added += 1;
                observer.on_progress(files_added, expected);
            }

            zip.finish()
                .map_err(|e| AppError::Internal(format!("Failed to finalize ZIP: {}", e)))?;
        }

        // Completeness gate: an incomplete archive is never shipped.
        if files_added != expected {
            tracing::warn!(
                files_added,
                expected,
                "Archive incomplete, withholding download"
            );
            return Err(AppError::PartialArchive {
                added: files_added,
                expected,
            });
        }

        tracing::info!(files_added, size_bytes = buffer.len(), "Archive built");

        Ok(Some(ArchiveBundle {
            filename: format!(
                "{}.zip",
                archive_file_name(gallery_name, self.config.name_max_len)
            ),
            data: buffer,
            files_added,
        }))
    }
}

/// One HTTP fetch for the bytes plus one metadata lookup for the original
/// filename. A missing filename is not an error; the object id stands in.
async fn fetch_entry(
    objects: &dyn ObjectStore,
    object_id: &str,
) -> Result<FetchedEntry, moments_storage::StorageError> {
    let data = objects.get(object_id).await?;
    let filename = match objects.metadata(object_id).await {
        Ok(meta) => meta.filename,
        Err(e) => {
            tracing::debug!(object_id = %object_id, error = %e, "No metadata for object");
            None
        }
    };
    Ok(FetchedEntry {
        object_id: object_id.to_string(),
        filename,
        data,
    })
}

/// Sanitize a filename for an archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Resolve a unique entry name within one archive build by inserting a
/// counter before the extension: `name (1).ext`, `name (2).ext`, ...
fn dedupe_filename(filename: &str, seen: &mut HashSet<String>) -> String {
    let mut unique = filename.to_string();
    let mut counter = 1;
    while seen.contains(&unique) {
        unique = match filename.rfind('.') {
            Some(dot) if dot > 0 => {
                format!("{} ({}){}", &filename[..dot], counter, &filename[dot..])
            }
            _ => format!("{} ({})", filename, counter),
        };
        counter += 1;
    }
    seen.insert(unique.clone());
    unique
}

/// Derive the archive's filename from the gallery display name: strip
/// everything outside `[A-Za-z0-9 _-]`, collapse whitespace to hyphens,
/// lowercase, truncate.
fn archive_file_name(name: &str, max_len: usize) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join("-");
    let lowered = collapsed.to_lowercase();
    let truncated: String = lowered.chars().take(max_len).collect();
    if truncated.is_empty() {
        "gallery".to_string()
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moments_storage::MemoryObjectStore;
    use std::io::Read;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct RecordingObserver {
        updates: Mutex<Vec<(usize, usize)>>,
    }

    impl ArchiveObserver for RecordingObserver {
        fn on_progress(&self, added: usize, expected: usize) {
            self.updates
                .lock()
                .expect("lock poisoned")
                .push((added, expected));
        }
    }

    async fn stored_record(
        store: &MemoryObjectStore,
        filename: &str,
        data: &'static [u8],
    ) -> AssetRecord {
        let object_id = store
            .put(filename, "image/jpeg", Bytes::from_static(data), None)
            .await
            .unwrap();
        AssetRecord {
            id: Uuid::new_v4(),
            gallery_id: Uuid::new_v4(),
            object_id,
            placeholder_hash: "LEHV6nWB2yk8pyo0adR*.7kCMdnj".to_string(),
            width: 800,
            height: 600,
            created_at: chrono::Utc::now(),
        }
    }

    fn entry_names(data: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).expect("open zip");
        (0..archive.len())
            .map(|i| archive.by_index(i).expect("entry").name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_empty_subset_is_noop() {
        let store = Arc::new(MemoryObjectStore::new());
        let service = ArchiveService::new(store, ArchiveConfig::default());
        let result = service
            .build("Party", &[], Arc::new(NoopArchiveObserver))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_archive_contains_every_asset() {
        let store = Arc::new(MemoryObjectStore::new());
        let mut records = Vec::new();
        for i in 0..5 {
            records.push(stored_record(&store, &format!("p{}.jpg", i), b"abc").await);
        }
        let service = ArchiveService::new(store, ArchiveConfig::default());

        let bundle = service
            .build("Summer Party", &records, Arc::new(NoopArchiveObserver))
            .await
            .unwrap()
            .expect("archive produced");

        assert_eq!(bundle.files_added, 5);
        assert_eq!(bundle.filename, "summer-party.zip");
        assert_eq!(entry_names(&bundle.data).len(), 5);
    }

    #[tokio::test]
    async fn test_duplicate_filenames_are_renamed() {
        let store = Arc::new(MemoryObjectStore::new());
        let records = vec![
            stored_record(&store, "photo.jpg", b"one").await,
            stored_record(&store, "photo.jpg", b"two").await,
        ];
        let service = ArchiveService::new(store, ArchiveConfig::default());

        let bundle = service
            .build("Party", &records, Arc::new(NoopArchiveObserver))
            .await
            .unwrap()
            .expect("archive produced");

        let mut names = entry_names(&bundle.data);
        names.sort();
        assert_eq!(names, vec!["photo (1).jpg", "photo.jpg"]);
    }

    #[tokio::test]
    async fn test_partial_fetch_fails_gate_and_withholds_archive() {
        let store = Arc::new(MemoryObjectStore::new());
        let records = vec![
            stored_record(&store, "a.jpg", b"a").await,
            stored_record(&store, "b.jpg", b"b").await,
            stored_record(&store, "c.jpg", b"c").await,
        ];
        store.fail_downloads_for(records[1].object_id.clone());
        let service = ArchiveService::new(store, ArchiveConfig::default());

        let err = service
            .build("Party", &records, Arc::new(NoopArchiveObserver))
            .await
            .unwrap_err();
        match err {
            AppError::PartialArchive { added, expected } => {
                assert_eq!(added, 2);
                assert_eq!(expected, 3);
            }
            other => panic!("expected PartialArchive, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_filename_falls_back_to_object_id() {
        let store = Arc::new(MemoryObjectStore::new());
        let record = stored_record(&store, "secret.jpg", b"x").await;
        store.hide_filename(&record.object_id);
        let service = ArchiveService::new(store, ArchiveConfig::default());

        let bundle = service
            .build("Party", &[record.clone()], Arc::new(NoopArchiveObserver))
            .await
            .unwrap()
            .expect("archive produced");

        assert_eq!(entry_names(&bundle.data), vec![record.object_id]);
    }

    #[tokio::test]
    async fn test_progress_reports_each_added_file() {
        let store = Arc::new(MemoryObjectStore::new());
        let records = vec![
            stored_record(&store, "a.jpg", b"a").await,
            stored_record(&store, "b.jpg", b"b").await,
        ];
        let service = ArchiveService::new(store, ArchiveConfig::default());
        let observer = Arc::new(RecordingObserver {
            updates: Mutex::new(Vec::new()),
        });

        service
            .build("Party", &records, observer.clone())
            .await
            .unwrap();

        let updates = observer.updates.lock().expect("lock poisoned").clone();
        assert_eq!(updates, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_entry_bytes_roundtrip() {
        let store = Arc::new(MemoryObjectStore::new());
        let records = vec![stored_record(&store, "a.txt", b"payload").await];
        let service = ArchiveService::new(store, ArchiveConfig::default());

        let bundle = service
            .build("Party", &records, Arc::new(NoopArchiveObserver))
            .await
            .unwrap()
            .expect("archive produced");

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(&bundle.data[..])).unwrap();
        let mut contents = String::new();
        archive
            .by_name("a.txt")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "payload");
    }

    #[test]
    fn test_archive_file_name_sanitation() {
        assert_eq!(archive_file_name("Summer Party", 100), "summer-party");
        assert_eq!(
            archive_file_name("Nora & Sam's Wedding!", 100),
            "nora-sams-wedding"
        );
        assert_eq!(archive_file_name("  spaced   out  ", 100), "spaced-out");
        assert_eq!(archive_file_name("!!!", 100), "gallery");
        assert_eq!(archive_file_name(&"x".repeat(150), 100).len(), 100);
    }

    #[test]
    fn test_dedupe_filename_counting() {
        let mut seen = HashSet::new();
        assert_eq!(dedupe_filename("photo.jpg", &mut seen), "photo.jpg");
        assert_eq!(dedupe_filename("photo.jpg", &mut seen), "photo (1).jpg");
        assert_eq!(dedupe_filename("photo.jpg", &mut seen), "photo (2).jpg");
        assert_eq!(dedupe_filename("noext", &mut seen), "noext");
        assert_eq!(dedupe_filename("noext", &mut seen), "noext (1)");
        // A leading dot is an extensionless hidden file, not an extension.
        assert_eq!(dedupe_filename(".hidden", &mut seen), ".hidden");
        assert_eq!(dedupe_filename(".hidden", &mut seen), ".hidden (1)");
    }

    #[test]
    fn test_sanitize_archive_filename() {
        assert_eq!(
            sanitize_archive_filename("../../etc/passwd", "fallback"),
            "passwd"
        );
        assert_eq!(
            sanitize_archive_filename("photo.jpg", "fallback"),
            "photo.jpg"
        );
        assert_eq!(sanitize_archive_filename("", "fallback"), "fallback");
        assert_eq!(sanitize_archive_filename("..", "fallback"), "fallback");
    }
}
