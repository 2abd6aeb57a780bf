//! Moments Services Layer
//!
//! This crate is the business service layer for the bulk asset transfer
//! pipeline: the upload scheduler, the metadata finalizer, the gallery asset
//! walker, and the archive assembler. Keep coordination logic here; keep thin
//! HTTP handling in moments-api.

pub mod archive;
pub mod finalize;
pub mod gallery;
pub mod upload;

pub use archive::{
    ArchiveBundle, ArchiveConfig, ArchiveObserver, ArchiveService, NoopArchiveObserver,
};
pub use finalize::{FinalizeConfig, FinalizeService};
pub use gallery::AssetWalker;
pub use moments_storage::{
    create_object_store, LocalObjectStore, MemoryObjectStore, ObjectMetadata, ObjectStore,
    ProgressFn, StorageBackend, StorageError, StorageResult,
};
pub use upload::{
    FileSource, LocalFile, NoopUploadObserver, SchedulerConfig, UploadBatchOutcome,
    UploadFileResult, UploadObserver, UploadScheduler,
};
