//! Upload scheduling.

pub mod scheduler;
pub mod types;

pub use scheduler::{
    NoopUploadObserver, SchedulerConfig, UploadBatchOutcome, UploadFileResult, UploadObserver,
    UploadScheduler,
};
pub use types::{FileSource, LocalFile};
