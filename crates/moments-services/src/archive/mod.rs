//! Archive assembly.

pub mod service;

pub use service::{
    ArchiveBundle, ArchiveConfig, ArchiveObserver, ArchiveService, NoopArchiveObserver,
};
