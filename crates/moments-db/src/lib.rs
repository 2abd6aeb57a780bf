//! Moments DB Library
//!
//! Document-store boundary for galleries and asset records: the
//! [`GalleryStore`] / [`AssetStore`] traits, the Postgres repositories behind
//! them, and in-memory implementations for tests and local development.

pub mod db;
pub mod memory;
pub mod traits;

pub use db::{PgAssetRepository, PgGalleryRepository};
pub use memory::{MemoryAssetStore, MemoryGalleryStore};
pub use traits::{AssetStore, GalleryStore};
