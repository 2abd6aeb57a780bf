//! Postgres repositories.

mod asset;
mod gallery;

pub use asset::PgAssetRepository;
pub use gallery::PgGalleryRepository;
