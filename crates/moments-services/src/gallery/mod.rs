//! Gallery enumeration.

pub mod walker;

pub use walker::AssetWalker;
