//! Data models for the application, organized by domain.

mod asset;
mod gallery;
mod upload;

pub use asset::*;
pub use gallery::*;
pub use upload::*;
