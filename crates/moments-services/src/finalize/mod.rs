//! Metadata finalization.

pub mod service;

pub use service::{FinalizeConfig, FinalizeService};
