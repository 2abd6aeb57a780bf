//! Moments Processing Library
//!
//! Image preprocessing for the upload pipeline: placeholder hash and
//! dimension extraction.

pub mod placeholder;

pub use placeholder::{is_video_filename, PlaceholderGenerator};
