//! Validation for client-supplied identifiers and placeholder hashes.

use std::sync::LazyLock;

use regex::Regex;

use crate::AppError;

pub const MAX_OBJECT_ID_LENGTH: usize = 36;
pub const MIN_PLACEHOLDER_HASH_LENGTH: usize = 6;
pub const MAX_PLACEHOLDER_HASH_LENGTH: usize = 100;
pub const MAX_ASSET_DIMENSION: i32 = 20_000;

static OBJECT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$").expect("valid regex"));

// base83 alphabet used by the placeholder encoding
static PLACEHOLDER_HASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z#$%*+,\-./:;=?@\[\]^_{|}~]+$").expect("valid regex")
});

/// Validate an opaque storage object id.
pub fn validate_object_id(id: &str) -> Result<(), AppError> {
    if id.is_empty() || id.len() > MAX_OBJECT_ID_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Object ID must be 1-{} characters: {:?}",
            MAX_OBJECT_ID_LENGTH, id
        )));
    }
    if !OBJECT_ID_RE.is_match(id) {
        return Err(AppError::InvalidInput(format!(
            "Object ID contains invalid characters: {:?}",
            id
        )));
    }
    Ok(())
}

/// Validate a placeholder hash string.
pub fn validate_placeholder_hash(hash: &str) -> Result<(), AppError> {
    if hash.len() < MIN_PLACEHOLDER_HASH_LENGTH || hash.len() > MAX_PLACEHOLDER_HASH_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Placeholder hash must be {}-{} characters",
            MIN_PLACEHOLDER_HASH_LENGTH, MAX_PLACEHOLDER_HASH_LENGTH
        )));
    }
    if !PLACEHOLDER_HASH_RE.is_match(hash) {
        return Err(AppError::InvalidInput(
            "Placeholder hash contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate asset dimensions.
pub fn validate_dimensions(width: i32, height: i32) -> Result<(), AppError> {
    if width <= 0 || height <= 0 || width > MAX_ASSET_DIMENSION || height > MAX_ASSET_DIMENSION {
        return Err(AppError::InvalidInput(format!(
            "Dimensions must be positive and at most {}: {}x{}",
            MAX_ASSET_DIMENSION, width, height
        )));
    }
    Ok(())
}
