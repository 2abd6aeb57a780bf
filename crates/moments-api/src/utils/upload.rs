//! Common utilities for the batch upload handler.

use axum::extract::Multipart;
use bytes::Bytes;
use moments_core::AppError;
use moments_services::LocalFile;

/// Extract every file field from a multipart form, preserving order.
/// Fields without a filename are ignored.
pub async fn extract_multipart_files(mut multipart: Multipart) -> Result<Vec<LocalFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let Some(filename) = field.file_name().map(|s: &str| s.to_string()) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(|s: &str| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        files.push(LocalFile::from_bytes(
            filename,
            content_type,
            Bytes::from(data),
        ));
    }

    if files.is_empty() {
        return Err(AppError::InvalidInput("No files provided".to_string()));
    }

    Ok(files)
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Validate that the filename carries an allowed extension.
pub fn validate_file_extension(filename: &str, allowed: &[String]) -> Result<(), AppError> {
    let extension = filename
        .rsplit('.')
        .next()
        .filter(|ext| *ext != filename)
        .map(|ext| ext.to_lowercase())
        .ok_or_else(|| {
            AppError::InvalidInput(format!("Missing file extension (filename: {})", filename))
        })?;

    if !allowed.iter().any(|a| *a == extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid extension '{}', allowed: {:?}",
            extension, allowed
        )));
    }
    Ok(())
}
