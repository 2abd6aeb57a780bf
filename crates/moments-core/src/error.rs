//! Error types module
//!
//! All errors are unified under the `AppError` enum, which covers database,
//! storage, validation, and pipeline-specific failures. The `Database` variant
//! and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// This trait allows errors to self-describe their HTTP response characteristics.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    /// Transient storage/network failure; safe to retry.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A local file could not be read. Not retried: the bytes are gone.
    #[error("File unreadable: {0}")]
    FileUnreadable(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more referenced storage objects do not exist. The finalizer
    /// fails the whole batch so no asset record can point at nothing.
    #[error("Referenced objects not found: {}", ids.join(", "))]
    MissingObjects { ids: Vec<String> },

    /// The gallery's expiry timestamp is in the past.
    #[error("Gallery expired: {0}")]
    Expired(String),

    /// Archive assembly finished with fewer entries than expected.
    #[error("Archive incomplete: {added} of {expected} files could be included")]
    PartialArchive { added: usize, expected: usize },

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

// Error conversion implementations following Rust best practices
#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in the ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::FileUnreadable(_) => (
            400,
            "FILE_UNREADABLE",
            false,
            Some("Re-select the file and upload again"),
            false,
            LogLevel::Warn,
        ),
        AppError::ImageProcessing(_) => (
            400,
            "IMAGE_PROCESSING_ERROR",
            false,
            Some("Check image format and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingObjects { .. } => (
            404,
            "OBJECTS_NOT_FOUND",
            false,
            Some("Re-upload the missing files and finalize again"),
            false,
            LogLevel::Warn,
        ),
        AppError::Expired(_) => (
            410,
            "GALLERY_EXPIRED",
            false,
            Some("Ask the organizer to extend the gallery expiry"),
            false,
            LogLevel::Debug,
        ),
        AppError::PartialArchive { .. } => (
            500,
            "ARCHIVE_INCOMPLETE",
            true,
            Some("Retry the download"),
            false,
            LogLevel::Warn,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::FileUnreadable(_) => "FileUnreadable",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::MissingObjects { .. } => "MissingObjects",
            AppError::Expired(_) => "Expired",
            AppError::PartialArchive { .. } => "PartialArchive",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::FileUnreadable(ref msg) => msg.clone(),
            AppError::ImageProcessing(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::MissingObjects { ids } => {
                format!("Some file IDs were not found: {}", ids.join(", "))
            }
            AppError::Expired(_) => "Gallery has expired".to_string(),
            AppError::PartialArchive { added, expected } => format!(
                "Only {} of {} files could be included in the archive",
                added, expected
            ),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
