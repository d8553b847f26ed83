//! Error types for Complyr
//!
//! Centralized error handling using thiserror. Loading and review errors stay
//! in their own modules (`ChecklistError`, `LoaderError`, `ReviewError`,
//! `LlmError`); `ComplyrError` covers report output.

use thiserror::Error;

/// Errors raised while rendering or exporting a report
#[derive(Debug, Error)]
pub enum ComplyrError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Export bundle could not be written
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Result type alias for Complyr operations
pub type Result<T> = std::result::Result<T, ComplyrError>;
